//! Navbar scroll effects: solid background once scrolled, auto-hide while
//! scrolling down on desktop, and a fixed-delay idle reset that brings it back.

use std::cell::Cell;
use std::rc::Rc;

use super::{is_desktop, PageContext};
use crate::debug::{self, cat};
use crate::port::{ElementRef, Presentation};
use crate::scheduler::TaskSlot;

const BG_SCROLLED: &str = "rgba(255, 255, 255, 0.98)";
const BG_TOP: &str = "rgba(255, 255, 255, 0.95)";
const SHADOW_SCROLLED: &str = "0 2px 20px rgba(0, 0, 0, 0.1)";
const HIDDEN: &str = "translateY(-100%)";
const SHOWN: &str = "translateY(0)";

pub struct Navbar {
    ctx: PageContext,
    el: ElementRef,
    autohide: bool,
    last_scroll_y: Cell<f64>,
    idle: TaskSlot,
}

impl Navbar {
    pub fn new(ctx: PageContext, el: ElementRef, autohide: bool, initial_scroll_y: f64) -> Self {
        let idle = TaskSlot::new(ctx.sched.clone());
        Self {
            ctx,
            el,
            autohide,
            last_scroll_y: Cell::new(initial_scroll_y),
            idle,
        }
    }

    pub fn on_scroll(&self, y: f64, viewport_width: u32) {
        let layout = &self.ctx.config.layout;
        let port = &self.ctx.port;

        if y > layout.navbar_scrolled_px {
            port.set_style(&self.el, "background", BG_SCROLLED);
            port.set_style(&self.el, "box-shadow", SHADOW_SCROLLED);
        } else {
            port.set_style(&self.el, "background", BG_TOP);
            port.set_style(&self.el, "box-shadow", "none");
        }

        if self.autohide && is_desktop(&self.ctx.config, viewport_width) {
            let scrolling_down = y > self.last_scroll_y.get() && y > layout.navbar_hide_after_px;
            port.set_style(&self.el, "transform", if scrolling_down { HIDDEN } else { SHOWN });

            // Fixed delay regardless of scroll velocity.
            let reset_port: Rc<dyn Presentation> = port.clone();
            let el = self.el.clone();
            self.idle.arm(self.ctx.config.timing.navbar_idle_ms, move || {
                debug::log(cat::NAV, "scroll idle, showing navbar");
                reset_port.set_style(&el, "transform", SHOWN);
            });
        }

        self.last_scroll_y.set(y);
    }

    pub fn idle_pending(&self) -> bool {
        self.idle.is_armed()
    }
}
