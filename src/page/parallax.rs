//! Hero parallax, desktop widths only.

use std::cell::Cell;
use std::rc::Rc;

use super::{is_desktop, px, PageContext};
use crate::debug::{self, cat};
use crate::port::ElementRef;
use crate::scheduler::TaskSlot;

pub struct Parallax {
    ctx: PageContext,
    hero: ElementRef,
    active: Cell<bool>,
    /// Latest scroll position; the pending frame reads it when it runs.
    scroll_y: Rc<Cell<f64>>,
    frame: TaskSlot,
}

impl Parallax {
    pub fn new(ctx: PageContext, hero: ElementRef, viewport_width: u32) -> Self {
        let active = is_desktop(&ctx.config, viewport_width);
        let frame = TaskSlot::new(ctx.sched.clone());
        Self {
            ctx,
            hero,
            active: Cell::new(active),
            scroll_y: Rc::new(Cell::new(0.0)),
            frame,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Request a frame update. At most one frame is pending at a time.
    pub fn on_scroll(&self, y: f64) {
        if !self.active.get() {
            return;
        }
        self.scroll_y.set(y);
        if self.frame.is_armed() {
            return;
        }
        let port = self.ctx.port.clone();
        let hero = self.hero.clone();
        let scroll_y = self.scroll_y.clone();
        let rate = self.ctx.config.layout.parallax_rate;
        self.frame.arm(self.ctx.config.timing.frame_ms, move || {
            let offset = px(scroll_y.get() * rate);
            port.set_style(&hero, "transform", &format!("translateY({offset})"));
        });
    }

    pub fn on_resize(&self, width: u32) {
        if is_desktop(&self.ctx.config, width) {
            if !self.active.replace(true) {
                debug::log(cat::INPUT, "parallax enabled");
            }
            return;
        }
        self.frame.cancel();
        self.ctx.port.set_style(&self.hero, "transform", "none");
        if self.active.replace(false) {
            debug::log(cat::INPUT, "parallax disabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortCall;
    use crate::test_support::Harness;

    fn transforms(h: &Harness) -> Vec<String> {
        h.port
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                PortCall::SetStyle { prop, value, .. } if prop == "transform" => Some(value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn one_frame_per_burst_uses_latest_position() {
        let h = Harness::new();
        let p = Parallax::new(h.ctx(), ".hero".into(), 1280);
        p.on_scroll(100.0);
        p.on_scroll(150.0);
        p.on_scroll(200.0);
        h.sched.advance(16);
        assert_eq!(transforms(&h), vec!["translateY(-100px)".to_string()]);

        p.on_scroll(0.0);
        h.sched.advance(16);
        assert_eq!(transforms(&h).last().map(String::as_str), Some("translateY(0px)"));
    }

    #[test]
    fn narrow_viewport_disables_and_resets() {
        let h = Harness::new();
        let p = Parallax::new(h.ctx(), ".hero".into(), 1280);
        p.on_scroll(300.0);
        p.on_resize(768);
        h.sched.run_until_idle();
        assert_eq!(transforms(&h), vec!["none".to_string()]);
        assert!(!p.is_active());

        p.on_scroll(400.0);
        assert_eq!(h.sched.pending_count(), 0);

        p.on_resize(1024);
        p.on_scroll(400.0);
        h.sched.advance(16);
        assert_eq!(transforms(&h).last().map(String::as_str), Some("translateY(-200px)"));
    }

    #[test]
    fn starts_inactive_on_mobile() {
        let h = Harness::new();
        let p = Parallax::new(h.ctx(), ".hero".into(), 375);
        p.on_scroll(500.0);
        assert!(h.port.calls().is_empty());
    }
}
