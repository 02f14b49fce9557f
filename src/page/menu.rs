//! Mobile hamburger menu.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use super::{is_desktop, PageContext};
use crate::debug::{self, cat};
use crate::port::ElementRef;

/// Where a click landed relative to the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickRegion {
    Hamburger,
    Menu,
    Outside,
}

pub struct MobileMenu {
    ctx: PageContext,
    hamburger: ElementRef,
    menu: ElementRef,
    open: Cell<bool>,
}

impl MobileMenu {
    pub fn new(ctx: PageContext, hamburger: ElementRef, menu: ElementRef) -> Self {
        Self {
            ctx,
            hamburger,
            menu,
            open: Cell::new(false),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn toggle(&self) {
        self.set_open(!self.open.get());
    }

    /// Close the menu if it is open. Returns whether anything changed.
    pub fn close(&self) -> bool {
        if !self.open.get() {
            return false;
        }
        self.set_open(false);
        true
    }

    pub fn on_click(&self, region: ClickRegion) {
        match region {
            ClickRegion::Hamburger => self.toggle(),
            ClickRegion::Menu => {}
            ClickRegion::Outside => {
                self.close();
            }
        }
    }

    pub fn on_key(&self, key: &str) {
        if key == "Escape" && self.close() {
            debug::log(cat::INPUT, "escape closed menu");
        }
    }

    pub fn on_resize(&self, width: u32) {
        if is_desktop(&self.ctx.config, width) {
            self.close();
        }
    }

    fn set_open(&self, open: bool) {
        self.open.set(open);
        let port = &self.ctx.port;
        port.set_class(&self.hamburger, "active", open);
        port.set_class(&self.menu, "active", open);
        port.set_body_scroll_locked(open);
        debug::log(cat::NAV, if open { "menu opened" } else { "menu closed" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortCall;
    use crate::test_support::Harness;

    fn menu(h: &Harness) -> MobileMenu {
        MobileMenu::new(h.ctx(), ".hamburger".into(), ".nav-menu".into())
    }

    #[test]
    fn hamburger_toggles_and_locks_scroll() {
        let h = Harness::new();
        let m = menu(&h);
        m.on_click(ClickRegion::Hamburger);
        assert!(m.is_open());
        assert!(h.port.calls().contains(&PortCall::BodyScrollLocked { locked: true }));

        m.on_click(ClickRegion::Hamburger);
        assert!(!m.is_open());
        assert_eq!(
            h.port.calls().last(),
            Some(&PortCall::BodyScrollLocked { locked: false })
        );
    }

    #[test]
    fn inside_click_keeps_menu_open() {
        let h = Harness::new();
        let m = menu(&h);
        m.toggle();
        m.on_click(ClickRegion::Menu);
        assert!(m.is_open());
        m.on_click(ClickRegion::Outside);
        assert!(!m.is_open());
    }

    #[test]
    fn escape_and_resize_close() {
        let h = Harness::new();
        let m = menu(&h);
        m.toggle();
        m.on_key("Enter");
        assert!(m.is_open());
        m.on_key("Escape");
        assert!(!m.is_open());

        m.toggle();
        m.on_resize(768);
        assert!(m.is_open());
        m.on_resize(769);
        assert!(!m.is_open());
    }

    #[test]
    fn closing_a_closed_menu_emits_nothing() {
        let h = Harness::new();
        let m = menu(&h);
        m.on_key("Escape");
        m.on_click(ClickRegion::Outside);
        assert!(h.port.calls().is_empty());
    }
}
