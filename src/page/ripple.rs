//! Click ripple on buttons.

use super::PageContext;
use crate::debug::{self, cat};
use crate::observer::Rect;
use crate::port::{ElementRef, Overlay};

/// Ripple square centred on the click point, in the button's coordinate space.
pub fn ripple_geometry(rect: &Rect, x: f64, y: f64) -> Overlay {
    let size = rect.width.max(rect.height);
    Overlay::Ripple {
        size,
        left: x - rect.left - size / 2.0,
        top: y - rect.top - size / 2.0,
    }
}

pub struct Ripples {
    ctx: PageContext,
    enabled: bool,
}

impl Ripples {
    pub fn new(ctx: PageContext, enabled: bool) -> Self {
        Self { ctx, enabled }
    }

    /// Play a ripple for a click at client point (`x`, `y`) inside `button`.
    pub fn on_click(&self, button: &ElementRef, rect: &Rect, x: f64, y: f64) {
        if !self.enabled {
            return;
        }
        let port = &self.ctx.port;
        port.set_style(button, "position", "relative");
        port.set_style(button, "overflow", "hidden");
        let id = port.append_overlay(button, ripple_geometry(rect, x, y));
        debug::log(cat::INPUT, format!("ripple on {button}"));

        let port = port.clone();
        self.ctx.sched.schedule(
            self.ctx.config.timing.ripple_ms,
            Box::new(move || port.remove_overlay(id)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{OverlayId, PortCall};
    use crate::test_support::Harness;

    #[test]
    fn geometry_centres_on_click() {
        let rect = Rect { left: 100.0, top: 50.0, width: 120.0, height: 40.0 };
        assert_eq!(
            ripple_geometry(&rect, 130.0, 60.0),
            Overlay::Ripple { size: 120.0, left: -30.0, top: -50.0 }
        );
    }

    #[test]
    fn overlay_removed_after_animation() {
        let h = Harness::new();
        let ripples = Ripples::new(h.ctx(), true);
        let rect = Rect { left: 0.0, top: 0.0, width: 80.0, height: 80.0 };
        ripples.on_click(&".btn".into(), &rect, 40.0, 40.0);

        h.sched.advance(599);
        assert!(!h.port.calls().contains(&PortCall::RemoveOverlay { id: OverlayId(0) }));
        h.sched.advance(1);
        assert_eq!(h.port.calls().last(), Some(&PortCall::RemoveOverlay { id: OverlayId(0) }));
    }

    #[test]
    fn disabled_ripple_does_nothing() {
        let h = Harness::new();
        let ripples = Ripples::new(h.ctx(), false);
        let rect = Rect { left: 0.0, top: 0.0, width: 80.0, height: 80.0 };
        ripples.on_click(&".btn".into(), &rect, 10.0, 10.0);
        assert!(h.port.calls().is_empty());
        assert_eq!(h.sched.pending_count(), 0);
    }
}
