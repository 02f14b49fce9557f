//! Page behaviours built on the core layers.
//!
//! Each behaviour is a small component that owns its own state and reaches
//! the page only through the shared [`PageContext`].

use std::rc::Rc;

use crate::config::SiteConfig;
use crate::notify::NotificationManager;
use crate::port::{Navigator, Presentation};
use crate::scheduler::Scheduler;

pub mod contact;
pub mod menu;
pub mod navbar;
pub mod parallax;
pub mod reveal;
pub mod ripple;
pub mod typing;

pub use contact::{ContactFields, ContactForm, SubmitOutcome, ValidationError};
pub use menu::MobileMenu;
pub use navbar::Navbar;
pub use parallax::Parallax;
pub use reveal::{LazyImages, SectionReveal, SkillBar, SkillBars};
pub use ripple::{ripple_geometry, Ripples};
pub use typing::{Typewriter, TypingPhase};

/// Handles every page component needs.
#[derive(Clone)]
pub struct PageContext {
    pub port: Rc<dyn Presentation>,
    pub nav: Rc<dyn Navigator>,
    pub sched: Rc<dyn Scheduler>,
    pub notifier: NotificationManager,
    pub config: Rc<SiteConfig>,
}

impl PageContext {
    pub fn new(
        port: Rc<dyn Presentation>,
        nav: Rc<dyn Navigator>,
        sched: Rc<dyn Scheduler>,
        config: Rc<SiteConfig>,
        viewport_width: u32,
    ) -> Self {
        let notifier = NotificationManager::new(
            port.clone(),
            sched.clone(),
            config.notify_settings(),
            viewport_width,
        );
        Self {
            port,
            nav,
            sched,
            notifier,
            config,
        }
    }
}

/// True when `width` counts as a desktop viewport.
pub fn is_desktop(config: &SiteConfig, width: u32) -> bool {
    width > config.layout.desktop_breakpoint_px
}

/// Format a px value the way CSS expects (no `-0`).
pub(crate) fn px(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}px")
}
