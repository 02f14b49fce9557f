//! folio - interactive behaviour for a static resume page
//!
//! The page core (navigation effects, scroll reveals, the contact form,
//! notifications and the timers that sequence them) is plain Rust that talks
//! to the page only through two ports:
//! - [`port::Presentation`] / [`port::Navigator`]: every visible or outbound effect
//! - [`scheduler::Scheduler`]: every deferred callback
//!
//! ## Architecture
//!
//! - **Browser** (`dom-web`, wasm32): `web::DomPort` and
//!   `web::BrowserScheduler` drive the real page; `wasm_api` exports the
//!   public actions to page scripts.
//! - **Native** (`native`): the `folio` CLI replays scripted sessions against
//!   [`port::RecordingPort`] and [`scheduler::ManualScheduler`] and prints
//!   every effect with its virtual timestamp.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --features native -- replay session.toml
//! wasm-pack build --target web --features dom-web
//! ```

// Core layers (all platforms)
pub mod config;
pub mod debug;
pub mod flags;
pub mod notify;
pub mod observer;
pub mod port;
pub mod ratelimit;
pub mod scheduler;

// Page behaviours and their assembly
pub mod actions;
pub mod page;
pub mod scenario;
pub mod site;

// Platform abstraction layer
pub mod platform;

// Browser host
#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
pub mod web;

// JS exports
#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
pub mod wasm_api;

#[cfg(test)]
pub(crate) mod test_support;

pub use actions::{Actions, PublicAction};
pub use config::SiteConfig;
pub use flags::PageFlags;
pub use notify::{NotificationManager, Severity};
pub use port::{ElementRef, Navigator, Presentation, RecordingPort};
pub use scheduler::{ManualScheduler, Scheduler, TaskHandle};
pub use site::{PageEvent, PageInventory, Site, StartOptions};
