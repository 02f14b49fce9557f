//! Presentation and navigation ports.
//!
//! The core never touches the page directly. Everything visible goes through
//! [`Presentation`], and everything that leaves the page (mailto:, tel:,
//! new tabs) goes through [`Navigator`]. The browser implementation lives in
//! `web::dom`; [`RecordingPort`] implements both for tests and CLI replay.

use std::cell::{Cell, RefCell};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notify::{NotificationLayout, Severity};

/// Opaque reference to a page element (selector, id, or adapter-issued key).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(key: impl Into<String>) -> Self {
        ElementRef(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementRef {
    fn from(s: &str) -> Self {
        ElementRef(s.to_string())
    }
}

impl From<String> for ElementRef {
    fn from(s: String) -> Self {
        ElementRef(s)
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a transient child node created through [`Presentation::append_overlay`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

/// Transient decoration appended inside an element.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    /// Click ripple, positioned relative to the button's box (px).
    Ripple { size: f64, left: f64, top: f64 },
    /// Blinking caret shown after the typing effect finishes.
    Cursor { glyph: char },
}

/// Everything a host needs to render one notification.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NotificationView {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub color: &'static str,
    pub icon: &'static str,
    pub duration_ms: u32,
    pub fade_ms: u32,
    pub layout: NotificationLayout,
}

/// Presentation side effects. Implementations must tolerate unknown elements.
pub trait Presentation {
    fn set_style(&self, el: &ElementRef, prop: &str, value: &str);
    fn clear_style(&self, el: &ElementRef, prop: &str);
    fn set_class(&self, el: &ElementRef, class: &str, on: bool);
    fn set_text(&self, el: &ElementRef, text: &str);
    fn append_text(&self, el: &ElementRef, text: &str);
    /// Put a button into (or out of) its loading state.
    fn set_busy(&self, el: &ElementRef, busy: bool);
    fn append_overlay(&self, el: &ElementRef, overlay: Overlay) -> OverlayId;
    fn remove_overlay(&self, id: OverlayId);
    fn show_notification(&self, view: &NotificationView);
    /// Start the exit animation of a notification that is about to expire.
    fn fade_notification(&self, id: u64);
    fn remove_notification(&self, id: u64);
    fn scroll_into_view(&self, el: &ElementRef);
    fn scroll_to_top(&self);
    fn set_body_scroll_locked(&self, locked: bool);
    fn reset_form(&self, el: &ElementRef);
    fn load_image(&self, el: &ElementRef);
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("navigation to {url} was refused: {reason}")]
    Refused { url: String, reason: String },
}

/// Side effects that leave the page.
pub trait Navigator {
    /// Same-tab navigation (used for `mailto:` and `tel:` handoff).
    fn navigate(&self, url: &str) -> Result<(), NavError>;
    /// New tab with `noopener,noreferrer`.
    fn open_external(&self, url: &str) -> Result<(), NavError>;
    /// Fetch `url` as a file saved under `file_name`.
    fn download(&self, url: &str, file_name: &str) -> Result<(), NavError>;
}

/// One recorded port call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum PortCall {
    SetStyle { el: ElementRef, prop: String, value: String },
    ClearStyle { el: ElementRef, prop: String },
    SetClass { el: ElementRef, class: String, on: bool },
    SetText { el: ElementRef, text: String },
    AppendText { el: ElementRef, text: String },
    SetBusy { el: ElementRef, busy: bool },
    AppendOverlay { el: ElementRef, id: OverlayId, overlay: Overlay },
    RemoveOverlay { id: OverlayId },
    ShowNotification { view: NotificationView },
    FadeNotification { id: u64 },
    RemoveNotification { id: u64 },
    ScrollIntoView { el: ElementRef },
    ScrollToTop,
    BodyScrollLocked { locked: bool },
    ResetForm { el: ElementRef },
    LoadImage { el: ElementRef },
    Navigate { url: String },
    OpenExternal { url: String },
    Download { url: String, file_name: String },
}

/// Port that records every call instead of touching a page.
#[derive(Default)]
pub struct RecordingPort {
    calls: RefCell<Vec<PortCall>>,
    next_overlay: Cell<u64>,
    fail_navigation: Cell<bool>,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent navigation fail (no mail client, blocked popup).
    pub fn fail_navigation(&self, fail: bool) {
        self.fail_navigation.set(fail);
    }

    pub fn calls(&self) -> Vec<PortCall> {
        self.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<PortCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Last value written to `prop` on `el`, if any.
    pub fn style_of(&self, el: &ElementRef, prop: &str) -> Option<String> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            PortCall::SetStyle { el: e, prop: p, value } if e == el && p == prop => {
                Some(value.clone())
            }
            PortCall::ClearStyle { el: e, prop: p } if e == el && p == prop => Some(String::new()),
            _ => None,
        })
    }

    /// Text content of `el` as rebuilt from `SetText` / `AppendText` calls.
    pub fn text_of(&self, el: &ElementRef) -> String {
        let mut text = String::new();
        for call in self.calls.borrow().iter() {
            match call {
                PortCall::SetText { el: e, text: t } if e == el => text = t.clone(),
                PortCall::AppendText { el: e, text: t } if e == el => text.push_str(t),
                _ => {}
            }
        }
        text
    }

    fn record(&self, call: PortCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Presentation for RecordingPort {
    fn set_style(&self, el: &ElementRef, prop: &str, value: &str) {
        self.record(PortCall::SetStyle {
            el: el.clone(),
            prop: prop.to_string(),
            value: value.to_string(),
        });
    }

    fn clear_style(&self, el: &ElementRef, prop: &str) {
        self.record(PortCall::ClearStyle {
            el: el.clone(),
            prop: prop.to_string(),
        });
    }

    fn set_class(&self, el: &ElementRef, class: &str, on: bool) {
        self.record(PortCall::SetClass {
            el: el.clone(),
            class: class.to_string(),
            on,
        });
    }

    fn set_text(&self, el: &ElementRef, text: &str) {
        self.record(PortCall::SetText {
            el: el.clone(),
            text: text.to_string(),
        });
    }

    fn append_text(&self, el: &ElementRef, text: &str) {
        self.record(PortCall::AppendText {
            el: el.clone(),
            text: text.to_string(),
        });
    }

    fn set_busy(&self, el: &ElementRef, busy: bool) {
        self.record(PortCall::SetBusy {
            el: el.clone(),
            busy,
        });
    }

    fn append_overlay(&self, el: &ElementRef, overlay: Overlay) -> OverlayId {
        let id = OverlayId(self.next_overlay.get());
        self.next_overlay.set(id.0 + 1);
        self.record(PortCall::AppendOverlay {
            el: el.clone(),
            id,
            overlay,
        });
        id
    }

    fn remove_overlay(&self, id: OverlayId) {
        self.record(PortCall::RemoveOverlay { id });
    }

    fn show_notification(&self, view: &NotificationView) {
        self.record(PortCall::ShowNotification { view: view.clone() });
    }

    fn fade_notification(&self, id: u64) {
        self.record(PortCall::FadeNotification { id });
    }

    fn remove_notification(&self, id: u64) {
        self.record(PortCall::RemoveNotification { id });
    }

    fn scroll_into_view(&self, el: &ElementRef) {
        self.record(PortCall::ScrollIntoView { el: el.clone() });
    }

    fn scroll_to_top(&self) {
        self.record(PortCall::ScrollToTop);
    }

    fn set_body_scroll_locked(&self, locked: bool) {
        self.record(PortCall::BodyScrollLocked { locked });
    }

    fn reset_form(&self, el: &ElementRef) {
        self.record(PortCall::ResetForm { el: el.clone() });
    }

    fn load_image(&self, el: &ElementRef) {
        self.record(PortCall::LoadImage { el: el.clone() });
    }
}

impl Navigator for RecordingPort {
    fn navigate(&self, url: &str) -> Result<(), NavError> {
        if self.fail_navigation.get() {
            return Err(NavError::Refused {
                url: url.to_string(),
                reason: "no handler registered".to_string(),
            });
        }
        self.record(PortCall::Navigate {
            url: url.to_string(),
        });
        Ok(())
    }

    fn open_external(&self, url: &str) -> Result<(), NavError> {
        if self.fail_navigation.get() {
            return Err(NavError::Refused {
                url: url.to_string(),
                reason: "popup blocked".to_string(),
            });
        }
        self.record(PortCall::OpenExternal {
            url: url.to_string(),
        });
        Ok(())
    }

    fn download(&self, url: &str, file_name: &str) -> Result<(), NavError> {
        if self.fail_navigation.get() {
            return Err(NavError::Refused {
                url: url.to_string(),
                reason: "download blocked".to_string(),
            });
        }
        self.record(PortCall::Download {
            url: url.to_string(),
            file_name: file_name.to_string(),
        });
        Ok(())
    }
}
