//! Notification manager.
//!
//! At most one notification is on screen at any time: `notify` always tears
//! down the current one before building the next, so there is no queue and no
//! stacking. Each notification owns two timers (fade start and removal); both
//! are cancelled whenever the notification goes away early, so no callback can
//! touch a notification that no longer exists.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::debug::{self, cat};
use crate::port::{NotificationView, Presentation};
use crate::scheduler::{Scheduler, TaskHandle};

pub const DEFAULT_DURATION_MS: u32 = 5000;
pub const DEFAULT_FADE_MS: u32 = 300;
pub const DEFAULT_COMPACT_BREAKPOINT_PX: u32 = 480;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn color(self) -> &'static str {
        match self {
            Severity::Success => "#10b981",
            Severity::Error => "#ef4444",
            Severity::Warning => "#f59e0b",
            Severity::Info => "#3b82f6",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "fas fa-check-circle",
            Severity::Error => "fas fa-exclamation-circle",
            Severity::Warning => "fas fa-exclamation-triangle",
            Severity::Info => "fas fa-info-circle",
        }
    }

    /// Like `parse`, but unknown names fall back to `Info`.
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for Severity {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "success" => Ok(Severity::Success),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(anyhow!(
                "Invalid severity '{s}'. Valid options: info, success, warning, error"
            )),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Where the notification sits on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLayout {
    /// Floating card in the top-right corner.
    Corner,
    /// Full-width banner for small viewports.
    Banner,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationState {
    Showing,
    Dismissing,
    Removed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub duration_ms: u32,
    pub state: NotificationState,
}

#[derive(Clone, Copy, Debug)]
pub struct NotifySettings {
    pub default_duration_ms: u32,
    pub fade_ms: u32,
    /// Viewports at or below this width get the banner layout.
    pub compact_breakpoint_px: u32,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            default_duration_ms: DEFAULT_DURATION_MS,
            fade_ms: DEFAULT_FADE_MS,
            compact_breakpoint_px: DEFAULT_COMPACT_BREAKPOINT_PX,
        }
    }
}

struct Active {
    note: Notification,
    fade: Option<TaskHandle>,
    expire: TaskHandle,
}

struct Shared {
    port: Rc<dyn Presentation>,
    sched: Rc<dyn Scheduler>,
    settings: NotifySettings,
    viewport_width: Cell<u32>,
    next_id: Cell<u64>,
    active: RefCell<Option<Active>>,
}

/// Owner of the single notification region. Clones share state.
#[derive(Clone)]
pub struct NotificationManager {
    shared: Rc<Shared>,
}

impl NotificationManager {
    pub fn new(
        port: Rc<dyn Presentation>,
        sched: Rc<dyn Scheduler>,
        settings: NotifySettings,
        viewport_width: u32,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                port,
                sched,
                settings,
                viewport_width: Cell::new(viewport_width),
                next_id: Cell::new(1),
                active: RefCell::new(None),
            }),
        }
    }

    /// Show `message` with the default duration.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> u64 {
        self.notify_for(message, severity, self.shared.settings.default_duration_ms)
    }

    /// Replace whatever is on screen with a new notification that expires
    /// after `duration_ms`. Returns the new notification's id.
    pub fn notify_for(&self, message: impl Into<String>, severity: Severity, duration_ms: u32) -> u64 {
        let shared = &self.shared;
        shared.remove_active();

        let id = shared.next_id.get();
        shared.next_id.set(id + 1);

        let note = Notification {
            id,
            message: message.into(),
            severity,
            duration_ms,
            state: NotificationState::Showing,
        };
        let layout = if shared.viewport_width.get() <= shared.settings.compact_breakpoint_px {
            NotificationLayout::Banner
        } else {
            NotificationLayout::Corner
        };
        shared.port.show_notification(&NotificationView {
            id,
            message: note.message.clone(),
            severity,
            color: severity.color(),
            icon: severity.icon(),
            duration_ms,
            fade_ms: shared.settings.fade_ms,
            layout,
        });
        debug::log(cat::NOTIFY, format!("show #{id} ({severity}, {duration_ms}ms)"));

        let fade_at = duration_ms.saturating_sub(shared.settings.fade_ms);
        let weak = Rc::downgrade(shared);
        let fade = (fade_at < duration_ms).then(|| {
            shared
                .sched
                .schedule(fade_at, Box::new(move || Shared::on_fade(&weak, id)))
        });
        let weak = Rc::downgrade(shared);
        let expire = shared
            .sched
            .schedule(duration_ms, Box::new(move || Shared::on_expire(&weak, id)));

        *shared.active.borrow_mut() = Some(Active { note, fade, expire });
        id
    }

    /// User-initiated close. Returns `false` (and does nothing) when `id` is
    /// not the notification currently on screen.
    pub fn dismiss(&self, id: u64) -> bool {
        let is_current = matches!(
            self.shared.active.borrow().as_ref(),
            Some(active) if active.note.id == id
        );
        if !is_current {
            debug::log(cat::NOTIFY, format!("dismiss #{id} ignored (not active)"));
            return false;
        }
        self.shared.remove_active();
        true
    }

    /// Remove the current notification, whatever it is.
    pub fn clear(&self) {
        self.shared.remove_active();
    }

    pub fn current(&self) -> Option<Notification> {
        self.shared.active.borrow().as_ref().map(|a| a.note.clone())
    }

    pub fn set_viewport_width(&self, width: u32) {
        self.shared.viewport_width.set(width);
    }

    pub fn settings(&self) -> NotifySettings {
        self.shared.settings
    }
}

impl Shared {
    fn remove_active(&self) {
        let Some(active) = self.active.borrow_mut().take() else {
            return;
        };
        if let Some(fade) = active.fade {
            self.sched.cancel(fade);
        }
        self.sched.cancel(active.expire);
        self.port.remove_notification(active.note.id);
        debug::log(cat::NOTIFY, format!("remove #{}", active.note.id));
    }

    fn on_fade(weak: &Weak<Shared>, id: u64) {
        let Some(shared) = weak.upgrade() else { return };
        let faded = {
            let mut active = shared.active.borrow_mut();
            match active.as_mut() {
                Some(a) if a.note.id == id => {
                    a.fade = None;
                    a.note.state = NotificationState::Dismissing;
                    true
                }
                _ => false,
            }
        };
        if faded {
            shared.port.fade_notification(id);
        }
    }

    fn on_expire(weak: &Weak<Shared>, id: u64) {
        let Some(shared) = weak.upgrade() else { return };
        let still_current = matches!(
            shared.active.borrow().as_ref(),
            Some(a) if a.note.id == id
        );
        if still_current {
            shared.remove_active();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{PortCall, RecordingPort};
    use crate::scheduler::ManualScheduler;

    fn setup(width: u32) -> (Rc<ManualScheduler>, Rc<RecordingPort>, NotificationManager) {
        let sched = ManualScheduler::shared();
        let port = Rc::new(RecordingPort::new());
        let mgr = NotificationManager::new(port.clone(), sched.clone(), NotifySettings::default(), width);
        (sched, port, mgr)
    }

    #[test]
    fn severity_parsing() {
        assert_eq!("SUCCESS".parse::<Severity>().unwrap(), Severity::Success);
        assert_eq!(Severity::parse_lossy("bogus"), Severity::Info);
        assert!("bogus".parse::<Severity>().is_err());
    }

    #[test]
    fn lifecycle_showing_dismissing_removed() {
        let (sched, port, mgr) = setup(1280);
        let id = mgr.notify("hello", Severity::Info);

        assert_eq!(mgr.current().unwrap().state, NotificationState::Showing);
        sched.advance(4_700);
        assert_eq!(mgr.current().unwrap().state, NotificationState::Dismissing);
        sched.advance(300);
        assert!(mgr.current().is_none());

        let calls = port.calls();
        assert!(matches!(calls[0], PortCall::ShowNotification { .. }));
        assert_eq!(calls[1], PortCall::FadeNotification { id });
        assert_eq!(calls[2], PortCall::RemoveNotification { id });
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn new_notification_replaces_old_first() {
        let (sched, port, mgr) = setup(1280);
        let first = mgr.notify("one", Severity::Info);
        port.clear();
        let second = mgr.notify("two", Severity::Error);

        let calls = port.calls();
        assert_eq!(calls[0], PortCall::RemoveNotification { id: first });
        match &calls[1] {
            PortCall::ShowNotification { view } => {
                assert_eq!(view.id, second);
                assert_eq!(view.color, "#ef4444");
            }
            other => panic!("unexpected call {other:?}"),
        }
        // Old timers are gone: only the new pair remains.
        assert_eq!(sched.pending_count(), 2);
    }

    #[test]
    fn stale_dismiss_is_noop() {
        let (sched, port, mgr) = setup(1280);
        let first = mgr.notify("one", Severity::Info);
        let second = mgr.notify("two", Severity::Info);

        port.clear();
        assert!(!mgr.dismiss(first));
        assert!(port.calls().is_empty());
        assert_eq!(mgr.current().unwrap().id, second);

        assert!(mgr.dismiss(second));
        assert!(!mgr.dismiss(second));
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn user_dismiss_cancels_expiry() {
        let (sched, port, mgr) = setup(1280);
        let id = mgr.notify("bye", Severity::Warning);
        assert!(mgr.dismiss(id));
        port.clear();
        sched.run_until_idle();
        assert!(port.calls().is_empty());
    }

    #[test]
    fn small_viewport_uses_banner() {
        let (_sched, port, mgr) = setup(480);
        mgr.notify("tiny", Severity::Success);
        match &port.calls()[0] {
            PortCall::ShowNotification { view } => {
                assert_eq!(view.layout, NotificationLayout::Banner)
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn short_duration_fades_immediately() {
        let (sched, _port, mgr) = setup(1280);
        mgr.notify_for("quick", Severity::Info, 200);
        sched.advance(0);
        assert_eq!(mgr.current().unwrap().state, NotificationState::Dismissing);
        sched.advance(200);
        assert!(mgr.current().is_none());
    }
}
