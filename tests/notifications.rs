//! Notification manager: exclusivity, timing and stale dismissal

use std::rc::Rc;

use folio::notify::{NotificationLayout, NotificationManager, NotificationState, NotifySettings, Severity};
use folio::port::{PortCall, RecordingPort};
use folio::scheduler::{ManualScheduler, Scheduler};

fn setup(width: u32) -> (Rc<ManualScheduler>, Rc<RecordingPort>, NotificationManager) {
    let sched = ManualScheduler::shared();
    let port = Rc::new(RecordingPort::new());
    let manager = NotificationManager::new(port.clone(), sched.clone(), NotifySettings::default(), width);
    (sched, port, manager)
}

/// Notifications shown but not yet removed, according to the port.
fn on_screen(port: &RecordingPort) -> Vec<u64> {
    let mut live = Vec::new();
    for call in port.calls() {
        match call {
            PortCall::ShowNotification { view } => live.push(view.id),
            PortCall::RemoveNotification { id } => live.retain(|x| *x != id),
            _ => {}
        }
    }
    live
}

#[test]
fn at_most_one_notification_at_any_time() {
    let (sched, port, manager) = setup(1280);
    let mut ids = Vec::new();
    for (i, severity) in [Severity::Info, Severity::Error, Severity::Success, Severity::Warning]
        .into_iter()
        .enumerate()
    {
        ids.push(manager.notify(format!("message {i}"), severity));
        assert_eq!(on_screen(&port), vec![*ids.last().unwrap()]);
        sched.advance(1000);
        assert!(on_screen(&port).len() <= 1);
    }

    sched.run_until_idle();
    assert!(on_screen(&port).is_empty());
    assert!(manager.current().is_none());
}

#[test]
fn fade_starts_before_removal() {
    let (sched, port, manager) = setup(1280);
    let id = manager.notify("hello", Severity::Success);

    sched.advance(4699);
    assert_eq!(manager.current().map(|n| n.state), Some(NotificationState::Showing));
    sched.advance(1);
    assert_eq!(manager.current().map(|n| n.state), Some(NotificationState::Dismissing));
    assert!(port.calls().contains(&PortCall::FadeNotification { id }));

    sched.advance(300);
    assert!(manager.current().is_none());
    assert_eq!(port.calls().last(), Some(&PortCall::RemoveNotification { id }));
}

#[test]
fn dismiss_cancels_pending_timers() {
    let (sched, _port, manager) = setup(1280);
    let id = manager.notify("bye", Severity::Info);
    assert!(manager.dismiss(id));
    assert_eq!(sched.pending_count(), 0);
    assert!(!manager.dismiss(id), "second dismiss is a no-op");
}

#[test]
fn stale_dismiss_never_removes_newer_notification() {
    let (sched, _port, manager) = setup(1280);
    let old = manager.notify("first", Severity::Info);
    let new = manager.notify("second", Severity::Info);

    assert!(!manager.dismiss(old));
    assert_eq!(manager.current().map(|n| n.id), Some(new));

    // The old notification's timers died with it.
    sched.advance(5000);
    assert!(manager.current().is_none());
    assert_eq!(sched.now_ms(), 5000);
}

#[test]
fn small_viewports_get_banner_layout() {
    let (_sched, port, manager) = setup(480);
    manager.notify("compact", Severity::Warning);
    manager.set_viewport_width(481);
    manager.notify("wide", Severity::Warning);

    let layouts: Vec<NotificationLayout> = port
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            PortCall::ShowNotification { view } => Some(view.layout),
            _ => None,
        })
        .collect();
    assert_eq!(layouts, vec![NotificationLayout::Banner, NotificationLayout::Corner]);
}

#[test]
fn short_durations_skip_to_dismissing() {
    let (sched, port, manager) = setup(1280);
    let id = manager.notify_for("blink", Severity::Info, 200);
    sched.advance(0);
    assert_eq!(manager.current().map(|n| n.state), Some(NotificationState::Dismissing));
    sched.advance(200);
    assert_eq!(port.calls().last(), Some(&PortCall::RemoveNotification { id }));
}
