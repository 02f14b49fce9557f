//! End-to-end page flows driven through `Site` on the virtual clock

use std::rc::Rc;

use folio::actions::{mailto_link, RESUME_PENDING};
use folio::page::{PageContext, TypingPhase};
use folio::port::{Overlay, PortCall};
use folio::scenario::{replay, ReplayOptions, Scenario};
use folio::site::HeroTitle;
use folio::{
    ManualScheduler, PageEvent, PageInventory, PublicAction, RecordingPort, Severity, Site,
    SiteConfig, StartOptions,
};

struct Page {
    sched: Rc<ManualScheduler>,
    port: Rc<RecordingPort>,
    site: Rc<Site>,
}

fn page(config: SiteConfig) -> Page {
    let sched = ManualScheduler::shared();
    let port = Rc::new(RecordingPort::new());
    let ctx = PageContext::new(port.clone(), port.clone(), sched.clone(), Rc::new(config), 1280);
    let inventory = PageInventory {
        sections: vec!["#about".into(), "#contact".into()],
        hero_title: Some(HeroTitle {
            element: ".hero-left h1".into(),
            text: "Hey".into(),
        }),
        ..PageInventory::default()
    };
    let site = Site::start(ctx, inventory, StartOptions::default());
    Page { sched, port, site }
}

fn typed_text(port: &RecordingPort) -> String {
    port.calls()
        .iter()
        .filter_map(|c| match c {
            PortCall::AppendText { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn typing_runs_to_completion_then_drops_cursor() {
    let p = page(SiteConfig::default());
    let typing = p.site.typing().expect("hero title is typed");

    p.sched.advance(999);
    assert_eq!(typing.phase(), TypingPhase::Idle);
    p.sched.advance(1);
    assert_eq!(typing.phase(), TypingPhase::Typing(1));
    p.sched.advance(100);
    assert_eq!(typing.phase(), TypingPhase::Typing(3));
    p.sched.advance(50);
    assert_eq!(typing.phase(), TypingPhase::Cursoring);
    assert!(p
        .port
        .calls()
        .iter()
        .any(|c| matches!(c, PortCall::AppendOverlay { overlay: Overlay::Cursor { .. }, .. })));

    p.sched.advance(3000);
    assert_eq!(typing.phase(), TypingPhase::Done);
    assert_eq!(typed_text(&p.port), "Hey");
}

#[test]
fn restarting_typing_abandons_the_old_run() {
    let p = page(SiteConfig::default());
    p.sched.advance(1050);
    assert_eq!(p.site.typing().map(|t| t.phase()), Some(TypingPhase::Typing(2)));

    p.port.clear();
    p.site.restart_typing();
    p.sched.run_until_idle();

    assert_eq!(typed_text(&p.port), "Hey");
    assert_eq!(p.site.typing().map(|t| t.phase()), Some(TypingPhase::Done));
    assert_eq!(p.port.text_of(&".hero-left h1".into()), "Hey");
}

#[test]
fn failed_mail_handoff_falls_back_to_address() {
    let p = page(SiteConfig::default());
    p.port.fail_navigation(true);

    assert!(p.site.action(PublicAction::SendEmail));
    let note = p.site.context().notifier.current().expect("fallback notification");
    assert_eq!(note.message, "Please email me at: hello@example.com");
    assert_eq!(note.severity, Severity::Info);
}

#[test]
fn mail_handoff_uses_configured_owner() {
    let p = page(SiteConfig::default());
    p.site.handle(PageEvent::Action {
        action: PublicAction::SendEmail,
    });
    let expected = mailto_link(&p.site.context().config.owner);
    assert!(p.port.calls().contains(&PortCall::Navigate { url: expected }));
}

#[test]
fn resume_without_file_explains_itself() {
    let mut config = SiteConfig::default();
    config.owner.resume_url = None;
    let p = page(config);

    p.site.action(PublicAction::DownloadResume);
    let note = p.site.context().notifier.current().expect("notification");
    assert_eq!(note.message, RESUME_PENDING);
}

#[test]
fn notify_export_skips_the_action_throttle() {
    let p = page(SiteConfig::default());
    assert!(p.site.action(PublicAction::ScrollToTop));
    p.site.handle(PageEvent::Notify {
        message: "Saved".into(),
        severity: Some("success".into()),
        duration_ms: Some(1000),
    });
    let note = p.site.context().notifier.current().expect("notification");
    assert_eq!((note.message.as_str(), note.severity), ("Saved", Severity::Success));

    p.sched.advance(1000);
    assert!(p.site.context().notifier.current().is_none());
}

#[test]
fn scenario_file_replays_deterministically() {
    let script = r##"{
        "viewport_width": 390,
        "inventory": { "sections": ["#about"] },
        "steps": [
            { "at_ms": 0, "type": "click", "region": "hamburger" },
            { "at_ms": 10, "type": "key_down", "key": "Escape" },
            { "at_ms": 20, "type": "offline" }
        ]
    }"##;
    let scenario = Scenario::from_json_str(script).unwrap();
    let first = replay(&scenario, SiteConfig::default(), ReplayOptions::default()).unwrap();
    let second = replay(&scenario, SiteConfig::default(), ReplayOptions::default()).unwrap();
    assert_eq!(first, second);

    let locks: Vec<(u64, bool)> = first
        .iter()
        .filter_map(|c| match c.call {
            PortCall::BodyScrollLocked { locked } => Some((c.at_ms, locked)),
            _ => None,
        })
        .collect();
    assert_eq!(locks, vec![(0, true), (10, false)]);

    let banner = first.iter().find_map(|c| match &c.call {
        PortCall::ShowNotification { view } => Some(view.clone()),
        _ => None,
    });
    assert!(banner.is_some_and(|v| v.severity == Severity::Warning));
}
