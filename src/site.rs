//! The assembled page.
//!
//! [`Site`] is built once per page load from a [`PageContext`] and a
//! [`PageInventory`] (which optional parts the page actually has). Hosts feed
//! it semantic [`PageEvent`]s; it routes each one to the components that care.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::actions::{Actions, PublicAction};
use crate::debug::{self, cat};
use crate::flags::PageFlags;
use crate::notify::Severity;
use crate::observer::{Intersection, Observer, Rect, VisibilitySupport};
use crate::page::contact::SubmitOutcome;
use crate::page::menu::ClickRegion;
use crate::page::reveal::feed_geometry;
use crate::page::{
    ContactFields, ContactForm, LazyImages, MobileMenu, Navbar, PageContext, Parallax, Ripples,
    SectionReveal, SkillBar, SkillBars, Typewriter,
};
use crate::port::ElementRef;
use crate::ratelimit::{debounce, throttle, Debounce, Throttle};

pub const ONLINE_MESSAGE: &str = "Connection restored!";
pub const OFFLINE_MESSAGE: &str = "You are currently offline";
const ONLINE_MS: u32 = 3000;
const OFFLINE_MS: u32 = 5000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroTitle {
    pub element: ElementRef,
    pub text: String,
}

/// What the page contains. Missing parts simply get no behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageInventory {
    /// Anchor targets (`#about`, `#contact`, ...) that exist on the page.
    pub sections: Vec<ElementRef>,
    pub skill_bars: Vec<SkillBar>,
    pub reveal_items: Vec<ElementRef>,
    pub lazy_images: Vec<ElementRef>,
    pub hero_title: Option<HeroTitle>,
    pub has_navbar: bool,
    pub has_menu: bool,
    pub has_form: bool,
    pub has_hero: bool,
}

impl Default for PageInventory {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
            skill_bars: Vec::new(),
            reveal_items: Vec::new(),
            lazy_images: Vec::new(),
            hero_title: None,
            has_navbar: true,
            has_menu: true,
            has_form: true,
            has_hero: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverKind {
    SkillBars,
    Sections,
    LazyImages,
}

/// Input from the host page, already classified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    Scroll {
        y: f64,
    },
    Resize {
        width: u32,
    },
    Click {
        region: ClickRegion,
    },
    AnchorClick {
        href: String,
    },
    ButtonClick {
        button: ElementRef,
        x: f64,
        y: f64,
        rect: Rect,
    },
    KeyDown {
        key: String,
    },
    Submit {
        #[serde(default)]
        fields: ContactFields,
    },
    Online,
    Offline,
    Intersections {
        observer: ObserverKind,
        entries: Vec<Intersection>,
    },
    /// Element boxes after a scroll, for hosts without an intersection feed.
    Layout {
        viewport_height: f64,
        rects: Vec<(ElementRef, Rect)>,
    },
    Action {
        action: PublicAction,
    },
    Notify {
        message: String,
        #[serde(default)]
        severity: Option<String>,
        #[serde(default)]
        duration_ms: Option<u32>,
    },
    Dismiss {
        id: u64,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct StartOptions {
    pub flags: PageFlags,
    pub support: VisibilitySupport,
    pub viewport_width: u32,
    pub scroll_y: f64,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            flags: PageFlags::default(),
            support: VisibilitySupport::Available,
            viewport_width: 1280,
            scroll_y: 0.0,
        }
    }
}

static WELCOMED: AtomicBool = AtomicBool::new(false);

pub struct Site {
    ctx: PageContext,
    flags: PageFlags,
    viewport_width: Cell<u32>,
    sections: Vec<ElementRef>,
    navbar: Option<Navbar>,
    menu: Option<MobileMenu>,
    skills: SkillBars,
    reveals: SectionReveal,
    lazy: LazyImages,
    form: Option<ContactForm>,
    ripples: Ripples,
    typing: Option<Typewriter>,
    parallax: Option<Parallax>,
    actions: Rc<Actions>,
    action_gates: HashMap<PublicAction, Throttle<()>>,
    resize: Debounce<u32>,
}

impl Site {
    pub fn start(ctx: PageContext, inventory: PageInventory, opts: StartOptions) -> Rc<Site> {
        let config = ctx.config.clone();
        let sel = &config.selectors;
        let flags = opts.flags;

        let navbar = inventory.has_navbar.then(|| {
            Navbar::new(
                ctx.clone(),
                sel.navbar.as_str().into(),
                flags.navbar_autohide,
                opts.scroll_y,
            )
        });
        let menu = inventory.has_menu.then(|| {
            MobileMenu::new(
                ctx.clone(),
                sel.hamburger.as_str().into(),
                sel.nav_menu.as_str().into(),
            )
        });
        let skills = SkillBars::observe(&ctx, inventory.skill_bars, opts.support);
        let reveals = SectionReveal::observe(&ctx, inventory.reveal_items, opts.support);
        let lazy = LazyImages::observe(&ctx, inventory.lazy_images, opts.support);
        let form = inventory.has_form.then(|| {
            ContactForm::new(
                ctx.clone(),
                sel.contact_form.as_str().into(),
                sel.submit_button.as_str().into(),
            )
        });
        let ripples = Ripples::new(ctx.clone(), flags.ripple);

        let typing = match inventory.hero_title {
            Some(hero) if flags.typing_effect => {
                let t = Typewriter::new(ctx.clone(), hero.element, &hero.text);
                t.start(config.timing.typing_start_ms);
                Some(t)
            }
            _ => None,
        };
        let parallax = (inventory.has_hero && flags.parallax)
            .then(|| Parallax::new(ctx.clone(), sel.hero.as_str().into(), opts.viewport_width));

        let actions = Rc::new(Actions::new(ctx.clone()));
        let action_gates = PublicAction::ALL
            .iter()
            .map(|&action| {
                let actions = actions.clone();
                let gate = throttle(
                    ctx.sched.clone(),
                    config.timing.action_throttle_ms,
                    move |()| actions.run(action),
                );
                (action, gate)
            })
            .collect();

        let site = Rc::new_cyclic(|weak: &Weak<Site>| {
            let weak = weak.clone();
            let resize = debounce(
                ctx.sched.clone(),
                config.timing.resize_debounce_ms,
                move |width: u32| {
                    if let Some(site) = weak.upgrade() {
                        site.apply_resize(width);
                    }
                },
            );
            Site {
                ctx: ctx.clone(),
                flags,
                viewport_width: Cell::new(opts.viewport_width),
                sections: inventory.sections,
                navbar,
                menu,
                skills,
                reveals,
                lazy,
                form,
                ripples,
                typing,
                parallax,
                actions,
                action_gates,
                resize,
            }
        });

        if !WELCOMED.swap(true, Ordering::Relaxed) {
            site.log_welcome();
        }
        site
    }

    pub fn handle(&self, event: PageEvent) {
        match event {
            PageEvent::Scroll { y } => {
                if let Some(navbar) = &self.navbar {
                    navbar.on_scroll(y, self.viewport_width.get());
                }
                if let Some(parallax) = &self.parallax {
                    parallax.on_scroll(y);
                }
            }
            PageEvent::Resize { width } => {
                self.viewport_width.set(width);
                self.ctx.notifier.set_viewport_width(width);
                self.resize.call(width);
            }
            PageEvent::Click { region } => {
                if let Some(menu) = &self.menu {
                    menu.on_click(region);
                }
            }
            PageEvent::AnchorClick { href } => self.follow_anchor(&href),
            PageEvent::ButtonClick { button, x, y, rect } => {
                self.ripples.on_click(&button, &rect, x, y);
            }
            PageEvent::KeyDown { key } => {
                if let Some(menu) = &self.menu {
                    menu.on_key(&key);
                }
            }
            PageEvent::Submit { fields } => {
                self.submit(&fields);
            }
            PageEvent::Online => {
                self.ctx
                    .notifier
                    .notify_for(ONLINE_MESSAGE, Severity::Success, ONLINE_MS);
            }
            PageEvent::Offline => {
                self.ctx
                    .notifier
                    .notify_for(OFFLINE_MESSAGE, Severity::Warning, OFFLINE_MS);
            }
            PageEvent::Intersections { observer, entries } => {
                let fired = self.observer(observer).handle_entries(&entries);
                debug::log(cat::REVEAL, format!("{observer:?}: {fired} entered"));
            }
            PageEvent::Layout {
                viewport_height,
                rects,
            } => {
                feed_geometry(self.skills.observer(), &rects, viewport_height);
                feed_geometry(self.reveals.observer(), &rects, viewport_height);
                feed_geometry(self.lazy.observer(), &rects, viewport_height);
            }
            PageEvent::Action { action } => {
                self.action(action);
            }
            PageEvent::Notify {
                message,
                severity,
                duration_ms,
            } => {
                self.actions
                    .notify(&message, severity.as_deref(), duration_ms);
            }
            PageEvent::Dismiss { id } => {
                self.ctx.notifier.dismiss(id);
            }
        }
    }

    /// Run a public action unless the same action ran within the throttle
    /// window. Different actions never suppress each other.
    pub fn action(&self, action: PublicAction) -> bool {
        let ran = match self.action_gates.get(&action) {
            Some(gate) => gate.call(()),
            None => {
                self.actions.run(action);
                true
            }
        };
        if !ran {
            debug::log(cat::ACTION, format!("{} suppressed", action.js_name()));
        }
        ran
    }

    /// Submit the contact form; `None` when the page has no form.
    pub fn submit(&self, fields: &ContactFields) -> Option<SubmitOutcome> {
        self.form.as_ref().map(|form| form.submit(fields))
    }

    /// Restart the hero typing effect from the beginning.
    pub fn restart_typing(&self) {
        if let Some(typing) = &self.typing {
            typing.start(self.ctx.config.timing.typing_start_ms);
        }
    }

    pub fn observer(&self, kind: ObserverKind) -> &Observer {
        match kind {
            ObserverKind::SkillBars => self.skills.observer(),
            ObserverKind::Sections => self.reveals.observer(),
            ObserverKind::LazyImages => self.lazy.observer(),
        }
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    pub fn flags(&self) -> PageFlags {
        self.flags
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width.get()
    }

    pub fn menu(&self) -> Option<&MobileMenu> {
        self.menu.as_ref()
    }

    pub fn typing(&self) -> Option<&Typewriter> {
        self.typing.as_ref()
    }

    pub fn parallax(&self) -> Option<&Parallax> {
        self.parallax.as_ref()
    }

    pub fn form(&self) -> Option<&ContactForm> {
        self.form.as_ref()
    }

    fn follow_anchor(&self, href: &str) {
        let Some(target) = self.sections.iter().find(|s| s.as_str() == href) else {
            debug::log(cat::NAV, format!("anchor {href} has no target"));
            return;
        };
        if let Some(menu) = &self.menu {
            menu.close();
        }
        self.ctx.port.scroll_into_view(target);
    }

    fn apply_resize(&self, width: u32) {
        debug::log(cat::INPUT, format!("resize settled at {width}px"));
        if let Some(menu) = &self.menu {
            menu.on_resize(width);
        }
        if let Some(parallax) = &self.parallax {
            parallax.on_resize(width);
        }
    }

    fn log_welcome(&self) {
        let owner = &self.ctx.config.owner;
        log::info!("Welcome to {}'s resume page", owner.name);
        log::info!("  {}", owner.role);
        log::info!("  {} | {}", owner.email, owner.phone_display);
        if !owner.address.is_empty() {
            log::info!("  {}", owner.address);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortCall;
    use crate::test_support::Harness;

    fn site(h: &Harness) -> Rc<Site> {
        let inventory = PageInventory {
            sections: vec!["#about".into(), "#contact".into()],
            hero_title: Some(HeroTitle {
                element: ".hero-title".into(),
                text: "Hi".into(),
            }),
            ..PageInventory::default()
        };
        Site::start(h.ctx(), inventory, StartOptions::default())
    }

    #[test]
    fn anchor_click_closes_menu_and_scrolls() {
        let h = Harness::new();
        let s = site(&h);
        s.handle(PageEvent::Click { region: ClickRegion::Hamburger });
        assert!(s.menu().is_some_and(MobileMenu::is_open));

        s.handle(PageEvent::AnchorClick { href: "#about".into() });
        assert!(!s.menu().is_some_and(MobileMenu::is_open));
        assert_eq!(
            h.port.calls().last(),
            Some(&PortCall::ScrollIntoView { el: "#about".into() })
        );

        h.port.clear();
        s.handle(PageEvent::AnchorClick { href: "#nowhere".into() });
        assert!(h.port.calls().is_empty());
    }

    #[test]
    fn resize_is_debounced_to_final_width() {
        let h = Harness::new();
        let s = site(&h);
        s.handle(PageEvent::Click { region: ClickRegion::Hamburger });
        s.handle(PageEvent::Resize { width: 900 });
        s.handle(PageEvent::Resize { width: 600 });
        h.sched.advance(100);
        assert!(s.menu().is_some_and(MobileMenu::is_open));
        assert_eq!(s.parallax().map(Parallax::is_active), Some(false));
        assert_eq!(s.viewport_width(), 600);
    }

    #[test]
    fn repeated_action_is_throttled() {
        let h = Harness::new();
        let s = site(&h);
        assert!(s.action(PublicAction::ScrollToTop));
        assert!(!s.action(PublicAction::ScrollToTop));
        h.sched.advance(500);
        assert!(s.action(PublicAction::ScrollToTop));
        let scrolls = h
            .port
            .calls()
            .iter()
            .filter(|c| matches!(c, PortCall::ScrollToTop))
            .count();
        assert_eq!(scrolls, 2);
    }

    #[test]
    fn different_actions_do_not_suppress_each_other() {
        let h = Harness::new();
        let s = site(&h);
        assert!(s.action(PublicAction::ScrollToContact));
        h.sched.advance(200);
        assert!(s.action(PublicAction::SendEmail));
        assert!(!s.action(PublicAction::ScrollToContact));

        let calls = h.port.calls();
        assert!(calls.iter().any(|c| matches!(c, PortCall::Navigate { .. })));
        let contact_scrolls = calls
            .iter()
            .filter(|c| matches!(c, PortCall::ScrollIntoView { .. }))
            .count();
        assert_eq!(contact_scrolls, 1);
    }

    #[test]
    fn connectivity_notifications() {
        let h = Harness::new();
        let s = site(&h);
        s.handle(PageEvent::Offline);
        let note = h.ctx().notifier.current().unwrap();
        assert_eq!((note.message.as_str(), note.severity), (OFFLINE_MESSAGE, Severity::Warning));

        s.handle(PageEvent::Online);
        let note = h.ctx().notifier.current().unwrap();
        assert_eq!((note.message.as_str(), note.duration_ms), (ONLINE_MESSAGE, 3000));
    }

    #[test]
    fn disabled_flags_skip_decoration() {
        let h = Harness::new();
        let inventory = PageInventory {
            hero_title: Some(HeroTitle {
                element: ".hero-title".into(),
                text: "Hi".into(),
            }),
            ..PageInventory::default()
        };
        let opts = StartOptions {
            flags: PageFlags::all_disabled(),
            ..StartOptions::default()
        };
        let s = Site::start(h.ctx(), inventory, opts);
        assert!(s.typing().is_none());
        assert!(s.parallax().is_none());
        assert_eq!(h.sched.pending_count(), 0);
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let event: PageEvent =
            serde_json::from_str(r#"{"type":"action","action":"send_email"}"#).unwrap();
        assert_eq!(event, PageEvent::Action { action: PublicAction::SendEmail });
        let event: PageEvent = serde_json::from_str(r#"{"type":"submit"}"#).unwrap();
        assert_eq!(event, PageEvent::Submit { fields: ContactFields::default() });
    }
}
