//! Browser host: wires the DOM to a [`Site`].
//!
//! `start` runs once on module load. It reads the page, builds the site with
//! a [`DomPort`] and a [`BrowserScheduler`], translates DOM events into
//! [`PageEvent`]s and keeps everything alive in a thread-local.

mod dom;
mod timers;

pub use dom::DomPort;
pub use timers::BrowserScheduler;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    ErrorEvent, Event, EventTarget, FormData, HtmlFormElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, MouseEvent, Node,
};

use crate::config::SiteConfig;
use crate::debug;
use crate::flags::PageFlags;
use crate::observer::{Intersection, Rect, VisibilitySupport};
use crate::page::menu::ClickRegion;
use crate::page::{ContactFields, PageContext, SkillBar};
use crate::platform;
use crate::port::ElementRef;
use crate::site::{HeroTitle, ObserverKind, PageEvent, PageInventory, Site, StartOptions};

const CONFIG_SCRIPT_ID: &str = "folio-config";

type Listener = Closure<dyn FnMut(Event)>;

struct Page {
    site: Rc<Site>,
    _port: Rc<DomPort>,
    _listeners: Vec<Listener>,
    _observers: Vec<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>)>,
}

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

/// Run `f` against the running site, if `start` has completed.
pub fn with_site<R>(f: impl FnOnce(&Site) -> R) -> Option<R> {
    let site = PAGE.with(|page| page.borrow().as_ref().map(|p| p.site.clone()))?;
    Some(f(&site))
}

fn dispatch(event: PageEvent) {
    if with_site(|site| site.handle(event)).is_none() {
        log::debug!("[web] event before start, dropped");
    }
}

pub fn start() {
    platform::install_panic_hook();
    platform::init_logging();
    debug::init_from_url_and_storage_once();

    let Some(port) = DomPort::new() else {
        log::error!("[web] no window/document, page behaviour disabled");
        return;
    };
    let port = Rc::new(port);
    let config = Rc::new(read_config(&port));
    let flags = read_flags(&port);
    let viewport_width = viewport_width(&port);
    let inventory = read_inventory(&port, &config);
    let support = if js_sys::Reflect::has(port.window(), &JsValue::from_str("IntersectionObserver"))
        .unwrap_or(false)
    {
        VisibilitySupport::Available
    } else {
        log::warn!("[web] IntersectionObserver unavailable, revealing everything now");
        VisibilitySupport::Unavailable
    };

    let sched = Rc::new(BrowserScheduler::new());
    let ctx = PageContext::new(port.clone(), port.clone(), sched, config.clone(), viewport_width);
    let notifier = ctx.notifier.clone();
    port.set_dismiss_handler(move |id| {
        notifier.dismiss(id);
    });

    let scroll_y = port.window().scroll_y().unwrap_or(0.0);
    let site = Site::start(
        ctx,
        inventory,
        StartOptions {
            flags,
            support,
            viewport_width,
            scroll_y,
        },
    );

    let listeners = install_listeners(&port, &config);
    let observers = if support == VisibilitySupport::Available {
        install_observers(&port, &site)
    } else {
        Vec::new()
    };

    PAGE.with(|page| {
        *page.borrow_mut() = Some(Page {
            site,
            _port: port,
            _listeners: listeners,
            _observers: observers,
        });
    });
    log::info!("[web] folio started ({viewport_width}px)");
}

fn read_config(port: &DomPort) -> SiteConfig {
    let raw = port
        .document()
        .get_element_by_id(CONFIG_SCRIPT_ID)
        .and_then(|el| el.text_content());
    let Some(raw) = raw else {
        return SiteConfig::default();
    };
    match SiteConfig::from_toml_str(&raw) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("[web] #{CONFIG_SCRIPT_ID} ignored: {e:#}");
            SiteConfig::default()
        }
    }
}

fn read_flags(port: &DomPort) -> PageFlags {
    let reduced = port
        .window()
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .is_some_and(|mq| mq.matches());
    if reduced {
        log::info!("[web] reduced motion requested");
        PageFlags::reduced_motion()
    } else {
        PageFlags::default()
    }
}

fn viewport_width(port: &DomPort) -> u32 {
    port.window()
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .map(|w| w.max(0.0) as u32)
        .unwrap_or(1280)
}

fn exists(port: &DomPort, selector: &str) -> bool {
    port.find(&ElementRef::from(selector)).is_some()
}

fn read_inventory(port: &DomPort, config: &SiteConfig) -> PageInventory {
    let sel = &config.selectors;

    let sections = port
        .register_all(&sel.nav_links)
        .into_iter()
        .filter_map(|(_, link)| link.get_attribute("href"))
        .filter(|href| href.len() > 1 && exists(port, href))
        .map(ElementRef::from)
        .collect();

    let skill_bars = port
        .register_all(&sel.skill_bars)
        .into_iter()
        .map(|(element, el)| SkillBar {
            element,
            width: el.get_attribute("data-width"),
        })
        .collect();

    let reveal_items = port
        .register_all(&sel.reveal_items)
        .into_iter()
        .map(|(element, _)| element)
        .collect();
    let lazy_images = port
        .register_all(&sel.lazy_images)
        .into_iter()
        .map(|(element, _)| element)
        .collect();

    let hero_title = port
        .register_all(&sel.hero_title)
        .into_iter()
        .next()
        .map(|(element, el)| HeroTitle {
            element,
            text: el.text_content().unwrap_or_default(),
        });

    PageInventory {
        sections,
        skill_bars,
        reveal_items,
        lazy_images,
        hero_title,
        has_navbar: exists(port, &sel.navbar),
        has_menu: exists(port, &sel.hamburger) && exists(port, &sel.nav_menu),
        has_form: exists(port, &sel.contact_form),
        has_hero: exists(port, &sel.hero),
    }
}

fn listen(
    target: &EventTarget,
    name: &str,
    handler: impl FnMut(Event) + 'static,
    out: &mut Vec<Listener>,
) {
    let closure = Listener::new(handler);
    if let Err(e) = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
    {
        log::warn!("[web] {name} listener: {e:?}");
        return;
    }
    out.push(closure);
}

fn install_listeners(port: &Rc<DomPort>, config: &SiteConfig) -> Vec<Listener> {
    let mut out = Vec::new();
    let window: &EventTarget = port.window().as_ref();
    let document: &EventTarget = port.document().as_ref();
    let sel = config.selectors.clone();

    let p = port.clone();
    listen(
        window,
        "scroll",
        move |_| {
            let y = p.window().scroll_y().unwrap_or(0.0);
            dispatch(PageEvent::Scroll { y });
        },
        &mut out,
    );

    let p = port.clone();
    listen(
        window,
        "resize",
        move |_| dispatch(PageEvent::Resize { width: viewport_width(&p) }),
        &mut out,
    );

    listen(window, "online", |_| dispatch(PageEvent::Online), &mut out);
    listen(window, "offline", |_| dispatch(PageEvent::Offline), &mut out);
    listen(
        window,
        "error",
        |e| {
            let message = e
                .dyn_ref::<ErrorEvent>()
                .map(|e| e.message())
                .unwrap_or_default();
            log::error!("JavaScript error: {message}");
        },
        &mut out,
    );

    let p = port.clone();
    let (hamburger, menu) = (sel.hamburger.clone(), sel.nav_menu.clone());
    listen(
        document,
        "click",
        move |e| {
            let target = e.target().and_then(|t| t.dyn_into::<Node>().ok());
            let inside = |selector: &str| {
                p.find(&ElementRef::from(selector))
                    .is_some_and(|el| el.contains(target.as_ref()))
            };
            let region = if inside(&hamburger) {
                ClickRegion::Hamburger
            } else if inside(&menu) {
                ClickRegion::Menu
            } else {
                ClickRegion::Outside
            };
            dispatch(PageEvent::Click { region });
        },
        &mut out,
    );

    listen(
        document,
        "keydown",
        |e| {
            if let Some(key) = e.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) {
                dispatch(PageEvent::KeyDown { key });
            }
        },
        &mut out,
    );

    for (_, link) in port.register_all(&sel.nav_links) {
        let Some(href) = link.get_attribute("href") else { continue };
        listen(
            link.as_ref(),
            "click",
            move |e| {
                e.prevent_default();
                dispatch(PageEvent::AnchorClick { href: href.clone() });
            },
            &mut out,
        );
    }

    for (button, el) in port.register_all(&sel.buttons) {
        let target = el.clone();
        listen(
            el.as_ref(),
            "click",
            move |e| {
                let Some(mouse) = e.dyn_ref::<MouseEvent>() else { return };
                let r = target.get_bounding_client_rect();
                dispatch(PageEvent::ButtonClick {
                    button: button.clone(),
                    x: f64::from(mouse.client_x()),
                    y: f64::from(mouse.client_y()),
                    rect: Rect {
                        left: r.left(),
                        top: r.top(),
                        width: r.width(),
                        height: r.height(),
                    },
                });
            },
            &mut out,
        );
    }

    if let Some(form) = port
        .find(&ElementRef::from(sel.contact_form.as_str()))
        .and_then(|f| f.dyn_into::<HtmlFormElement>().ok())
    {
        let target = form.clone();
        listen(
            form.as_ref(),
            "submit",
            move |e| {
                e.prevent_default();
                dispatch(PageEvent::Submit {
                    fields: read_form(&target),
                });
            },
            &mut out,
        );
    }

    out
}

fn read_form(form: &HtmlFormElement) -> ContactFields {
    let Ok(data) = FormData::new_with_form(form) else {
        log::warn!("[web] could not read contact form");
        return ContactFields::default();
    };
    let field = |name: &str| data.get(name).as_string();
    ContactFields {
        name: field("name"),
        email: field("email"),
        subject: field("subject"),
        message: field("message"),
    }
}

fn install_observers(
    port: &Rc<DomPort>,
    site: &Site,
) -> Vec<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>)> {
    let mut out = Vec::new();
    for kind in [
        ObserverKind::SkillBars,
        ObserverKind::Sections,
        ObserverKind::LazyImages,
    ] {
        let observer = site.observer(kind);
        if observer.watched_count() == 0 {
            continue;
        }
        let options = observer.options();

        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, io: IntersectionObserver| {
                let mut targets = Vec::new();
                let batch: Vec<Intersection> = entries
                    .iter()
                    .map(|value| value.unchecked_into::<IntersectionObserverEntry>())
                    .filter_map(|entry| {
                        let target = entry.target();
                        let key = target.get_attribute("data-folio")?;
                        let element = ElementRef::new(format!("[data-folio=\"{key}\"]"));
                        targets.push((element.clone(), target));
                        Some(Intersection {
                            element,
                            ratio: entry.intersection_ratio(),
                            is_intersecting: entry.is_intersecting(),
                        })
                    })
                    .collect();
                dispatch(PageEvent::Intersections {
                    observer: kind,
                    entries: batch,
                });
                for (element, target) in targets {
                    let done = with_site(|s| !s.observer(kind).is_watching(&element));
                    if done.unwrap_or(true) {
                        io.unobserve(&target);
                    }
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin());
        let io = match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
        {
            Ok(io) => io,
            Err(e) => {
                log::warn!("[web] IntersectionObserver for {kind:?}: {e:?}");
                continue;
            }
        };
        for element in observer.watched() {
            if let Some(el) = port.find(&element) {
                io.observe(&el);
            }
        }
        out.push((io, callback));
    }
    out
}
