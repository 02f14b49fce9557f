//! `Presentation` and `Navigator` on top of the real DOM.
//!
//! Elements that only exist as members of a selector list are tagged with a
//! `data-folio` attribute at startup and referred to by the attribute
//! selector, so every [`ElementRef`] resolves with one `querySelector`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlImageElement,
    ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, ScrollToOptions, Window,
};

use crate::notify::NotificationLayout;
use crate::port::{
    ElementRef, NavError, Navigator, NotificationView, Overlay, OverlayId, Presentation,
};

const KEY_ATTR: &str = "data-folio";
const LABEL_ATTR: &str = "data-folio-label";
const STYLE_ID: &str = "folio-styles";
const BUSY_LABEL: &str = "<i class=\"fas fa-spinner fa-spin\"></i> <span>Loading...</span>";

const STYLES: &str = r#"
@keyframes ripple { to { transform: scale(4); opacity: 0; } }
@keyframes slideInRight {
    from { transform: translateX(100%); opacity: 0; }
    to { transform: translateX(0); opacity: 1; }
}
@keyframes fadeOut { to { opacity: 0; transform: translateX(100%); } }
@keyframes progress { from { width: 100%; } to { width: 0%; } }
@keyframes blink { 50% { opacity: 0; } }
.folio-ripple {
    position: absolute;
    background: rgba(255, 255, 255, 0.3);
    border-radius: 50%;
    transform: scale(0);
    animation: ripple 0.6s linear;
    pointer-events: none;
    z-index: 1;
}
.folio-cursor { animation: blink 1s infinite; }
.notification {
    position: fixed;
    top: 20px;
    right: 20px;
    color: white;
    padding: 1rem;
    border-radius: 12px;
    box-shadow: 0 10px 30px rgba(0, 0, 0, 0.2);
    z-index: 10000;
    max-width: 400px;
    min-width: 280px;
    font-family: 'Poppins', sans-serif;
    overflow: hidden;
}
.notification.notification-banner { top: 10px; right: 10px; left: 10px; max-width: none; }
.notification-content { display: flex; align-items: center; gap: 0.75rem; }
.notification-content i:first-child { font-size: 1.1rem; flex-shrink: 0; }
.notification-message { flex: 1; font-size: 0.9rem; line-height: 1.4; }
.notification-close {
    background: rgba(255, 255, 255, 0.2);
    border: none;
    color: white;
    width: 24px;
    height: 24px;
    border-radius: 50%;
    cursor: pointer;
    display: flex;
    align-items: center;
    justify-content: center;
    transition: background 0.2s;
    flex-shrink: 0;
}
.notification-close:hover { background: rgba(255, 255, 255, 0.3); }
.notification-progress {
    position: absolute;
    bottom: 0;
    left: 0;
    height: 3px;
    background: rgba(255, 255, 255, 0.3);
}
"#;

struct Shown {
    el: Element,
    fade_ms: u32,
    _close: Option<Closure<dyn FnMut()>>,
}

pub struct DomPort {
    window: Window,
    document: Document,
    next_key: Cell<u64>,
    next_overlay: Cell<u64>,
    overlays: RefCell<HashMap<u64, Element>>,
    notifications: RefCell<HashMap<u64, Shown>>,
    on_dismiss: RefCell<Option<Rc<dyn Fn(u64)>>>,
}

impl DomPort {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let port = Self {
            window,
            document,
            next_key: Cell::new(1),
            next_overlay: Cell::new(1),
            overlays: RefCell::new(HashMap::new()),
            notifications: RefCell::new(HashMap::new()),
            on_dismiss: RefCell::new(None),
        };
        port.inject_styles();
        Some(port)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Called with the notification id when its close button is clicked.
    pub fn set_dismiss_handler(&self, handler: impl Fn(u64) + 'static) {
        *self.on_dismiss.borrow_mut() = Some(Rc::new(handler));
    }

    /// Give `el` a stable key and return a reference that resolves back to it.
    pub fn register(&self, el: &Element) -> ElementRef {
        let key = match el.get_attribute(KEY_ATTR) {
            Some(key) => key,
            None => {
                let key = self.next_key.get().to_string();
                self.next_key.set(self.next_key.get() + 1);
                if let Err(e) = el.set_attribute(KEY_ATTR, &key) {
                    log::warn!("[dom] could not tag element: {e:?}");
                }
                key
            }
        };
        ElementRef::new(format!("[{KEY_ATTR}=\"{key}\"]"))
    }

    /// Every element matching `selector`, registered.
    pub fn register_all(&self, selector: &str) -> Vec<(ElementRef, Element)> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("[dom] bad selector {selector}: {e:?}");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|el| (self.register(&el), el))
            .collect()
    }

    pub fn find(&self, el: &ElementRef) -> Option<Element> {
        match self.document.query_selector(el.as_str()) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("[dom] bad selector {el}: {e:?}");
                None
            }
        }
    }

    fn find_html(&self, el: &ElementRef) -> Option<HtmlElement> {
        self.find(el)?.dyn_into::<HtmlElement>().ok()
    }

    fn inject_styles(&self) {
        if self.document.get_element_by_id(STYLE_ID).is_some() {
            return;
        }
        let Ok(style) = self.document.create_element("style") else { return };
        style.set_id(STYLE_ID);
        style.set_text_content(Some(STYLES));
        if let Some(head) = self.document.head() {
            if let Err(e) = head.append_child(&style) {
                log::warn!("[dom] could not inject styles: {e:?}");
            }
        }
    }

    fn create(&self, tag: &str, class: &str) -> Option<Element> {
        match self.document.create_element(tag) {
            Ok(el) => {
                el.set_class_name(class);
                Some(el)
            }
            Err(e) => {
                log::warn!("[dom] create <{tag}> failed: {e:?}");
                None
            }
        }
    }

    fn build_notification(&self, view: &NotificationView) -> Option<(Element, Element)> {
        let root = self.create("div", &format!("notification notification-{}", view.severity))?;
        if view.layout == NotificationLayout::Banner {
            let _ = root.class_list().add_1("notification-banner");
        }
        let content = self.create("div", "notification-content")?;
        let icon = self.create("i", view.icon)?;
        let message = self.create("span", "notification-message")?;
        message.set_text_content(Some(&view.message));
        let close = self.create("button", "notification-close")?;
        let close_icon = self.create("i", "fas fa-times")?;
        let progress = self.create("div", "notification-progress")?;

        let attach = || -> Result<(), JsValue> {
            close.append_child(&close_icon)?;
            content.append_child(&icon)?;
            content.append_child(&message)?;
            content.append_child(&close)?;
            root.append_child(&content)?;
            root.append_child(&progress)?;
            Ok(())
        };
        if let Err(e) = attach() {
            log::warn!("[dom] notification build failed: {e:?}");
            return None;
        }

        if let Some(root) = root.dyn_ref::<HtmlElement>() {
            let style = root.style();
            let _ = style.set_property("background", view.color);
            let _ = style.set_property("animation", "slideInRight 0.3s ease");
        }
        if let Some(progress) = progress.dyn_ref::<HtmlElement>() {
            let _ = progress
                .style()
                .set_property("animation", &format!("progress {}ms linear forwards", view.duration_ms));
        }
        Some((root, close))
    }
}

impl Presentation for DomPort {
    fn set_style(&self, el: &ElementRef, prop: &str, value: &str) {
        if let Some(html) = self.find_html(el) {
            if let Err(e) = html.style().set_property(prop, value) {
                log::warn!("[dom] {el} {prop}={value}: {e:?}");
            }
        }
    }

    fn clear_style(&self, el: &ElementRef, prop: &str) {
        if let Some(html) = self.find_html(el) {
            let _ = html.style().remove_property(prop);
        }
    }

    fn set_class(&self, el: &ElementRef, class: &str, on: bool) {
        if let Some(found) = self.find(el) {
            if let Err(e) = found.class_list().toggle_with_force(class, on) {
                log::warn!("[dom] {el} class {class}: {e:?}");
            }
        }
    }

    fn set_text(&self, el: &ElementRef, text: &str) {
        if let Some(found) = self.find(el) {
            found.set_text_content(Some(text));
        }
    }

    fn append_text(&self, el: &ElementRef, text: &str) {
        if let Some(found) = self.find(el) {
            let node = self.document.create_text_node(text);
            if let Err(e) = found.append_child(&node) {
                log::warn!("[dom] append text to {el}: {e:?}");
            }
        }
    }

    fn set_busy(&self, el: &ElementRef, busy: bool) {
        let Some(found) = self.find(el) else { return };
        if busy {
            if found.get_attribute(LABEL_ATTR).is_none() {
                let _ = found.set_attribute(LABEL_ATTR, &found.inner_html());
            }
            found.set_inner_html(BUSY_LABEL);
        } else if let Some(label) = found.get_attribute(LABEL_ATTR) {
            found.set_inner_html(&label);
            let _ = found.remove_attribute(LABEL_ATTR);
        }
        if let Some(button) = found.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(busy);
        }
        if let Some(html) = found.dyn_ref::<HtmlElement>() {
            let _ = html
                .style()
                .set_property("pointer-events", if busy { "none" } else { "" });
        }
    }

    fn append_overlay(&self, el: &ElementRef, overlay: Overlay) -> OverlayId {
        let id = self.next_overlay.get();
        self.next_overlay.set(id + 1);

        let Some(parent) = self.find(el) else {
            return OverlayId(id);
        };
        let child = match overlay {
            Overlay::Ripple { size, left, top } => {
                let Some(span) = self.create("span", "folio-ripple") else {
                    return OverlayId(id);
                };
                if let Some(html) = span.dyn_ref::<HtmlElement>() {
                    let style = html.style();
                    let _ = style.set_property("width", &format!("{size}px"));
                    let _ = style.set_property("height", &format!("{size}px"));
                    let _ = style.set_property("left", &format!("{left}px"));
                    let _ = style.set_property("top", &format!("{top}px"));
                }
                span
            }
            Overlay::Cursor { glyph } => {
                let Some(span) = self.create("span", "folio-cursor") else {
                    return OverlayId(id);
                };
                span.set_text_content(Some(glyph.encode_utf8(&mut [0; 4])));
                span
            }
        };
        match parent.append_child(&child) {
            Ok(_) => {
                self.overlays.borrow_mut().insert(id, child);
            }
            Err(e) => log::warn!("[dom] overlay on {el}: {e:?}"),
        }
        OverlayId(id)
    }

    fn remove_overlay(&self, id: OverlayId) {
        let removed = self.overlays.borrow_mut().remove(&id.0);
        if let Some(el) = removed {
            el.remove();
        }
    }

    fn show_notification(&self, view: &NotificationView) {
        let Some((root, close_button)) = self.build_notification(view) else { return };

        let handler = self.on_dismiss.borrow().clone();
        let id = view.id;
        let close = handler.map(|handler| {
            let closure = Closure::<dyn FnMut()>::new(move || handler(id));
            if let Err(e) = close_button
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            {
                log::warn!("[dom] close button listener: {e:?}");
            }
            closure
        });

        let Some(body) = self.document.body() else { return };
        if let Err(e) = body.append_child(&root) {
            log::warn!("[dom] show notification: {e:?}");
            return;
        }
        self.notifications.borrow_mut().insert(
            id,
            Shown {
                el: root,
                fade_ms: view.fade_ms,
                _close: close,
            },
        );
    }

    fn fade_notification(&self, id: u64) {
        let notifications = self.notifications.borrow();
        let Some(shown) = notifications.get(&id) else { return };
        if let Some(html) = shown.el.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property(
                "animation",
                &format!("fadeOut {}ms ease forwards", shown.fade_ms),
            );
        }
    }

    fn remove_notification(&self, id: u64) {
        let removed = self.notifications.borrow_mut().remove(&id);
        if let Some(shown) = removed {
            shown.el.remove();
        }
    }

    fn scroll_into_view(&self, el: &ElementRef) {
        let Some(found) = self.find(el) else { return };
        let opts = ScrollIntoViewOptions::new();
        opts.set_behavior(ScrollBehavior::Smooth);
        opts.set_block(ScrollLogicalPosition::Start);
        found.scroll_into_view_with_scroll_into_view_options(&opts);
    }

    fn scroll_to_top(&self) {
        let opts = ScrollToOptions::new();
        opts.set_top(0.0);
        opts.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&opts);
    }

    fn set_body_scroll_locked(&self, locked: bool) {
        if let Some(body) = self.document.body() {
            let _ = body
                .style()
                .set_property("overflow", if locked { "hidden" } else { "" });
        }
    }

    fn reset_form(&self, el: &ElementRef) {
        if let Some(form) = self.find(el).and_then(|f| f.dyn_into::<HtmlFormElement>().ok()) {
            form.reset();
        }
    }

    fn load_image(&self, el: &ElementRef) {
        let Some(found) = self.find(el) else { return };
        let src = found.get_attribute("data-src");
        if let (Some(img), Some(src)) = (found.dyn_ref::<HtmlImageElement>(), src) {
            img.set_src(&src);
        }
    }
}

impl Navigator for DomPort {
    fn navigate(&self, url: &str) -> Result<(), NavError> {
        self.window
            .location()
            .set_href(url)
            .map_err(|e| NavError::Refused {
                url: url.to_string(),
                reason: format!("{e:?}"),
            })
    }

    fn open_external(&self, url: &str) -> Result<(), NavError> {
        // With noopener the returned handle is always null, so only a throw counts.
        self.window
            .open_with_url_and_target_and_features(url, "_blank", "noopener,noreferrer")
            .map(|_| ())
            .map_err(|e| NavError::Refused {
                url: url.to_string(),
                reason: format!("{e:?}"),
            })
    }

    fn download(&self, url: &str, file_name: &str) -> Result<(), NavError> {
        let refused = |reason: String| NavError::Refused {
            url: url.to_string(),
            reason,
        };
        let link = self
            .document
            .create_element("a")
            .map_err(|e| refused(format!("{e:?}")))?;
        link.set_attribute("href", url)
            .and_then(|_| link.set_attribute("download", file_name))
            .map_err(|e| refused(format!("{e:?}")))?;
        let link = link
            .dyn_into::<HtmlElement>()
            .map_err(|_| refused("anchor is not an HtmlElement".to_string()))?;
        link.click();
        Ok(())
    }
}
