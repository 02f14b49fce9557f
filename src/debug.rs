//! Filterable debug logging
//!
//! Categories: NAV, REVEAL, TIMER, NOTIFY, FORM, ACTION, INPUT
//! Enable via: ?folio_debug=all or localStorage.setItem('folio.debug','nav,notify')
//! Native: FOLIO_DEBUG=reveal,form

use std::sync::atomic::{AtomicU32, Ordering};

pub mod cat {
    pub const NAV: u32 = 1 << 0;
    pub const REVEAL: u32 = 1 << 1;
    pub const TIMER: u32 = 1 << 2;
    pub const NOTIFY: u32 = 1 << 3;
    pub const FORM: u32 = 1 << 4;
    pub const ACTION: u32 = 1 << 5;
    pub const INPUT: u32 = 1 << 6;
    pub const ALL: u32 = 0xffff_ffff;
}

static MASK: AtomicU32 = AtomicU32::new(0);

#[inline]
pub fn set(mask: u32) {
    MASK.store(mask, Ordering::Relaxed)
}

#[inline]
pub fn is(cat: u32) -> bool {
    (MASK.load(Ordering::Relaxed) & cat) != 0
}

fn cat_name(cat: u32) -> &'static str {
    match cat {
        c if c == cat::NAV => "nav",
        c if c == cat::REVEAL => "reveal",
        c if c == cat::TIMER => "timer",
        c if c == cat::NOTIFY => "notify",
        c if c == cat::FORM => "form",
        c if c == cat::ACTION => "action",
        c if c == cat::INPUT => "input",
        _ => "misc",
    }
}

/// Parse a comma-separated category list ("nav,form", "all", "none").
pub fn parse_list(list: &str) -> u32 {
    let mut m: u32 = 0;
    for tok in list.split(',').map(|s| s.trim().to_ascii_lowercase()) {
        match tok.as_str() {
            "" | "none" => m = 0,
            "all" => m = cat::ALL,
            "nav" => m |= cat::NAV,
            "reveal" => m |= cat::REVEAL,
            "timer" => m |= cat::TIMER,
            "notify" => m |= cat::NOTIFY,
            "form" => m |= cat::FORM,
            "action" => m |= cat::ACTION,
            "input" => m |= cat::INPUT,
            other => log::warn!("[debug] unknown category '{other}'"),
        }
    }
    m
}

#[inline]
pub fn set_from_list(list: &str) {
    set(parse_list(list));
}

#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
pub fn init_from_url_and_storage_once() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let Some(win) = web_sys::window() else { return };
        // URL query: ?folio_debug=nav,notify
        if let Ok(search) = win.location().search() {
            for part in search.trim_start_matches('?').split('&') {
                let mut it = part.splitn(2, '=');
                let key = it.next().unwrap_or_default();
                let val = it.next().unwrap_or_default();
                if key.eq_ignore_ascii_case("folio_debug") {
                    if let Ok(decoded) = js_sys::decode_uri_component(val) {
                        set_from_list(&String::from(decoded));
                    }
                }
            }
        }
        // localStorage: folio.debug = "nav,notify"
        if let Ok(Some(storage)) = win.local_storage() {
            if let Ok(Some(v)) = storage.get_item("folio.debug") {
                set_from_list(&v);
            }
        }
        log(cat::NAV, "debug init (wasm) complete");
    });
}

#[cfg(not(all(target_arch = "wasm32", feature = "dom-web")))]
pub fn init_from_url_and_storage_once() {
    if let Ok(v) = std::env::var("FOLIO_DEBUG") {
        set_from_list(&v);
    }
}

/// Log `msg` under `cat` if that category is enabled.
#[inline]
pub fn log(cat: u32, msg: impl AsRef<str>) {
    if !is(cat) {
        return;
    }
    log::info!(target: "folio::debug", "[{}] {}", cat_name(cat), msg.as_ref());
}
