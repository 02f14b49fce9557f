//! Functions exported to page scripts.
//!
//! Buttons on the page call these by name (`onclick="sendEmail()"`). All of
//! them go through the running [`Site`](crate::site::Site), so calls made
//! before startup finishes are dropped with a log line.
//!
//! # Example
//! ```javascript
//! import init, { notify, scrollToContact } from "./folio-web.js";
//! await init();
//! notify("Saved!", "success", 3000);
//! ```

#![cfg(all(target_arch = "wasm32", feature = "dom-web"))]

use wasm_bindgen::prelude::*;

use crate::actions::PublicAction;
use crate::web::with_site;

fn run(action: PublicAction) {
    if with_site(|site| site.action(action)).is_none() {
        log::warn!("{}() called before the page started", action.js_name());
    }
}

#[wasm_bindgen(js_name = scrollToContact)]
pub fn scroll_to_contact() {
    run(PublicAction::ScrollToContact);
}

#[wasm_bindgen(js_name = scrollToAbout)]
pub fn scroll_to_about() {
    run(PublicAction::ScrollToAbout);
}

#[wasm_bindgen(js_name = downloadResume)]
pub fn download_resume() {
    run(PublicAction::DownloadResume);
}

#[wasm_bindgen(js_name = sendEmail)]
pub fn send_email() {
    run(PublicAction::SendEmail);
}

#[wasm_bindgen(js_name = callNow)]
pub fn call_now() {
    run(PublicAction::CallNow);
}

#[wasm_bindgen(js_name = openLinkedIn)]
pub fn open_linkedin() {
    run(PublicAction::OpenLinkedin);
}

#[wasm_bindgen(js_name = openGitHub)]
pub fn open_github() {
    run(PublicAction::OpenGithub);
}

#[wasm_bindgen(js_name = viewLocation)]
pub fn view_location() {
    run(PublicAction::ViewLocation);
}

#[wasm_bindgen(js_name = scrollToTop)]
pub fn scroll_to_top() {
    run(PublicAction::ScrollToTop);
}

/// `notify(message, severity = "info", durationMs = 5000)`; not throttled.
#[wasm_bindgen]
pub fn notify(message: String, severity: Option<String>, duration_ms: Option<u32>) {
    let shown = with_site(|site| {
        site.actions()
            .notify(&message, severity.as_deref(), duration_ms)
    });
    if shown.is_none() {
        log::warn!("notify() called before the page started: {message}");
    }
}
