#![cfg_attr(target_arch = "wasm32", no_main)]

// Browser entry point.
//
// JS side:
//   import init from "./folio-web.js";
//   await init();            // runs folio_start(), wires the page
//   window.sendEmail = ...   // the exported actions are on the module

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn folio_start() {
    folio::web::start();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("folio-web only runs in the browser; build with --target wasm32-unknown-unknown");
}
