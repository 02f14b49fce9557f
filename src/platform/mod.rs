//! Platform glue: logger backends and panic reporting.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(all(target_arch = "wasm32", feature = "dom-web"))] {
        use std::sync::Once;

        static LOGGER: Once = Once::new();

        /// Route `log` records to the browser console.
        pub fn init_logging() {
            LOGGER.call_once(|| wasm_logger::init(wasm_logger::Config::new(log::Level::Info)));
        }

        /// Panics show up in the console instead of as `unreachable` traps.
        pub fn install_panic_hook() {
            console_error_panic_hook::set_once();
        }
    } else if #[cfg(feature = "native")] {
        /// `RUST_LOG` filtering, `info` by default. Safe to call twice.
        pub fn init_logging() {
            let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .format_timestamp_millis()
                .try_init();
        }

        pub fn install_panic_hook() {}
    } else {
        pub fn init_logging() {}

        pub fn install_panic_hook() {}
    }
}
