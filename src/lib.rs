//! # paduchu-web
//!
//! Leptos + WASM single-page client for the PaduchuAndam storefront accounts:
//! password login, registration, Google sign-in, and a profile view backed by
//! the remote JSON API.
//!
//! The session manager lives in `state` (observable store + auth service),
//! wire and HTTP concerns in `net`, the Google Identity Services bridge in
//! `identity`, and browser glue in `util`.

pub mod app;
pub mod components;
pub mod config;
pub mod identity;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;

/// Browser entry point: installs console logging and mounts [`app::App`].
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    });
    leptos::mount::mount_to_body(app::App);
}
