//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read shared services from Leptos context providers installed by
//! `app::App` and report results to their page through callbacks.

pub mod google_button;
pub mod provider_sign_in;
