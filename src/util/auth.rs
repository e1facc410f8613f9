//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Guarded routes apply identical unauthenticated redirect behavior; the
//! sign-in pages leave for `/profile` as soon as a session exists.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthState;

/// Whether a guarded route should bounce to `/login`.
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    !state.loading && !state.is_authenticated()
}

/// Redirect to `/login` whenever no session is held and nothing is in flight.
pub fn install_unauth_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if should_redirect_unauth(&auth.get()) {
            navigate(
                "/login",
                NavigateOptions {
                    replace: true,
                    ..NavigateOptions::default()
                },
            );
        }
    });
}

/// Whether a sign-in page should move on to `/profile`.
pub fn should_redirect_signed_in(state: &AuthState) -> bool {
    !state.loading && state.is_authenticated()
}

/// Navigate to `/profile` once a session is held, however it was obtained.
pub fn install_signed_in_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if should_redirect_signed_in(&auth.get()) {
            navigate("/profile", NavigateOptions::default());
        }
    });
}
