//! Third-party sign-in block shared by the login and register pages.
//!
//! The remote deployment renders the Google button; the local-mock build has
//! no identity provider and offers a demo account instead.

#[cfg(test)]
#[path = "provider_sign_in_test.rs"]
mod provider_sign_in_test;

use leptos::prelude::*;

use crate::app::use_auth;
use crate::net::types::AuthResponse;

/// Token carried by a Google exchange response.
pub fn google_token(response: &AuthResponse) -> Result<&str, &'static str> {
    response.token().ok_or("No token from Google sign-in")
}

/// Error text for display, with `fallback` when the error renders empty.
pub fn failure_message(err: &impl std::fmt::Display, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_owned()
    } else {
        message
    }
}

#[component]
pub fn ProviderSignIn(error: RwSignal<Option<String>>) -> impl IntoView {
    let auth = use_auth();

    if cfg!(feature = "local-mock") {
        // Signs in as the mock backend's demo Google account.
        let on_demo = move |_| {
            auth.with_value(|auth| {
                auth.sign_in_simulated();
            });
        };
        return view! {
            <button class="auth-button auth-button--secondary" type="button" on:click=on_demo>
                "Continue with demo account"
            </button>
        }
        .into_any();
    }

    let on_success = Callback::new(move |response: AuthResponse| match google_token(&response) {
        Ok(token) => auth.with_value(|auth| auth.set_app_token(token)),
        Err(message) => error.set(Some(message.to_owned())),
    });
    let on_error = Callback::new(move |message: String| {
        error.set(Some(failure_message(&message, "Google sign-in failed")));
    });

    view! { <crate::components::google_button::GoogleSignInButton on_success on_error/> }.into_any()
}
