//! Login page: email + password, or a third-party provider.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::app::use_auth;
use crate::components::provider_sign_in::{ProviderSignIn, failure_message};
use crate::net::types::LoginRequest;
use crate::state::auth::AuthState;
use crate::util::auth::install_signed_in_redirect;

/// Build the login request from the form fields.
pub fn validate_login_input(email: &str, password: &str) -> Result<LoginRequest, &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Enter your email and password");
    }
    Ok(LoginRequest {
        username_or_email: email.to_owned(),
        password: password.to_owned(),
    })
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let state = expect_context::<RwSignal<AuthState>>();
    install_signed_in_redirect(state, use_navigate());

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let busy = move || state.get().loading;

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if state.get_untracked().loading {
            return;
        }
        error.set(None);
        let input = validate_login_input(&email.get_untracked(), &password.get_untracked());
        let request = match input {
            Ok(request) => request,
            Err(message) => {
                error.set(Some(message.to_owned()));
                return;
            }
        };
        leptos::task::spawn_local(async move {
            let service = auth.get_value();
            if let Err(err) = service.login(&request).await {
                error.set(Some(failure_message(&err, "Login failed")));
            }
        });
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1 class="auth-card__brand">"PaduchuAndam"</h1>
                <p class="auth-card__subtitle">"Sign in"</p>
                <Show when=move || error.get().is_some()>
                    <p class="auth-message auth-message--error">
                        {move || error.get().unwrap_or_default()}
                    </p>
                </Show>
                <form class="auth-form" on:submit=on_submit>
                    <input
                        class="auth-input"
                        type="email"
                        name="email"
                        autocomplete="email"
                        placeholder="Email Address"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="auth-input"
                        type="password"
                        name="password"
                        autocomplete="current-password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="auth-button" type="submit" disabled=busy>
                        {move || if busy() { "Signing in..." } else { "Sign In" }}
                    </button>
                </form>
                <ProviderSignIn error/>
                <p class="auth-card__switch">
                    <A href="/register">"Don't have an account? Register"</A>
                </p>
            </div>
        </div>
    }
}
