//! Registration page. A successful registration signs the new account in
//! with the same credentials.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::app::use_auth;
use crate::components::provider_sign_in::{ProviderSignIn, failure_message};
use crate::net::backend::{AuthBackend, AuthError};
use crate::net::types::{LoginRequest, RegisterRequest};
use crate::state::auth::AuthState;
use crate::state::auth_service::AuthService;
use crate::util::auth::install_signed_in_redirect;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Local checks run before anything is sent.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
) -> Result<RegisterRequest, &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Please enter your name");
    }
    if !email.contains('@') {
        return Err("Enter a valid email");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters");
    }
    Ok(RegisterRequest {
        username: name.to_owned(),
        email: email.trim().to_owned(),
        password: password.to_owned(),
    })
}

/// Register, then log in with the submitted email and password.
///
/// # Errors
///
/// The first failure of either call.
pub async fn register_and_sign_in<B: AuthBackend>(
    auth: &AuthService<B>,
    request: &RegisterRequest,
) -> Result<(), AuthError> {
    auth.register(request).await?;
    let login = LoginRequest {
        username_or_email: request.email.clone(),
        password: request.password.clone(),
    };
    auth.login(&login).await?;
    Ok(())
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let state = expect_context::<RwSignal<AuthState>>();
    install_signed_in_redirect(state, use_navigate());

    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        error.set(None);
        let input = validate_registration(
            &name.get_untracked(),
            &email.get_untracked(),
            &password.get_untracked(),
        );
        let request = match input {
            Ok(request) => request,
            Err(message) => {
                error.set(Some(message.to_owned()));
                return;
            }
        };
        busy.set(true);
        leptos::task::spawn_local(async move {
            let service = auth.get_value();
            if let Err(err) = register_and_sign_in(&service, &request).await {
                error.set(Some(failure_message(&err, "Registration failed")));
            }
            busy.set(false);
        });
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1 class="auth-card__brand">"PaduchuAndam"</h1>
                <p class="auth-card__subtitle">"Create account"</p>
                <Show when=move || error.get().is_some()>
                    <p class="auth-message auth-message--error">
                        {move || error.get().unwrap_or_default()}
                    </p>
                </Show>
                <form class="auth-form" on:submit=on_submit>
                    <input
                        class="auth-input"
                        type="text"
                        name="name"
                        autocomplete="name"
                        placeholder="Full Name"
                        prop:value=move || name.get()
                        on:input=move |ev| name.set(event_target_value(&ev))
                    />
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
                        autocomplete="new-password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="auth-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Creating account..." } else { "Register" }}
                    </button>
                </form>
                <ProviderSignIn error/>
                <p class="auth-card__switch">
                    <A href="/login">"Already have an account? Sign in"</A>
                </p>
            </div>
        </div>
    }
}
