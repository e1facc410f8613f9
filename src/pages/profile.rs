//! Profile page for the signed-in user.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::use_auth;
use crate::state::auth::{AuthState, SessionUser};
use crate::util::auth::install_unauth_redirect;

const MISSING: &str = "—";

/// Display rows for a session user; absent fields show as a dash.
pub fn profile_rows(user: Option<&SessionUser>) -> [(&'static str, String); 3] {
    let field = |value: Option<&String>| value.map_or_else(|| MISSING.to_owned(), Clone::clone);
    let roles = user
        .and_then(|u| u.roles.as_ref())
        .filter(|roles| !roles.is_empty())
        .map_or_else(|| MISSING.to_owned(), |roles| roles.join(", "));
    [
        ("Username", field(user.and_then(|u| u.username.as_ref()))),
        ("Email", field(user.and_then(|u| u.email.as_ref()))),
        ("Roles", roles),
    ]
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let state = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();
    install_unauth_redirect(state, navigate.clone());

    let on_logout = move |_| {
        auth.with_value(|auth| auth.logout());
        navigate("/login", NavigateOptions::default());
    };

    view! {
        <div class="profile-page">
            <div class="profile-card">
                <h2>"Profile"</h2>
                {move || {
                    profile_rows(state.get().user.as_ref())
                        .into_iter()
                        .map(|(label, value)| {
                            view! {
                                <div class="profile-card__row">
                                    <span class="profile-card__label">{label}</span>
                                    <span class="profile-card__value">{value}</span>
                                </div>
                            }
                        })
                        .collect_view()
                }}
                <button class="auth-button auth-button--secondary" type="button" on:click=on_logout>
                    "Log out"
                </button>
            </div>
        </div>
    }
}
