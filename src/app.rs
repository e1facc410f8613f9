//! Root application component with routing and context providers.
//!
//! The session store is bridged into a `RwSignal<AuthState>` through its
//! subscription hook; services that hold `Rc`s are shared as local
//! `StoredValue`s.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::StaticSegment;
use leptos_router::components::{Redirect, Route, Router, Routes};

use crate::config::ClientConfig;
use crate::net::api::{ApiClient, DefaultTransport};
use crate::pages::{login::LoginPage, profile::ProfilePage, register::RegisterPage};
use crate::state::auth_service::AuthService;
use crate::state::session::{SessionStore, StorageKeys};
use crate::util::storage::{KeyValueStore, default_store};

pub type AppApi = ApiClient<DefaultTransport>;

#[cfg(feature = "local-mock")]
pub type AppBackend = crate::net::mock_backend::LocalMockBackend;
#[cfg(not(feature = "local-mock"))]
pub type AppBackend = crate::net::backend::RemoteBackend<DefaultTransport>;

pub type AppAuth = AuthService<AppBackend>;

#[cfg(feature = "local-mock")]
pub const STORAGE_KEYS: StorageKeys = StorageKeys::LOCAL_MOCK;
#[cfg(not(feature = "local-mock"))]
pub const STORAGE_KEYS: StorageKeys = StorageKeys::REMOTE;

/// The auth service installed by [`App`].
pub fn use_auth() -> StoredValue<AppAuth, LocalStorage> {
    expect_context()
}

/// The API client installed by [`App`].
pub fn use_api() -> StoredValue<AppApi, LocalStorage> {
    expect_context()
}

/// Wire the API client, session store and backend for this deployment.
pub fn build_services(config: &ClientConfig, store: Rc<dyn KeyValueStore>) -> (AppApi, AppAuth) {
    let session = SessionStore::load(Rc::clone(&store), STORAGE_KEYS);
    #[cfg(feature = "local-mock")]
    let backend = crate::net::mock_backend::LocalMockBackend::new(Rc::clone(&store));
    let api = ApiClient::new(
        &config.api_base_url,
        DefaultTransport::default(),
        store,
        STORAGE_KEYS.token,
    );
    #[cfg(not(feature = "local-mock"))]
    let backend = crate::net::backend::RemoteBackend::new(api.clone());

    (api, AuthService::new(session, backend))
}

/// Root application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = ClientConfig::from_env();
    log::info!("API base URL: {}", config.api_base_url);
    let (api, auth) = build_services(&config, default_store());

    let auth_state = RwSignal::new(auth.session().snapshot());
    auth.session().subscribe(move |state| {
        auth_state.set(state.clone());
    });

    provide_context(config);
    provide_context(auth_state);
    provide_context(StoredValue::new_local(auth));
    provide_context(StoredValue::new_local(api));

    view! {
        <Title text="PaduchuAndam"/>

        <Router>
            <Routes fallback=|| view! { <Redirect path="/login"/> }>
                <Route path=StaticSegment("") view=|| view! { <Redirect path="/login"/> }/>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("register") view=RegisterPage/>
                <Route path=StaticSegment("profile") view=ProfilePage/>
            </Routes>
        </Router>
    }
}
