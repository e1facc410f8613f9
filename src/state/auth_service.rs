//! Auth facade used by pages: login, register, logout, token injection.
//!
//! SYSTEM CONTEXT
//! ==============
//! Composes the [`SessionStore`] with an [`AuthBackend`]. Only successful
//! token-issuing calls mutate the session; registration never does, so the
//! register page chains a login itself.

#[cfg(test)]
#[path = "auth_service_test.rs"]
mod auth_service_test;

use std::rc::Rc;

use serde_json::{Map, Value};

use super::session::SessionStore;
use crate::net::backend::{AuthBackend, AuthError};
use crate::net::types::{AuthResponse, LoginRequest, RegisterRequest};

/// Placeholder token used by the development sign-in shortcut.
pub const SIMULATED_TOKEN: &str = "simulated-demo-token";

/// Holds `loading` true for the lifetime of one backend call.
struct LoadingGuard<'a>(&'a SessionStore);

impl<'a> LoadingGuard<'a> {
    fn start(session: &'a SessionStore) -> Self {
        session.set_loading(true);
        Self(session)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.set_loading(false);
    }
}

pub struct AuthService<B> {
    session: SessionStore,
    backend: Rc<B>,
}

impl<B> Clone for AuthService<B> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            backend: Rc::clone(&self.backend),
        }
    }
}

impl<B: AuthBackend> AuthService<B> {
    pub fn new(session: SessionStore, backend: B) -> Self {
        Self {
            session,
            backend: Rc::new(backend),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Log in and store the issued token. Returns the raw response.
    ///
    /// # Errors
    ///
    /// Backend errors pass through unchanged; a response without a token is
    /// [`AuthError::MissingToken`] and leaves the session untouched.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        let _loading = LoadingGuard::start(&self.session);
        let response = self.backend.login(request).await?;
        let Some(token) = response.token() else {
            log::warn!("login response carried no token");
            return Err(AuthError::MissingToken);
        };
        self.session.save_token(Some(token));
        log::info!("signed in");
        Ok(response)
    }

    /// Create an account. Does not establish a session.
    ///
    /// # Errors
    ///
    /// Backend errors pass through unchanged.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Value, AuthError> {
        let _loading = LoadingGuard::start(&self.session);
        let created = self.backend.register(request).await?;
        log::info!("account registered");
        Ok(created)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// Adopt a token issued outside the password flow (Google sign-in).
    pub fn set_app_token(&self, token: &str) {
        self.session.set_app_token(token);
    }

    /// Development-only sign-in that never touches the network.
    ///
    /// Backends that mint their own tokens sign in as their demo Google
    /// account, so the profile has user fields to show. Otherwise
    /// [`SIMULATED_TOKEN`] is stored, which carries no claims. Not for
    /// production builds.
    pub fn sign_in_simulated(&self) -> AuthResponse {
        log::warn!("simulated sign-in; not a real session");
        let response = self
            .backend
            .simulated_google_sign_in()
            .filter(|r| r.token().is_some())
            .unwrap_or_else(|| AuthResponse {
                token: Some(SIMULATED_TOKEN.to_owned()),
                extra: Map::new(),
            });
        self.session.save_token(response.token());
        response
    }
}
