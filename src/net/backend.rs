//! Account backends the auth service can run against.
//!
//! `RemoteBackend` talks to the accounts API; `mock_backend::LocalMockBackend`
//! keeps accounts in browser storage. Both satisfy [`AuthBackend`], so the
//! session store and pages are identical across the two deployments.

#![allow(async_fn_in_trait)]

#[cfg(test)]
#[path = "backend_test.rs"]
mod backend_test;

use serde_json::Value;

use super::api::{ApiClient, ApiError, HttpTransport};
use super::types::{AuthResponse, LoginRequest, RegisterRequest};

pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const REGISTER_ENDPOINT: &str = "/auth/register";
pub const GOOGLE_SIGN_IN_ENDPOINT: &str = "/auth/oauth/google";

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("No token received from server")]
    MissingToken,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
}

pub trait AuthBackend {
    /// Exchange credentials for the raw token response.
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError>;

    /// Create an account. The response shape is backend-defined.
    async fn register(&self, request: &RegisterRequest) -> Result<Value, AuthError>;

    /// Sign in as a stand-in Google account without the Google SDK. Only
    /// backends that mint their own tokens support this.
    fn simulated_google_sign_in(&self) -> Option<AuthResponse> {
        None
    }
}

/// Backend over the remote accounts API.
pub struct RemoteBackend<T> {
    api: ApiClient<T>,
}

impl<T> Clone for RemoteBackend<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
        }
    }
}

impl<T: HttpTransport> RemoteBackend<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self { api }
    }
}

impl<T: HttpTransport> AuthBackend for RemoteBackend<T> {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        let body = self.api.post_json(LOGIN_ENDPOINT, request).await?;
        Ok(AuthResponse::from_json(body.into_json()))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Value, AuthError> {
        let body = self.api.post_json(REGISTER_ENDPOINT, request).await?;
        Ok(body.into_json())
    }
}
