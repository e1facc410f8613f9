//! Accounts kept entirely in browser storage, for running without the API.
//!
//! MOCK ONLY
//! =========
//! Passwords are stored in plaintext and tokens are unsigned. This backend
//! exists for demos and offline development and must never ship to users.

#[cfg(test)]
#[path = "mock_backend_test.rs"]
mod mock_backend_test;

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::backend::{AuthBackend, AuthError};
use super::types::{AuthResponse, LoginRequest, RegisterRequest};
use crate::util::jwt;
use crate::util::storage::{KeyValueStore, load_json, save_json};

pub const USERS_KEY: &str = "mock_users_v1";
/// Email of the account behind the simulated Google sign-in.
pub const DEMO_GOOGLE_EMAIL: &str = "demo.user@gmail.com";
const DEMO_GOOGLE_NAME: &str = "Google User";

const LOCAL_PROVIDER: &str = "local";
const GOOGLE_PROVIDER: &str = "google";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct MockUser {
    id: String,
    username: String,
    email: String,
    /// Plaintext. Mock only.
    password: String,
    provider: String,
}

impl MockUser {
    fn public_json(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email,
            "provider": self.provider,
        })
    }

    /// Google accounts have no password and never match here.
    fn accepts_password(&self, key: &str, password: &str) -> bool {
        self.provider == LOCAL_PROVIDER
            && (self.email == key || self.username == key)
            && self.password == password
    }

    fn claims(&self) -> Map<String, Value> {
        let mut claims = Map::new();
        claims.insert("sub".to_owned(), json!(self.id));
        claims.insert("username".to_owned(), json!(self.username));
        claims.insert("email".to_owned(), json!(self.email));
        claims.insert("roles".to_owned(), json!(["ROLE_USER"]));
        claims.insert("provider".to_owned(), json!(self.provider));
        claims
    }

    fn bearer_response(&self) -> AuthResponse {
        let mut extra = Map::new();
        extra.insert("tokenType".to_owned(), json!("Bearer"));
        AuthResponse {
            token: Some(jwt::encode_unsigned(&self.claims())),
            extra,
        }
    }
}

#[derive(Clone)]
pub struct LocalMockBackend {
    storage: Rc<dyn KeyValueStore>,
}

impl LocalMockBackend {
    pub fn new(storage: Rc<dyn KeyValueStore>) -> Self {
        log::warn!("local mock accounts: plaintext passwords, unsigned tokens");
        Self { storage }
    }

    fn users(&self) -> Vec<MockUser> {
        load_json(self.storage.as_ref(), USERS_KEY).unwrap_or_default()
    }

    /// The account for [`DEMO_GOOGLE_EMAIL`], created on first use.
    fn demo_google_user(&self) -> MockUser {
        let mut users = self.users();
        if let Some(user) = users.iter().find(|u| u.email == DEMO_GOOGLE_EMAIL) {
            return user.clone();
        }
        let user = MockUser {
            id: format!("google_{}", uuid::Uuid::new_v4().simple()),
            username: DEMO_GOOGLE_NAME.to_owned(),
            email: DEMO_GOOGLE_EMAIL.to_owned(),
            password: String::new(),
            provider: GOOGLE_PROVIDER.to_owned(),
        };
        users.push(user.clone());
        save_json(self.storage.as_ref(), USERS_KEY, &users);
        log::info!("created demo Google account {DEMO_GOOGLE_EMAIL}");
        user
    }
}

impl AuthBackend for LocalMockBackend {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        let key = request.username_or_email.as_str();
        let user = self
            .users()
            .into_iter()
            .find(|u| u.accepts_password(key, &request.password))
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(user.bearer_response())
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Value, AuthError> {
        let mut users = self.users();
        if users.iter().any(|u| u.email == request.email) {
            return Err(AuthError::EmailTaken);
        }
        let user = MockUser {
            id: uuid::Uuid::new_v4().to_string(),
            username: request.username.clone(),
            email: request.email.clone(),
            password: request.password.clone(),
            provider: LOCAL_PROVIDER.to_owned(),
        };
        let public = user.public_json();
        users.push(user);
        save_json(self.storage.as_ref(), USERS_KEY, &users);
        Ok(public)
    }

    fn simulated_google_sign_in(&self) -> Option<AuthResponse> {
        Some(self.demo_google_user().bearer_response())
    }
}
