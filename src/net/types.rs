//! Request/response DTOs for the accounts API.
//!
//! DESIGN
//! ======
//! Field names follow the API's camelCase JSON. Responses keep unknown fields
//! so callers receive the raw payload, not a lossy projection of it.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username or email; the API tries both.
    pub username_or_email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Display/login name. Older clients sent this as `name`.
    #[serde(alias = "name")]
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/oauth/google`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleTokenRequest {
    /// Google ID token (the GSI `credential`).
    pub id_token: String,
}

/// Response of the token-issuing endpoints: `{ token, ... }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Everything else the API returned (`tokenType`, user fields, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthResponse {
    /// Interpret an arbitrary JSON payload. Anything that is not an object with
    /// a string `token` yields a response without a token.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                let token = match map.remove("token") {
                    Some(Value::String(token)) => Some(token),
                    Some(other) => {
                        map.insert("token".to_owned(), other);
                        None
                    }
                    None => None,
                };
                Self { token, extra: map }
            }
            _ => Self::default(),
        }
    }

    /// The application token, if present and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}
