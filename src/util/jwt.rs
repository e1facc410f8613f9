//! Non-validating decoder for compact three-part tokens.
//!
//! TRUST BOUNDARY
//! ==============
//! Claims are read client-side only for display, never for authorization.
//! There is no signature check and no expiry check; the API remains the
//! authority on whether a token is valid.

#[cfg(test)]
#[path = "jwt_test.rs"]
mod jwt_test;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value};

/// Standard alphabet, padding optional, trailing bits ignored (matches `atob`).
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decoded payload object of a token.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// The `sub` claim.
    pub fn subject(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    pub fn username(&self) -> Option<&str> {
        self.str_claim("username")
    }

    pub fn email(&self) -> Option<&str> {
        self.str_claim("email")
    }

    /// The `roles` claim as a list. A bare string counts as a single role.
    pub fn roles(&self) -> Option<Vec<String>> {
        match self.0.get("roles")? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect(),
            ),
            Value::String(role) => Some(vec![role.clone()]),
            _ => None,
        }
    }

    fn str_claim(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Decode the middle segment of `token` into claims.
///
/// Returns `None` unless the token has exactly three `.`-separated segments
/// and the middle one is base64 (URL-safe or standard) of a UTF-8 JSON object.
pub fn decode(token: &str) -> Option<Claims> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    let normalized = payload.replace('-', "+").replace('_', "/");
    let bytes = FORGIVING.decode(normalized).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    match serde_json::from_str::<Value>(&text).ok()? {
        Value::Object(map) => Some(Claims(map)),
        _ => None,
    }
}

/// Build an unsigned token carrying `claims`.
///
/// Only for the local mock backend, whose sessions never reach a server.
pub fn encode_unsigned(claims: &Map<String, Value>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(Value::Object(claims.clone()).to_string());
    format!("{header}.{payload}.unsigned")
}
