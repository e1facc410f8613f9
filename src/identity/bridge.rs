//! Bridge lifecycle and credential exchange for Google Identity Services.
//!
//! The bridge only relays: it turns a GSI credential into an application
//! token response via the API and hands the result to its caller. Session
//! state is decided by the page that receives the result.

#[cfg(test)]
#[path = "bridge_test.rs"]
mod bridge_test;

use serde::Serialize;

use crate::net::api::{ApiClient, ApiError, HttpTransport};
use crate::net::backend::GOOGLE_SIGN_IN_ENDPOINT;
use crate::net::types::{AuthResponse, GoogleTokenRequest};

/// Fixed id of the injected `<script>`; makes injection idempotent.
pub const SCRIPT_ELEMENT_ID: &str = "google-identity-services";
pub const SCRIPT_SRC: &str = "https://accounts.google.com/gsi/client";
/// Attribute on the injected `<script>` recording its [`ScriptStatus`].
pub const SCRIPT_STATUS_ATTR: &str = "data-gsi-status";

/// Load progress of the injected script, as recorded on its element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptStatus {
    Loading,
    Loaded,
}

impl ScriptStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Loaded => "loaded",
        }
    }

    pub fn parse(marker: Option<&str>) -> Option<Self> {
        match marker? {
            "loading" => Some(Self::Loading),
            "loaded" => Some(Self::Loaded),
            _ => None,
        }
    }
}

/// Whether a script element already on the page can stand in for a fresh
/// injection. Only an element whose load event fired qualifies; one left
/// behind by a cancelled mount, or added without a marker, is replaced.
pub fn reuse_existing_script(marker: Option<&str>) -> bool {
    ScriptStatus::parse(marker) == Some(ScriptStatus::Loaded)
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BridgeError {
    #[error("Google sign-in is not configured (missing client id)")]
    MissingClientId,
    #[error("Failed to load Google sign-in")]
    ScriptLoad,
    #[error("no credential returned")]
    NoCredential,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Lifecycle of one mounted sign-in button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BridgeState {
    #[default]
    Unloaded,
    ScriptLoading,
    Ready,
    Rendering,
    Rendered,
    ConfigError,
    ScriptError,
    /// Retry budget spent; waiting for the container to become visible.
    RenderExhausted,
}

impl BridgeState {
    /// `Some(next)` if the transition is allowed.
    pub fn advance(self, next: Self) -> Option<Self> {
        use BridgeState::*;
        let allowed = matches!(
            (self, next),
            (Unloaded, ScriptLoading | Ready | ConfigError)
                | (ScriptLoading, Ready | ScriptError)
                | (Ready, Rendering)
                | (Rendering, Rendered | RenderExhausted)
                | (RenderExhausted, Rendered)
        );
        allowed.then_some(next)
    }

    pub fn is_failed(self) -> bool {
        matches!(self, Self::ConfigError | Self::ScriptError)
    }
}

/// Options passed to `google.accounts.id.renderButton`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonOptions {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub theme: &'static str,
    pub size: &'static str,
    pub text: &'static str,
    pub shape: &'static str,
    pub width: u32,
    pub logo_alignment: &'static str,
}

impl Default for ButtonOptions {
    fn default() -> Self {
        Self {
            kind: "standard",
            theme: "outline",
            size: "large",
            text: "signin_with",
            shape: "rectangular",
            width: 320,
            logo_alignment: "left",
        }
    }
}

/// The configured client id, or [`BridgeError::MissingClientId`].
///
/// # Errors
///
/// Fails when the id is absent or blank.
pub fn require_client_id(client_id: Option<&str>) -> Result<&str, BridgeError> {
    client_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(BridgeError::MissingClientId)
}

/// Exchange a GSI credential for the application's token response.
///
/// # Errors
///
/// [`BridgeError::NoCredential`] when GSI returned nothing, otherwise the API
/// error from the exchange.
pub async fn exchange_credential<T: HttpTransport>(
    api: &ApiClient<T>,
    credential: Option<&str>,
) -> Result<AuthResponse, BridgeError> {
    let Some(id_token) = credential.filter(|c| !c.is_empty()) else {
        log::warn!("Google sign-in callback fired without a credential");
        return Err(BridgeError::NoCredential);
    };
    let request = GoogleTokenRequest {
        id_token: id_token.to_owned(),
    };
    let body = api.post_json(GOOGLE_SIGN_IN_ENDPOINT, &request).await?;
    Ok(AuthResponse::from_json(body.into_json()))
}
