//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware components to coordinate login redirects
//! and identity-dependent rendering.

use serde::{Deserialize, Serialize};

/// Display fields derived from the session token's claims.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub roles: Option<Vec<String>>,
}

/// Authentication state tracking the token, derived user and loading status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub token: Option<String>,
    pub user: Option<SessionUser>,
    pub loading: bool,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
