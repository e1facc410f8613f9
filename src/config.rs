//! Client configuration baked in at build time.
//!
//! The browser has no process environment, so values come from the build
//! environment via `option_env!`:
//! - `APP_API_URL`: remote API base URL (default `http://localhost:8081/api`)
//! - `APP_GOOGLE_CLIENT_ID`: Google Identity Services client id (optional)

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8081/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub google_client_id: Option<String>,
}

impl ClientConfig {
    /// Build config from the values captured at compile time.
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("APP_API_URL"),
            option_env!("APP_GOOGLE_CLIENT_ID"),
        )
    }

    /// Build config from raw values. Blank values count as unset.
    pub fn from_values(api_url: Option<&str>, google_client_id: Option<&str>) -> Self {
        let api_base_url = non_blank(api_url)
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_owned();
        let google_client_id = non_blank(google_client_id).map(str::to_owned);
        Self {
            api_base_url,
            google_client_id,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_values(None, None)
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}
