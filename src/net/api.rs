//! JSON request helper for the accounts API.
//!
//! Every request carries `Content-Type: application/json` and, when the
//! session token key in storage holds a value, `Authorization: Bearer <token>`.
//! Response bodies are parsed as JSON with a raw-text fallback.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become [`ApiError::Http`] with the status, the parsed
//! body, and a display message taken from the body's `message` field, its
//! `error` field, the body itself, or the HTTP status text, in that order.
//! Nothing is retried here.

#![allow(async_fn_in_trait)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::util::storage::KeyValueStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// Fully-resolved request handed to a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response as seen by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one HTTP request. Errors are network-level failures only; HTTP
/// error statuses are successful sends.
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, String>;
}

/// Parsed response body.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Empty;
        }
        serde_json::from_str(raw)
            .map_or_else(|_| Self::Text(raw.to_owned()), Self::Json)
    }

    /// The body as JSON: text becomes a JSON string, empty becomes `null`.
    pub fn into_json(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Http {
        status: u16,
        body: ResponseBody,
        message: String,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("could not encode request: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&ResponseBody> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Display message for a failed response.
fn error_message(body: &ResponseBody, status_text: &str) -> String {
    let from_body = match body {
        ResponseBody::Empty | ResponseBody::Json(Value::Null) => None,
        ResponseBody::Json(Value::Object(map)) => ["message", "error"]
            .iter()
            .find_map(|key| {
                map.get(*key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            })
            .map(str::to_owned)
            .or_else(|| Some(Value::Object(map.clone()).to_string())),
        ResponseBody::Json(Value::String(s)) | ResponseBody::Text(s) => {
            Some(s.clone()).filter(|s| !s.is_empty())
        }
        ResponseBody::Json(other) => Some(other.to_string()),
    };
    from_body
        .or_else(|| Some(status_text.to_owned()).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "API error".to_owned())
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    let existing = headers
        .iter_mut()
        .find(|(k, _)| k.eq_ignore_ascii_case(name));
    match existing {
        Some(slot) => slot.1 = value,
        None => headers.push((name.to_owned(), value)),
    }
}

/// Per-request options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::Get,
            body: None,
            headers: Vec::new(),
        }
    }
}

/// JSON API client bound to a base URL and the session's token key.
pub struct ApiClient<T> {
    base_url: String,
    transport: Rc<T>,
    store: Rc<dyn KeyValueStore>,
    token_key: &'static str,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: Rc::clone(&self.transport),
            store: Rc::clone(&self.store),
            token_key: self.token_key,
        }
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(
        base_url: &str,
        transport: T,
        store: Rc<dyn KeyValueStore>,
        token_key: &'static str,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            transport: Rc::new(transport),
            store,
            token_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request to `endpoint` (leading slash included, e.g. `/auth/login`).
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`] when the request could not be sent,
    /// [`ApiError::Http`] for any non-2xx status.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, ApiError> {
        let mut headers = vec![("Content-Type".to_owned(), "application/json".to_owned())];
        for (name, value) in options.headers {
            set_header(&mut headers, &name, value);
        }
        if let Some(token) = self.store.get(self.token_key).filter(|t| !t.is_empty()) {
            set_header(&mut headers, "Authorization", format!("Bearer {token}"));
        }

        let request = HttpRequest {
            method: options.method,
            url: format!("{}{endpoint}", self.base_url),
            headers,
            body: options.body,
        };
        log::debug!("{} {endpoint}", request.method);

        let response = self.transport.send(request).await.map_err(|e| {
            log::warn!("{} {endpoint} failed to send: {e}", options.method);
            ApiError::Network(e)
        })?;
        let body = ResponseBody::parse(&response.body);
        if !response.ok() {
            let message = error_message(&body, &response.status_text);
            log::debug!("{endpoint} -> {}: {message}", response.status);
            return Err(ApiError::Http {
                status: response.status,
                body,
                message,
            });
        }
        Ok(body)
    }

    /// `POST` `payload` as JSON.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::request`], plus [`ApiError::Encode`] if `payload` fails
    /// to serialize.
    pub async fn post_json<P: Serialize>(
        &self,
        endpoint: &str,
        payload: &P,
    ) -> Result<ResponseBody, ApiError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| ApiError::Encode(e.to_string()))?;
        let options = RequestOptions {
            method: Method::Post,
            body: Some(body),
            headers: Vec::new(),
        };
        self.request(endpoint, options).await
    }
}

/// `fetch` via `gloo-net`.
#[cfg(feature = "csr")]
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

#[cfg(feature = "csr")]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        use gloo_net::http::{Method as FetchMethod, RequestBuilder};

        let method = match request.method {
            Method::Get => FetchMethod::GET,
            Method::Post => FetchMethod::POST,
        };
        let mut builder = RequestBuilder::new(&request.url).method(method);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let built = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| e.to_string())?;

        let resp = built.send().await.map_err(|e| e.to_string())?;
        let status = resp.status();
        let status_text = resp.status_text();
        let body = resp.text().await.map_err(|e| e.to_string())?;
        Ok(HttpResponse {
            status,
            status_text,
            body,
        })
    }
}

/// Transport for builds without a browser; every send fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableTransport;

impl HttpTransport for UnavailableTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, String> {
        Err("not available outside the browser".to_owned())
    }
}

#[cfg(feature = "csr")]
pub type DefaultTransport = GlooTransport;
#[cfg(not(feature = "csr"))]
pub type DefaultTransport = UnavailableTransport;
