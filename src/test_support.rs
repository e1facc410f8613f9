//! Fakes shared by unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::net::api::{HttpRequest, HttpResponse, HttpTransport};

/// Transport that replays queued responses and records every request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Rc<RefCell<VecDeque<Result<HttpResponse, String>>>>,
    requests: Rc<RefCell<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        let status_text = match status {
            200 => "OK",
            201 => "Created",
            400 => "Bad Request",
            401 => "Unauthorized",
            500 => "Internal Server Error",
            _ => "",
        };
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            status_text: status_text.to_owned(),
            body: body.to_owned(),
        }));
        self
    }

    pub fn fail(&self, error: &str) -> &Self {
        self.responses.borrow_mut().push_back(Err(error.to_owned()));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted response".to_owned()))
    }
}

/// Unsigned token whose payload is `claims`.
pub fn token_for(claims: &serde_json::Value) -> String {
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("eyJhbGciOiJIUzI1NiJ9.{payload}.sig")
}
