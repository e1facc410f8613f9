use super::*;
use crate::test_support::ScriptedTransport;
use crate::util::storage::MemoryStorage;
use futures::executor::block_on;
use serde_json::json;
use std::rc::Rc;

fn api(transport: &ScriptedTransport) -> ApiClient<ScriptedTransport> {
    ApiClient::new(
        "http://api.test/api",
        transport.clone(),
        Rc::new(MemoryStorage::new()),
        "auth_token",
    )
}

#[test]
fn happy_path_transitions_are_allowed() {
    let path = [
        BridgeState::ScriptLoading,
        BridgeState::Ready,
        BridgeState::Rendering,
        BridgeState::RenderExhausted,
        BridgeState::Rendered,
    ];
    let mut state = BridgeState::default();
    for next in path {
        state = state
            .advance(next)
            .unwrap_or_else(|| panic!("{state:?} -> {next:?}"));
    }
    assert_eq!(state, BridgeState::Rendered);
}

#[test]
fn failures_are_terminal() {
    assert_eq!(
        BridgeState::ScriptLoading.advance(BridgeState::ScriptError),
        Some(BridgeState::ScriptError)
    );
    assert_eq!(BridgeState::ScriptError.advance(BridgeState::Ready), None);
    assert_eq!(
        BridgeState::ConfigError.advance(BridgeState::ScriptLoading),
        None
    );
    assert_eq!(BridgeState::Unloaded.advance(BridgeState::Rendering), None);
    assert!(BridgeState::ScriptError.is_failed());
    assert!(!BridgeState::RenderExhausted.is_failed());
}

#[test]
fn only_a_script_marked_loaded_is_reused() {
    assert!(reuse_existing_script(Some(ScriptStatus::Loaded.as_str())));
    // A failed load removes its element; a cancelled one leaves "loading".
    assert!(!reuse_existing_script(Some(ScriptStatus::Loading.as_str())));
    assert!(!reuse_existing_script(None));
    assert!(!reuse_existing_script(Some("error")));
    assert_eq!(
        ScriptStatus::parse(Some("loading")),
        Some(ScriptStatus::Loading)
    );
    assert_eq!(ScriptStatus::parse(Some("")), None);
}

#[test]
fn require_client_id_rejects_missing_or_blank() {
    assert_eq!(require_client_id(None), Err(BridgeError::MissingClientId));
    assert_eq!(
        require_client_id(Some("  ")),
        Err(BridgeError::MissingClientId)
    );
    assert_eq!(
        require_client_id(Some("id.apps.googleusercontent.com")),
        Ok("id.apps.googleusercontent.com")
    );
}

#[test]
fn button_options_serialize_with_type_key() {
    assert_eq!(
        serde_json::to_value(ButtonOptions::default()).unwrap(),
        json!({
            "type": "standard",
            "theme": "outline",
            "size": "large",
            "text": "signin_with",
            "shape": "rectangular",
            "width": 320,
            "logo_alignment": "left",
        })
    );
}

#[test]
fn missing_credential_is_reported_without_network() {
    let transport = ScriptedTransport::new();
    let err = block_on(exchange_credential(&api(&transport), None)).unwrap_err();
    assert_eq!(err, BridgeError::NoCredential);
    assert_eq!(err.to_string(), "no credential returned");
    assert_eq!(
        block_on(exchange_credential(&api(&transport), Some(""))),
        Err(BridgeError::NoCredential)
    );
    assert!(transport.requests().is_empty());
}

#[test]
fn credential_is_exchanged_at_google_endpoint() {
    let transport = ScriptedTransport::new();
    transport.respond(200, r#"{"token":"a.b.c","tokenType":"Bearer"}"#);

    let resp = block_on(exchange_credential(
        &api(&transport),
        Some("gsi-credential"),
    ))
    .unwrap();

    assert_eq!(resp.token(), Some("a.b.c"));
    let sent = transport.requests();
    assert_eq!(sent[0].url, "http://api.test/api/auth/oauth/google");
    assert_eq!(
        sent[0].body.as_deref(),
        Some(r#"{"idToken":"gsi-credential"}"#)
    );
}

#[test]
fn api_rejection_is_forwarded() {
    let transport = ScriptedTransport::new();
    transport.respond(401, r#"{"error":"Invalid ID token"}"#);

    let err = block_on(exchange_credential(&api(&transport), Some("stale"))).unwrap_err();

    assert_eq!(err.to_string(), "Invalid ID token");
    assert!(matches!(err, BridgeError::Api(ref e) if e.status() == Some(401)));
}
