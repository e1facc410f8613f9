use super::*;
use serde_json::json;

const NO_TOKEN: Result<&str, &str> = Err("No token from Google sign-in");

#[test]
fn google_token_requires_non_empty_token() {
    let response = AuthResponse::from_json(json!({ "token": "a.b.c", "tokenType": "Bearer" }));
    assert_eq!(google_token(&response), Ok("a.b.c"));

    let empty = AuthResponse::from_json(json!({ "token": "" }));
    assert_eq!(google_token(&empty), NO_TOKEN);
    let missing = AuthResponse::from_json(json!({}));
    assert_eq!(google_token(&missing), NO_TOKEN);
}

#[test]
fn failure_message_falls_back_when_blank() {
    assert_eq!(
        failure_message(&"Invalid ID token", "Google sign-in failed"),
        "Invalid ID token"
    );
    assert_eq!(failure_message(&"  ", "Login failed"), "Login failed");
}
