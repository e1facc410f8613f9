use super::*;
use serde_json::json;

#[test]
fn login_request_serializes_camel_case() {
    let req = LoginRequest {
        username_or_email: "a@b.test".to_owned(),
        password: "secret1".to_owned(),
    };
    assert_eq!(
        serde_json::to_value(&req).unwrap(),
        json!({ "usernameOrEmail": "a@b.test", "password": "secret1" })
    );
}

#[test]
fn register_request_accepts_legacy_name_field() {
    let legacy = json!({ "name": "Ravi", "email": "r@x.test", "password": "secret1" });
    let req: RegisterRequest = serde_json::from_value(legacy).unwrap();
    assert_eq!(req.username, "Ravi");
    assert_eq!(serde_json::to_value(&req).unwrap()["username"], "Ravi");
}

#[test]
fn google_token_request_uses_id_token_key() {
    let req = GoogleTokenRequest {
        id_token: "gsi".to_owned(),
    };
    assert_eq!(
        serde_json::to_value(&req).unwrap(),
        json!({ "idToken": "gsi" })
    );
}

#[test]
fn auth_response_keeps_extra_fields() {
    let resp = AuthResponse::from_json(json!({ "token": "a.b.c", "tokenType": "Bearer" }));
    assert_eq!(resp.token(), Some("a.b.c"));
    assert_eq!(resp.extra.get("tokenType"), Some(&json!("Bearer")));
}

#[test]
fn auth_response_without_string_token_has_none() {
    let token_of = |value: Value| AuthResponse::from_json(value).token().map(str::to_owned);
    assert_eq!(token_of(json!({ "id": 3 })), None);
    assert_eq!(token_of(json!({ "token": 12 })), None);
    assert_eq!(token_of(json!({ "token": "" })), None);
    assert_eq!(token_of(json!("plain text")), None);
}
