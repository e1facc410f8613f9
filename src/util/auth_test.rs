use super::*;
use crate::state::auth::SessionUser;

fn state(token: Option<&str>, loading: bool) -> AuthState {
    AuthState {
        token: token.map(str::to_owned),
        user: None,
        loading,
    }
}

#[test]
fn should_redirect_unauth_when_not_loading_and_token_missing() {
    assert!(should_redirect_unauth(&state(None, false)));
}

#[test]
fn should_not_redirect_while_loading() {
    assert!(!should_redirect_unauth(&state(None, true)));
}

#[test]
fn should_not_redirect_when_token_exists_without_claims() {
    let state = state(Some("simulated-demo-token"), false);
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_when_user_exists() {
    let state = AuthState {
        user: Some(SessionUser {
            username: Some("ravi".to_owned()),
            email: None,
            roles: None,
        }),
        ..state(Some("a.b.c"), false)
    };
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn signed_in_redirect_waits_for_pending_call() {
    let mut state = state(Some("a.b.c"), true);
    assert!(!should_redirect_signed_in(&state));
    state.loading = false;
    assert!(should_redirect_signed_in(&state));
    assert!(!should_redirect_signed_in(&AuthState::default()));
}
