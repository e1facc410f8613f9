//! Observable session store.
//!
//! ARCHITECTURE
//! ============
//! One `SessionStore` is created at the application root and handed to the
//! auth service and the UI. It owns the token and the user derived from it,
//! mirrors both into durable storage, and notifies subscribers after every
//! mutation. Components never write session state directly.
//!
//! Single-threaded by construction (`Rc`/`RefCell`); each mutator finishes its
//! state write before any subscriber runs, so subscribers may read the store.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::auth::{AuthState, SessionUser};
use crate::util::jwt;
use crate::util::storage::{KeyValueStore, load_json, save_json};

/// Storage keys for one deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    pub token: &'static str,
    pub user: &'static str,
}

impl StorageKeys {
    /// Keys used against the remote API.
    pub const REMOTE: Self = Self {
        token: "auth_token",
        user: "auth_user",
    };
    /// Keys used by the local mock deployment.
    pub const LOCAL_MOCK: Self = Self {
        token: "mock_session_token_v1",
        user: "mock_current_user_v1",
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Rc<dyn Fn(&AuthState)>;

struct Inner {
    state: RefCell<AuthState>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_id: Cell<u64>,
    storage: Rc<dyn KeyValueStore>,
    keys: StorageKeys,
}

/// Cloneable handle to the process-wide session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<Inner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SessionStore")
            .field("authenticated", &state.is_authenticated())
            .field("user", &state.user)
            .field("loading", &state.loading)
            .field("keys", &self.inner.keys)
            .finish_non_exhaustive()
    }
}

/// Derive display fields from a token. `None` when the token does not decode.
pub fn derive_user(token: &str) -> Option<SessionUser> {
    let claims = jwt::decode(token)?;
    Some(SessionUser {
        username: claims
            .username()
            .or_else(|| claims.subject())
            .map(str::to_owned),
        email: claims.email().map(str::to_owned),
        roles: claims.roles(),
    })
}

impl SessionStore {
    /// Restore the session persisted under `keys`.
    ///
    /// A token without a stored user is decoded immediately; a stored user
    /// without a token is discarded.
    pub fn load(storage: Rc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        let token = storage.get(keys.token).filter(|t| !t.is_empty());
        let user = match &token {
            Some(token) => {
                let stored = load_json::<SessionUser>(storage.as_ref(), keys.user);
                stored.or_else(|| {
                    let derived = derive_user(token);
                    persist_user(storage.as_ref(), keys, derived.as_ref());
                    derived
                })
            }
            None => {
                storage.remove(keys.user);
                None
            }
        };
        log::debug!("session restored (authenticated: {})", token.is_some());

        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(AuthState {
                    token,
                    user,
                    loading: false,
                }),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                storage,
                keys,
            }),
        }
    }

    /// Replace the session token.
    ///
    /// `Some` persists the token and the user derived from it (cleared if the
    /// token does not decode). `None` or an empty token removes both.
    pub fn save_token(&self, token: Option<&str>) {
        let storage = self.inner.storage.as_ref();
        let keys = self.inner.keys;
        match token.filter(|t| !t.is_empty()) {
            Some(token) => {
                storage.set(keys.token, token);
                let user = derive_user(token);
                if user.is_none() {
                    log::debug!("session token has no readable claims");
                }
                persist_user(storage, keys, user.as_ref());
                let mut state = self.inner.state.borrow_mut();
                state.token = Some(token.to_owned());
                state.user = user;
            }
            None => {
                storage.remove(keys.token);
                storage.remove(keys.user);
                let mut state = self.inner.state.borrow_mut();
                state.token = None;
                state.user = None;
            }
        }
        self.notify();
    }

    /// Inject a token obtained outside the password flow (e.g. Google sign-in).
    pub fn set_app_token(&self, token: &str) {
        self.save_token(Some(token));
    }

    pub fn logout(&self) {
        log::info!("session cleared");
        self.save_token(None);
    }

    pub fn set_loading(&self, loading: bool) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.loading == loading {
                return;
            }
            state.loading = loading;
        }
        self.notify();
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.inner.state.borrow().user.clone()
    }

    pub fn loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn snapshot(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Call `f` with the new state after every mutation.
    pub fn subscribe(&self, f: impl Fn(&AuthState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.subscribers.borrow_mut().push((id, Rc::new(f)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, f)| Rc::clone(f))
            .collect();
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }
}

fn persist_user(storage: &dyn KeyValueStore, keys: StorageKeys, user: Option<&SessionUser>) {
    match user {
        Some(user) => save_json(storage, keys.user, user),
        None => storage.remove(keys.user),
    }
}
