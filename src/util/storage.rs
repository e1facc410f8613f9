//! Durable key/value storage used by the session store and the mock backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! In the browser this is `window.localStorage`; tests and non-browser builds
//! use an in-memory map with the same contract. Writes are best-effort: a
//! full or disabled storage area is logged and otherwise ignored.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// String key/value store with `localStorage` semantics.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Load a JSON value stored under `key`. Missing or unparseable values are `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    serde_json::from_str(&raw).ok()
}

/// Save `value` as JSON under `key`.
pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => log::warn!("failed to encode {key} for storage: {e}"),
    }
}

/// In-memory store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.borrow().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// `window.localStorage`, looked up on every call.
#[cfg(feature = "csr")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

#[cfg(feature = "csr")]
impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "csr")]
impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = Self::storage() else {
            log::warn!("localStorage unavailable; dropping write to {key}");
            return;
        };
        if storage.set_item(key, value).is_err() {
            log::warn!("localStorage rejected write to {key}");
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// The store for the current build target.
pub fn default_store() -> Rc<dyn KeyValueStore> {
    #[cfg(feature = "csr")]
    {
        Rc::new(BrowserStorage)
    }
    #[cfg(not(feature = "csr"))]
    {
        Rc::new(MemoryStorage::new())
    }
}
