//! Key-value persistence
//!
//! Features:
//! - `KeyValueStore` trait over LocalStorage (web) or memory (native/tests)
//! - JSON values with logged fallback to defaults on missing/corrupt data
//! - Player progress written once per run, at the end

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(target_arch = "wasm32")]
mod local_storage;
pub mod profile;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;
pub use profile::{ProgressProfile, RunRecord};

/// Storage keys
pub mod keys {
    pub const TOTAL_XP: &str = "reflex_tap_total_xp";
    pub const COINS: &str = "reflex_tap_coins";
    pub const MAX_COMBO: &str = "reflex_tap_max_combo";
    pub const GAMES_PLAYED: &str = "reflex_tap_games_played";
    pub const SETTINGS: &str = "reflex_tap_settings";
    pub const LEADERBOARDS: &str = "reflex_tap_leaderboards";

    /// Per-mode high score key
    pub fn high_score(mode: crate::sim::GameMode) -> String {
        format!("reflex_tap_high_score_{}", mode.as_str())
    }
}

/// Storage failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No storage backend (private browsing, no window)
    Unavailable,
    /// Backend rejected the operation
    Backend(String),
    /// Value could not be encoded/decoded
    Serialize(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "storage unavailable"),
            StoreError::Backend(msg) => write!(f, "storage backend error: {msg}"),
            StoreError::Serialize(msg) => write!(f, "serialization error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialize(err.to_string())
    }
}

/// String key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Read a JSON value; `Ok(None)` when the key is missing
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Write a JSON value
pub fn write_json<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Read a JSON value, logging and falling back to `T::default()` on any failure
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match read_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(err) => {
            log::warn!("Failed to load {key}: {err}, using defaults");
            T::default()
        }
    }
}

/// Write a JSON value, logging failures; returns whether it was saved
pub fn save_logged<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> bool {
    match write_json(store, key, value) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("Failed to save {key}: {err}");
            false
        }
    }
}

/// Store that fails every call (for exercising fallbacks)
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}
