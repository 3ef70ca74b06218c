//! Scene-keyed persistence seam.
//!
//! Hotspots and atmosphere settings are stored as JSON under
//! `hotspots:<sceneId>` and `atmosphere:<sceneId>`. Reads never fail: a
//! missing or malformed record is reported as `None` and callers fall back to
//! defaults.

use fnv::FnvHashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("write rejected for {key}: {reason}")]
    Write { key: String, reason: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// String key-value persistence collaborator.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process store for the host and for tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: FnvHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[inline]
pub fn hotspots_key(scene_id: &str) -> String {
    format!("hotspots:{scene_id}")
}

#[inline]
pub fn atmosphere_key(scene_id: &str) -> String {
    format!("atmosphere:{scene_id}")
}

/// Key layout used by earlier builds, read as a fallback only.
#[inline]
pub fn legacy_key(scene_id: &str, record: &str) -> String {
    format!("{scene_id}-{record}")
}

/// Read and decode `key`. Malformed JSON is logged and treated as absent.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("[store] ignoring malformed {}: {}", key, e);
            None
        }
    }
}

/// Read the first of `keys` that holds a decodable record.
pub fn load_json_any<T: DeserializeOwned>(store: &dyn KeyValueStore, keys: &[String]) -> Option<T> {
    keys.iter().find_map(|k| load_json(store, k))
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
