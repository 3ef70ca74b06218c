use crate::core::{KeyValueStore, StoreError};
use web_sys as web;

/// `window.localStorage`. Private-mode browsers may refuse it entirely; the
/// viewer then runs on defaults and every write reports `Unavailable`.
pub struct LocalStore {
    storage: Option<web::Storage>,
}

impl LocalStore {
    pub fn open() -> Self {
        let storage = web::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("[store] localStorage unavailable; edits will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self.storage.as_ref().ok_or(StoreError::Unavailable)?;
        storage.set_item(key, value).map_err(|e| StoreError::Write {
            key: key.to_string(),
            reason: format!("{:?}", e),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let storage = self.storage.as_ref().ok_or(StoreError::Unavailable)?;
        storage.remove_item(key).map_err(|e| StoreError::Write {
            key: key.to_string(),
            reason: format!("{:?}", e),
        })
    }
}
