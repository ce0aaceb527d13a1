//! Persisted "last selected address"

use std::sync::Arc;
use tracing::warn;

use super::types::Address;
use crate::storage::KeyValueStore;

pub const DEFAULT_STORAGE_KEY: &str = "savedAccount";

/// Best-effort wrapper over the key-value capability for the single
/// last-selected address. Storage faults are logged and never propagated.
#[derive(Clone)]
pub struct AddressStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl AddressStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn get(&self) -> Option<Address> {
        match self.storage.get_item(&self.key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read saved account: {}", e);
                None
            }
        }
    }

    pub fn set(&self, address: &str) {
        if let Err(e) = self.storage.set_item(&self.key, address) {
            warn!("Failed to save selected account {}: {}", address, e);
        }
    }
}
