use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::error::StoreError;

/// Persistent string key-value capability.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Sled-backed store; survives process restarts.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(Path::new(path))
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(SledStore { db })
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map(|_| ())
            .map_err(|e| StoreError::DatabaseError(e.to_string()))
    }
}

impl KeyValueStore for SledStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.db.get(key.as_bytes()) {
            Ok(Some(data)) => String::from_utf8(data.to_vec())
                .map(Some)
                .map_err(|_| StoreError::InvalidValue(key.to_string())),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::DatabaseError(e.to_string())),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        // Single small record; flush so a crash right after selection keeps it.
        self.flush()
    }
}

/// In-process store for ephemeral sessions and tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let items = self
            .items
            .lock()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Opens the sled store at `path`, falling back to an in-process store when
/// the database cannot be opened (e.g. another process holds its lock).
/// The selection is then not persisted, but the session still runs.
pub fn open_or_memory(path: &str) -> Arc<dyn KeyValueStore> {
    match SledStore::open(path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Storage at {} unavailable, selection will not persist: {}", path, e);
            Arc::new(MemoryStore::new())
        }
    }
}
