use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use thiserror::Error;

/// Errors produced by key-value storage implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    #[error("entry not found for key: {key}")]
    NotFound { key: String },
    /// Underlying storage failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

/// Synchronous local key-value storage holding whole values under string keys.
pub trait KeyValueStore {
    /// Persist a value under a key, overwriting any existing entry.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Retrieve the value for a key.
    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove a key and its value (idempotent).
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and throwaway sessions.
/// Clones share the same map, so a clone can inspect what another handle wrote.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut map = self.inner.lock().map_err(|err| StorageError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let map = self.inner.lock().map_err(|err| StorageError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;

        map.get(key).cloned().ok_or_else(|| StorageError::NotFound {
            key: key.to_string(),
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.inner.lock().map_err(|err| StorageError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.remove(key);
        Ok(())
    }
}
