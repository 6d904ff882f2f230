use std::collections::HashSet;

use thiserror::Error;
use ticklist_core::{
    storage::{KeyValueStore, StorageError},
    tasks::Task,
};
use tracing::{debug, warn};

/// Slot the collection is written to unless configured otherwise.
pub const DEFAULT_SLOT: &str = "tasks";

/// Failure writing a snapshot. The store logs it and carries on.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Reads and writes the whole task collection under a single named slot.
pub struct PersistenceAdapter<S: KeyValueStore> {
    store: S,
    slot: String,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(store: S) -> Self {
        Self::with_slot(store, DEFAULT_SLOT)
    }

    pub fn with_slot(store: S, slot: impl Into<String>) -> Self {
        Self {
            store,
            slot: slot.into(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hydrate the collection. Missing, unreadable or corrupt slots yield an empty list.
    pub fn load(&self) -> Vec<Task> {
        let bytes = match self.store.get(&self.slot) {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound { .. }) => {
                debug!(slot = %self.slot, "no saved tasks, starting empty");
                return Vec::new();
            }
            Err(err) => {
                warn!(slot = %self.slot, error = %err, "could not read saved tasks, starting empty");
                return Vec::new();
            }
        };

        match decode(&bytes) {
            Ok(tasks) => {
                debug!(slot = %self.slot, count = tasks.len(), "loaded tasks");
                tasks
            }
            Err(err) => {
                warn!(slot = %self.slot, error = %err, "discarding unparsable saved tasks");
                Vec::new()
            }
        }
    }

    /// Replace the slot with a full snapshot of `tasks`.
    pub fn save(&self, tasks: &[Task]) -> Result<(), PersistError> {
        let bytes = encode(tasks)?;
        self.store.put(&self.slot, &bytes)?;
        debug!(slot = %self.slot, count = tasks.len(), "saved tasks");
        Ok(())
    }
}

/// Serialize a collection into the slot format (a JSON array of records).
pub fn encode(tasks: &[Task]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(tasks)
}

/// Parse the slot format. Records repeating an earlier id are dropped.
pub fn decode(bytes: &[u8]) -> Result<Vec<Task>, serde_json::Error> {
    let mut tasks: Vec<Task> = serde_json::from_slice(bytes)?;
    let mut seen = HashSet::with_capacity(tasks.len());
    let before = tasks.len();
    tasks.retain(|task| seen.insert(task.id.clone()));
    if tasks.len() != before {
        warn!(dropped = before - tasks.len(), "dropped tasks with duplicate ids");
    }
    Ok(tasks)
}
