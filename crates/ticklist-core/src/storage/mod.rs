//! Key-value storage contract the persistence layer writes snapshots into.

mod kv_store;

pub use kv_store::{InMemoryStore, KeyValueStore, StorageError};
