//! Concrete storage backends for the ticklist key-value contract.

pub mod file_store;

pub use file_store::{validate_key, FileStore};
