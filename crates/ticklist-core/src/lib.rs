//! Core abstractions for ticklist: the task data model and the key-value
//! storage contract. Kept small so every other crate can depend on it.

pub mod storage;
pub mod tasks;
