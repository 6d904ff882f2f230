use std::path::PathBuf;

use crate::config::Config;
use color_eyre::Result;
use dirs::data_dir;
use ticklist_store::{PersistenceAdapter, TaskStore};
use ticklist_storage::FileStore;
use tracing::debug;

/// Environment override for the data directory; wins over the config file.
pub const DATA_DIR_ENV: &str = "TICKLIST_DATA_DIR";

/// Resolve the default data directory for ticklist.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("ticklist"))
}

/// Pick the data directory: environment, then config, then platform default.
pub fn resolve_data_dir(config: &Config, env_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = env_override {
        return Ok(root);
    }
    if let Some(root) = &config.data_dir {
        return Ok(root.clone());
    }
    default_data_dir()
}

/// Build the file store using env and config overrides.
pub fn store_from_config(config: &Config) -> Result<FileStore> {
    let env_override = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    let root = resolve_data_dir(config, env_override)?;
    debug!(?root, "initializing file store");
    Ok(FileStore::new(root))
}

/// Open the task store over the configured slot, hydrating saved tasks.
pub fn open_task_store(config: &Config) -> Result<TaskStore<FileStore>> {
    let store = store_from_config(config)?;
    debug!(slot = config.slot(), "opening task store");
    Ok(TaskStore::open(PersistenceAdapter::with_slot(
        store,
        config.slot(),
    )))
}

/// Helper for tests to construct a store rooted at a temp dir.
#[cfg(test)]
pub fn test_store(root: impl Into<PathBuf>) -> FileStore {
    FileStore::new(root)
}
