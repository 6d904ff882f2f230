use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use ticklist_storage::validate_key;
use ticklist_store::DEFAULT_SLOT;

/// User-level configuration loaded from `~/.config/ticklist/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for the directory holding saved tasks.
    pub data_dir: Option<PathBuf>,
    /// Slot name the task list is saved under.
    pub storage_key: Option<String>,
}

impl Config {
    pub fn slot(&self) -> &str {
        self.storage_key.as_deref().unwrap_or(DEFAULT_SLOT)
    }

    /// Catch a `storage_key` the file store could never write, before any task is touched.
    pub fn validate(&self) -> Result<()> {
        validate_key(self.slot())
            .map_err(|err| color_eyre::eyre::eyre!("invalid storage_key in config: {err}"))
    }
}

/// Load config from the default path; if missing, return defaults.
pub fn load() -> Result<Config> {
    let path = default_path()?;
    load_from_path(path)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("ticklist").join("config.toml"))
}

/// Write `config` to the default path unless a file is already there.
pub fn write_default_if_missing(config: &Config) -> Result<PathBuf> {
    write_if_missing(config, &default_path()?)
}

/// Never clobbers an existing file, so user edits survive repeated `config init`.
pub fn write_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}
