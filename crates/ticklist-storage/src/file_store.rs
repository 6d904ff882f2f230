use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use tempfile::NamedTempFile;
use ticklist_core::storage::{KeyValueStore, StorageError};
use tracing::instrument;

/// Longest file name most filesystems accept, in bytes.
pub const MAX_FILE_NAME_LEN: usize = 255;

/// File-backed store: one file per key under `root`, replaced atomically on write.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(sanitize_key(key))
    }
}

impl KeyValueStore for FileStore {
    #[instrument(skip(self, value), fields(len = value.len()))]
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        fs::create_dir_all(&self.root).map_err(storage_err)?;
        write_atomic(&self.path_for(key), value)
    }

    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_key(key)?;
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::NotFound {
                key: key.to_string(),
            }),
            Err(err) => Err(storage_err(err)),
        }
    }

    #[instrument(skip(self))]
    fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_err(err)),
        }
    }
}

/// Reject keys that cannot become a file name: empty, or too long once encoded.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::Storage {
            reason: "storage key is empty".to_string(),
        });
    }
    let encoded = sanitize_key(key).len();
    if encoded > MAX_FILE_NAME_LEN {
        return Err(StorageError::Storage {
            reason: format!(
                "storage key is too long: {} bytes encode to a {encoded}-byte file name (max {MAX_FILE_NAME_LEN})",
                key.len()
            ),
        });
    }
    Ok(())
}

fn write_atomic(path: &Path, value: &[u8]) -> Result<(), StorageError> {
    let parent = path.parent().ok_or_else(|| StorageError::Storage {
        reason: "invalid storage path".to_string(),
    })?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(storage_err)?;
    tmp.write_all(value).map_err(storage_err)?;
    tmp.flush().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}

// Keys are arbitrary strings; encode them so they are always a single safe file name.
fn sanitize_key(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key)
}

fn storage_err<E: ToString>(err: E) -> StorageError {
    StorageError::Storage {
        reason: err.to_string(),
    }
}
