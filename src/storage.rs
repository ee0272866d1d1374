//! String-keyed blob storage for the ancillary collections (members, notifications, targets).
//!
//! Every collection is a JSON array stored under one key and rewritten whole on each
//! mutation. There is no schema versioning and the last write wins.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Storage failures surfaced to the collection services.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("blob store io failure for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("blob '{key}' is not valid JSON for its collection: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("blob key '{0}' contains characters outside [A-Za-z0-9_-]")]
    InvalidKey(String),
    #[error("blob store lock poisoned")]
    Poisoned,
}

/// Minimal get/put/list surface so the persistence mechanism can be swapped freely.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn put(&self, key: &str, value: String) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Load a JSON array stored under `key`; a missing blob is an empty collection.
pub fn load_collection<T, S>(store: &S, key: &str) -> Result<Vec<T>, StorageError>
where
    T: DeserializeOwned,
    S: BlobStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        }),
        None => Ok(Vec::new()),
    }
}

pub fn save_collection<T, S>(store: &S, key: &str, items: &[T]) -> Result<(), StorageError>
where
    T: Serialize,
    S: BlobStore + ?Sized,
{
    let raw = serde_json::to_string(items).map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.put(key, raw)
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.blobs.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut guard = self.blobs.lock().map_err(|_| StorageError::Poisoned)?;
        guard.insert(key.to_string(), value);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let guard = self.blobs.lock().map_err(|_| StorageError::Poisoned)?;
        let mut keys: Vec<String> = guard.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// One `<key>.json` file per blob inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryBlobStore {
    root: PathBuf,
}

impl DirectoryBlobStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            key: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl BlobStore for DirectoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::write(&staging, value).map_err(io_err)?;
        fs::rename(&staging, &path).map_err(io_err)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = fs::read_dir(&self.root).map_err(|source| StorageError::Io {
            key: self.root.display().to_string(),
            source,
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                key: self.root.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
