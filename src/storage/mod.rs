pub mod codec;

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    string::FromUtf8Error,
};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

/// Key under which the player state is cached.
pub const MUSIC_KEY: &str = "blog-music-player";

const STORE_FILE: &str = "storage.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid utf-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error("Invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A small persistent key/value store. Keys and values go through
/// [`codec`]; values are JSON. The whole map is rewritten on every change.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStore {
    /// Opens the store at `dir`. A missing or unreadable file starts empty.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(STORE_FILE);
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "storage_corrupt_file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_set<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        if key.is_empty() {
            return Ok(());
        }

        let value = serde_json::to_value(value)?;
        let stored = match &value {
            Value::Null => return Ok(()),
            Value::String(s) if s.is_empty() => return Ok(()),
            // zero is kept as a bare key without a value
            Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
            _ => codec::encode(&serde_json::to_string(&value)?),
        };

        self.entries.insert(codec::encode(key), stored);
        self.flush()
    }

    /// Like [`try_set`](Self::try_set) but logs failures instead of
    /// returning them.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        if let Err(e) = self.try_set(key, value) {
            error!(key, error = %e, "storage_set_failed");
        }
    }

    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        if key.is_empty() {
            return Ok(None);
        }
        match self.entries.get(&codec::encode(key)) {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => {
                let json = codec::decode(raw)?;
                Ok(Some(serde_json::from_str(&json)?))
            }
        }
    }

    /// Like [`try_get`](Self::try_get) but treats every failure as absence.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.try_get(key).unwrap_or_else(|e| {
            error!(key, error = %e, "storage_get_failed");
            None
        })
    }

    pub fn remove(&mut self, key: &str) {
        if self.entries.remove(&codec::encode(key)).is_some()
            && let Err(e) = self.flush()
        {
            error!(key, error = %e, "storage_remove_failed");
        }
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(&self.entries)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        a: i32,
    }

    #[test]
    fn round_trips_json_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path());
        store.set("key", &Sample { a: 1 });
        assert_eq!(store.get::<Sample>("key"), Some(Sample { a: 1 }));

        let reopened = LocalStore::open(dir.path());
        assert_eq!(reopened.get::<Sample>("key"), Some(Sample { a: 1 }));
    }

    #[test]
    fn unset_or_empty_keys_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path());
        assert_eq!(store.get::<Sample>("missing"), None);

        store.set("", &Sample { a: 2 });
        assert_eq!(store.get::<Sample>(""), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn null_and_empty_values_are_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path());
        store.set("k", &Option::<i32>::None);
        store.set("k", "");
        assert_eq!(store.try_get::<String>("k").unwrap(), None);
        assert!(store.entries.is_empty());
    }

    #[test]
    fn zero_keeps_key_without_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path());
        store.set("count", &0);
        assert_eq!(store.entries.get(&codec::encode("count")), Some(&String::new()));
        assert_eq!(store.get::<i32>("count"), None);
    }

    #[test]
    fn corrupt_values_degrade_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path());
        store
            .entries
            .insert(codec::encode("broken"), "not base64!".to_string());
        assert!(store.try_get::<Sample>("broken").is_err());
        assert_eq!(store.get::<Sample>("broken"), None);

        store.remove("broken");
        assert!(store.entries.is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE), "{ nope").unwrap();
        let store = LocalStore::open(dir.path());
        assert_eq!(store.get::<Sample>("key"), None);
    }
}
