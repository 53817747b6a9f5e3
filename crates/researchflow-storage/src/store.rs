//! Key-value store port with file-backed and in-memory implementations

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value for `{key}` is not valid JSON: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String-keyed store of string values.
///
/// Every method is a complete operation: `update` holds the store for the
/// whole read-modify-write so no other writer on the same instance can
/// interleave between the read and the write.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Atomically replace the value for `key`. Returning `None` removes it.
    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Option<String>,
    ) -> Result<(), StoreError>;
}

/// Load and decode a JSON value stored under `key`
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`
pub fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// All keys in one JSON object file, rewritten atomically on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match crate::io::read_json(&self.path) {
            Ok(map) => Ok(map.unwrap_or_default()),
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
                ) =>
            {
                tracing::warn!(path = %self.path.display(), "store file is corrupt, starting empty");
                Ok(BTreeMap::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        crate::io::write_json(&self.path, map)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = lock(&self.guard);
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(key, &mut |_| Some(value.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(key, &mut |_| None)
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Option<String>,
    ) -> Result<(), StoreError> {
        let _guard = lock(&self.guard);
        let mut map = self.read_map()?;
        let previous = map.remove(key);
        let had_value = previous.is_some();
        match f(previous) {
            Some(next) => {
                map.insert(key.to_string(), next);
            }
            None if !had_value => return Ok(()),
            None => {}
        }
        self.write_map(&map)
    }
}

/// In-memory store used by tests and embedders without a filesystem
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Option<String>,
    ) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries);
        let previous = entries.remove(key);
        if let Some(next) = f(previous) {
            entries.insert(key.to_string(), next);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store
            .update("a", &mut |prev| {
                let n: u32 = prev.unwrap().parse().unwrap();
                Some((n + 41).to_string())
            })
            .unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("42"));

        store.update("b", &mut |_| None).unwrap();
        assert_eq!(store.get("b").unwrap(), None);

        store.remove("a").unwrap();
        store.remove("missing").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_memory_store_contract() {
        let store = MemoryStore::new();
        exercise(&store);
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_contract() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("store.json"));
        exercise(&store);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("store.json");

        FileStore::new(&path).set("k", "v").unwrap();
        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_recovers_from_corrupt_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        std::fs::write(&path, "[[[").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        save_json(&store, "list", &vec![1, 2, 3]).unwrap();
        let list: Option<Vec<u32>> = load_json(&store, "list").unwrap();
        assert_eq!(list, Some(vec![1, 2, 3]));

        store.set("bad", "not json").unwrap();
        let bad: Result<Option<Vec<u32>>, _> = load_json(&store, "bad");
        assert!(matches!(bad, Err(StoreError::Malformed { .. })));
    }
}
