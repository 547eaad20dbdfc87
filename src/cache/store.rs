//! Single-file cache store
//!
//! Provides a `CacheStore` that keeps a `String -> JSON` mapping in memory and
//! persists the whole mapping to one file on every mutation.

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::{debug, warn};

/// File name used inside the XDG cache directory
const CACHE_FILE_NAME: &str = "image_cache.json";

/// Process-wide cache mirrored to a single JSON file
///
/// The store is the only owner of persisted cache state. It is meant to be
/// shared behind an `Arc`; reads and writes take an internal lock.
#[derive(Debug)]
pub struct CacheStore {
    /// File the mapping is mirrored to
    path: PathBuf,
    /// In-memory mapping, authoritative for the life of the process
    entries: RwLock<Map<String, Value>>,
    /// Bumped on every mutation, under the `entries` write lock
    version: AtomicU64,
    /// Newest version handed to the file, held for the duration of a write
    persisted: Mutex<u64>,
}

impl CacheStore {
    /// Returns the default cache file location
    ///
    /// Uses `~/.cache/portfolio/image_cache.json` on Linux, or the equivalent
    /// XDG path on other platforms. Returns `None` if no home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "portfolio")?;
        Some(project_dirs.cache_dir().join(CACHE_FILE_NAME))
    }

    /// Loads the store from `path`
    ///
    /// A missing, unreadable or malformed file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_mapping(&path) {
            Ok(entries) => {
                debug!(path = %path.display(), keys = entries.len(), "Loaded cache file");
                entries
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Ignoring unreadable cache file");
                }
                Map::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
            version: AtomicU64::new(0),
            persisted: Mutex::new(0),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the raw value stored under `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Returns the value under `key` decoded as `T`
    ///
    /// A value of the wrong shape is treated the same as a missing one.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        serde_json::from_value(value)
            .map_err(|e| debug!(key, error = %e, "Cached value has unexpected shape"))
            .ok()
    }

    /// Stores a raw value and persists the whole mapping
    ///
    /// The mapping is encoded under the write lock and written to disk after
    /// the lock is released. A snapshot older than one already written is
    /// skipped, so the file never goes back in time.
    pub fn set(&self, key: &str, value: Value) {
        let (version, encoded) = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            entries.insert(key.to_string(), value);
            let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
            (version, serde_json::to_string(&*entries))
        };

        let json = match encoded {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache mapping");
                return;
            }
        };

        let mut persisted = self.persisted.lock().unwrap_or_else(PoisonError::into_inner);
        if *persisted >= version {
            return;
        }
        *persisted = version;

        if let Err(e) = write_file(&self.path, &json) {
            warn!(path = %self.path.display(), error = %e, "Failed to persist cache");
        }
    }

    /// Encodes `value` as JSON and stores it under `key`
    pub fn set_as<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.set(key, value),
            Err(e) => warn!(key, error = %e, "Failed to encode cache value"),
        }
    }

    /// Number of keys currently held
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the full in-memory mapping
    pub fn snapshot(&self) -> Map<String, Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn read_mapping(path: &Path) -> io::Result<Map<String, Value>> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn write_file(path: &Path, json: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_store() -> (CacheStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CacheStore::load(temp_dir.path().join("cache.json"));
        (store, temp_dir)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.is_empty());
        assert!(store.get("anything").is_none());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("cache.json");
        fs::write(&path, "{ not json").expect("Should write file");

        let store = CacheStore::load(&path);

        assert!(store.is_empty(), "Malformed file should load as empty");
    }

    #[test]
    fn test_load_non_object_file_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("cache.json");
        fs::write(&path, "[1, 2, 3]").expect("Should write file");

        let store = CacheStore::load(&path);

        assert!(store.is_empty());
    }

    #[test]
    fn test_set_writes_file_immediately() {
        let (store, temp_dir) = create_test_store();

        store.set("greeting", json!("hello"));

        let content =
            fs::read_to_string(temp_dir.path().join("cache.json")).expect("Should read file");
        assert!(content.contains("\"greeting\""));
        assert!(content.contains("\"hello\""));
    }

    #[test]
    fn test_set_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("cache").join("store.json");
        let store = CacheStore::load(&path);

        store.set("key", json!(1));

        assert!(path.exists(), "Nested cache file should be created");
    }

    #[test]
    fn test_reload_round_trip() {
        let (store, _temp_dir) = create_test_store();
        let data = TestData {
            name: "roundtrip".to_string(),
            value: 12345,
        };

        store.set_as("typed", &data);
        store.set("raw", json!({"images": ["a", "b"], "n": 2}));

        let reloaded = CacheStore::load(store.path());

        assert_eq!(reloaded.snapshot(), store.snapshot());
        assert_eq!(reloaded.get_as::<TestData>("typed"), Some(data));
    }

    #[test]
    fn test_concurrent_sets_leave_latest_mapping_on_disk() {
        let (store, _temp_dir) = create_test_store();

        std::thread::scope(|scope| {
            for thread in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..25 {
                        store.set(&format!("key-{thread}-{i}"), json!(i));
                    }
                });
            }
        });

        let reloaded = CacheStore::load(store.path());

        assert_eq!(store.len(), 200);
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[test]
    fn test_overwrite_existing_key() {
        let (store, _temp_dir) = create_test_store();

        store.set("key", json!("first"));
        store.set("key", json!("second"));

        assert_eq!(store.get("key"), Some(json!("second")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_as_wrong_shape_is_none() {
        let (store, _temp_dir) = create_test_store();

        store.set("key", json!("not a struct"));

        assert!(store.get_as::<TestData>("key").is_none());
    }

    #[test]
    fn test_failed_persist_keeps_memory_value() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // A regular file where the parent directory should be makes every write fail
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").expect("Should write blocker");
        let store = CacheStore::load(blocker.join("cache.json"));

        store.set("key", json!(42));

        assert_eq!(store.get("key"), Some(json!(42)));
        assert!(!blocker.join("cache.json").exists());
    }

    #[test]
    fn test_default_path_is_xdg_compliant() {
        if let Some(path) = CacheStore::default_path() {
            let path_str = path.to_string_lossy();
            assert!(path_str.contains("portfolio"));
            assert!(path_str.ends_with(CACHE_FILE_NAME));
        }
        // Passes if no home directory is available (e.g. in CI)
    }
}
