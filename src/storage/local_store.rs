use crate::error::StorageError;
use crate::storage::manager::{paths, StorageManager};
use log::{debug, error, info};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Small string key-value persistence capability, the durable "local storage"
/// behind the theme holder.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

// All keys live in one JSON object on disk, read once and rewritten on every set
pub struct FileStore {
    storage_manager: StorageManager,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub fn new(storage_manager: StorageManager) -> Self {
        let entries = Self::load_entries(&storage_manager);
        Self {
            storage_manager,
            entries: Mutex::new(entries),
        }
    }

    fn load_entries(storage_manager: &StorageManager) -> BTreeMap<String, String> {
        if !storage_manager.file_exists(paths::LOCAL_STORE_FILE) {
            debug!("No local store file found");
            return BTreeMap::new();
        }

        match storage_manager.read_file(paths::LOCAL_STORE_FILE) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(entries) => {
                    info!("Loaded local store with {} keys", entries.len());
                    entries
                }
                Err(e) => {
                    error!("Error parsing local store file: {}", e);
                    BTreeMap::new()
                }
            },
            Err(e) => {
                error!("Error reading local store file: {}", e);
                BTreeMap::new()
            }
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.insert(key.to_string(), value.to_string());

        let json = serde_json::to_string_pretty(&*entries)?;
        self.storage_manager
            .write_file(paths::LOCAL_STORE_FILE, &json)?;
        debug!("Stored '{}' = '{}'", key, value);
        Ok(())
    }
}

// Non-durable store for tests and for running without a writable home directory
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn create_store(custom_dir: Option<String>) -> SharedStore {
    match StorageManager::new(custom_dir) {
        Ok(storage_manager) => Arc::new(FileStore::new(storage_manager)),
        Err(e) => {
            error!(
                "Failed to open storage directory, theme will not survive restarts: {}",
                e
            );
            Arc::new(MemoryStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_store(dir: &TempDir) -> FileStore {
        let manager = StorageManager::new(Some(dir.path().to_string_lossy().into_owned())).unwrap();
        FileStore::new(manager)
    }

    #[test]
    fn values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let store = file_store(&temp_dir);
        assert_eq!(store.get("theme"), None);
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("dark"));

        let reopened = file_store(&temp_dir);
        assert_eq!(reopened.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(paths::LOCAL_STORE_FILE), "not json").unwrap();

        let store = file_store(&temp_dir);
        assert_eq!(store.get("theme"), None);
        store.set("theme", "light").unwrap();
        assert_eq!(file_store(&temp_dir).get("theme").as_deref(), Some("light"));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::with_entry("theme", "dark");
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("light"));
    }
}
