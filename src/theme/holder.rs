use crate::models::theme::ThemeMode;
use crate::storage::local_store::SharedStore;
use log::{debug, error, info, warn};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast::{self, Receiver, Sender};

// Durable storage key holding the current theme string
pub const THEME_KEY: &str = "theme";

/// Process-wide current theme.
///
/// Initialised from the durable store on construction (falling back to light)
/// and mirrored to the store on every write. Any number of consumers may read,
/// write or subscribe; writes are last-writer-wins.
pub struct ThemeHolder {
    mode: RwLock<ThemeMode>,
    store: SharedStore,
    changes: Sender<ThemeMode>,
}

pub type SharedThemeHolder = Arc<ThemeHolder>;

impl ThemeHolder {
    pub fn new(store: SharedStore) -> Self {
        let mode = match store.get(THEME_KEY) {
            Some(saved) => match saved.parse::<ThemeMode>() {
                Ok(mode) => {
                    info!("Restored saved theme: {}", mode);
                    mode
                }
                Err(e) => {
                    warn!("Ignoring saved theme: {}", e);
                    ThemeMode::default()
                }
            },
            None => {
                debug!("No saved theme, using {}", ThemeMode::default());
                ThemeMode::default()
            }
        };

        let (changes, _) = broadcast::channel(16);
        let holder = Self {
            mode: RwLock::new(mode),
            store,
            changes,
        };
        // Store holds the effective mode from the start
        holder.persist(mode);
        holder
    }

    pub fn mode(&self) -> ThemeMode {
        *self.mode.read().unwrap_or_else(|p| p.into_inner())
    }

    /// Writes the new mode to the durable store, then to memory, then notifies
    /// subscribers. Returns the previous mode.
    pub fn set_theme(&self, new_mode: ThemeMode) -> ThemeMode {
        self.persist(new_mode);

        let previous = {
            let mut mode = self.mode.write().unwrap_or_else(|p| p.into_inner());
            std::mem::replace(&mut *mode, new_mode)
        };

        if previous != new_mode {
            info!("Theme: {} -> {}", previous, new_mode);
            let _ = self.changes.send(new_mode);
        }
        previous
    }

    pub fn subscribe(&self) -> Receiver<ThemeMode> {
        self.changes.subscribe()
    }

    fn persist(&self, mode: ThemeMode) {
        if let Err(e) = self.store.set(THEME_KEY, mode.as_str()) {
            error!("Error writing theme to storage: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::local_store::{KeyValueStore, MemoryStore};

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Option<String> {
            Some("dark".to_string())
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn defaults_to_light_without_saved_value() {
        let store = Arc::new(MemoryStore::new());
        let holder = ThemeHolder::new(store.clone());

        assert_eq!(holder.mode(), ThemeMode::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn restores_saved_value() {
        let holder = ThemeHolder::new(Arc::new(MemoryStore::with_entry(THEME_KEY, "dark")));
        assert_eq!(holder.mode(), ThemeMode::Dark);
    }

    #[test]
    fn unknown_saved_value_falls_back_to_light() {
        let store = Arc::new(MemoryStore::with_entry(THEME_KEY, "purple"));
        let holder = ThemeHolder::new(store.clone());

        assert_eq!(holder.mode(), ThemeMode::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn set_theme_writes_store_synchronously() {
        let store = Arc::new(MemoryStore::new());
        let holder = ThemeHolder::new(store.clone());

        let previous = holder.set_theme(ThemeMode::Dark);
        assert_eq!(previous, ThemeMode::Light);
        assert_eq!(holder.mode(), ThemeMode::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn subscribers_see_changes_only() {
        let holder = ThemeHolder::new(Arc::new(MemoryStore::new()));
        let mut rx = holder.subscribe();

        holder.set_theme(ThemeMode::Light);
        holder.set_theme(ThemeMode::Dark);

        assert_eq!(rx.try_recv().unwrap(), ThemeMode::Dark);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn storage_failure_still_updates_memory() {
        let holder = ThemeHolder::new(Arc::new(FailingStore));
        assert_eq!(holder.mode(), ThemeMode::Dark);

        holder.set_theme(ThemeMode::Light);
        assert_eq!(holder.mode(), ThemeMode::Light);
    }
}
