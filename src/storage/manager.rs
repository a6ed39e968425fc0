use log::{debug, info};
use std::fs::{self, File};
use std::io::{Read, Result as IoResult, Write};
use std::path::PathBuf;

// Default storage location, relative to the user's home directory
pub const DEFAULT_DIR: &str = ".prefs_panel";

// Path constants for all stored files
pub mod paths {
    pub const LOCAL_STORE_FILE: &str = "local_storage.json";
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Create a new StorageManager rooted at `custom_dir`, or at
    /// `~/.prefs_panel` when none is given. The directory is created if needed.
    pub fn new(custom_dir: Option<String>) -> IoResult<Self> {
        let base_dir = if let Some(dir) = custom_dir {
            debug!("Using custom storage directory: {}", dir);
            PathBuf::from(dir)
        } else {
            let home_dir = dirs::home_dir().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "Could not find home directory")
            })?;
            let storage_dir = home_dir.join(DEFAULT_DIR);
            debug!("Using default storage directory: {:?}", storage_dir);
            storage_dir
        };

        let manager = Self { base_dir };
        manager.ensure_directory_exists()?;
        Ok(manager)
    }

    // Get the full path for a specific file
    pub fn get_file_path(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    // Ensure the base directory exists
    pub fn ensure_directory_exists(&self) -> IoResult<()> {
        if !self.base_dir.exists() {
            debug!("Creating storage directory: {:?}", self.base_dir);
            fs::create_dir_all(&self.base_dir)?;
            info!("Created storage directory: {:?}", self.base_dir);
        }
        Ok(())
    }

    // Read a file from storage
    pub fn read_file(&self, filename: &str) -> IoResult<String> {
        let file_path = self.get_file_path(filename);
        debug!("Reading file: {:?}", file_path);
        let mut file = File::open(file_path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(contents)
    }

    // Write a file to storage via a temp file renamed into place
    pub fn write_file(&self, filename: &str, contents: &str) -> IoResult<()> {
        self.ensure_directory_exists()?;

        let file_path = self.get_file_path(filename);
        let tmp_path = self.get_file_path(&format!("{}.tmp", filename));
        debug!("Writing to file: {:?}", file_path);
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &file_path)?;
        debug!("Successfully wrote {} bytes to {}", contents.len(), filename);
        Ok(())
    }

    // Check if a file exists
    pub fn file_exists(&self, filename: &str) -> bool {
        let exists = self.get_file_path(filename).exists();
        debug!("Checking if file '{}' exists: {}", filename, exists);
        exists
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        let manager = StorageManager::new(Some(nested.to_string_lossy().into_owned())).unwrap();
        assert!(nested.exists());
        assert_eq!(manager.get_file_path("x.json"), nested.join("x.json"));
    }

    #[test]
    fn write_then_read_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager =
            StorageManager::new(Some(temp_dir.path().to_string_lossy().into_owned())).unwrap();

        assert!(!manager.file_exists("data.json"));
        manager.write_file("data.json", "{\"a\":1}").unwrap();
        assert!(manager.file_exists("data.json"));
        assert!(!manager.file_exists("data.json.tmp"));
        assert_eq!(manager.read_file("data.json").unwrap(), "{\"a\":1}");
    }
}
