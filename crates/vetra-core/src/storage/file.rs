//! Filesystem-backed storage: one file per key under a base directory.

use super::{Storage, StorageError, StorageResult};
use std::fs;
use std::path::PathBuf;

/// Key-value storage persisting each key as a JSON file.
#[derive(Debug)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at the given directory, creating it if needed.
    pub fn new(base_dir: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&base_dir).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(Self { base_dir })
    }

    /// Create a storage in the platform config directory (`<config>/vetra`).
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| StorageError::Other("No config directory available".to_string()))?
            .join("vetra");
        Self::new(base)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are dotted identifiers ("vetra.pages"); keep filenames tame.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        self.base_dir.join(format!("{safe}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        fs::write(self.path_for(key), value).map_err(|e| StorageError::Io(e.to_string()))
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let entries = fs::read_dir(&self.base_dir).map_err(|e| StorageError::Io(e.to_string()))?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::Io(e.to_string()))?;
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.set("vetra.theme", "\"dark\"").unwrap();
        assert_eq!(
            storage.get("vetra.theme").unwrap().as_deref(),
            Some("\"dark\"")
        );
    }

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert!(storage.get("vetra.pages").unwrap().is_none());
    }

    #[test]
    fn test_remove_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.remove("a").unwrap();

        let keys = storage.keys().unwrap();
        assert_eq!(keys, vec!["b".to_string()]);
    }

    #[test]
    fn test_key_sanitization() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.set("weird/key name", "x").unwrap();
        assert_eq!(storage.get("weird/key name").unwrap().as_deref(), Some("x"));
    }
}
