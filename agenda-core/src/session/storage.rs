//! Persistent key/value storage backing the session.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::error::{AgendaError, AgendaResult};

/// A string key/value store. Reads always go to the backing medium, so
/// changes made by another process are visible on the next read.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> AgendaResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> AgendaResult<()>;

    fn remove(&self, key: &str) -> AgendaResult<()>;

    /// Apply several writes; `None` removes the key. Implementations that
    /// can should do it in one write.
    fn set_all(&self, entries: &[(&str, Option<&str>)]) -> AgendaResult<()> {
        for (key, value) in entries {
            match value {
                Some(value) => self.set(key, value)?,
                None => self.remove(key)?,
            }
        }
        Ok(())
    }

    /// Remove several keys. Implementations that can should do it in one write.
    fn remove_all(&self, keys: &[&str]) -> AgendaResult<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// Session storage in a TOML file of string values (token, user JSON).
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> AgendaResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            AgendaError::Storage(format!(
                "Failed to read session from {}: {}",
                self.path.display(),
                e
            ))
        })?;

        toml::from_str(&contents).map_err(|e| {
            AgendaError::Storage(format!(
                "Failed to parse session from {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Current entries for a rewrite. An unreadable file is replaced
    /// rather than blocking every later write.
    fn read_for_update(&self) -> BTreeMap<String, String> {
        self.read().unwrap_or_else(|e| {
            warn!("Replacing unreadable session file: {}", e);
            BTreeMap::new()
        })
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> AgendaResult<()> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).map_err(|e| {
                    AgendaError::Storage(format!(
                        "Failed to remove {}: {}",
                        self.path.display(),
                        e
                    ))
                })?;
            }
            return Ok(());
        }

        let contents = toml::to_string_pretty(entries)
            .map_err(|e| AgendaError::Storage(format!("Failed to serialize session: {e}")))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        std::fs::write(&self.path, contents).map_err(|e| {
            AgendaError::Storage(format!(
                "Failed to write session to {}: {}",
                self.path.display(),
                e
            ))
        })?;

        // Owner-only (0600): the file holds a bearer token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| {
                    AgendaError::Storage(format!(
                        "Failed to set permissions on {}: {}",
                        self.path.display(),
                        e
                    ))
                })?;
        }

        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> AgendaResult<Option<String>> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> AgendaResult<()> {
        self.set_all(&[(key, Some(value))])
    }

    fn remove(&self, key: &str) -> AgendaResult<()> {
        self.remove_all(&[key])
    }

    fn set_all(&self, updates: &[(&str, Option<&str>)]) -> AgendaResult<()> {
        let mut entries = self.read_for_update();
        for (key, value) in updates {
            match value {
                Some(value) => entries.insert(key.to_string(), value.to_string()),
                None => entries.remove(*key),
            };
        }
        self.write(&entries)
    }

    fn remove_all(&self, keys: &[&str]) -> AgendaResult<()> {
        let mut entries = self.read_for_update();
        for key in keys {
            entries.remove(*key);
        }
        self.write(&entries)
    }
}

/// In-memory storage. Clones share the same map, so a clone handed to a
/// second store behaves like another tab over the same browser storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> AgendaResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AgendaResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AgendaResult<()> {
        self.entries().remove(key);
        Ok(())
    }

    fn set_all(&self, updates: &[(&str, Option<&str>)]) -> AgendaResult<()> {
        let mut entries = self.entries();
        for (key, value) in updates {
            match value {
                Some(value) => entries.insert(key.to_string(), value.to_string()),
                None => entries.remove(*key),
            };
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> AgendaResult<()> {
        let mut entries = self.entries();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.toml"));

        assert_eq!(storage.get("token").unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.toml");

        FileStorage::new(&path).set("token", "abc").unwrap();
        FileStorage::new(&path)
            .set("user", r#"{"id":1,"roles":["empleado"]}"#)
            .unwrap();

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(
            storage.get("user").unwrap().as_deref(),
            Some(r#"{"id":1,"roles":["empleado"]}"#)
        );
    }

    #[test]
    fn test_file_storage_remove_all_deletes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        let storage = FileStorage::new(&path);

        storage.set("token", "abc").unwrap();
        storage.set("user", "{}").unwrap();
        storage.remove_all(&["token", "user"]).unwrap();

        assert!(!path.exists());
        assert_eq!(storage.get("token").unwrap(), None);
    }

    #[test]
    fn test_file_storage_replaces_corrupt_file_on_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let storage = FileStorage::new(&path);

        assert!(storage.get("token").is_err());
        storage.remove_all(&["token", "user"]).unwrap();
        assert_eq!(storage.get("token").unwrap(), None);
    }

    #[test]
    fn test_file_storage_set_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let storage = FileStorage::new(&path);

        storage.set("token", "abc").unwrap();

        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(storage.get("user").unwrap(), None);
    }

    #[test]
    fn test_file_storage_set_all_writes_and_removes_together() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.toml"));
        storage.set("user", "{}").unwrap();

        storage
            .set_all(&[("token", Some("abc")), ("user", None)])
            .unwrap();

        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(storage.get("user").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        FileStorage::new(&path).set("token", "abc").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let a = MemoryStorage::new();
        let b = a.clone();

        a.set("token", "abc").unwrap();
        assert_eq!(b.get("token").unwrap().as_deref(), Some("abc"));

        b.remove("token").unwrap();
        assert_eq!(a.get("token").unwrap(), None);
    }
}
