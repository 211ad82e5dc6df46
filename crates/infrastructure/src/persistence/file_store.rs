//! JSON-file key-value store.
//!
//! The whole store is one JSON object written with two-space indentation
//! and sorted keys. Every write replaces the file through a temporary file
//! and a rename, so a crash never leaves a truncated session behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use linkhub_application::ports::{KeyValueStore, StorageError};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

type Entries = BTreeMap<String, String>;

/// Persists values in a single JSON file.
///
/// The file is read once, on first access; later reads are served from
/// memory and every write is flushed to disk before returning.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Option<Entries>>,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the entries and flushes it.
    ///
    /// The cache only takes the new entries once they are on disk, so a
    /// failed write leaves memory and file agreeing on the old state.
    async fn update<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Entries) + Send,
    {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        let mut entries = guard.as_ref().cloned().unwrap_or_default();
        change(&mut entries);
        self.flush(&entries).await?;
        *guard = Some(entries);
        Ok(())
    }

    async fn load(&self) -> Result<Entries, StorageError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Entries::new());
        }
        match serde_json::from_slice(&bytes) {
            Ok(entries) => Ok(entries),
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    %error,
                    "session file is corrupt, starting empty"
                );
                Ok(Entries::new())
            }
        }
    }

    async fn flush(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let contents = to_pretty_json(entries)?;
        let staging = self.path.with_extension("json.tmp");
        let written = async {
            fs::write(&staging, contents).await?;
            restrict_permissions(&staging).await?;
            fs::rename(&staging, &self.path).await
        }
        .await;

        if let Err(error) = written {
            warn!(path = %self.path.display(), %error, "failed to write session file");
            let _ = fs::remove_file(&staging).await;
            return Err(StorageError::Io(error));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        Ok(guard.as_ref().and_then(|entries| entries.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
        .await
    }

    async fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        self.update(|entries| {
            for (key, value) in pairs {
                entries.insert((*key).to_string(), (*value).to_string());
            }
        })
        .await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.update(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
        .await
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    value
        .serialize(&mut serializer)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    buffer.push(b'\n');
    Ok(buffer)
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_values_survive_new_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = JsonFileStore::new(&path);
        store
            .set_many(&[("access_token", "A"), ("refresh_token", "R")])
            .await
            .unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("access_token").await.unwrap().as_deref(), Some("A"));
        assert_eq!(reopened.get("refresh_token").await.unwrap().as_deref(), Some("R"));
    }

    #[tokio::test]
    async fn test_file_is_stable_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = JsonFileStore::new(&path);

        store.set("b", "2").await.unwrap();
        store.set("a", "1").await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{\n  \"a\": \"1\",\n  \"b\": \"2\"\n}\n");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert_eq!(store.get("access_token").await.unwrap(), None);

        store.set("access_token", "A").await.unwrap();
        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("access_token").await.unwrap().as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_remove_many() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("session.json"));
        store.set_many(&[("a", "1"), ("b", "2"), ("c", "3")]).await.unwrap();

        store.remove_many(&["a", "b", "missing"]).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("c").await.unwrap().as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cache_and_file_in_step() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = JsonFileStore::new(&path);
        store.set("access_token", "A").await.unwrap();

        // a directory in the staging spot makes the next write fail
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        assert!(matches!(
            store.remove("access_token").await,
            Err(StorageError::Io(_))
        ));
        assert_eq!(store.get("access_token").await.unwrap().as_deref(), Some("A"));

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("access_token").await.unwrap().as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_failed_rename_removes_staging_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = JsonFileStore::new(&path);
        store.set("a", "1").await.unwrap();

        // a non-empty directory at the target makes the rename fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        assert!(store.set("b", "2").await.is_err());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.get("b").await.unwrap(), None);
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        JsonFileStore::new(&path).set("a", "1").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
