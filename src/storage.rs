use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key-value persistence abstraction.
///
/// The application persists two small JSON documents (API keys and the
/// output-section flags). Behind this trait they can live in the user's
/// config directory in production or in memory in tests. Failures are
/// swallowed by the implementations: callers fall back to defaults and the
/// user is never bothered about storage problems.
pub trait KeyValueStore: Send + Sync {
    /// Return the stored value for `key`, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`. Best-effort; errors are logged, not raised.
    fn set(&self, key: &str, value: &str);

    /// Remove any value stored under `key`.
    fn remove(&self, key: &str);
}

/// File-backed store: one file per key under the per-user config directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `~/.config/fin-snap` (platform equivalent).
    ///
    /// Returns `None` when no config directory can be resolved; callers
    /// should degrade to an in-memory store in that case.
    pub fn open_default() -> Option<Self> {
        let dir = dirs::config_dir()?.join("fin-snap");
        Some(Self { dir })
    }

    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory holding the store's files (also used for the debug log).
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Storage keys contain ':' which is not portable in file names.
        let file_name: String = key
            .chars()
            .map(|c| if c == ':' { '.' } else { c })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "failed to read stored value");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::debug!(error = %e, "failed to create storage directory");
            return;
        }
        let path = self.path_for(key);
        if let Err(e) = fs::write(&path, value) {
            tracing::debug!(key = %key, error = %e, "failed to write stored value");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "failed to remove stored value");
            }
        }
    }
}

/// In-memory store for tests and environments without a config directory.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.values.lock() {
            map.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.values.lock() {
            map.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let store = FileStore::new(tmp.path().join("fin-snap"));

        assert_eq!(store.get("fin-snap:api-keys"), None);
        store.set("fin-snap:api-keys", r#"{"activeProvider":"gemini"}"#);
        assert_eq!(
            store.get("fin-snap:api-keys").as_deref(),
            Some(r#"{"activeProvider":"gemini"}"#)
        );
        store.remove("fin-snap:api-keys");
        assert_eq!(store.get("fin-snap:api-keys"), None);
    }

    #[test]
    fn file_store_key_names_avoid_colons() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let store = FileStore::new(tmp.path().to_path_buf());
        store.set("fin-snap:output-config", "{}");
        assert!(tmp.path().join("fin-snap.output-config.json").exists());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k");
        assert_eq!(store.get("k"), None);
    }
}
