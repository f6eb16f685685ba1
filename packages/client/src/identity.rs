//! Identity persistence.
//!
//! The chosen avatar is remembered across restarts through a small
//! key/value store; the nickname is deliberately not persisted and entered
//! fresh per session.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Storage key for the persisted avatar
pub const AVATAR_KEY: &str = "identity.avatar";

/// Minimal key/value store interface
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// JSON-file-backed key/value store.
///
/// The whole map is read and rewritten per operation; the store holds a
/// handful of identity keys, nothing more.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> HashMap<String, String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn store(&self, map: &HashMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(map)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, raw)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut map = self.load();
        map.insert(key.to_string(), value.to_string());
        self.store(&map)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut map = self.load();
        map.remove(key);
        self.store(&map)
    }
}

/// Load the remembered avatar, if any
pub fn load_avatar(store: &dyn KeyValueStore) -> Option<String> {
    store.get(AVATAR_KEY)
}

/// Remember the chosen avatar for future sessions. Persistence is
/// best-effort; a failure is logged, not surfaced.
pub fn remember_avatar(store: &dyn KeyValueStore, avatar: &str) {
    if let Err(e) = store.set(AVATAR_KEY, avatar) {
        tracing::warn!("Failed to persist avatar: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> FileStore {
        let mut path = std::env::temp_dir();
        path.push(format!("tomodoro-test-{}-{}.json", name, std::process::id()));
        let _ = fs::remove_file(&path);
        FileStore::new(path)
    }

    #[test]
    fn test_get_on_missing_file_returns_none() {
        // given:
        let store = temp_store("missing");

        // when:
        let value = store.get("identity.avatar");

        // then:
        assert_eq!(value, None);
    }

    #[test]
    fn test_set_then_get_round_trips() {
        // given:
        let store = temp_store("roundtrip");

        // when:
        store.set("identity.avatar", "fox").unwrap();

        // then:
        assert_eq!(store.get("identity.avatar"), Some("fox".to_string()));
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        // given:
        let store = temp_store("overwrite");
        store.set("identity.avatar", "cat").unwrap();

        // when:
        store.set("identity.avatar", "owl").unwrap();

        // then:
        assert_eq!(store.get("identity.avatar"), Some("owl".to_string()));
    }

    #[test]
    fn test_remove_deletes_the_key() {
        // given:
        let store = temp_store("remove");
        store.set("identity.avatar", "cat").unwrap();

        // when:
        store.remove("identity.avatar").unwrap();

        // then:
        assert_eq!(store.get("identity.avatar"), None);
    }

    #[test]
    fn test_keys_are_independent() {
        // given:
        let store = temp_store("independent");

        // when:
        store.set("identity.avatar", "cat").unwrap();
        store.set("other.key", "value").unwrap();
        store.remove("other.key").unwrap();

        // then:
        assert_eq!(store.get("identity.avatar"), Some("cat".to_string()));
    }

    #[test]
    fn test_avatar_helpers_use_the_stable_key() {
        // given:
        let store = temp_store("helpers");

        // when:
        remember_avatar(&store, "panda");

        // then:
        assert_eq!(load_avatar(&store), Some("panda".to_string()));
        assert_eq!(store.get(AVATAR_KEY), Some("panda".to_string()));
    }
}
