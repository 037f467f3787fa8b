use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::Result;

/// Persistence boundary: a string key-value store.
///
/// Every consumer treats a failed read as "no value" and a failed write as
/// non-fatal, so the worst case is falling back to defaults.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store: one file per key under the data directory.
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(FileKvStore { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-memory store, used by tests.
#[derive(Default)]
pub struct MemoryKvStore {
    values: HashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// Store keys, shared across the persistence consumers.
pub const MOOD_HISTORY_KEY: &str = "aura-mood-history";
pub const STREAK_KEY: &str = "aura-streak-data";
pub const QUOTE_KEY: &str = "aura-daily-quote";
pub const CHECKIN_KEY: &str = "aura-last-checkin-time";
pub const THEME_KEY: &str = "aura-theme";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryKvStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap(), Some("value".to_string()));

        store.set("key", "updated").unwrap();
        assert_eq!(store.get("key").unwrap(), Some("updated".to_string()));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileKvStore::new(dir.path().to_path_buf()).unwrap();

        assert_eq!(store.get(MOOD_HISTORY_KEY).unwrap(), None);

        store.set(MOOD_HISTORY_KEY, "[]").unwrap();
        assert_eq!(store.get(MOOD_HISTORY_KEY).unwrap(), Some("[]".to_string()));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileKvStore::new(dir.path().to_path_buf()).unwrap();
            store.set(STREAK_KEY, "{\"streak\":2}").unwrap();
        }
        let store = FileKvStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(
            store.get(STREAK_KEY).unwrap(),
            Some("{\"streak\":2}".to_string())
        );
    }
}
