use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

/// Consider synced data stale after 1 hour.
const CACHE_STALE_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// File-backed key-value store: one file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Read a raw string value. Missing or unreadable keys yield `None`.
    pub fn get_item(&self, key: &str) -> Option<String> {
        let path = self.key_path(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read stored value");
                None
            }
        }
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write stored value: {}", key))?;
        Ok(())
    }

    /// Remove a key. Removing a missing key is not an error.
    pub fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove stored value: {}", key)),
        }
    }

    /// Read a JSON value. Corrupt JSON is logged and treated as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let contents = self.get_item(key)?;
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = key, error = %e, "Discarding corrupt stored value");
                None
            }
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let contents = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize stored value: {}", key))?;
        self.set_item(key, &contents)
    }

    /// Read a value stored as `CachedData`, keeping its write time.
    pub fn load_cached<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        self.get_json(key)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn temp_storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("data")).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_rounding() {
        let mut cached = CachedData::new(());
        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");
        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(61);
        assert!(old.is_stale());
    }

    #[test]
    fn test_item_round_trip_and_remove() {
        let (_dir, storage) = temp_storage();
        assert_eq!(storage.get_item("inputCode"), None);

        storage.set_item("inputCode", "x = 1").unwrap();
        storage.set_item("inputCode", "x = 1").unwrap();
        assert_eq!(storage.get_item("inputCode").as_deref(), Some("x = 1"));

        storage.remove_item("inputCode").unwrap();
        storage.remove_item("inputCode").unwrap();
        assert_eq!(storage.get_item("inputCode"), None);
    }

    #[test]
    fn test_corrupt_json_is_absent() {
        let (_dir, storage) = temp_storage();
        storage.set_item("userInfo", "{not json").unwrap();
        let value: Option<serde_json::Value> = storage.get_json("userInfo");
        assert!(value.is_none());
    }

    #[test]
    fn test_cached_round_trip() {
        let (_dir, storage) = temp_storage();
        storage.set_json("codeReviewHistory", &CachedData::new(vec!["a", "b"])).unwrap();
        let cached: CachedData<Vec<String>> = storage.load_cached("codeReviewHistory").unwrap();
        assert_eq!(cached.data, vec!["a", "b"]);
        assert!(!cached.is_stale());
    }
}
