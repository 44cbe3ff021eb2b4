use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{error, info, warn};

use crate::snapshot::RateSnapshot;

/// Keyed-by-date access to cached rate snapshots. Entries are never removed.
pub trait RateStore: Send + Sync {
    /// Returns the snapshot for `date` if one exists with a non-empty rate table.
    fn get(&self, date: &str) -> Option<RateSnapshot>;

    /// Inserts or overwrites the snapshot for `date` and persists the store.
    fn put(&self, date: &str, snapshot: RateSnapshot);
}

/// File-backed store: the whole map lives in memory and is rewritten to disk
/// as a single JSON object on every `put`.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, RateSnapshot>>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Cache file {} is malformed, starting empty: {e}", path.display());
                    HashMap::new()
                }
            },
            Err(_) => {
                info!("No cache file at {}, starting empty", path.display());
                HashMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }
}

impl RateStore for FileStore {
    fn get(&self, date: &str) -> Option<RateSnapshot> {
        self.entries
            .lock()
            .unwrap()
            .get(date)
            .filter(|snapshot| !snapshot.rates.is_empty())
            .cloned()
    }

    fn put(&self, date: &str, snapshot: RateSnapshot) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(date.to_string(), snapshot);

        // On write failure the in-memory entry is kept and requests keep
        // being served from it; the next successful put rewrites the file.
        match serde_json::to_string(&*entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    error!("Failed to persist cache to {}: {e}", self.path.display());
                }
            }
            Err(e) => error!("Failed to serialize cache: {e}"),
        }
    }
}

/// In-memory store without persistence, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, RateSnapshot>>,
}

#[cfg(test)]
impl RateStore for MemoryStore {
    fn get(&self, date: &str) -> Option<RateSnapshot> {
        self.entries
            .lock()
            .unwrap()
            .get(date)
            .filter(|snapshot| !snapshot.rates.is_empty())
            .cloned()
    }

    fn put(&self, date: &str, snapshot: RateSnapshot) {
        self.entries
            .lock()
            .unwrap()
            .insert(date.to_string(), snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(rates: &[(&str, f64)]) -> RateSnapshot {
        RateSnapshot {
            timestamp: 1577923199,
            updated_at: 1577923200000,
            base: "EUR".to_string(),
            rates: rates
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        }
    }

    #[test]
    fn open_without_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data.json"));
        assert!(store.get("2020-01-02").is_none());
    }

    #[test]
    fn open_with_malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::open(&path);
        assert!(store.get("2020-01-02").is_none());
    }

    #[test]
    fn put_then_get_returns_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data.json"));

        store.put("2020-01-02", snapshot(&[("USD", 1.0), ("EUR", 0.9)]));

        let found = store.get("2020-01-02").unwrap();
        assert_eq!(found.rates["EUR"], 0.9);
    }

    #[test]
    fn get_ignores_snapshot_with_empty_rates() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data.json"));

        store.put("2020-01-02", snapshot(&[]));

        assert!(store.get("2020-01-02").is_none());
    }

    #[test]
    fn rates_survive_a_reload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let written = snapshot(&[("USD", 1.1234), ("GBP", 0.85)]);

        FileStore::open(&path).put("2020-01-02", written.clone());

        let reloaded = FileStore::open(&path).get("2020-01-02").unwrap();
        assert_eq!(reloaded, written);
    }

    #[test]
    fn put_overwrites_existing_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data.json"));

        store.put("2020-01-02", snapshot(&[("USD", 1.0)]));
        store.put("2020-01-02", snapshot(&[("USD", 2.0)]));

        assert_eq!(store.get("2020-01-02").unwrap().rates["USD"], 2.0);
    }
}
