// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Local persistent storage with named slots.
//!
//! Each slot is one file under the application data directory. The store
//! enforces a byte quota per write so a growing capture history can't
//! fill the disk; callers handle `QuotaExceeded` by storing less.

use crate::error::StorageError;
use crate::models::capture_history::{CaptureHistory, CaptureHistoryItem};
use std::path::PathBuf;

/// Slot holding the capture history list.
pub const HISTORY_SLOT: &str = "capture-history";
/// Items kept when the full history does not fit.
pub const FALLBACK_ITEMS: usize = 5;
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Directory-backed store, one `<key>.json` file per slot.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota: usize,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, quota: usize) -> Self {
        Self {
            dir: dir.into(),
            quota,
        }
    }

    /// Store under `$DATA_DIR/snapframe`, if the platform has one.
    pub fn open_default(quota: usize) -> Option<Self> {
        let dir = dirs::data_dir()?.join("snapframe");
        Some(Self::new(dir, quota))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if value.len() > self.quota {
            return Err(StorageError::QuotaExceeded {
                needed: value.len(),
                quota: self.quota,
            });
        }
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write beside the target and rename so a crash never leaves half a file.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

fn write_items<S: KeyValueStore + ?Sized>(
    store: &mut S,
    items: &[CaptureHistoryItem],
) -> Result<(), StorageError> {
    let json = serde_json::to_string(items)?;
    store.set(HISTORY_SLOT, &json)
}

/// Persist `history`. When the full list can't be written, only the
/// newest few items are stored; if even that fails the error is logged
/// and dropped. Returns whether anything was written.
pub fn save_capture_history<S: KeyValueStore + ?Sized>(store: &mut S, history: &CaptureHistory) -> bool {
    let err = match write_items(store, history.items()) {
        Ok(()) => {
            log::debug!("Saved {} capture history item(s)", history.len());
            return true;
        }
        Err(e) => e,
    };
    log::warn!(
        "Failed to save capture history ({}), retrying with {} items",
        err,
        FALLBACK_ITEMS
    );
    match write_items(store, history.newest(FALLBACK_ITEMS)) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Giving up on saving capture history: {}", e);
            false
        }
    }
}

/// Forget the stored history entirely.
pub fn clear_capture_history<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StorageError> {
    store.remove(HISTORY_SLOT)?;
    log::debug!("Removed stored capture history");
    Ok(())
}

/// Load the stored history. Missing or unreadable data yields an empty list.
pub fn load_capture_history<S: KeyValueStore + ?Sized>(store: &S) -> CaptureHistory {
    let json = match store.get(HISTORY_SLOT) {
        Ok(Some(json)) => json,
        Ok(None) => return CaptureHistory::new(),
        Err(e) => {
            log::warn!("Failed to read capture history: {}", e);
            return CaptureHistory::new();
        }
    };
    match serde_json::from_str::<Vec<CaptureHistoryItem>>(&json) {
        Ok(items) => CaptureHistory::from_items(items),
        Err(e) => {
            log::warn!("Stored capture history is corrupt, starting empty: {}", e);
            CaptureHistory::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(n: usize, payload: usize) -> CaptureHistoryItem {
        CaptureHistoryItem {
            id: format!("item-{n}"),
            thumbnail: "x".repeat(payload),
            timestamp: Utc::now(),
        }
    }

    fn history(count: usize, payload: usize) -> CaptureHistory {
        let mut history = CaptureHistory::new();
        for n in 0..count {
            history.push(item(n, payload));
        }
        history
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path(), DEFAULT_QUOTA_BYTES);
        let saved = history(3, 10);
        assert!(save_capture_history(&mut store, &saved));
        assert_eq!(load_capture_history(&store), saved);
    }

    #[test]
    fn test_quota_falls_back_to_newest_five() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path(), 8_000);
        let full = history(20, 1_000);
        assert!(save_capture_history(&mut store, &full));

        let loaded = load_capture_history(&store);
        assert_eq!(loaded.len(), FALLBACK_ITEMS);
        assert_eq!(loaded.items(), full.newest(FALLBACK_ITEMS));
    }

    #[test]
    fn test_gives_up_silently() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path(), 100);
        assert!(!save_capture_history(&mut store, &history(20, 1_000)));
        assert!(load_capture_history(&store).is_empty());
    }

    #[test]
    fn test_corrupt_slot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path(), DEFAULT_QUOTA_BYTES);
        store.set(HISTORY_SLOT, "[{\"id\": 3").unwrap();
        assert!(load_capture_history(&store).is_empty());
    }

    #[test]
    fn test_clear_removes_slot() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path(), DEFAULT_QUOTA_BYTES);
        assert!(save_capture_history(&mut store, &history(2, 10)));
        clear_capture_history(&mut store).unwrap();
        assert_eq!(store.get(HISTORY_SLOT).unwrap(), None);
        // Clearing twice is fine.
        clear_capture_history(&mut store).unwrap();
    }

    #[test]
    fn test_missing_slot_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("fresh"), DEFAULT_QUOTA_BYTES);
        assert_eq!(store.get("nothing").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
