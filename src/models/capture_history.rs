// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recently exported screenshots.
//!
//! Owned by the application shell. The list is append/evict only: new
//! items go to the front and the oldest drop off the back once the list
//! is full.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of items kept.
pub const MAX_ITEMS: usize = 20;

/// One exported screenshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureHistoryItem {
    pub id: String,
    /// PNG data URL of a scaled-down copy.
    pub thumbnail: String,
    pub timestamp: DateTime<Utc>,
}

impl CaptureHistoryItem {
    pub fn new(thumbnail: String) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!("capture-{}", timestamp.timestamp_micros()),
            thumbnail,
            timestamp,
        }
    }
}

/// Bounded list of capture history items, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptureHistory {
    items: Vec<CaptureHistoryItem>,
}

impl CaptureHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored items, keeping at most `MAX_ITEMS` of the newest.
    pub fn from_items(mut items: Vec<CaptureHistoryItem>) -> Self {
        items.truncate(MAX_ITEMS);
        Self { items }
    }

    /// Add `item` as the newest entry, evicting the oldest beyond the cap.
    pub fn push(&mut self, item: CaptureHistoryItem) {
        self.items.insert(0, item);
        if self.items.len() > MAX_ITEMS {
            let evicted = self.items.split_off(MAX_ITEMS);
            log::debug!("Evicted {} capture history item(s)", evicted.len());
        }
    }

    pub fn items(&self) -> &[CaptureHistoryItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CaptureHistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The `n` newest items.
    pub fn newest(&self, n: usize) -> &[CaptureHistoryItem] {
        &self.items[..n.min(self.items.len())]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: usize) -> CaptureHistoryItem {
        CaptureHistoryItem {
            id: format!("item-{n}"),
            thumbnail: String::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_newest_first() {
        let mut history = CaptureHistory::new();
        history.push(item(1));
        history.push(item(2));
        assert_eq!(history.items()[0].id, "item-2");
        assert_eq!(history.newest(1)[0].id, "item-2");
        assert_eq!(history.newest(10).len(), 2);
    }

    #[test]
    fn test_oldest_evicted_at_capacity() {
        let mut history = CaptureHistory::new();
        for n in 0..=MAX_ITEMS {
            history.push(item(n));
        }
        assert_eq!(history.len(), MAX_ITEMS);
        assert!(history.get("item-0").is_none());
        assert!(history.get("item-1").is_some());
        assert_eq!(history.items()[0].id, format!("item-{MAX_ITEMS}"));
    }

    #[test]
    fn test_from_items_is_capped() {
        let items = (0..30).map(item).collect();
        let history = CaptureHistory::from_items(items);
        assert_eq!(history.len(), MAX_ITEMS);
        assert_eq!(history.items()[0].id, "item-0");
    }
}
