// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Linear undo/redo over full scene snapshots.
//!
//! Entries are immutable serialized copies of the scene taken after each
//! committed mutation. `current` always points at a valid entry once the
//! first one exists; entry 0 is the freshly loaded image.

use super::canvas::SceneCanvas;
use super::lock::OperationLock;
use crate::error::SceneError;

/// One saved state of the scene.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: u64,
    data: String,
}

/// Result of a commit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new entry with this id is now current.
    Committed(u64),
    /// Another history operation held the lock; nothing was recorded.
    Suppressed,
}

#[derive(Debug, Default)]
pub struct HistoryManager {
    entries: Vec<HistoryEntry>,
    current: usize,
    next_id: u64,
    lock: OperationLock,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `canvas`, drop any redo future and make the new entry
    /// current. Consumes the canvas's pending-change flag.
    pub fn commit<C: SceneCanvas + ?Sized>(
        &mut self,
        canvas: &mut C,
    ) -> Result<CommitOutcome, SceneError> {
        let Some(_guard) = self.lock.try_acquire() else {
            log::debug!("Commit suppressed, history operation in progress");
            return Ok(CommitOutcome::Suppressed);
        };

        let data = canvas.snapshot()?;
        let mut dropped = 0;
        if !self.entries.is_empty() {
            dropped = self.entries.len() - (self.current + 1);
            if dropped > 0 {
                log::debug!("Discarding {} redo entr(ies)", dropped);
            }
            self.entries.truncate(self.current + 1);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(HistoryEntry { id, data });
        self.current = self.entries.len() - 1;
        canvas.take_changed();

        // The discarded future may have been the last user of some pooled data.
        if dropped > 0 {
            let live: Vec<&str> = self.entries.iter().map(|e| e.data.as_str()).collect();
            canvas.prune(&live);
        }

        log::info!(
            "Committed history entry {} ({} of {})",
            id,
            self.current + 1,
            self.entries.len()
        );
        Ok(CommitOutcome::Committed(id))
    }

    /// Step back one entry. Returns false when there is nothing to undo or
    /// the entry could not be restored; the scene is unchanged then.
    pub fn undo<C: SceneCanvas + ?Sized>(&mut self, canvas: &mut C) -> bool {
        if !self.can_undo() {
            return false;
        }
        let moved = self.restore_to(canvas, self.current - 1);
        if moved {
            log::info!("Undo to entry {}", self.current);
        }
        moved
    }

    /// Step forward one entry. Same failure behavior as [`Self::undo`].
    pub fn redo<C: SceneCanvas + ?Sized>(&mut self, canvas: &mut C) -> bool {
        if !self.can_redo() {
            return false;
        }
        let moved = self.restore_to(canvas, self.current + 1);
        if moved {
            log::info!("Redo to entry {}", self.current);
        }
        moved
    }

    fn restore_to<C: SceneCanvas + ?Sized>(&mut self, canvas: &mut C, index: usize) -> bool {
        let Some(_guard) = self.lock.try_acquire() else {
            return false;
        };
        let Some(entry) = self.entries.get(index) else {
            return false;
        };
        match canvas.restore(&entry.data) {
            Ok(()) => {
                self.current = index;
                // A restore is not an edit.
                canvas.take_changed();
                true
            }
            Err(e) => {
                log::warn!("Failed to restore history entry {}: {}", entry.id, e);
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.current < self.entries.len() - 1
    }

    #[cfg(test)]
    pub(crate) fn current_index(&self) -> usize {
        self.current
    }

    #[cfg(test)]
    pub(crate) fn current_entry(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.current)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn replace_entry_data(&mut self, index: usize, data: &str) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.data = data.to_string();
        }
    }
}
