//! Undo history for token placements.
//!
//! One global stack for the whole chart, ordered by when a placement was
//! requested. Entries point at tokens and cells; they never own them.

use crate::cell::TokenId;
use crate::cell_id::CellRef;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub token: TokenId,
    pub cell: CellRef,
}

#[derive(Debug, Default)]
pub struct StarHistory {
    undo_stack: Vec<HistoryEntry>,
}

impl StarHistory {
    pub fn new() -> Self {
        Self { undo_stack: Vec::new() }
    }

    /// Record a placement.
    ///
    /// Token ids are handed out in increasing order and never reused, so a
    /// new entry always carries a larger id than the top of the stack.
    pub fn push(&mut self, token: TokenId, cell: CellRef) {
        debug_assert!(
            self.undo_stack.last().map_or(true, |top| top.token < token),
            "history push out of order: {} after {:?}",
            token,
            self.undo_stack.last().map(|e| e.token)
        );
        self.undo_stack.push(HistoryEntry { token, cell });
    }

    /// Pop the most recent entry.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.undo_stack.pop()
    }

    /// Remove every entry matching `predicate`, wherever it sits in the stack.
    pub fn purge<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&HistoryEntry) -> bool,
    {
        let before = self.undo_stack.len();
        self.undo_stack.retain(|e| !predicate(e));
        before - self.undo_stack.len()
    }

    /// Row `removed` is gone: entries below it move up one row.
    pub fn shift_rows_after(&mut self, removed: usize) {
        for entry in self.undo_stack.iter_mut() {
            if entry.cell.row > removed {
                entry.cell.row -= 1;
            }
        }
    }

    /// Column `removed` is gone: entries right of it move left one column.
    pub fn shift_cols_after(&mut self, removed: usize) {
        for entry in self.undo_stack.iter_mut() {
            if entry.cell.col > removed {
                entry.cell.col -= 1;
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    /// Oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.undo_stack
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
    }
}
