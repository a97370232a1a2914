//! # Undo/Redo Stack
//!
//! Tracks transaction history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Each applied transaction records its inverse operation list
//! - Undo applies the inverse and moves the entry to the redo stack
//! - Redo reapplies the original forward transaction
//! - New transactions clear the redo stack
//! - History depth is bounded: exceeding it silently evicts the oldest
//!   entry (lost undo depth, never an error)

use crate::transaction::Transaction;
use doctree_model::Selection;
use std::collections::VecDeque;

/// One undoable step: the forward transaction, its recorded inverse, and
/// the selections on either side of the apply.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The transaction as the caller built it.
    pub forward: Transaction,

    /// Inverse operations recorded during apply, ordered for replay.
    pub inverse: Transaction,

    /// Selection before the forward apply (restored by undo).
    pub before_selection: Option<Selection>,

    /// Selection after the forward apply (restored by redo).
    pub after_selection: Option<Selection>,
}

/// Bounded double-ended undo/redo history for one document session.
#[derive(Debug)]
pub struct UndoStack {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with the default depth (100).
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with a custom depth (0 = unlimited).
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record an applied transaction. Invalidates the redo future.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    /// Pop the most recent entry for undoing. The caller moves it to the
    /// redo side with [`UndoStack::push_redo`] once the inverse applied.
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.undo_stack.pop_back()
    }

    pub fn push_redo(&mut self, entry: HistoryEntry) {
        self.redo_stack.push(entry);
    }

    /// Pop the most recently undone entry for redoing.
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.redo_stack.pop()
    }

    /// Re-add an entry after a successful redo, without clearing the
    /// remaining redo future.
    pub fn push_undo(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> HistoryEntry {
        HistoryEntry {
            forward: Transaction::default(),
            inverse: Transaction::default(),
            before_selection: None,
            after_selection: None,
        }
    }

    #[test]
    fn test_empty_stack() {
        let stack = UndoStack::new();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_levels(), 0);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut stack = UndoStack::new();
        stack.record(entry());
        let undone = stack.pop_undo().unwrap();
        stack.push_redo(undone);
        assert_eq!(stack.redo_levels(), 1);

        stack.record(entry());
        assert_eq!(stack.redo_levels(), 0);
        assert_eq!(stack.undo_levels(), 1);
    }

    #[test]
    fn test_max_levels_evicts_oldest() {
        let mut stack = UndoStack::with_max_levels(2);
        for _ in 0..3 {
            stack.record(entry());
        }
        assert_eq!(stack.undo_levels(), 2);
    }

    #[test]
    fn test_zero_max_levels_is_unlimited() {
        let mut stack = UndoStack::with_max_levels(0);
        for _ in 0..500 {
            stack.record(entry());
        }
        assert_eq!(stack.undo_levels(), 500);
    }
}
