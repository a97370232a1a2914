//! # Edit Session Management
//!
//! An [`EditSession`] owns one live document, the active selection, and the
//! undo/redo history. It is the single-writer boundary: all mutation goes
//! through `&mut self`, so two transactions can never race on the same
//! tree — a host that shares a session across threads wraps it in a
//! `Mutex` around `apply`, not around reads.

use crate::document::Document;
use crate::errors::TransactionError;
use crate::transaction::{Transaction, TransactionBuilder};
use crate::undo_stack::{HistoryEntry, UndoStack};
use doctree_model::{Node, NodeTree, Path, Position, Selection};

/// One editing session over one document.
#[derive(Debug)]
pub struct EditSession {
    document: Document,
    selection: Option<Selection>,
    history: UndoStack,
}

impl EditSession {
    /// Session over an empty document.
    pub fn new() -> Self {
        Self::with_tree(NodeTree::new())
    }

    pub fn with_tree(tree: NodeTree) -> Self {
        Self {
            document: Document::from_tree(tree),
            selection: None,
            history: UndoStack::new(),
        }
    }

    /// Session with a custom undo depth (0 = unlimited).
    pub fn with_history_depth(tree: NodeTree, max_levels: usize) -> Self {
        Self {
            document: Document::from_tree(tree),
            selection: None,
            history: UndoStack::with_max_levels(max_levels),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tree(&self) -> &NodeTree {
        self.document.tree()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Replace the active selection out of band (cursor movement, clicks).
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// Start building a transaction against the current tree shape.
    pub fn begin_transaction(&self) -> TransactionBuilder {
        TransactionBuilder::new()
    }

    /// Apply a transaction; on success the session selection is the
    /// transformed (or hinted) post-transaction selection, which is also
    /// returned.
    pub fn apply(
        &mut self,
        transaction: Transaction,
    ) -> Result<Option<Selection>, TransactionError> {
        let before = self.selection.clone();
        let forward = transaction.clone();

        let applied = self.document.apply(transaction, before.as_ref())?;
        self.selection = applied.selection.clone();
        self.history.record(HistoryEntry {
            forward,
            inverse: applied.inverse,
            before_selection: before,
            after_selection: applied.selection.clone(),
        });

        Ok(applied.selection)
    }

    /// Undo the most recent transaction. Returns `false` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Result<bool, TransactionError> {
        let Some(entry) = self.history.pop_undo() else {
            return Ok(false);
        };

        let mut inverse = entry.inverse.clone();
        inverse.after_selection = entry.before_selection.clone();

        match self.document.apply_recorded(inverse, self.selection.as_ref()) {
            Ok(applied) => {
                tracing::debug!(version = applied.version, "undo applied");
                self.selection = applied.selection;
                self.history.push_redo(entry);
                Ok(true)
            }
            Err(err) => {
                self.history.push_undo(entry);
                Err(err)
            }
        }
    }

    /// Redo the most recently undone transaction. Returns `false` when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, TransactionError> {
        let Some(entry) = self.history.pop_redo() else {
            return Ok(false);
        };

        let mut forward = entry.forward.clone();
        forward.after_selection = entry.after_selection.clone();

        match self.document.apply(forward, self.selection.as_ref()) {
            Ok(applied) => {
                tracing::debug!(version = applied.version, "redo applied");
                self.selection = applied.selection;
                self.history.push_undo(entry);
                Ok(true)
            }
            Err(err) => {
                self.history.push_redo(entry);
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- queries ---

    pub fn node_at_path(&self, path: &Path) -> Option<&Node> {
        self.tree().node_at(path)
    }

    /// All nodes whose path range intersects the selection, depth-first.
    pub fn nodes_in_selection(&self, selection: &Selection) -> Vec<(Path, &Node)> {
        self.tree()
            .nodes_in_range(&selection.start().path, &selection.end().path)
    }

    /// Insert a divider at `path`. A trailing empty paragraph always
    /// follows the divider and receives the caret, so typing can continue
    /// immediately below the rule.
    pub fn insert_divider(&mut self, path: Path) -> Result<Option<Selection>, TransactionError> {
        use doctree_model::NodeType;

        let caret = path.next().unwrap_or_else(|| path.clone());
        let transaction = self
            .begin_transaction()
            .insert_nodes(
                path,
                vec![
                    Node::new(NodeType::Divider),
                    Node::empty_paragraph(),
                ],
            )
            .after_selection(Selection::collapsed(Position::new(caret, 0)))
            .build();
        self.apply(transaction)
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}
