//! # Document Handle
//!
//! A [`Document`] owns one live node tree and applies transactions to it.
//!
//! ## Transaction lifecycle
//!
//! ```text
//! Building → Validated → Applied
//!    ↓           ↓           ↓
//! Builder    working copy  commit + selection transform
//! ```
//!
//! Operations are validated and applied against a working copy of the tree,
//! left to right, each resolving paths against the already-partially-mutated
//! state. Only when every operation has succeeded is the working copy
//! committed, so a failing transaction leaves the document untouched and a
//! subsequent valid transaction always applies cleanly.

use crate::errors::TransactionError;
use crate::transaction::{
    transform_for_delete, transform_for_insert, transform_for_move, Operation, PathTransform,
    Transaction,
};
use doctree_model::{Delta, Node, NodeTree, Path, Position, Selection};

/// Editable document: one live tree plus a version counter.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    tree: NodeTree,
    version: u64,
}

/// What an applied transaction left behind.
#[derive(Debug, Clone)]
pub struct AppliedTransaction {
    /// Inverse operations, ordered so applying them as a transaction undoes
    /// the forward one.
    pub inverse: Transaction,

    /// The transformed (or hinted) post-transaction selection.
    pub selection: Option<Selection>,

    /// Document version after the commit.
    pub version: u64,
}

impl Document {
    /// Empty document (root with a single empty paragraph).
    pub fn new() -> Self {
        Self {
            tree: NodeTree::new(),
            version: 0,
        }
    }

    pub fn from_tree(tree: NodeTree) -> Self {
        Self { tree, version: 0 }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply a transaction atomically, transforming `selection` in lockstep
    /// with the structural edits.
    ///
    /// Operation paths are taken to share the pre-transaction frame: after
    /// each structural splice the engine rewrites the paths of every
    /// not-yet-applied operation. On success the document holds the mutated
    /// tree and the returned [`AppliedTransaction`] carries the inverse
    /// (for undo) and the post-transaction selection. On error nothing
    /// changed.
    pub fn apply(
        &mut self,
        transaction: Transaction,
        selection: Option<&Selection>,
    ) -> Result<AppliedTransaction, TransactionError> {
        self.apply_inner(transaction, selection, true)
    }

    /// Apply a transaction whose operation paths were recorded against the
    /// evolving tree, one frame per operation — the shape of the inverse
    /// lists this engine produces. No pending-path rewriting happens;
    /// rewriting such a list would adjust its indices twice.
    pub(crate) fn apply_recorded(
        &mut self,
        transaction: Transaction,
        selection: Option<&Selection>,
    ) -> Result<AppliedTransaction, TransactionError> {
        self.apply_inner(transaction, selection, false)
    }

    fn apply_inner(
        &mut self,
        transaction: Transaction,
        selection: Option<&Selection>,
        rewrite: bool,
    ) -> Result<AppliedTransaction, TransactionError> {
        let mut working = self.tree.clone();
        let mut pending = transaction.operations;
        let mut live_selection = selection.cloned();
        let mut inverse_ops = Vec::with_capacity(pending.len());

        let mut index = 0;
        while index < pending.len() {
            let op = pending[index].clone();
            let inverse = apply_operation(&mut working, &op)
                .map_err(|err| err.with_operation_index(index))?;
            inverse_ops.push(inverse);

            // Structural splices rewrite the paths of everything that has
            // not been applied yet, and the live selection.
            match &op {
                Operation::InsertNode { path, nodes } => {
                    let transform = |target: &Path| {
                        PathTransform::Kept(transform_for_insert(path, nodes.len(), target))
                    };
                    if rewrite {
                        rewrite_pending(&working, &mut pending[index + 1..], transform);
                    }
                    rewrite_selection(&working, &mut live_selection, transform);
                }
                Operation::DeleteNode { path, count } => {
                    let transform = |target: &Path| transform_for_delete(path, *count, target);
                    if rewrite {
                        rewrite_pending(&working, &mut pending[index + 1..], transform);
                    }
                    rewrite_selection(&working, &mut live_selection, transform);
                }
                Operation::MoveNode { from, to } => {
                    let transform = |target: &Path| transform_for_move(from, to, target);
                    if rewrite {
                        rewrite_pending(&working, &mut pending[index + 1..], transform);
                    }
                    rewrite_selection(&working, &mut live_selection, transform);
                }
                Operation::UpdateNode { .. } | Operation::UpdateText { .. } => {}
            }

            index += 1;
        }

        // Commit point: every operation validated and applied.
        self.tree = working;
        self.version += 1;

        inverse_ops.reverse();
        let selection = transaction.after_selection.or(live_selection);

        tracing::debug!(
            version = self.version,
            operations = inverse_ops.len(),
            "transaction applied"
        );

        Ok(AppliedTransaction {
            inverse: Transaction {
                operations: inverse_ops,
                after_selection: None,
            },
            selection,
            version: self.version,
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionError {
    fn with_operation_index(self, index: usize) -> Self {
        match self {
            TransactionError::InvalidOperation {
                kind,
                path,
                reason,
                ..
            } => TransactionError::InvalidOperation {
                index,
                kind,
                path,
                reason,
            },
            other => other,
        }
    }
}

/// Validate and apply one operation against the working tree, returning its
/// inverse.
fn apply_operation(tree: &mut NodeTree, op: &Operation) -> Result<Operation, TransactionError> {
    match op {
        Operation::InsertNode { path, nodes } => {
            if nodes.is_empty() {
                return Err(invalid(op, "no nodes to insert"));
            }
            tree.insert_nodes(path, nodes.clone())?;
            Ok(Operation::DeleteNode {
                path: path.clone(),
                count: nodes.len(),
            })
        }

        Operation::DeleteNode { path, count } => {
            if *count == 0 {
                return Err(invalid(op, "delete count must be positive"));
            }
            check_container_keeps_children(tree, path, *count)?;
            let removed = tree.remove_nodes(path, *count)?;
            Ok(Operation::InsertNode {
                path: path.clone(),
                nodes: removed,
            })
        }

        Operation::UpdateNode { path, attributes } => {
            let prior = tree.update_attributes(path, attributes)?;
            Ok(Operation::UpdateNode {
                path: path.clone(),
                attributes: prior,
            })
        }

        Operation::UpdateText { path, delta } => {
            let base = tree.apply_text_delta(path, delta)?;
            Ok(Operation::UpdateText {
                path: path.clone(),
                delta: delta.invert(&base),
            })
        }

        Operation::MoveNode { from, to } => {
            if from.is_root() || to.is_root() {
                return Err(invalid(op, "cannot move the root"));
            }
            if from == to || from.is_ancestor_of(to) {
                return Err(invalid(op, "destination lies inside the moved subtree"));
            }
            check_container_keeps_children(tree, from, 1)?;
            let removed = tree.remove_nodes(from, 1)?;
            tree.insert_nodes(to, removed)?;
            Ok(Operation::MoveNode {
                from: to.clone(),
                to: from.clone(),
            })
        }
    }
}

/// Containers that require children must never be drained by a delete or a
/// move-out. Callers that want the container gone delete the container.
fn check_container_keeps_children(
    tree: &NodeTree,
    path: &Path,
    count: usize,
) -> Result<(), TransactionError> {
    let Some(parent_path) = path.parent() else {
        return Ok(());
    };
    let Some(parent) = tree.node_at(&parent_path) else {
        // Path resolution will produce the InvalidPath shortly.
        return Ok(());
    };
    if parent.node_type.requires_children() && parent.children.len() <= count {
        return Err(TransactionError::StructuralInvariantViolation(format!(
            "removing the last child of {} at {}",
            parent.node_type, parent_path
        )));
    }
    Ok(())
}

fn invalid(op: &Operation, reason: &str) -> TransactionError {
    TransactionError::InvalidOperation {
        index: 0,
        kind: op.kind(),
        path: op.path().clone(),
        reason: reason.to_string(),
    }
}

/// Rewrite the paths of all not-yet-applied operations.
fn rewrite_pending(
    tree: &NodeTree,
    pending: &mut [Operation],
    transform: impl Fn(&Path) -> PathTransform,
) {
    for op in pending {
        match op {
            Operation::InsertNode { path, .. }
            | Operation::DeleteNode { path, .. }
            | Operation::UpdateNode { path, .. }
            | Operation::UpdateText { path, .. } => {
                *path = resolve_transform(tree, transform(path));
            }
            Operation::MoveNode { from, to } => {
                *from = resolve_transform(tree, transform(from));
                *to = resolve_transform(tree, transform(to));
            }
        }
    }
}

/// Rewrite anchor and focus independently.
fn rewrite_selection(
    tree: &NodeTree,
    selection: &mut Option<Selection>,
    transform: impl Fn(&Path) -> PathTransform,
) {
    let Some(selection) = selection.as_mut() else {
        return;
    };
    for position in [&mut selection.anchor, &mut selection.focus] {
        *position = transform_position(tree, position, &transform);
    }
}

fn transform_position(
    tree: &NodeTree,
    position: &Position,
    transform: impl Fn(&Path) -> PathTransform,
) -> Position {
    match transform(&position.path) {
        PathTransform::Kept(path) => Position {
            path,
            offset: position.offset,
        },
        PathTransform::Removed { parent, index } => {
            let retargeted = retarget(tree, parent, index);
            let offset = tree
                .node_at(&retargeted)
                .map(|node| position.offset.min(node.text_len()))
                .unwrap_or(0);
            Position {
                path: retargeted,
                offset,
            }
        }
    }
}

fn resolve_transform(tree: &NodeTree, transform: PathTransform) -> Path {
    match transform {
        PathTransform::Kept(path) => path,
        PathTransform::Removed { parent, index } => retarget(tree, parent, index),
    }
}

/// Nearest surviving sibling at the splice site, or the parent when the
/// container emptied out.
fn retarget(tree: &NodeTree, parent: Path, index: usize) -> Path {
    match tree.node_at(&parent) {
        Some(node) if !node.children.is_empty() => {
            parent.child(index.min(node.children.len() - 1))
        }
        _ => parent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionBuilder;
    use doctree_model::NodeType;

    fn paragraph(text: &str) -> Node {
        Node::new(NodeType::Paragraph).with_delta(Delta::from_text(text))
    }

    fn three_paragraphs() -> Document {
        Document::from_tree(NodeTree::from_children(vec![
            paragraph("a"),
            paragraph("b"),
            paragraph("c"),
        ]))
    }

    #[test]
    fn test_insert_shifts_selection() {
        let mut doc = three_paragraphs();
        let selection = Selection::collapsed(Position::new([2], 0));

        let tx = TransactionBuilder::new()
            .insert_node([1], paragraph("new"))
            .build();
        let applied = doc.apply(tx, Some(&selection)).unwrap();

        assert_eq!(
            applied.selection,
            Some(Selection::collapsed(Position::new([3], 0)))
        );
        assert_eq!(doc.tree().node_at(&Path::from([1])).unwrap().text(), "new");
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_delete_shifts_selection_back() {
        let mut doc = three_paragraphs();
        let selection = Selection::collapsed(Position::new([2], 1));

        let tx = TransactionBuilder::new().delete_node([0]).build();
        let applied = doc.apply(tx, Some(&selection)).unwrap();

        assert_eq!(
            applied.selection,
            Some(Selection::collapsed(Position::new([1], 1)))
        );
    }

    #[test]
    fn test_deleted_selection_retargets_to_survivor() {
        let mut doc = three_paragraphs();
        let selection = Selection::collapsed(Position::new([1], 1));

        let tx = TransactionBuilder::new().delete_node([1]).build();
        let applied = doc.apply(tx, Some(&selection)).unwrap();

        // Nearest surviving sibling at the splice site is the old [2].
        assert_eq!(
            applied.selection,
            Some(Selection::collapsed(Position::new([1], 1)))
        );
        assert_eq!(doc.tree().node_at(&Path::from([1])).unwrap().text(), "c");
    }

    #[test]
    fn test_after_selection_hint_wins() {
        let mut doc = three_paragraphs();
        let hint = Selection::collapsed(Position::new([0], 0));

        let tx = TransactionBuilder::new()
            .insert_node([0], paragraph("x"))
            .after_selection(hint.clone())
            .build();
        let applied = doc
            .apply(tx, Some(&Selection::collapsed(Position::new([2], 0))))
            .unwrap();

        assert_eq!(applied.selection, Some(hint));
    }

    #[test]
    fn test_later_operations_see_earlier_effects() {
        let mut doc = three_paragraphs();

        // Both inserts written against the pre-transaction shape; the
        // second one's path is rewritten after the first splice.
        let tx = TransactionBuilder::new()
            .insert_node([0], paragraph("first"))
            .insert_node([1], paragraph("second"))
            .build();
        doc.apply(tx, None).unwrap();

        assert_eq!(doc.tree().node_at(&Path::from([0])).unwrap().text(), "first");
        // "second" targeted pre-transaction [1]; after the first insert it
        // lands at [2].
        assert_eq!(
            doc.tree().node_at(&Path::from([2])).unwrap().text(),
            "second"
        );
        assert_eq!(doc.tree().node_at(&Path::from([1])).unwrap().text(), "a");
    }

    #[test]
    fn test_failed_transaction_leaves_document_untouched() {
        let mut doc = three_paragraphs();
        let before = doc.clone();

        let tx = TransactionBuilder::new()
            .delete_node([0])
            .update_text([9], Delta::from_text("x"))
            .build();
        let err = doc.apply(tx, None).unwrap_err();

        assert!(matches!(err, TransactionError::InvalidPath(_)));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_invalid_operation_reports_index_and_path() {
        let mut doc = three_paragraphs();
        let tx = TransactionBuilder::new()
            .insert_node([0], paragraph("ok"))
            .insert_nodes([1], vec![])
            .build();

        let err = doc.apply(tx, None).unwrap_err();
        match err {
            TransactionError::InvalidOperation { index, kind, .. } => {
                assert_eq!(index, 1);
                assert_eq!(kind, "insert_node");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_update_text_composes_patch() {
        let mut doc = Document::from_tree(NodeTree::from_children(vec![paragraph("Hi")]));
        let patch = Delta::new().retain(2, None).insert("!", None);

        let tx = TransactionBuilder::new().update_text([0], patch).build();
        doc.apply(tx, None).unwrap();

        assert_eq!(
            doc.tree().node_at(&Path::from([0])).unwrap().delta,
            Some(Delta::from_text("Hi!"))
        );
    }

    #[test]
    fn test_move_node_and_inverse() {
        let mut doc = three_paragraphs();
        let tx = TransactionBuilder::new().move_node([0], [2]).build();
        let applied = doc.apply(tx, None).unwrap();

        // "a" removed from 0, reinserted at post-removal index 2 (the end).
        let texts: Vec<String> = doc
            .tree()
            .root()
            .children
            .iter()
            .map(Node::text)
            .collect();
        assert_eq!(texts, ["b", "c", "a"]);

        doc.apply_recorded(applied.inverse, None).unwrap();
        let texts: Vec<String> = doc
            .tree()
            .root()
            .children
            .iter()
            .map(Node::text)
            .collect();
        assert_eq!(texts, ["a", "b", "c"]);
    }

    #[test]
    fn test_text_edit_inside_moved_subtree_lands_in_new_home() {
        let mut doc = Document::from_tree(NodeTree::from_children(vec![
            Node::new(NodeType::BulletedList).with_children(vec![
                Node::new(NodeType::ListItem).with_delta(Delta::from_text("a")),
                Node::new(NodeType::ListItem).with_delta(Delta::from_text("b")),
            ]),
            paragraph("p"),
        ]));

        // Both paths in the pre-transaction frame: [0, 0] is the first
        // list item, which the move relocates under [1] before the edit
        // runs.
        let tx = TransactionBuilder::new()
            .move_node([0], [1])
            .update_text([0, 0], Delta::new().retain(1, None).insert("X", None))
            .build();
        doc.apply(tx, None).unwrap();

        assert_eq!(doc.tree().node_at(&Path::from([0])).unwrap().text(), "p");
        assert_eq!(
            doc.tree().node_at(&Path::from([1, 0])).unwrap().text(),
            "aX"
        );
    }

    #[test]
    fn test_selection_follows_moved_subtree() {
        let mut doc = Document::from_tree(NodeTree::from_children(vec![
            Node::new(NodeType::BulletedList).with_children(vec![
                Node::new(NodeType::ListItem).with_delta(Delta::from_text("a")),
                Node::new(NodeType::ListItem).with_delta(Delta::from_text("b")),
            ]),
            paragraph("p"),
        ]));
        let selection = Selection::collapsed(Position::new([0, 1], 1));

        let tx = TransactionBuilder::new().move_node([0], [1]).build();
        let applied = doc.apply(tx, Some(&selection)).unwrap();

        assert_eq!(
            applied.selection,
            Some(Selection::collapsed(Position::new([1, 1], 1)))
        );
    }

    #[test]
    fn test_move_into_own_subtree_is_rejected() {
        let mut doc = Document::from_tree(NodeTree::from_children(vec![Node::new(
            NodeType::BulletedList,
        )
        .with_children(vec![
            Node::new(NodeType::ListItem).with_delta(Delta::from_text("a")),
            Node::new(NodeType::ListItem).with_delta(Delta::from_text("b")),
        ])]));

        let tx = TransactionBuilder::new().move_node([0], [0, 0]).build();
        let err = doc.apply(tx, None).unwrap_err();
        assert!(matches!(err, TransactionError::InvalidOperation { .. }));
    }

    #[test]
    fn test_draining_required_container_is_refused() {
        let mut doc = Document::from_tree(NodeTree::from_children(vec![Node::new(
            NodeType::BulletedList,
        )
        .with_children(vec![
            Node::new(NodeType::ListItem).with_delta(Delta::from_text("only"))
        ])]));

        let tx = TransactionBuilder::new().delete_node([0, 0]).build();
        let err = doc.apply(tx, None).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::StructuralInvariantViolation(_)
        ));

        // Deleting the container itself is fine.
        let tx = TransactionBuilder::new().delete_node([0]).build();
        assert!(doc.apply(tx, None).is_ok());
    }

    #[test]
    fn test_undo_round_trip_restores_tree_and_selection() {
        let mut doc = three_paragraphs();
        let before_tree = doc.tree().clone();
        let selection = Selection::collapsed(Position::new([1], 1));

        let tx = TransactionBuilder::new()
            .delete_node([1])
            .insert_node([0], paragraph("head"))
            .build();
        let applied = doc.apply(tx, Some(&selection)).unwrap();

        let mut undo = applied.inverse;
        undo.after_selection = Some(selection.clone());
        let undone = doc.apply_recorded(undo, applied.selection.as_ref()).unwrap();

        assert_eq!(doc.tree(), &before_tree);
        assert_eq!(undone.selection, Some(selection));
    }
}
