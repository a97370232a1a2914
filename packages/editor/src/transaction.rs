//! Transactions
//!
//! A transaction is an ordered batch of tree operations plus an optional
//! post-apply selection hint. Operations later in the batch see the effects
//! of earlier ones: after each structural operation the engine rewrites the
//! remaining operations' paths (and the live selection) with the sibling
//! index adjustment rules in this module.

use doctree_model::{Attributes, Delta, Node, Path, Selection};
use serde::{Deserialize, Serialize};

/// A single tree operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Insert `nodes` so the first lands at `path`.
    InsertNode { path: Path, nodes: Vec<Node> },

    /// Delete `count` siblings starting at `path`, with their subtrees.
    DeleteNode { path: Path, count: usize },

    /// Shallow-merge an attribute patch; `null` values delete keys.
    UpdateNode { path: Path, attributes: Attributes },

    /// Compose a delta patch onto the node's existing text.
    UpdateText { path: Path, delta: Delta },

    /// Relocate a node. `to` is interpreted against the tree *after* the
    /// node has been detached from `from`.
    MoveNode { from: Path, to: Path },
}

impl Operation {
    /// Short tag for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::InsertNode { .. } => "insert_node",
            Operation::DeleteNode { .. } => "delete_node",
            Operation::UpdateNode { .. } => "update_node",
            Operation::UpdateText { .. } => "update_text",
            Operation::MoveNode { .. } => "move_node",
        }
    }

    /// The path the operation primarily targets.
    pub fn path(&self) -> &Path {
        match self {
            Operation::InsertNode { path, .. }
            | Operation::DeleteNode { path, .. }
            | Operation::UpdateNode { path, .. }
            | Operation::UpdateText { path, .. } => path,
            Operation::MoveNode { from, .. } => from,
        }
    }
}

/// Atomic ordered batch of operations plus selection hint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub operations: Vec<Operation>,

    /// Takes precedence verbatim over the engine-transformed selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_selection: Option<Selection>,
}

impl Transaction {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Fluent builder for transactions.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    operations: Vec<Operation>,
    after_selection: Option<Selection>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_node(self, path: impl Into<Path>, node: Node) -> Self {
        self.insert_nodes(path, vec![node])
    }

    pub fn insert_nodes(mut self, path: impl Into<Path>, nodes: Vec<Node>) -> Self {
        self.operations.push(Operation::InsertNode {
            path: path.into(),
            nodes,
        });
        self
    }

    pub fn delete_node(self, path: impl Into<Path>) -> Self {
        self.delete_nodes(path, 1)
    }

    pub fn delete_nodes(mut self, path: impl Into<Path>, count: usize) -> Self {
        self.operations.push(Operation::DeleteNode {
            path: path.into(),
            count,
        });
        self
    }

    pub fn update_node(mut self, path: impl Into<Path>, attributes: Attributes) -> Self {
        self.operations.push(Operation::UpdateNode {
            path: path.into(),
            attributes,
        });
        self
    }

    pub fn update_text(mut self, path: impl Into<Path>, delta: Delta) -> Self {
        self.operations.push(Operation::UpdateText {
            path: path.into(),
            delta,
        });
        self
    }

    pub fn move_node(mut self, from: impl Into<Path>, to: impl Into<Path>) -> Self {
        self.operations.push(Operation::MoveNode {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn after_selection(mut self, selection: Selection) -> Self {
        self.after_selection = Some(selection);
        self
    }

    pub fn build(self) -> Transaction {
        Transaction {
            operations: self.operations,
            after_selection: self.after_selection,
        }
    }
}

/// Outcome of rewriting a path across a structural splice.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PathTransform {
    /// Unaffected, or shifted to the new index.
    Kept(Path),
    /// The path pointed into the deleted range; `parent`/`index` name the
    /// splice site so the caller can retarget against the surviving tree.
    Removed { parent: Path, index: usize },
}

/// Index adjustment for an insertion of `count` nodes at `at`: indices
/// >= the insertion index shift up at that depth, for every path sharing
/// the insertion parent.
pub(crate) fn transform_for_insert(at: &Path, count: usize, target: &Path) -> Path {
    let (Some(parent), Some(at_index)) = (at.parent(), at.last()) else {
        return target.clone();
    };
    let depth = parent.len();
    if target.len() <= depth || !target.starts_with(&parent) {
        return target.clone();
    }

    let mut indices = target.as_slice().to_vec();
    if indices[depth] >= at_index {
        indices[depth] += count;
    }
    Path::new(indices)
}

/// Index adjustment for a deletion of `count` nodes at `at`: indices past
/// the deleted range shift down; paths into the deleted range report
/// [`PathTransform::Removed`].
pub(crate) fn transform_for_delete(at: &Path, count: usize, target: &Path) -> PathTransform {
    let (Some(parent), Some(at_index)) = (at.parent(), at.last()) else {
        return PathTransform::Kept(target.clone());
    };
    let depth = parent.len();
    if target.len() <= depth || !target.starts_with(&parent) {
        return PathTransform::Kept(target.clone());
    }

    let mut indices = target.as_slice().to_vec();
    let index = indices[depth];
    if index >= at_index + count {
        indices[depth] -= count;
        PathTransform::Kept(Path::new(indices))
    } else if index >= at_index {
        PathTransform::Removed {
            parent,
            index: at_index,
        }
    } else {
        PathTransform::Kept(Path::new(indices))
    }
}

/// Path rewriting for a move. The moved node and everything inside it
/// travel to the destination: the `from` prefix is replaced by the node's
/// post-insert path. Every other path sees the detach at `from` composed
/// with the attach at `to`.
pub(crate) fn transform_for_move(from: &Path, to: &Path, target: &Path) -> PathTransform {
    if target.starts_with(from) {
        let mut indices = to.as_slice().to_vec();
        indices.extend_from_slice(&target.as_slice()[from.len()..]);
        return PathTransform::Kept(Path::new(indices));
    }
    match transform_for_delete(from, 1, target) {
        PathTransform::Kept(path) => PathTransform::Kept(transform_for_insert(to, 1, &path)),
        removed => removed,
    }
}
