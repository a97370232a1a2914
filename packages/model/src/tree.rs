//! Document tree
//!
//! The tree owns a single root container node and resolves paths to nodes.
//! The splice primitives at the bottom are the transaction engine's
//! backdoor: structural invariants (atomicity, index rewriting, container
//! rules) are enforced there, in one place, and no other component mutates
//! the tree.

use crate::attributes::{compose_attributes, invert_attributes, Attributes};
use crate::delta::Delta;
use crate::error::TreeError;
use crate::node::{Node, NodeType};
use crate::path::Path;

/// A document: one root node and everything beneath it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeTree {
    root: Node,
}

impl NodeTree {
    /// Empty document: a root container holding a single empty paragraph.
    pub fn new() -> Self {
        Self {
            root: Node::new(NodeType::Document).with_children(vec![Node::empty_paragraph()]),
        }
    }

    /// Document with the given top-level nodes.
    pub fn from_children(children: Vec<Node>) -> Self {
        Self {
            root: Node::new(NodeType::Document).with_children(children),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Resolve a path to a node. The empty path resolves to the root.
    pub fn node_at(&self, path: &Path) -> Option<&Node> {
        let mut node = &self.root;
        for &index in path.as_slice() {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    fn node_at_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for &index in path.as_slice() {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.node_at(path).is_some()
    }

    /// Path of an attached node, located by pointer identity. `None` when
    /// the reference does not point into this tree; meaningless across
    /// structural edits, like any other path.
    pub fn path_of(&self, node: &Node) -> Option<Path> {
        fn walk(current: &Node, target: *const Node, path: Path) -> Option<Path> {
            if std::ptr::eq(current, target) {
                return Some(path);
            }
            for (index, child) in current.children.iter().enumerate() {
                if let Some(found) = walk(child, target, path.child(index)) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.root, node, Path::root())
    }

    /// Ancestor nodes of `path`, root first, parent last. Empty for the
    /// root itself.
    pub fn ancestors_of(&self, path: &Path) -> Vec<&Node> {
        let mut ancestors = Vec::with_capacity(path.len());
        let mut node = &self.root;
        for &index in path.as_slice() {
            ancestors.push(node);
            match node.children.get(index) {
                Some(child) => node = child,
                None => break,
            }
        }
        ancestors
    }

    /// Path of the next sibling, when one exists in the tree.
    pub fn next_sibling_path(&self, path: &Path) -> Option<Path> {
        let next = path.next()?;
        self.contains(&next).then_some(next)
    }

    /// Path of the previous sibling, when one exists in the tree.
    pub fn previous_sibling_path(&self, path: &Path) -> Option<Path> {
        let previous = path.previous()?;
        self.contains(&previous).then_some(previous)
    }

    /// All nodes whose path falls in the inclusive interval
    /// `[start, end]` of the path total order, in depth-first preorder.
    pub fn nodes_in_range(&self, start: &Path, end: &Path) -> Vec<(Path, &Node)> {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        let mut collected = Vec::new();
        collect_range(&self.root, Path::root(), start, end, &mut collected);
        collected
    }

    // --- splice primitives, used only by the transaction engine ---

    /// Insert `nodes` so the first one lands at `path`. Text-bearing nodes
    /// without a delta are normalized to carry an empty one.
    pub fn insert_nodes(&mut self, path: &Path, nodes: Vec<Node>) -> Result<(), TreeError> {
        let (parent_path, index) = split_parent(path)?;
        let parent = self
            .node_at_mut(&parent_path)
            .ok_or_else(|| TreeError::InvalidPath(path.clone()))?;
        if index > parent.children.len() {
            return Err(TreeError::InvalidPath(path.clone()));
        }

        let normalized = nodes.into_iter().map(normalize_node);
        parent.children.splice(index..index, normalized);
        Ok(())
    }

    /// Remove `count` siblings starting at `path`, returning the detached
    /// subtrees in order.
    pub fn remove_nodes(&mut self, path: &Path, count: usize) -> Result<Vec<Node>, TreeError> {
        let (parent_path, index) = split_parent(path)?;
        let parent = self
            .node_at_mut(&parent_path)
            .ok_or_else(|| TreeError::InvalidPath(path.clone()))?;
        if index + count > parent.children.len() {
            return Err(TreeError::InvalidPath(path.clone()));
        }

        Ok(parent.children.drain(index..index + count).collect())
    }

    /// Shallow-merge an attribute patch onto the node at `path` and return
    /// the patch that restores the prior values.
    pub fn update_attributes(
        &mut self,
        path: &Path,
        patch: &Attributes,
    ) -> Result<Attributes, TreeError> {
        let node = self
            .node_at_mut(path)
            .ok_or_else(|| TreeError::InvalidPath(path.clone()))?;

        let inverse = invert_attributes(patch, Some(&node.attributes));
        node.attributes =
            compose_attributes(Some(&node.attributes), Some(patch), false).unwrap_or_default();
        Ok(inverse)
    }

    /// Compose a delta patch onto the node's text and return the prior
    /// delta for inversion.
    pub fn apply_text_delta(&mut self, path: &Path, patch: &Delta) -> Result<Delta, TreeError> {
        let node = self
            .node_at_mut(path)
            .ok_or_else(|| TreeError::InvalidPath(path.clone()))?;
        if !node.is_text_bearing() {
            return Err(TreeError::NotTextBearing(path.clone()));
        }

        let base = node.delta.clone().unwrap_or_default();
        node.delta = Some(base.compose(patch)?);
        Ok(base)
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

fn split_parent(path: &Path) -> Result<(Path, usize), TreeError> {
    match (path.parent(), path.last()) {
        (Some(parent), Some(index)) => Ok((parent, index)),
        _ => Err(TreeError::InvalidPath(path.clone())),
    }
}

/// Text-bearing kinds must carry a delta once attached, never `None`.
fn normalize_node(mut node: Node) -> Node {
    if node.is_text_bearing() && node.delta.is_none() {
        node.delta = Some(Delta::new());
    }
    node.children = node.children.into_iter().map(normalize_node).collect();
    node
}

fn collect_range<'a>(
    node: &'a Node,
    path: Path,
    start: &Path,
    end: &Path,
    collected: &mut Vec<(Path, &'a Node)>,
) {
    // Every descendant of a node ordering past `end` also orders past it.
    if &path > end {
        return;
    }
    if &path >= start && !path.is_root() {
        collected.push((path.clone(), node));
    }
    for (index, child) in node.children.iter().enumerate() {
        collect_range(child, path.child(index), start, end, collected);
    }
}
