//! Node paths
//!
//! A path locates a node by its index at each level from the root. Paths
//! are positional, not stable handles: a path is valid only while the node
//! at that position exists, and structural edits shift the paths of later
//! siblings. The transaction engine owns the rewriting rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index sequence locating a node from the tree root.
///
/// The derived `Ord` is lexicographic, which matches depth-first preorder:
/// a parent orders before its descendants, and earlier siblings (with their
/// subtrees) order before later ones. This total order backs range
/// selections.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Path(Vec<usize>);

impl Path {
    /// The root path (empty index sequence).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Index of this node among its siblings. `None` for the root.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the parent node. `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        if self.is_root() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Path of the next sibling position. The root has no siblings.
    pub fn next(&self) -> Option<Path> {
        let mut indices = self.0.clone();
        *indices.last_mut()? += 1;
        Some(Path(indices))
    }

    /// Path of the previous sibling position, if one exists.
    pub fn previous(&self) -> Option<Path> {
        let mut indices = self.0.clone();
        let last = indices.last_mut()?;
        if *last == 0 {
            return None;
        }
        *last -= 1;
        Some(Path(indices))
    }

    /// Append a child index.
    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// True when `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// True when `prefix` is a (non-strict) prefix of `self`.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl std::ops::Index<usize> for Path {
    type Output = usize;

    fn index(&self, index: usize) -> &usize {
        &self.0[index]
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "]")
    }
}
