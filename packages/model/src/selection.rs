//! Selection & position
//!
//! A selection is an anchor/focus pair of (path, offset) positions.
//! Equality is structural. The engine guarantees selection consistency only
//! across the span of a single transaction apply; a selection held across
//! out-of-band tree edits is the caller's problem.

use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A caret position: a node path plus a character offset into its text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub path: Path,
    pub offset: usize,
}

impl Position {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.offset)
    }
}

/// Anchor/focus position pair describing the active text range.
///
/// The anchor is where the selection began, the focus where it currently
/// ends; callers must not assume the anchor orders first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// Caret selection: anchor == focus.
    pub fn collapsed(position: Position) -> Self {
        Self {
            anchor: position.clone(),
            focus: position,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// True when the focus orders before the anchor.
    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    /// The earlier of the two positions in (path, offset) order.
    pub fn start(&self) -> &Position {
        if self.is_backward() {
            &self.focus
        } else {
            &self.anchor
        }
    }

    /// The later of the two positions in (path, offset) order.
    pub fn end(&self) -> &Position {
        if self.is_backward() {
            &self.anchor
        } else {
            &self.focus
        }
    }

    /// Equivalent selection with anchor ordered before focus.
    pub fn normalized(&self) -> Selection {
        Selection {
            anchor: self.start().clone(),
            focus: self.end().clone(),
        }
    }

    /// Whether `path` falls inside the selected path interval.
    pub fn contains(&self, path: &Path) -> bool {
        let start = &self.start().path;
        let end = &self.end().path;
        path >= start && (path <= end || path.starts_with(end))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.anchor, self.focus)
    }
}
