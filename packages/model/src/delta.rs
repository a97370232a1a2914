//! Run-length rich-text representation
//!
//! A [`Delta`] is an ordered sequence of insert/retain/delete runs carrying
//! per-run formatting attributes. A delta in *document form* contains only
//! inserts and describes a full text; a delta in *patch form* mixes retains
//! and deletes and describes an edit against some base.
//!
//! All offsets and lengths are Unicode scalar value counts (`char`s),
//! consistent across the whole engine. Callers never mix units.

use crate::attributes::{compose_attributes, invert_attributes, Attributes};
use crate::error::DeltaError;
use serde::{Deserialize, Serialize};

/// A single run in a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOp {
    /// Insert `text`, formatted with `attributes`.
    Insert {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attributes: Option<Attributes>,
    },

    /// Keep `len` characters of the base; `attributes` is a format patch
    /// applied to the retained span (`null` values remove keys).
    Retain {
        len: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attributes: Option<Attributes>,
    },

    /// Remove `len` characters of the base.
    Delete { len: usize },
}

impl TextOp {
    pub fn insert(text: impl Into<String>) -> Self {
        TextOp::Insert {
            text: text.into(),
            attributes: None,
        }
    }

    pub fn insert_with(text: impl Into<String>, attributes: Attributes) -> Self {
        TextOp::Insert {
            text: text.into(),
            attributes: Some(attributes),
        }
    }

    pub fn retain(len: usize) -> Self {
        TextOp::Retain {
            len,
            attributes: None,
        }
    }

    pub fn retain_with(len: usize, attributes: Attributes) -> Self {
        TextOp::Retain {
            len,
            attributes: Some(attributes),
        }
    }

    pub fn delete(len: usize) -> Self {
        TextOp::Delete { len }
    }

    /// Run length in characters.
    pub fn len(&self) -> usize {
        match self {
            TextOp::Insert { text, .. } => char_len(text),
            TextOp::Retain { len, .. } | TextOp::Delete { len } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            TextOp::Insert { attributes, .. } | TextOp::Retain { attributes, .. } => {
                attributes.as_ref()
            }
            TextOp::Delete { .. } => None,
        }
    }
}

/// Ordered sequence of text runs with canonical run merging.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta {
    ops: Vec<TextOp>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document-form delta holding a single unformatted run.
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut delta = Self::new();
        delta.push(TextOp::insert(text));
        delta
    }

    pub fn ops(&self) -> &[TextOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Builder-style insert.
    pub fn insert(mut self, text: impl Into<String>, attributes: Option<Attributes>) -> Self {
        self.push(TextOp::Insert {
            text: text.into(),
            attributes,
        });
        self
    }

    /// Builder-style retain.
    pub fn retain(mut self, len: usize, attributes: Option<Attributes>) -> Self {
        self.push(TextOp::Retain { len, attributes });
        self
    }

    /// Builder-style delete.
    pub fn delete(mut self, len: usize) -> Self {
        self.push(TextOp::Delete { len });
        self
    }

    /// Append a run, merging with adjacent equal-attribute runs and keeping
    /// the canonical insert-before-delete ordering.
    pub fn push(&mut self, op: TextOp) {
        if op.is_empty() {
            return;
        }

        let mut index = self.ops.len();

        // Inserts order before an adjacent delete so equal edits compare equal.
        if let (Some(TextOp::Delete { .. }), TextOp::Insert { .. }) = (self.ops.last(), &op) {
            index -= 1;
        }

        if index > 0 {
            let merged = match (&mut self.ops[index - 1], &op) {
                (TextOp::Delete { len: prev }, TextOp::Delete { len }) => {
                    *prev += len;
                    true
                }
                (
                    TextOp::Insert {
                        text: prev,
                        attributes: prev_attrs,
                    },
                    TextOp::Insert { text, attributes },
                ) if prev_attrs == attributes => {
                    prev.push_str(text);
                    true
                }
                (
                    TextOp::Retain {
                        len: prev,
                        attributes: prev_attrs,
                    },
                    TextOp::Retain { len, attributes },
                ) if prev_attrs == attributes => {
                    *prev += len;
                    true
                }
                _ => false,
            };
            if merged {
                return;
            }
        }

        self.ops.insert(index, op);
    }

    /// Full text length this delta describes (insert and retain runs).
    pub fn text_len(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                TextOp::Insert { text, .. } => char_len(text),
                TextOp::Retain { len, .. } => *len,
                TextOp::Delete { .. } => 0,
            })
            .sum()
    }

    /// Base length this delta consumes when applied as a patch.
    pub fn base_len(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                TextOp::Insert { .. } => 0,
                TextOp::Retain { len, .. } | TextOp::Delete { len } => *len,
            })
            .sum()
    }

    /// Concatenated insert text (document-form deltas).
    pub fn to_plain_text(&self) -> String {
        let mut text = String::new();
        for op in &self.ops {
            if let TextOp::Insert { text: run, .. } = op {
                text.push_str(run);
            }
        }
        text
    }

    /// Apply patch `other` onto base `self`, producing a new delta.
    ///
    /// Associative, with the empty delta as identity. Fails with
    /// [`DeltaError::LengthMismatch`] when the patch retains or deletes past
    /// the length the base provides; a patch shorter than the base leaves
    /// the remainder untouched (implicit trailing retain).
    pub fn compose(&self, other: &Delta) -> Result<Delta, DeltaError> {
        let provided = self.text_len();
        let required = other.base_len();
        if required > provided {
            return Err(DeltaError::LengthMismatch {
                base: provided,
                required,
            });
        }

        let mut base = OpCursor::new(self);
        let mut patch = OpCursor::new(other);
        let mut composed = Delta::new();

        while base.has_next() || patch.has_next() {
            if matches!(patch.peek(), Some(TextOp::Insert { .. })) {
                composed.push(patch.take(usize::MAX));
                continue;
            }
            if matches!(base.peek(), Some(TextOp::Delete { .. })) {
                composed.push(base.take(usize::MAX));
                continue;
            }
            if !patch.has_next() {
                composed.push(base.take(usize::MAX));
                continue;
            }

            // Patch run is retain or delete; the length check above
            // guarantees the base still provides length here.
            let len = base.remaining_len().min(patch.remaining_len());
            let base_op = base.take(len);
            let patch_op = patch.take(len);

            match patch_op {
                TextOp::Retain {
                    len,
                    attributes: patch_attrs,
                } => match base_op {
                    TextOp::Insert { text, attributes } => composed.push(TextOp::Insert {
                        text,
                        attributes: compose_attributes(
                            attributes.as_ref(),
                            patch_attrs.as_ref(),
                            false,
                        ),
                    }),
                    TextOp::Retain { attributes, .. } => composed.push(TextOp::Retain {
                        len,
                        attributes: compose_attributes(
                            attributes.as_ref(),
                            patch_attrs.as_ref(),
                            true,
                        ),
                    }),
                    TextOp::Delete { len } => composed.push(TextOp::Delete { len }),
                },
                TextOp::Delete { len } => {
                    // Deleting freshly inserted text cancels out entirely.
                    if !matches!(base_op, TextOp::Insert { .. }) {
                        composed.push(TextOp::Delete { len });
                    }
                }
                TextOp::Insert { .. } => composed.push(patch_op),
            }
        }

        Ok(composed)
    }

    /// Produce the patch that undoes `self` when applied after it, given the
    /// document-form `base` the patch was applied to.
    pub fn invert(&self, base: &Delta) -> Delta {
        let mut inverted = Delta::new();
        let mut base_pos = 0;

        for op in &self.ops {
            match op {
                TextOp::Insert { text, .. } => {
                    inverted.push(TextOp::delete(char_len(text)));
                }
                TextOp::Retain {
                    len,
                    attributes: None,
                } => {
                    inverted.push(TextOp::retain(*len));
                    base_pos += len;
                }
                TextOp::Retain {
                    len,
                    attributes: Some(patch_attrs),
                } => {
                    // Restore the prior value of every touched key.
                    for run in base.slice(base_pos, base_pos + len).ops {
                        inverted.push(TextOp::Retain {
                            len: run.len(),
                            attributes: Some(invert_attributes(patch_attrs, run.attributes())),
                        });
                    }
                    base_pos += len;
                }
                TextOp::Delete { len } => {
                    // Reinstate the removed text with its formatting.
                    for run in base.slice(base_pos, base_pos + len).ops {
                        inverted.push(run);
                    }
                    base_pos += len;
                }
            }
        }

        inverted
    }

    /// Extract the sub-runs covering `[start, end)` of a document-form
    /// delta, splitting runs at the boundaries as needed.
    pub fn slice(&self, start: usize, end: usize) -> Delta {
        let mut sliced = Delta::new();
        let mut pos = 0;

        for op in &self.ops {
            if pos >= end {
                break;
            }
            let len = match op {
                TextOp::Insert { text, .. } => char_len(text),
                TextOp::Retain { len, .. } => *len,
                // Document-form deltas carry no deletes.
                TextOp::Delete { .. } => continue,
            };
            let run_start = pos;
            let run_end = pos + len;
            pos = run_end;

            if run_end <= start {
                continue;
            }
            let from = start.saturating_sub(run_start);
            let to = end.min(run_end) - run_start;

            match op {
                TextOp::Insert { text, attributes } => sliced.push(TextOp::Insert {
                    text: substring(text, from, to),
                    attributes: attributes.clone(),
                }),
                TextOp::Retain { attributes, .. } => sliced.push(TextOp::Retain {
                    len: to - from,
                    attributes: attributes.clone(),
                }),
                TextOp::Delete { .. } => {}
            }
        }

        sliced
    }
}

impl From<Vec<TextOp>> for Delta {
    fn from(ops: Vec<TextOp>) -> Self {
        let mut delta = Delta::new();
        for op in ops {
            delta.push(op);
        }
        delta
    }
}

/// Cursor over a delta's runs that can split a run mid-way.
struct OpCursor<'a> {
    ops: &'a [TextOp],
    index: usize,
    consumed: usize,
}

impl<'a> OpCursor<'a> {
    fn new(delta: &'a Delta) -> Self {
        Self {
            ops: &delta.ops,
            index: 0,
            consumed: 0,
        }
    }

    fn has_next(&self) -> bool {
        self.index < self.ops.len()
    }

    fn peek(&self) -> Option<&TextOp> {
        self.ops.get(self.index)
    }

    fn remaining_len(&self) -> usize {
        match self.ops.get(self.index) {
            Some(op) => op.len() - self.consumed,
            None => usize::MAX,
        }
    }

    /// Take up to `max` characters from the current run.
    fn take(&mut self, max: usize) -> TextOp {
        let op = &self.ops[self.index];
        let remaining = op.len() - self.consumed;
        let count = remaining.min(max);

        let taken = match op {
            TextOp::Insert { text, attributes } => TextOp::Insert {
                text: substring(text, self.consumed, self.consumed + count),
                attributes: attributes.clone(),
            },
            TextOp::Retain { attributes, .. } => TextOp::Retain {
                len: count,
                attributes: attributes.clone(),
            },
            TextOp::Delete { .. } => TextOp::Delete { len: count },
        };

        self.consumed += count;
        if self.consumed >= op.len() {
            self.index += 1;
            self.consumed = 0;
        }
        taken
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn substring(text: &str, from: usize, to: usize) -> String {
    text.chars().skip(from).take(to.saturating_sub(from)).collect()
}
