//! # Doctree Model
//!
//! Core data model for the doctree rich-text engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Node tree + Delta + Selection        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: transactions, undo/redo, sessions   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ encoder: HTML / Markdown conversion         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! This crate is pure data plus algebra: nodes addressed by integer paths,
//! run-length rich text ([`Delta`]) with a compose/invert/slice algebra, and
//! anchor/focus selections. Mutation of a live tree happens exclusively
//! through the transaction engine in `doctree-editor`; the splice
//! primitives on [`NodeTree`] exist for it.

pub mod attributes;
pub mod delta;
pub mod error;
pub mod node;
pub mod path;
pub mod selection;
pub mod tree;

pub use attributes::{
    attr_bool, attr_i64, attr_str, compose_attributes, invert_attributes, Attributes,
};
pub use delta::{Delta, TextOp};
pub use error::{DeltaError, TreeError};
pub use node::{Node, NodeType};
pub use path::Path;
pub use selection::{Position, Selection};
pub use tree::NodeTree;
