//! # Doctree Editor
//!
//! Transaction engine for the doctree rich-text document model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Node tree + Delta + Selection        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: transaction protocol                │
//! │  - Build operations against a tree shape    │
//! │  - Validate + apply atomically              │
//! │  - Transform the selection in lockstep      │
//! │  - Undo/redo via recorded inverses          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core principles
//!
//! 1. **The tree mutates only through transactions**: validation and
//!    structural invariants live in one place
//! 2. **Atomic**: a transaction either fully applies or leaves the
//!    document untouched
//! 3. **Selection moves with the edit**: structural splices rewrite the
//!    live selection with the same index rules as pending operations
//! 4. **Single writer**: one session owns one tree; `&mut self` is the
//!    serialization boundary
//!
//! ## Usage
//!
//! ```rust
//! use doctree_editor::EditSession;
//! use doctree_model::{Delta, Node, NodeType};
//!
//! let mut session = EditSession::new();
//!
//! let tx = session
//!     .begin_transaction()
//!     .insert_node([1], Node::new(NodeType::Paragraph).with_delta(Delta::from_text("hello")))
//!     .build();
//! session.apply(tx).unwrap();
//!
//! assert_eq!(session.tree().root().children.len(), 2);
//! ```

mod document;
mod errors;
mod session;
mod transaction;
mod undo_stack;

pub use document::{AppliedTransaction, Document};
pub use errors::TransactionError;
pub use session::EditSession;
pub use transaction::{Operation, Transaction, TransactionBuilder};
pub use undo_stack::{HistoryEntry, UndoStack};

// Re-export the model for convenience
pub use doctree_model as model;
