//! # Doctree Commands
//!
//! Keyboard shortcut grammar and priority-ordered command dispatch for
//! the doctree editor.
//!
//! ## Architecture
//!
//! ```text
//! host key event ──▶ CommandRegistry::dispatch
//!                      │  resolve platform once
//!                      │  match KeyCombos, highest priority first
//!                      ▼
//!                    handler(&mut EditSession, &dyn HostEnvironment)
//!                      │  Handled  → DispatchOutcome::Handled
//!                      │  Ignored  → try the next handler
//!                      ▼
//!                    no claimant → DispatchOutcome::PassThrough
//! ```
//!
//! The tri-state split matters for embedding: `Ignored` lets a handler
//! decline an event it is bound to but cannot act on, while
//! `PassThrough` tells the host to run its default behavior (usually
//! inserting the typed character).

mod dispatch;
mod shortcut;

pub use dispatch::{
    CommandHandler, CommandRegistry, CommandResult, DispatchOutcome, HostEnvironment,
};
pub use shortcut::{KeyCombo, KeyEvent, Platform, ShortcutError};
