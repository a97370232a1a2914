//! # Command Dispatch
//!
//! Maps keyboard events to editing commands. Hosts register handlers
//! against [`KeyCombo`]s with a priority; a key event is offered to the
//! matching handlers from highest priority down until one claims it.
//!
//! Handlers report [`CommandResult::Ignored`] when their preconditions do
//! not hold (collapsed selection, wrong node type, mobile platform) so the
//! event keeps falling through; a fully unclaimed event comes back as
//! [`DispatchOutcome::PassThrough`] and the host applies its default
//! behavior, typically plain text input.

use crate::shortcut::{KeyCombo, KeyEvent, Platform};
use doctree_editor::{EditSession, TransactionError};

/// Host services the dispatcher and handlers may consult. Injected, never
/// constructed here; tests use fakes.
pub trait HostEnvironment {
    fn platform(&self) -> Platform;
    fn is_mobile(&self) -> bool;
}

/// What a handler did with the event it was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// The handler consumed the event; dispatch stops.
    Handled,
    /// Preconditions not met; offer the event to the next handler.
    Ignored,
}

/// Final verdict for one key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Some handler claimed the event.
    Handled,
    /// No handler claimed it; the host default applies.
    PassThrough,
}

/// A command handler. Mutates the document only through the session's
/// transaction API.
pub type CommandHandler = Box<
    dyn Fn(&mut EditSession, &dyn HostEnvironment) -> Result<CommandResult, TransactionError>
        + Send
        + Sync,
>;

struct Binding {
    combo: KeyCombo,
    priority: i32,
    handler: CommandHandler,
}

/// Priority-ordered shortcut table.
pub struct CommandRegistry {
    /// Sorted by descending priority; equal priorities keep registration
    /// order.
    bindings: Vec<Binding>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Register a handler for a shortcut. Higher priority is consulted
    /// first; ties resolve in registration order.
    pub fn register_shortcut<F>(&mut self, combo: KeyCombo, priority: i32, handler: F)
    where
        F: Fn(&mut EditSession, &dyn HostEnvironment) -> Result<CommandResult, TransactionError>
            + Send
            + Sync
            + 'static,
    {
        let binding = Binding {
            combo,
            priority,
            handler: Box::new(handler),
        };
        let at = self
            .bindings
            .iter()
            .position(|existing| existing.priority < priority)
            .unwrap_or(self.bindings.len());
        self.bindings.insert(at, binding);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Offer one key event to the registered handlers.
    ///
    /// The platform is read from the host once per dispatch, so every
    /// handler sees the same `mod` resolution. Handler errors abort the
    /// dispatch; the failing transaction has already rolled itself back.
    pub fn dispatch(
        &self,
        event: &KeyEvent,
        session: &mut EditSession,
        host: &dyn HostEnvironment,
    ) -> Result<DispatchOutcome, TransactionError> {
        let platform = host.platform();

        for binding in &self.bindings {
            if !binding.combo.matches(event, platform) {
                continue;
            }
            match (binding.handler)(session, host)? {
                CommandResult::Handled => {
                    tracing::debug!(combo = %binding.combo, "shortcut handled");
                    return Ok(DispatchOutcome::Handled);
                }
                CommandResult::Ignored => continue,
            }
        }
        Ok(DispatchOutcome::PassThrough)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctree_model::{Delta, Node, NodeTree, NodeType, Position, Selection};
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Desktop;

    impl HostEnvironment for Desktop {
        fn platform(&self) -> Platform {
            Platform::Linux
        }

        fn is_mobile(&self) -> bool {
            false
        }
    }

    struct CountingHost {
        platform_calls: Cell<usize>,
    }

    impl HostEnvironment for CountingHost {
        fn platform(&self) -> Platform {
            self.platform_calls.set(self.platform_calls.get() + 1);
            Platform::MacOs
        }

        fn is_mobile(&self) -> bool {
            false
        }
    }

    fn session() -> EditSession {
        EditSession::with_tree(NodeTree::from_children(vec![
            Node::new(NodeType::Paragraph).with_delta(Delta::from_text("hello")),
        ]))
    }

    #[test]
    fn test_unmatched_event_passes_through() {
        let registry = CommandRegistry::new();
        let mut session = session();
        let outcome = registry
            .dispatch(&KeyEvent::new("k"), &mut session, &Desktop)
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::PassThrough);
    }

    #[test]
    fn test_handler_claims_event() {
        let mut registry = CommandRegistry::new();
        registry.register_shortcut(KeyCombo::parse("ctrl+b").unwrap(), 0, |session, _| {
            let tx = session
                .begin_transaction()
                .insert_node([0], Node::empty_paragraph())
                .build();
            session.apply(tx)?;
            Ok(CommandResult::Handled)
        });

        let mut session = session();
        let outcome = registry
            .dispatch(&KeyEvent::new("b").with_ctrl(), &mut session, &Desktop)
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(session.tree().root().children.len(), 2);
    }

    #[test]
    fn test_ignored_falls_through_without_mutation() {
        // A bold handler requires a non-collapsed selection; with a caret
        // it must leave the tree alone and yield to lower priorities.
        let mut registry = CommandRegistry::new();
        let fallback_ran = Arc::new(AtomicUsize::new(0));
        let counter = fallback_ran.clone();

        registry.register_shortcut(KeyCombo::parse("mod+b").unwrap(), 10, |session, _| {
            match session.selection() {
                Some(selection) if !selection.is_collapsed() => {
                    let tx = session.begin_transaction().delete_node([0]).build();
                    session.apply(tx)?;
                    Ok(CommandResult::Handled)
                }
                _ => Ok(CommandResult::Ignored),
            }
        });
        registry.register_shortcut(KeyCombo::parse("mod+b").unwrap(), 0, move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(CommandResult::Ignored)
        });

        let mut session = session();
        session.set_selection(Some(Selection::collapsed(Position::new([0], 0))));
        let before = session.tree().clone();

        let outcome = registry
            .dispatch(&KeyEvent::new("b").with_ctrl(), &mut session, &Desktop)
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::PassThrough);
        assert_eq!(session.tree(), &before);
        assert_eq!(fallback_ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_priority_order_and_stable_ties() {
        let mut registry = CommandRegistry::new();
        let trace = Arc::new(std::sync::Mutex::new(Vec::new()));

        for (label, priority) in [("low", -5), ("first-tie", 0), ("second-tie", 0), ("high", 9)] {
            let trace = trace.clone();
            registry.register_shortcut(KeyCombo::parse("ctrl+k").unwrap(), priority, move |_, _| {
                trace.lock().unwrap().push(label);
                Ok(CommandResult::Ignored)
            });
        }

        let mut session = session();
        registry
            .dispatch(&KeyEvent::new("k").with_ctrl(), &mut session, &Desktop)
            .unwrap();

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["high", "first-tie", "second-tie", "low"]
        );
    }

    #[test]
    fn test_platform_resolved_once_per_dispatch() {
        let mut registry = CommandRegistry::new();
        for _ in 0..4 {
            registry.register_shortcut(KeyCombo::parse("mod+z").unwrap(), 0, |_, _| {
                Ok(CommandResult::Ignored)
            });
        }

        let host = CountingHost {
            platform_calls: Cell::new(0),
        };
        let mut session = session();
        registry
            .dispatch(&KeyEvent::new("z").with_meta(), &mut session, &host)
            .unwrap();

        assert_eq!(host.platform_calls.get(), 1);
    }

    #[test]
    fn test_mobile_guard_via_host() {
        struct Mobile;
        impl HostEnvironment for Mobile {
            fn platform(&self) -> Platform {
                Platform::Linux
            }
            fn is_mobile(&self) -> bool {
                true
            }
        }

        let mut registry = CommandRegistry::new();
        registry.register_shortcut(KeyCombo::parse("ctrl+k").unwrap(), 0, |session, host| {
            if host.is_mobile() {
                return Ok(CommandResult::Ignored);
            }
            let tx = session.begin_transaction().delete_node([0]).build();
            session.apply(tx)?;
            Ok(CommandResult::Handled)
        });

        let mut session = session();
        let outcome = registry
            .dispatch(&KeyEvent::new("k").with_ctrl(), &mut session, &Mobile)
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::PassThrough);
    }

    #[test]
    fn test_handler_error_propagates() {
        let mut registry = CommandRegistry::new();
        registry.register_shortcut(KeyCombo::parse("ctrl+d").unwrap(), 0, |session, _| {
            let tx = session.begin_transaction().delete_node([99]).build();
            session.apply(tx)?;
            Ok(CommandResult::Handled)
        });

        let mut session = session();
        let result = registry.dispatch(&KeyEvent::new("d").with_ctrl(), &mut session, &Desktop);
        assert!(result.is_err());
    }
}
