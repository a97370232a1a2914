//! Integration tests for the editor crate
//!
//! Exercises whole-session workflows: multi-operation transactions,
//! selection transformation across structural edits, and the undo
//! round-trip property over realistic edit sequences.

use doctree_editor::{EditSession, TransactionError};
use doctree_model::{
    Delta, Node, NodeTree, NodeType, Path, Position, Selection,
};

fn paragraph(text: &str) -> Node {
    Node::new(NodeType::Paragraph).with_delta(Delta::from_text(text))
}

fn list(items: &[&str]) -> Node {
    Node::new(NodeType::BulletedList).with_children(
        items
            .iter()
            .map(|text| Node::new(NodeType::ListItem).with_delta(Delta::from_text(*text)))
            .collect(),
    )
}

fn sample_session() -> EditSession {
    EditSession::with_tree(NodeTree::from_children(vec![
        paragraph("intro"),
        list(&["first", "second"]),
        paragraph("outro"),
    ]))
}

#[test]
fn test_editing_workflow() -> anyhow::Result<()> {
    let mut session = sample_session();
    session.set_selection(Some(Selection::collapsed(Position::new([0], 5))));

    // Type "!" at the end of the intro paragraph.
    let tx = session
        .begin_transaction()
        .update_text([0], Delta::new().retain(5, None).insert("!", None))
        .build();
    session.apply(tx)?;
    assert_eq!(session.node_at_path(&Path::from([0])).unwrap().text(), "intro!");

    // Add a heading above everything.
    let heading = Node::new(NodeType::Heading)
        .with_attribute("level", 1)
        .with_delta(Delta::from_text("Title"));
    let tx = session.begin_transaction().insert_node([0], heading).build();
    session.apply(tx)?;

    // The caret followed the shift.
    assert_eq!(
        session.selection(),
        Some(&Selection::collapsed(Position::new([1], 5)))
    );

    // Undo both edits.
    assert!(session.undo()?);
    assert!(session.undo()?);
    assert_eq!(session.node_at_path(&Path::from([0])).unwrap().text(), "intro");
    Ok(())
}

#[test]
fn test_undo_round_trip_over_mixed_transaction() -> anyhow::Result<()> {
    let mut session = sample_session();
    let original = session.tree().clone();
    session.set_selection(Some(Selection::new(
        Position::new([1, 0], 0),
        Position::new([1, 1], 3),
    )));
    let original_selection = session.selection().cloned();

    let mut checked = doctree_model::Attributes::new();
    checked.insert("checked".to_string(), serde_json::json!(true));

    let tx = session
        .begin_transaction()
        .update_text([1, 0], Delta::new().retain(5, None).insert(" item", None))
        .update_node([0], checked)
        .move_node([2], [0])
        .delete_node([1])
        .build();
    session.apply(tx)?;
    assert_ne!(session.tree(), &original);

    assert!(session.undo()?);
    assert_eq!(session.tree(), &original);
    assert_eq!(session.selection().cloned(), original_selection);

    assert!(session.redo()?);
    assert!(session.undo()?);
    assert_eq!(session.tree(), &original);
    Ok(())
}

#[test]
fn test_repeated_undo_redo_stability() -> anyhow::Result<()> {
    let mut session = sample_session();

    for i in 0..5 {
        let tx = session
            .begin_transaction()
            .insert_node([0], paragraph(&format!("edit {i}")))
            .build();
        session.apply(tx)?;
    }
    let edited = session.tree().clone();

    while session.undo()? {}
    assert_eq!(session.tree().root().children.len(), 3);

    while session.redo()? {}
    assert_eq!(session.tree(), &edited);
    Ok(())
}

#[test]
fn test_history_depth_is_bounded() -> anyhow::Result<()> {
    let mut session = EditSession::with_history_depth(NodeTree::new(), 3);

    for i in 0..10 {
        let tx = session
            .begin_transaction()
            .insert_node([0], paragraph(&format!("p{i}")))
            .build();
        session.apply(tx)?;
    }

    // Only the newest three entries survive; eviction is silent.
    let mut undone = 0;
    while session.undo()? {
        undone += 1;
    }
    assert_eq!(undone, 3);
    Ok(())
}

#[test]
fn test_selection_shift_matches_index_adjustment_rule() -> anyhow::Result<()> {
    // Insert at [2] with three existing children: a [3, 0] selection
    // becomes [4, 0]; deleting [2] shifts it back.
    let mut session = EditSession::with_tree(NodeTree::from_children(vec![
        paragraph("a"),
        paragraph("b"),
        paragraph("c"),
        paragraph("d"),
    ]));
    session.set_selection(Some(Selection::collapsed(Position::new([3], 0))));

    let tx = session
        .begin_transaction()
        .insert_node([2], paragraph("inserted"))
        .build();
    session.apply(tx)?;
    assert_eq!(
        session.selection(),
        Some(&Selection::collapsed(Position::new([4], 0)))
    );

    let tx = session.begin_transaction().delete_node([2]).build();
    session.apply(tx)?;
    assert_eq!(
        session.selection(),
        Some(&Selection::collapsed(Position::new([3], 0)))
    );
    Ok(())
}

#[test]
fn test_atomicity_across_operations() {
    let mut session = sample_session();
    let before = session.tree().clone();

    // Second operation fails validation; the first must not stick.
    let tx = session
        .begin_transaction()
        .update_text([0], Delta::from_text("x"))
        .delete_nodes([1, 0], 2)
        .build();

    let err = session.apply(tx).unwrap_err();
    assert!(matches!(
        err,
        TransactionError::StructuralInvariantViolation(_)
    ));
    assert_eq!(session.tree(), &before);
}

#[test]
fn test_length_mismatch_aborts() {
    let mut session = sample_session();
    let before = session.tree().clone();

    let tx = session
        .begin_transaction()
        .update_text([0], Delta::new().retain(50, None).insert("!", None))
        .build();

    let err = session.apply(tx).unwrap_err();
    assert!(matches!(err, TransactionError::LengthMismatch(_)));
    assert_eq!(session.tree(), &before);
}

#[test]
fn test_transaction_serialization_round_trip() -> anyhow::Result<()> {
    let session = sample_session();
    let tx = session
        .begin_transaction()
        .insert_node([1], paragraph("x"))
        .move_node([0], [2])
        .after_selection(Selection::collapsed(Position::new([2], 0)))
        .build();

    let json = serde_json::to_string(&tx)?;
    let parsed: doctree_editor::Transaction = serde_json::from_str(&json)?;
    assert_eq!(parsed, tx);
    Ok(())
}
