//! # Parser Registry
//!
//! Encoding is driven by a per-node-type registry: each [`NodeType`] maps
//! to a [`NodeParser`] that turns one node into one output fragment.
//! Composite parsers recurse through [`Encoder::encode_children`], which
//! routes every child back through the same registry, so a host can swap
//! the rendering of a single node type without touching the rest.
//!
//! A node type with no registered parser is skipped along with its
//! subtree. That is deliberately not an error: documents round-trip
//! through hosts that only understand a subset of node types, and a
//! partial export beats a failed one. Skips are recorded on the
//! [`Conversion`] report.

use doctree_model::{Node, NodeTree, NodeType};
use std::collections::HashMap;
use std::sync::Arc;

/// Converts one node into one output fragment.
///
/// Implementations must be side-effect-free and re-entrant: a composite
/// parser re-enters the encoder for its children.
pub trait NodeParser<O>: Send + Sync {
    fn parse(&self, node: &Node, encoder: &mut Encoder<'_, O>) -> O;
}

/// Maps node types to their parsers for one output format.
pub struct Registry<O> {
    parsers: HashMap<NodeType, Arc<dyn NodeParser<O>>>,
}

impl<O> Registry<O> {
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register (or replace) the parser for a node type.
    pub fn register(&mut self, node_type: NodeType, parser: Arc<dyn NodeParser<O>>) {
        self.parsers.insert(node_type, parser);
    }

    pub fn get(&self, node_type: &NodeType) -> Option<&Arc<dyn NodeParser<O>>> {
        self.parsers.get(node_type)
    }

    pub fn contains(&self, node_type: &NodeType) -> bool {
        self.parsers.contains_key(node_type)
    }
}

impl<O> Default for Registry<O> {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of converting a tree: the fragments produced for the root's
/// children, plus every node type that was skipped for lack of a parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion<O> {
    pub fragments: Vec<O>,
    pub skipped: Vec<NodeType>,
}

/// One conversion pass over a tree. Created per conversion; parsers
/// receive it to recurse into children.
pub struct Encoder<'a, O> {
    registry: &'a Registry<O>,
    skipped: Vec<NodeType>,
}

impl<'a, O> Encoder<'a, O> {
    pub fn new(registry: &'a Registry<O>) -> Self {
        Self {
            registry,
            skipped: Vec::new(),
        }
    }

    /// Encode one node, or record a skip when no parser is registered.
    pub fn encode_node(&mut self, node: &Node) -> Option<O> {
        let registry = self.registry;
        match registry.get(&node.node_type) {
            Some(parser) => Some(parser.parse(node, self)),
            None => {
                tracing::debug!(node_type = %node.node_type, "no parser registered, skipping subtree");
                self.skipped.push(node.node_type.clone());
                None
            }
        }
    }

    /// Encode all children of a node through the registry, dropping
    /// skipped ones.
    pub fn encode_children(&mut self, node: &Node) -> Vec<O> {
        node.children
            .iter()
            .filter_map(|child| self.encode_node(child))
            .collect()
    }
}

/// Convert a whole tree: encode every top-level node and collect the skip
/// report.
pub fn convert<O>(registry: &Registry<O>, tree: &NodeTree) -> Conversion<O> {
    let mut encoder = Encoder::new(registry);
    let fragments = encoder.encode_children(tree.root());
    Conversion {
        fragments,
        skipped: encoder.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctree_model::Delta;

    struct TextParser;

    impl NodeParser<String> for TextParser {
        fn parse(&self, node: &Node, _encoder: &mut Encoder<'_, String>) -> String {
            node.text()
        }
    }

    struct JoinChildrenParser;

    impl NodeParser<String> for JoinChildrenParser {
        fn parse(&self, node: &Node, encoder: &mut Encoder<'_, String>) -> String {
            encoder.encode_children(node).join("|")
        }
    }

    fn text_registry() -> Registry<String> {
        let mut registry = Registry::new();
        registry.register(NodeType::Paragraph, Arc::new(TextParser));
        registry.register(NodeType::BulletedList, Arc::new(JoinChildrenParser));
        registry.register(NodeType::ListItem, Arc::new(TextParser));
        registry
    }

    #[test]
    fn test_unknown_node_is_skipped_not_an_error() {
        let tree = NodeTree::from_children(vec![
            Node::new(NodeType::Paragraph).with_delta(Delta::from_text("kept")),
            Node::new(NodeType::Divider),
            Node::new(NodeType::Custom("embed".to_string())),
        ]);

        let conversion = convert(&text_registry(), &tree);
        assert_eq!(conversion.fragments, vec!["kept".to_string()]);
        assert_eq!(
            conversion.skipped,
            vec![
                NodeType::Divider,
                NodeType::Custom("embed".to_string())
            ]
        );
    }

    #[test]
    fn test_unknown_skip_covers_the_subtree() {
        // The quote's paragraph child has a parser, but the quote itself
        // does not, so neither appears in the output.
        let tree = NodeTree::from_children(vec![Node::new(NodeType::Quote).with_children(vec![
            Node::new(NodeType::Paragraph).with_delta(Delta::from_text("inside")),
        ])]);

        let conversion = convert(&text_registry(), &tree);
        assert!(conversion.fragments.is_empty());
        assert_eq!(conversion.skipped, vec![NodeType::Quote]);
    }

    #[test]
    fn test_composite_parser_recurses_through_registry() {
        let tree = NodeTree::from_children(vec![Node::new(NodeType::BulletedList).with_children(
            vec![
                Node::new(NodeType::ListItem).with_delta(Delta::from_text("a")),
                Node::new(NodeType::ListItem).with_delta(Delta::from_text("b")),
            ],
        )]);

        let conversion = convert(&text_registry(), &tree);
        assert_eq!(conversion.fragments, vec!["a|b".to_string()]);
        assert!(conversion.skipped.is_empty());
    }

    #[test]
    fn test_replacing_a_parser_changes_output() {
        struct Upper;
        impl NodeParser<String> for Upper {
            fn parse(&self, node: &Node, _: &mut Encoder<'_, String>) -> String {
                node.text().to_uppercase()
            }
        }

        let mut registry = text_registry();
        registry.register(NodeType::Paragraph, Arc::new(Upper));

        let tree = NodeTree::from_children(vec![
            Node::new(NodeType::Paragraph).with_delta(Delta::from_text("loud")),
        ]);
        let conversion = convert(&registry, &tree);
        assert_eq!(conversion.fragments, vec!["LOUD".to_string()]);
    }
}
