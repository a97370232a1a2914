//! Document nodes
//!
//! A node's type determines which attribute keys are meaningful, whether it
//! must carry a [`Delta`], and whether it is a container that requires
//! children. Nodes own their children directly, so the tree is a strict
//! single-ownership hierarchy with no parent back-pointers; paths are
//! derived by traversal, never stored.

use crate::attributes::Attributes;
use crate::delta::Delta;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Semantic kind of a node.
///
/// The built-in kinds form a closed set; `Custom` carries the tag of any
/// host-registered type. Encoders that meet an unregistered type skip it
/// rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Paragraph,
    Heading,
    Quote,
    BulletedList,
    NumberedList,
    ListItem,
    TodoList,
    CodeBlock,
    Divider,
    Image,
    Callout,
    Custom(String),
}

impl NodeType {
    /// Tag string used on the wire and in registries.
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Document => "document",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::Quote => "quote",
            NodeType::BulletedList => "bulleted_list",
            NodeType::NumberedList => "numbered_list",
            NodeType::ListItem => "list_item",
            NodeType::TodoList => "todo_list",
            NodeType::CodeBlock => "code_block",
            NodeType::Divider => "divider",
            NodeType::Image => "image",
            NodeType::Callout => "callout",
            NodeType::Custom(tag) => tag,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "document" => NodeType::Document,
            "paragraph" => NodeType::Paragraph,
            "heading" => NodeType::Heading,
            "quote" => NodeType::Quote,
            "bulleted_list" => NodeType::BulletedList,
            "numbered_list" => NodeType::NumberedList,
            "list_item" => NodeType::ListItem,
            "todo_list" => NodeType::TodoList,
            "code_block" => NodeType::CodeBlock,
            "divider" => NodeType::Divider,
            "image" => NodeType::Image,
            "callout" => NodeType::Callout,
            other => NodeType::Custom(other.to_string()),
        }
    }

    /// Kinds whose nodes must carry a delta once attached to a tree.
    pub fn is_text_bearing(&self) -> bool {
        matches!(
            self,
            NodeType::Paragraph
                | NodeType::Heading
                | NodeType::Quote
                | NodeType::ListItem
                | NodeType::TodoList
                | NodeType::CodeBlock
                | NodeType::Callout
        )
    }

    /// Container kinds that must keep at least one child.
    pub fn requires_children(&self) -> bool {
        matches!(self, NodeType::BulletedList | NodeType::NumberedList)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(NodeType::from_tag(&tag))
    }
}

/// A typed node in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub node_type: NodeType,

    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,

    /// Present only for text-bearing node types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
}

impl Node {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            attributes: Attributes::new(),
            children: Vec::new(),
            delta: None,
        }
    }

    /// Empty text-bearing paragraph, the normalization placeholder.
    pub fn empty_paragraph() -> Self {
        Self::new(NodeType::Paragraph).with_delta(Delta::new())
    }

    pub fn with_delta(mut self, delta: Delta) -> Self {
        self.delta = Some(delta);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn is_text_bearing(&self) -> bool {
        self.node_type.is_text_bearing()
    }

    /// Plain text of this node's delta, empty for non-text nodes.
    pub fn text(&self) -> String {
        self.delta
            .as_ref()
            .map(Delta::to_plain_text)
            .unwrap_or_default()
    }

    /// Character length of this node's text.
    pub fn text_len(&self) -> usize {
        self.delta.as_ref().map(Delta::text_len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_type_tag_round_trip() {
        for tag in [
            "document",
            "paragraph",
            "heading",
            "quote",
            "bulleted_list",
            "numbered_list",
            "list_item",
            "todo_list",
            "code_block",
            "divider",
            "image",
            "callout",
            "mermaid_diagram",
        ] {
            assert_eq!(NodeType::from_tag(tag).as_str(), tag);
        }
    }

    #[test]
    fn test_custom_type_is_not_text_bearing() {
        let custom = NodeType::from_tag("embed");
        assert_eq!(custom, NodeType::Custom("embed".to_string()));
        assert!(!custom.is_text_bearing());
        assert!(!custom.requires_children());
    }

    #[test]
    fn test_node_serialization() {
        let node = Node::new(NodeType::Heading)
            .with_attribute("level", 2)
            .with_delta(Delta::from_text("Title"));

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], json!("heading"));
        assert_eq!(json["attributes"]["level"], json!(2));

        let parsed: Node = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, node);
    }

    #[test]
    fn test_text_extraction() {
        let node = Node::new(NodeType::Paragraph).with_delta(Delta::from_text("héllo"));
        assert_eq!(node.text(), "héllo");
        assert_eq!(node.text_len(), 5);
        assert_eq!(Node::new(NodeType::Divider).text(), "");
    }
}
