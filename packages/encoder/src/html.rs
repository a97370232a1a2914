//! # HTML Encoding
//!
//! Renders a document tree to an HTML fragment. Parsers build an
//! [`HtmlNode`] element tree first; serialization to a string is a
//! separate pass, so hosts can post-process the structure (sanitizers,
//! class injection) before printing.

use crate::registry::{Encoder, NodeParser, Registry};
use doctree_model::attributes::{attr_bool, attr_i64, attr_str, keys};
use doctree_model::{Delta, Node, NodeTree, NodeType, TextOp};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One HTML output fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Element(HtmlElement),
    Text(String),
}

/// An element with attributes in sorted key order, for deterministic
/// output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlElement {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<HtmlNode>,
}

impl HtmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: HtmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: Vec<HtmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn into_node(self) -> HtmlNode {
        HtmlNode::Element(self)
    }
}

impl HtmlNode {
    pub fn text(text: impl Into<String>) -> Self {
        HtmlNode::Text(text.into())
    }

    /// Serialize to a string with escaped text and attribute values.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            HtmlNode::Text(text) => out.push_str(&escape_html(text)),
            HtmlNode::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_html(value));
                    out.push('"');
                }
                if element.children.is_empty() && is_self_closing(&element.tag) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for child in &element.children {
                    child.render_into(out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_self_closing(tag: &str) -> bool {
    matches!(tag, "img" | "input" | "br" | "hr")
}

/// Render a delta's insert runs as inline HTML, wrapping each run in the
/// mark elements its attributes call for. Nesting order is fixed (link
/// outermost, code innermost) so output is deterministic.
pub fn inline_html(delta: &Delta) -> Vec<HtmlNode> {
    let mut nodes = Vec::new();
    for op in delta.ops() {
        let (text, attributes) = match op {
            TextOp::Insert { text, attributes } => (text, attributes),
            _ => continue,
        };

        let mut node = HtmlNode::text(text.clone());
        if let Some(attrs) = attributes {
            if attr_bool(attrs, keys::CODE).unwrap_or(false) {
                node = HtmlElement::new("code").child(node).into_node();
            }
            if attr_bool(attrs, keys::STRIKETHROUGH).unwrap_or(false) {
                node = HtmlElement::new("del").child(node).into_node();
            }
            if attr_bool(attrs, keys::ITALIC).unwrap_or(false) {
                node = HtmlElement::new("em").child(node).into_node();
            }
            if attr_bool(attrs, keys::BOLD).unwrap_or(false) {
                node = HtmlElement::new("strong").child(node).into_node();
            }
            if let Some(href) = attr_str(attrs, keys::HREF) {
                node = HtmlElement::new("a").attr("href", href).child(node).into_node();
            }
        }
        nodes.push(node);
    }
    nodes
}

fn inline_of(node: &Node) -> Vec<HtmlNode> {
    node.delta.as_ref().map(inline_html).unwrap_or_default()
}

struct ParagraphParser;

impl NodeParser<HtmlNode> for ParagraphParser {
    fn parse(&self, node: &Node, _encoder: &mut Encoder<'_, HtmlNode>) -> HtmlNode {
        HtmlElement::new("p").children(inline_of(node)).into_node()
    }
}

struct HeadingParser;

impl NodeParser<HtmlNode> for HeadingParser {
    fn parse(&self, node: &Node, _encoder: &mut Encoder<'_, HtmlNode>) -> HtmlNode {
        let level = attr_i64(&node.attributes, keys::LEVEL)
            .unwrap_or(1)
            .clamp(1, 6);
        HtmlElement::new(format!("h{level}"))
            .children(inline_of(node))
            .into_node()
    }
}

struct QuoteParser;

impl NodeParser<HtmlNode> for QuoteParser {
    fn parse(&self, node: &Node, encoder: &mut Encoder<'_, HtmlNode>) -> HtmlNode {
        HtmlElement::new("blockquote")
            .children(inline_of(node))
            .children(encoder.encode_children(node))
            .into_node()
    }
}

struct ListParser {
    tag: &'static str,
}

impl NodeParser<HtmlNode> for ListParser {
    fn parse(&self, node: &Node, encoder: &mut Encoder<'_, HtmlNode>) -> HtmlNode {
        HtmlElement::new(self.tag)
            .children(encoder.encode_children(node))
            .into_node()
    }
}

struct ListItemParser;

impl NodeParser<HtmlNode> for ListItemParser {
    fn parse(&self, node: &Node, encoder: &mut Encoder<'_, HtmlNode>) -> HtmlNode {
        HtmlElement::new("li")
            .children(inline_of(node))
            .children(encoder.encode_children(node))
            .into_node()
    }
}

struct TodoParser;

impl NodeParser<HtmlNode> for TodoParser {
    fn parse(&self, node: &Node, _encoder: &mut Encoder<'_, HtmlNode>) -> HtmlNode {
        let mut checkbox = HtmlElement::new("input").attr("type", "checkbox");
        if attr_bool(&node.attributes, keys::CHECKED).unwrap_or(false) {
            checkbox = checkbox.attr("checked", "");
        }
        HtmlElement::new("p")
            .child(checkbox.into_node())
            .children(inline_of(node))
            .into_node()
    }
}

struct CodeBlockParser;

impl NodeParser<HtmlNode> for CodeBlockParser {
    fn parse(&self, node: &Node, _encoder: &mut Encoder<'_, HtmlNode>) -> HtmlNode {
        let mut code = HtmlElement::new("code");
        if let Some(language) = attr_str(&node.attributes, keys::LANGUAGE) {
            code = code.attr("class", format!("language-{language}"));
        }
        code = code.child(HtmlNode::text(node.text()));
        HtmlElement::new("pre").child(code.into_node()).into_node()
    }
}

struct DividerParser;

impl NodeParser<HtmlNode> for DividerParser {
    fn parse(&self, _node: &Node, _encoder: &mut Encoder<'_, HtmlNode>) -> HtmlNode {
        HtmlElement::new("hr").into_node()
    }
}

struct ImageParser;

impl NodeParser<HtmlNode> for ImageParser {
    fn parse(&self, node: &Node, _encoder: &mut Encoder<'_, HtmlNode>) -> HtmlNode {
        let mut img = HtmlElement::new("img");
        if let Some(src) = attr_str(&node.attributes, keys::SRC) {
            img = img.attr("src", src);
        }
        if let Some(alt) = attr_str(&node.attributes, "alt") {
            img = img.attr("alt", alt);
        }
        img.into_node()
    }
}

struct CalloutParser;

impl NodeParser<HtmlNode> for CalloutParser {
    fn parse(&self, node: &Node, encoder: &mut Encoder<'_, HtmlNode>) -> HtmlNode {
        HtmlElement::new("aside")
            .children(inline_of(node))
            .children(encoder.encode_children(node))
            .into_node()
    }
}

/// Registry with the default HTML rendering for every built-in node type.
pub fn html_registry() -> Registry<HtmlNode> {
    let mut registry = Registry::new();
    registry.register(NodeType::Paragraph, Arc::new(ParagraphParser));
    registry.register(NodeType::Heading, Arc::new(HeadingParser));
    registry.register(NodeType::Quote, Arc::new(QuoteParser));
    registry.register(NodeType::BulletedList, Arc::new(ListParser { tag: "ul" }));
    registry.register(NodeType::NumberedList, Arc::new(ListParser { tag: "ol" }));
    registry.register(NodeType::ListItem, Arc::new(ListItemParser));
    registry.register(NodeType::TodoList, Arc::new(TodoParser));
    registry.register(NodeType::CodeBlock, Arc::new(CodeBlockParser));
    registry.register(NodeType::Divider, Arc::new(DividerParser));
    registry.register(NodeType::Image, Arc::new(ImageParser));
    registry.register(NodeType::Callout, Arc::new(CalloutParser));
    registry
}

/// Encode a tree to an HTML fragment string with the default registry.
pub fn encode_html(tree: &NodeTree) -> String {
    encode_html_with_registry(tree, &html_registry())
}

/// Encode a tree to HTML through a custom registry.
pub fn encode_html_with_registry(tree: &NodeTree, registry: &Registry<HtmlNode>) -> String {
    crate::registry::convert(registry, tree)
        .fragments
        .iter()
        .map(HtmlNode::render)
        .collect::<Vec<_>>()
        .join("\n")
}
