//! # Markdown Encoding and Decoding
//!
//! Encoding goes through the same registry mechanism as HTML, with
//! `String` block fragments joined by blank lines. Decoding is
//! line-oriented with a fixed marker precedence: fenced code, then
//! heading, divider, todo, bulleted, numbered, quote, image, and finally
//! the paragraph fallback. Consecutive list lines group under one list
//! container.
//!
//! Markdown cannot express everything the model can (callouts render as
//! quotes, nested list indentation does not survive a round trip), but
//! node types and text content are preserved for everything Markdown has
//! syntax for.

use crate::registry::{Encoder, NodeParser, Registry};
use doctree_model::attributes::{attr_bool, attr_i64, attr_str, keys};
use doctree_model::{Attributes, Delta, Node, NodeTree, NodeType, TextOp};
use serde_json::json;
use std::sync::Arc;

// --- encode ---

/// Render a delta's insert runs as inline Markdown. Marker order is fixed
/// (code bare, italic inside bold inside strike, link outermost) so the
/// same delta always prints the same bytes.
pub fn inline_markdown(delta: &Delta) -> String {
    let mut out = String::new();
    for op in delta.ops() {
        let (text, attributes) = match op {
            TextOp::Insert { text, attributes } => (text, attributes),
            _ => continue,
        };

        let mut rendered = text.clone();
        if let Some(attrs) = attributes {
            if attr_bool(attrs, keys::CODE).unwrap_or(false) {
                rendered = format!("`{rendered}`");
            } else {
                if attr_bool(attrs, keys::ITALIC).unwrap_or(false) {
                    rendered = format!("_{rendered}_");
                }
                if attr_bool(attrs, keys::BOLD).unwrap_or(false) {
                    rendered = format!("**{rendered}**");
                }
                if attr_bool(attrs, keys::STRIKETHROUGH).unwrap_or(false) {
                    rendered = format!("~~{rendered}~~");
                }
            }
            if let Some(href) = attr_str(attrs, keys::HREF) {
                rendered = format!("[{rendered}]({href})");
            }
        }
        out.push_str(&rendered);
    }
    out
}

fn inline_of(node: &Node) -> String {
    node.delta.as_ref().map(inline_markdown).unwrap_or_default()
}

fn prefix_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

struct MdParagraph;

impl NodeParser<String> for MdParagraph {
    fn parse(&self, node: &Node, _encoder: &mut Encoder<'_, String>) -> String {
        inline_of(node)
    }
}

struct MdHeading;

impl NodeParser<String> for MdHeading {
    fn parse(&self, node: &Node, _encoder: &mut Encoder<'_, String>) -> String {
        let level = attr_i64(&node.attributes, keys::LEVEL)
            .unwrap_or(1)
            .clamp(1, 6) as usize;
        format!("{} {}", "#".repeat(level), inline_of(node))
    }
}

struct MdQuote;

impl NodeParser<String> for MdQuote {
    fn parse(&self, node: &Node, encoder: &mut Encoder<'_, String>) -> String {
        let mut body = vec![inline_of(node)];
        body.extend(encoder.encode_children(node));
        let body: Vec<String> = body.into_iter().filter(|s| !s.is_empty()).collect();
        prefix_lines(&body.join("\n"), "> ")
    }
}

struct MdBulletedList;

impl NodeParser<String> for MdBulletedList {
    fn parse(&self, node: &Node, encoder: &mut Encoder<'_, String>) -> String {
        encoder
            .encode_children(node)
            .iter()
            .map(|item| marker_item("- ", item))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct MdNumberedList;

impl NodeParser<String> for MdNumberedList {
    fn parse(&self, node: &Node, encoder: &mut Encoder<'_, String>) -> String {
        encoder
            .encode_children(node)
            .iter()
            .enumerate()
            .map(|(index, item)| marker_item(&format!("{}. ", index + 1), item))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Prefix the first line of an item with its list marker and indent any
/// continuation lines under it.
fn marker_item(marker: &str, item: &str) -> String {
    let mut lines = item.lines();
    let first = lines.next().unwrap_or_default();
    let mut out = format!("{marker}{first}");
    for line in lines {
        out.push('\n');
        out.push_str("  ");
        out.push_str(line);
    }
    out
}

struct MdListItem;

impl NodeParser<String> for MdListItem {
    fn parse(&self, node: &Node, encoder: &mut Encoder<'_, String>) -> String {
        let mut body = vec![inline_of(node)];
        body.extend(encoder.encode_children(node));
        body.into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct MdTodo;

impl NodeParser<String> for MdTodo {
    fn parse(&self, node: &Node, _encoder: &mut Encoder<'_, String>) -> String {
        let mark = if attr_bool(&node.attributes, keys::CHECKED).unwrap_or(false) {
            "x"
        } else {
            " "
        };
        format!("- [{mark}] {}", inline_of(node))
    }
}

struct MdCodeBlock;

impl NodeParser<String> for MdCodeBlock {
    fn parse(&self, node: &Node, _encoder: &mut Encoder<'_, String>) -> String {
        let language = attr_str(&node.attributes, keys::LANGUAGE).unwrap_or_default();
        format!("```{language}\n{}\n```", node.text())
    }
}

struct MdDivider;

impl NodeParser<String> for MdDivider {
    fn parse(&self, _node: &Node, _encoder: &mut Encoder<'_, String>) -> String {
        "---".to_string()
    }
}

struct MdImage;

impl NodeParser<String> for MdImage {
    fn parse(&self, node: &Node, _encoder: &mut Encoder<'_, String>) -> String {
        let src = attr_str(&node.attributes, keys::SRC).unwrap_or_default();
        let alt = attr_str(&node.attributes, "alt").unwrap_or_default();
        format!("![{alt}]({src})")
    }
}

/// Registry with the default Markdown rendering for every built-in node
/// type. Callouts have no Markdown syntax and render as quotes.
pub fn markdown_registry() -> Registry<String> {
    let mut registry = Registry::new();
    registry.register(NodeType::Paragraph, Arc::new(MdParagraph));
    registry.register(NodeType::Heading, Arc::new(MdHeading));
    registry.register(NodeType::Quote, Arc::new(MdQuote));
    registry.register(NodeType::BulletedList, Arc::new(MdBulletedList));
    registry.register(NodeType::NumberedList, Arc::new(MdNumberedList));
    registry.register(NodeType::ListItem, Arc::new(MdListItem));
    registry.register(NodeType::TodoList, Arc::new(MdTodo));
    registry.register(NodeType::CodeBlock, Arc::new(MdCodeBlock));
    registry.register(NodeType::Divider, Arc::new(MdDivider));
    registry.register(NodeType::Image, Arc::new(MdImage));
    registry.register(NodeType::Callout, Arc::new(MdQuote));
    registry
}

/// Encode a tree to Markdown with the default registry.
pub fn encode_markdown(tree: &NodeTree) -> String {
    encode_markdown_with_registry(tree, &markdown_registry())
}

/// Encode a tree to Markdown through a custom registry. Block fragments
/// are joined by blank lines.
pub fn encode_markdown_with_registry(tree: &NodeTree, registry: &Registry<String>) -> String {
    crate::registry::convert(registry, tree).fragments.join("\n\n")
}

// --- decode ---

/// Parse a Markdown document into a node tree.
pub fn decode_markdown(input: &str) -> NodeTree {
    let lines: Vec<&str> = input.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim_end();
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        if let Some(rest) = line.strip_prefix("```") {
            let language = rest.trim().to_string();
            let mut body = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].trim_end().starts_with("```") {
                body.push(lines[i]);
                i += 1;
            }
            if i < lines.len() {
                i += 1;
            }
            let mut node =
                Node::new(NodeType::CodeBlock).with_delta(Delta::from_text(body.join("\n")));
            if !language.is_empty() {
                node = node.with_attribute(keys::LANGUAGE, language);
            }
            blocks.push(node);
            continue;
        }

        if let Some((level, text)) = parse_heading(line) {
            blocks.push(
                Node::new(NodeType::Heading)
                    .with_attribute(keys::LEVEL, level as i64)
                    .with_delta(parse_inline(text)),
            );
            i += 1;
            continue;
        }

        if line == "---" || line == "***" {
            blocks.push(Node::new(NodeType::Divider));
            i += 1;
            continue;
        }

        if let Some((checked, text)) = parse_todo(line) {
            blocks.push(
                Node::new(NodeType::TodoList)
                    .with_attribute(keys::CHECKED, checked)
                    .with_delta(parse_inline(text)),
            );
            i += 1;
            continue;
        }

        if parse_bullet(line).is_some() {
            let mut items = Vec::new();
            while i < lines.len() {
                let item_line = lines[i].trim_end();
                if parse_todo(item_line).is_some() {
                    break;
                }
                let Some(text) = parse_bullet(item_line) else {
                    break;
                };
                items.push(Node::new(NodeType::ListItem).with_delta(parse_inline(text)));
                i += 1;
            }
            blocks.push(Node::new(NodeType::BulletedList).with_children(items));
            continue;
        }

        if parse_numbered(line).is_some() {
            let mut items = Vec::new();
            while i < lines.len() {
                let Some(text) = parse_numbered(lines[i].trim_end()) else {
                    break;
                };
                items.push(Node::new(NodeType::ListItem).with_delta(parse_inline(text)));
                i += 1;
            }
            blocks.push(Node::new(NodeType::NumberedList).with_children(items));
            continue;
        }

        if line.starts_with('>') {
            let mut quoted = Vec::new();
            while i < lines.len() {
                let Some(rest) = lines[i].trim_end().strip_prefix('>') else {
                    break;
                };
                quoted.push(rest.strip_prefix(' ').unwrap_or(rest));
                i += 1;
            }
            blocks.push(Node::new(NodeType::Quote).with_delta(parse_inline(&quoted.join("\n"))));
            continue;
        }

        if let Some((alt, src)) = parse_image(line) {
            let mut node = Node::new(NodeType::Image).with_attribute(keys::SRC, src);
            if !alt.is_empty() {
                node = node.with_attribute("alt", alt);
            }
            blocks.push(node);
            i += 1;
            continue;
        }

        // Paragraph fallback: merge consecutive plain lines into one node.
        let mut paragraph = vec![line];
        i += 1;
        while i < lines.len() {
            let next = lines[i].trim_end();
            if next.trim().is_empty() || is_block_marker(next) {
                break;
            }
            paragraph.push(next);
            i += 1;
        }
        blocks.push(Node::new(NodeType::Paragraph).with_delta(parse_inline(&paragraph.join("\n"))));
    }

    NodeTree::from_children(blocks)
}

fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if (1..=6).contains(&level) {
        line[level..].strip_prefix(' ').map(|text| (level, text))
    } else {
        None
    }
}

fn parse_bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

fn parse_todo(line: &str) -> Option<(bool, &str)> {
    if let Some(text) = line.strip_prefix("- [ ] ") {
        return Some((false, text));
    }
    line.strip_prefix("- [x] ")
        .or_else(|| line.strip_prefix("- [X] "))
        .map(|text| (true, text))
}

fn parse_numbered(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ")
}

fn parse_image(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("![")?;
    let alt_end = rest.find("](")?;
    let src = rest[alt_end + 2..].strip_suffix(')')?;
    Some((&rest[..alt_end], src))
}

fn is_block_marker(line: &str) -> bool {
    line.starts_with("```")
        || line.starts_with('>')
        || line.starts_with("![")
        || line == "---"
        || line == "***"
        || parse_heading(line).is_some()
        || parse_bullet(line).is_some()
        || parse_numbered(line).is_some()
}

/// Parse inline Markdown into attributed delta runs.
pub fn parse_inline(text: &str) -> Delta {
    let mut delta = Delta::new();
    parse_inline_into(text, &Attributes::new(), &mut delta);
    delta
}

fn parse_inline_into(text: &str, attrs: &Attributes, delta: &mut Delta) {
    let mut plain = String::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        if rest.starts_with('[') {
            if let Some(consumed) = try_link(rest, attrs, &mut plain, delta) {
                i += consumed;
                continue;
            }
        }
        if rest.starts_with("**") {
            if let Some(end) = rest[2..].find("**") {
                flush(&mut plain, attrs, delta);
                parse_inline_into(&rest[2..2 + end], &with_mark(attrs, keys::BOLD), delta);
                i += end + 4;
                continue;
            }
        }
        if rest.starts_with("~~") {
            if let Some(end) = rest[2..].find("~~") {
                flush(&mut plain, attrs, delta);
                parse_inline_into(
                    &rest[2..2 + end],
                    &with_mark(attrs, keys::STRIKETHROUGH),
                    delta,
                );
                i += end + 4;
                continue;
            }
        }
        if rest.starts_with('`') {
            if let Some(end) = rest[1..].find('`') {
                flush(&mut plain, attrs, delta);
                // Code spans are literal; no nested marks.
                let mut code_attrs = attrs.clone();
                code_attrs.insert(keys::CODE.to_string(), json!(true));
                delta.push(TextOp::insert_with(&rest[1..1 + end], code_attrs));
                i += end + 2;
                continue;
            }
        }
        // `_` only opens emphasis at a word boundary, so identifiers like
        // `snake_case_name` stay literal.
        if rest.starts_with('_') && at_word_boundary(text, i) {
            if let Some(end) = rest[1..].find('_') {
                let follows = rest[end + 2..].chars().next();
                if !follows.map_or(false, char::is_alphanumeric) {
                    flush(&mut plain, attrs, delta);
                    parse_inline_into(&rest[1..1 + end], &with_mark(attrs, keys::ITALIC), delta);
                    i += end + 2;
                    continue;
                }
            }
        }

        // Unmarked (or unmatched marker) text advances one char.
        let ch_len = rest.chars().next().map_or(1, char::len_utf8);
        plain.push_str(&rest[..ch_len]);
        i += ch_len;
    }

    flush(&mut plain, attrs, delta);
}

/// Try `[text](href)` at the start of `rest`; returns bytes consumed.
fn try_link(
    rest: &str,
    attrs: &Attributes,
    plain: &mut String,
    delta: &mut Delta,
) -> Option<usize> {
    let label_end = rest.find("](")?;
    let href_end = rest[label_end + 2..].find(')')?;
    let label = &rest[1..label_end];
    let href = &rest[label_end + 2..label_end + 2 + href_end];

    flush(plain, attrs, delta);
    let mut linked = attrs.clone();
    linked.insert(keys::HREF.to_string(), json!(href));
    parse_inline_into(label, &linked, delta);
    Some(label_end + 2 + href_end + 1)
}

/// True when the byte at `i` is not preceded by an alphanumeric character.
fn at_word_boundary(text: &str, i: usize) -> bool {
    text[..i]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric())
}

fn with_mark(attrs: &Attributes, key: &str) -> Attributes {
    let mut marked = attrs.clone();
    marked.insert(key.to_string(), json!(true));
    marked
}

fn flush(plain: &mut String, attrs: &Attributes, delta: &mut Delta) {
    if plain.is_empty() {
        return;
    }
    let run = std::mem::take(plain);
    if attrs.is_empty() {
        delta.push(TextOp::insert(run));
    } else {
        delta.push(TextOp::insert_with(run, attrs.clone()));
    }
}
