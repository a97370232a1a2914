//! # Doctree Encoder
//!
//! Converts document trees to HTML and Markdown, and parses Markdown back
//! into trees.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Registry<O>: NodeType → Arc<dyn NodeParser>  │
//! └──────────────────────────────────────────────┘
//!          │ encode_node / encode_children
//!          ▼
//! ┌──────────────┐   ┌────────────────────────────┐
//! │ html:        │   │ markdown:                  │
//! │ HtmlNode     │   │ String blocks + the        │
//! │ element tree │   │ line-oriented decoder      │
//! └──────────────┘   └────────────────────────────┘
//! ```
//!
//! Each output format is one registry; hosts override or extend a format
//! by registering parsers for their own node types. Unregistered node
//! types are skipped and reported, never fatal.
//!
//! ## Usage
//!
//! ```rust
//! use doctree_encoder::{decode_markdown, encode_html};
//!
//! let tree = decode_markdown("# Hi\n\nSome **bold** text.");
//! let html = encode_html(&tree);
//! assert_eq!(html, "<h1>Hi</h1>\n<p>Some <strong>bold</strong> text.</p>");
//! ```

pub mod html;
pub mod markdown;
pub mod registry;

pub use html::{encode_html, encode_html_with_registry, html_registry, HtmlElement, HtmlNode};
pub use markdown::{
    decode_markdown, encode_markdown, encode_markdown_with_registry, markdown_registry,
};
pub use registry::{convert, Conversion, Encoder, NodeParser, Registry};
