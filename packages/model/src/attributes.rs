//! Attribute maps
//!
//! Attributes are JSON object maps. When a map is applied as a patch, a
//! `null` value is the delete-key sentinel rather than a stored value.

use serde_json::Value;

/// Attribute map for nodes and delta runs. Keys are unique; iteration order
/// is the map's sorted key order, which keeps serialization and encoding
/// deterministic.
pub type Attributes = serde_json::Map<String, Value>;

/// Well-known attribute keys shared across the engine and the encoders.
pub mod keys {
    /// Heading level, 1..=6.
    pub const LEVEL: &str = "level";
    /// Todo checked state.
    pub const CHECKED: &str = "checked";
    /// Code block language.
    pub const LANGUAGE: &str = "language";
    /// Image source URL.
    pub const SRC: &str = "src";

    // Inline formatting keys carried on delta runs.
    pub const BOLD: &str = "bold";
    pub const ITALIC: &str = "italic";
    pub const STRIKETHROUGH: &str = "strikethrough";
    pub const CODE: &str = "code";
    pub const HREF: &str = "href";
}

/// Shallow-merge `patch` over `base`.
///
/// `null` values in the patch delete the key. When `keep_null` is set the
/// null markers are preserved in the output (needed when the result is
/// itself still a patch that will be composed again later).
pub fn compose_attributes(
    base: Option<&Attributes>,
    patch: Option<&Attributes>,
    keep_null: bool,
) -> Option<Attributes> {
    let mut merged = base.cloned().unwrap_or_default();

    if let Some(patch) = patch {
        for (key, value) in patch {
            if value.is_null() && !keep_null {
                merged.remove(key);
            } else {
                merged.insert(key.clone(), value.clone());
            }
        }
    }

    if merged.is_empty() {
        None
    } else {
        Some(merged)
    }
}

/// Build the patch that restores `base`'s values for every key `patch`
/// touched. Keys absent from `base` invert to the `null` delete sentinel.
pub fn invert_attributes(patch: &Attributes, base: Option<&Attributes>) -> Attributes {
    let mut inverted = Attributes::new();
    for key in patch.keys() {
        let prior = base
            .and_then(|attrs| attrs.get(key))
            .cloned()
            .unwrap_or(Value::Null);
        inverted.insert(key.clone(), prior);
    }
    inverted
}

pub fn attr_str<'a>(attrs: &'a Attributes, key: &str) -> Option<&'a str> {
    attrs.get(key).and_then(Value::as_str)
}

pub fn attr_i64(attrs: &Attributes, key: &str) -> Option<i64> {
    attrs.get(key).and_then(Value::as_i64)
}

pub fn attr_bool(attrs: &Attributes, key: &str) -> Option<bool> {
    attrs.get(key).and_then(Value::as_bool)
}
