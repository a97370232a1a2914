//! # Shortcut Grammar
//!
//! Keyboard shortcuts are declared as strings like `"mod+shift+k"` and
//! parsed into [`KeyCombo`] values. Tokens are separated by `+`; every
//! token except the last names a modifier (`ctrl`, `alt`, `shift`,
//! `meta`/`cmd`, or the platform-dependent `mod`), and the last token is
//! the key itself.
//!
//! `mod` is the reason combos are matched against a [`Platform`] rather
//! than resolved at parse time: the same declaration means Cmd on macOS
//! and Ctrl everywhere else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Host platform, as reported by the embedding environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    /// Whether `mod` resolves to the Meta/Cmd key on this platform.
    pub fn mod_is_meta(&self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

/// A raw keyboard event from the host.
///
/// `key` is the logical key name in lowercase (`"k"`, `"enter"`,
/// `"arrowdown"`); the four flags are the modifier state at press time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into().to_lowercase(),
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

/// Errors from parsing a shortcut declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcutError {
    #[error("shortcut string is empty")]
    EmptyCombo,

    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),

    #[error("modifier `{0}` appears twice")]
    DuplicateModifier(String),

    #[error("shortcut `{0}` has no key after its modifiers")]
    MissingKey(String),
}

/// A parsed shortcut: a set of required modifiers plus one key.
///
/// The `mod` token is kept symbolic until [`KeyCombo::matches`] is called
/// with a concrete [`Platform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    key: String,
    ctrl: bool,
    alt: bool,
    shift: bool,
    meta: bool,
    /// The platform-dependent `mod` modifier was declared.
    uses_mod: bool,
}

impl KeyCombo {
    /// Parse a declaration like `"mod+shift+k"`.
    pub fn parse(combo: &str) -> Result<Self, ShortcutError> {
        let trimmed = combo.trim();
        if trimmed.is_empty() {
            return Err(ShortcutError::EmptyCombo);
        }

        let mut parsed = KeyCombo {
            key: String::new(),
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
            uses_mod: false,
        };

        let tokens: Vec<String> = trimmed
            .split('+')
            .map(|token| token.trim().to_lowercase())
            .collect();
        let (key, modifiers) = match tokens.split_last() {
            Some(split) => split,
            None => return Err(ShortcutError::EmptyCombo),
        };

        for modifier in modifiers {
            let flag = match modifier.as_str() {
                "ctrl" | "control" => &mut parsed.ctrl,
                "alt" | "option" => &mut parsed.alt,
                "shift" => &mut parsed.shift,
                "meta" | "cmd" => &mut parsed.meta,
                "mod" => &mut parsed.uses_mod,
                other => return Err(ShortcutError::UnknownModifier(other.to_string())),
            };
            if *flag {
                return Err(ShortcutError::DuplicateModifier(modifier.clone()));
            }
            *flag = true;
        }

        if key.is_empty() || Self::is_modifier_token(key) {
            return Err(ShortcutError::MissingKey(trimmed.to_string()));
        }
        parsed.key = key.clone();
        Ok(parsed)
    }

    fn is_modifier_token(token: &str) -> bool {
        matches!(
            token,
            "ctrl" | "control" | "alt" | "option" | "shift" | "meta" | "cmd" | "mod"
        )
    }

    /// Whether this combo matches a host event on the given platform.
    ///
    /// All declared modifiers must be down and no others: `ctrl+k` does
    /// not fire on Ctrl+Shift+K.
    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        let mut ctrl = self.ctrl;
        let mut meta = self.meta;
        if self.uses_mod {
            if platform.mod_is_meta() {
                meta = true;
            } else {
                ctrl = true;
            }
        }

        event.key.to_lowercase() == self.key
            && event.ctrl == ctrl
            && event.alt == self.alt
            && event.shift == self.shift
            && event.meta == meta
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl FromStr for KeyCombo {
    type Err = ShortcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uses_mod {
            write!(f, "mod+")?;
        }
        if self.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.alt {
            write!(f, "alt+")?;
        }
        if self.shift {
            write!(f, "shift+")?;
        }
        if self.meta {
            write!(f, "meta+")?;
        }
        write!(f, "{}", self.key)
    }
}
