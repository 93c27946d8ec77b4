//! Delimiters shared by the combine and separate strategies.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringDelimiter {
    #[default]
    Space,
    /// One or more whitespace characters. Splits only; joins with a space.
    MultiSpace,
    Comma,
    Colon,
    Semicolon,
    Slash,
    Backslash,
    Dash,
    Period,
    Pipe,
    Hash,
    Equal,
    Ampersand,
    Underscore,
    Custom(String),
}

static MULTI_SPACE: OnceLock<Regex> = OnceLock::new();

impl StringDelimiter {
    /// The literal text inserted between combined values.
    pub fn value(&self) -> &str {
        match self {
            StringDelimiter::Space | StringDelimiter::MultiSpace => " ",
            StringDelimiter::Comma => ",",
            StringDelimiter::Colon => ":",
            StringDelimiter::Semicolon => ";",
            StringDelimiter::Slash => "/",
            StringDelimiter::Backslash => "\\",
            StringDelimiter::Dash => "-",
            StringDelimiter::Period => ".",
            StringDelimiter::Pipe => "|",
            StringDelimiter::Hash => "#",
            StringDelimiter::Equal => "=",
            StringDelimiter::Ampersand => "&",
            StringDelimiter::Underscore => "_",
            StringDelimiter::Custom(s) => s,
        }
    }

    /// `true` when splitting uses the whitespace pattern rather than the
    /// literal text.
    pub fn is_pattern(&self) -> bool {
        matches!(self, StringDelimiter::MultiSpace)
    }
}

/// `\s+`, compiled once.
pub(crate) fn whitespace() -> &'static Regex {
    MULTI_SPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}
