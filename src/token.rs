//! Tokens and the position markers that travel with them.
//!
//! Both types are immutable once built. A wider span is produced by copying an
//! existing marker and overriding fields, never by mutating it.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Source name used when the caller supplies none.
pub const DEFAULT_SOURCE_NAME: &str = "<unknown>";

// ============================================================================
// MARKER - source positions
// ============================================================================

/// Location of a token, or of a span of tokens, in a named source.
///
/// Offsets are byte offsets into the source text; `line_number` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marker {
    pub source_name: Arc<str>,
    pub main_index: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub line_number: usize,
}

impl Marker {
    pub fn new(
        source_name: Arc<str>,
        main_index: usize,
        start_index: usize,
        end_index: usize,
        line_number: usize,
    ) -> Self {
        Self {
            source_name,
            main_index,
            start_index,
            end_index,
            line_number,
        }
    }

    /// Marker for a primary match where the anchor is the start of the match.
    pub fn at(source_name: Arc<str>, start: usize, end: usize, line_number: usize) -> Self {
        Self::new(source_name, start, start, end, line_number)
    }

    /// A marker running from the start of `self` through the end of `last`.
    pub fn through(&self, last: &Marker) -> Self {
        Self {
            end_index: last.end_index,
            ..self.clone()
        }
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_name, self.line_number)
    }
}

// ============================================================================
// TOKEN KINDS AND VALUES
// ============================================================================

/// The closed set of token kinds.
///
/// Keywords and symbols both lex as their own literal text, so they share the
/// `Literal` variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenKind {
    Newline,
    String,
    Number,
    Name,
    Eof,
    Literal(String),
}

impl TokenKind {
    pub const NEWLINE: &'static str = "NEWLINE";
    pub const STRING: &'static str = "STRING";
    pub const NUMBER: &'static str = "NUMBER";
    pub const NAME: &'static str = "NAME";
    pub const EOF: &'static str = "EOF";

    /// Resolves a written kind name. The fixed category names win; any other
    /// text is a literal kind.
    pub fn from_name(name: &str) -> Self {
        match name {
            Self::NEWLINE => TokenKind::Newline,
            Self::STRING => TokenKind::String,
            Self::NUMBER => TokenKind::Number,
            Self::NAME => TokenKind::Name,
            Self::EOF => TokenKind::Eof,
            text => TokenKind::Literal(text.to_string()),
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        TokenKind::Literal(text.into())
    }

    pub fn is_category_name(name: &str) -> bool {
        [Self::NEWLINE, Self::STRING, Self::NUMBER, Self::NAME, Self::EOF].contains(&name)
    }

    /// The fixed categories every lexer recognizes.
    pub fn categories() -> [TokenKind; 5] {
        [
            TokenKind::Newline,
            TokenKind::String,
            TokenKind::Number,
            TokenKind::Name,
            TokenKind::Eof,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            TokenKind::Newline => Self::NEWLINE,
            TokenKind::String => Self::STRING,
            TokenKind::Number => Self::NUMBER,
            TokenKind::Name => Self::NAME,
            TokenKind::Eof => Self::EOF,
            TokenKind::Literal(text) => text,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a token that carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    String(String),
    Number(f64),
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::String(s) => write!(f, "{:?}", s),
            TokenValue::Number(n) => write!(f, "{}", n),
        }
    }
}

// ============================================================================
// TOKEN
// ============================================================================

/// A typed, optionally valued unit of lexical input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub marker: Marker,
    pub kind: TokenKind,
    pub value: Option<TokenValue>,
}

impl Token {
    pub fn new(marker: Marker, kind: TokenKind, value: Option<TokenValue>) -> Self {
        Self {
            marker,
            kind,
            value,
        }
    }

    pub fn line_number(&self) -> usize {
        self.marker.line_number
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Human-readable kind and value, for diagnostics only.
    pub fn descriptor(&self) -> String {
        match &self.value {
            Some(value) => format!("{}({})", self.kind, value),
            None => format!("{}", self.kind),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}
