//! Lexer configuration: keywords, symbols, newline handling and custom specs.
//!
//! The serialisable part loads from YAML or JSON. Custom specs carry closures
//! and are attached in code only.

use std::{fmt, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    errors::{Error, Result},
    token::{Marker, Token, TokenKind, TokenValue},
};

pub const DEFAULT_KEYWORDS: &[&str] = &["for", "class", "while", "true", "false"];
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "[", "]", "(", ")", "{", "}", "+", "-", "*", "/", "=", ";", ",",
];

/// Whether NEWLINE tokens reach the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlineBehavior {
    #[default]
    Keep,
    Ignore,
}

/// Lexer options. Every field has a default, so a config file may name only
/// what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerConfig {
    pub keywords: Vec<String>,
    pub symbols: Vec<String>,
    pub newline_behavior: NewlineBehavior,
    #[serde(skip)]
    pub custom_specs: Vec<CustomSpec>,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            newline_behavior: NewlineBehavior::Keep,
            custom_specs: Vec::new(),
        }
    }
}

impl LexerConfig {
    /// A config with no keywords and no symbols.
    pub fn empty() -> Self {
        Self {
            keywords: Vec::new(),
            symbols: Vec::new(),
            ..Self::default()
        }
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    pub fn newline_behavior(mut self, behavior: NewlineBehavior) -> Self {
        self.newline_behavior = behavior;
        self
    }

    pub fn custom_spec(mut self, spec: CustomSpec) -> Self {
        self.custom_specs.push(spec);
        self
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::from(e).into())
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ConfigError::from(e).into())
    }

    /// Loads a config file; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }
}

/// Failures while reading a config, folded into [`Error`] at the boundary.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::config(err.to_string())
    }
}

// ============================================================================
// CUSTOM SPECS
// ============================================================================

/// The text matched by a custom spec, with its position.
#[derive(Debug, Clone)]
pub struct Lexeme<'s> {
    pub text: &'s str,
    pub marker: Marker,
}

impl Lexeme<'_> {
    /// A token of `kind` spanning this lexeme.
    pub fn token(&self, kind: TokenKind, value: Option<TokenValue>) -> Token {
        Token::new(self.marker.clone(), kind, value)
    }
}

pub type CustomAction = Arc<dyn Fn(&Lexeme<'_>) -> Result<Vec<Token>> + Send + Sync>;

/// A caller-supplied lexical rule, tried before the built-in ones.
#[derive(Clone)]
pub struct CustomSpec {
    pub pattern: String,
    /// Kinds the action may emit; they join the lexer's recognized kinds.
    pub kinds: Vec<TokenKind>,
    pub action: CustomAction,
}

impl CustomSpec {
    pub fn new<F>(pattern: impl Into<String>, kinds: Vec<TokenKind>, action: F) -> Self
    where
        F: Fn(&Lexeme<'_>) -> Result<Vec<Token>> + Send + Sync + 'static,
    {
        Self {
            pattern: pattern.into(),
            kinds,
            action: Arc::new(action),
        }
    }

    /// A spec whose matches are discarded, e.g. comments.
    pub fn skip(pattern: impl Into<String>) -> Self {
        Self::new(pattern, Vec::new(), |_| Ok(Vec::new()))
    }
}

impl fmt::Debug for CustomSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomSpec")
            .field("pattern", &self.pattern)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}
