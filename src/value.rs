//! Semantic values produced by matched terminals and reducers.

use std::fmt;

use serde::Serialize;

use crate::token::{Token, TokenValue};

/// Conversion from a matched terminal to a semantic value.
///
/// The value is the token's payload when it has one, otherwise its kind, so
/// keyword and symbol terminals still produce something usable.
pub trait FromToken: Sized {
    fn from_token(token: &Token) -> Self;
}

/// A general-purpose dynamic value for grammars that don't define their own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Number(f64),
    String(String),
    Symbol(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short type name, for reducer error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
        }
    }
}

impl FromToken for Value {
    fn from_token(token: &Token) -> Self {
        match &token.value {
            Some(TokenValue::Number(n)) => Value::Number(*n),
            Some(TokenValue::String(s)) => Value::String(s.clone()),
            None => Value::Symbol(token.kind.to_string()),
        }
    }
}

/// Parsers over tokens themselves, for callers that build their own trees.
impl FromToken for Token {
    fn from_token(token: &Token) -> Self {
        token.clone()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Symbol(s) => f.write_str(s),
            Value::List(items) => {
                let inner = items
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "({})", inner)
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
