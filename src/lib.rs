//! A regex-driven lexer and a memoized recursive-descent parser for grammars
//! written as flat lists of production rules.
//!
//! ```no_run
//! use lexparse::{Grammar, ParseOptions, Parser, Rule, Value};
//!
//! let grammar = Grammar::new("sum").rules([
//!     Rule::new("sum", "#sum + NUMBER").reduce(|_, v: Vec<Value>| {
//!         Ok(Value::Number(v[0].as_number().unwrap_or(0.0) + v[2].as_number().unwrap_or(0.0)))
//!     }),
//!     Rule::new("sum", "NUMBER"),
//! ]);
//! let parser = Parser::with_default_lexer(grammar)?;
//! assert_eq!(parser.parse_value("1 + 2 + 3", &ParseOptions::default())?, Value::Number(6.0));
//! # Ok::<(), lexparse::Error>(())
//! ```

pub use crate::errors::{print_error, Error, ErrorCategory, ErrorKind, Result, SourceContext};
pub use crate::grammar::{Grammar, Reducer, Rule, Symbol};
pub use crate::lexer::{
    ConfigError, CustomSpec, Lexeme, Lexer, LexerConfig, NewlineBehavior, Tokens,
};
pub use crate::parser::{ParseOptions, ParseOutcome, Parser, ReduceContext};
pub use crate::token::{Marker, Token, TokenKind, TokenValue, DEFAULT_SOURCE_NAME};
pub use crate::value::{FromToken, Value};

pub mod cli;
pub mod errors;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

mod stack;
