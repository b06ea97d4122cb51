//! Memoized recursive-descent parser over rule-list grammars.
//!
//! A `Parser` is built once from a grammar and a lexer; construction runs all
//! grammar validation. Each `parse` call lexes the source once, then matches
//! the start symbol against the token list with a fresh memo table, so a
//! parser can be shared freely between calls and threads.

use std::fmt;

use tracing::debug;

use crate::{
    errors::{Error, ErrorKind, Result, SourceContext},
    grammar::Grammar,
    lexer::Lexer,
    token::{Marker, Token, DEFAULT_SOURCE_NAME},
    value::FromToken,
};

mod matcher;
mod memo;
mod validate;

use matcher::Matcher;
use validate::CompiledGrammar;

// ============================================================================
// PUBLIC TYPES
// ============================================================================

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub source_name: Option<String>,
}

impl ParseOptions {
    pub fn named(source_name: impl Into<String>) -> Self {
        Self {
            source_name: Some(source_name.into()),
        }
    }

    fn source_name(&self) -> &str {
        self.source_name.as_deref().unwrap_or(DEFAULT_SOURCE_NAME)
    }
}

/// Raw result of matching the start symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<V> {
    /// The start symbol matched; `next_index` is the first unconsumed token.
    Matched { value: V, next_index: usize },
    /// No rule for the start symbol matched. `furthest` is the token at the
    /// farthest position any terminal was tried, for diagnostics.
    Failed { furthest: Token },
}

impl<V> ParseOutcome<V> {
    pub fn is_ok(&self) -> bool {
        matches!(self, ParseOutcome::Matched { .. })
    }

    pub fn value(&self) -> Option<&V> {
        match self {
            ParseOutcome::Matched { value, .. } => Some(value),
            ParseOutcome::Failed { .. } => None,
        }
    }

    pub fn next_index(&self) -> Option<usize> {
        match self {
            ParseOutcome::Matched { next_index, .. } => Some(*next_index),
            ParseOutcome::Failed { .. } => None,
        }
    }
}

/// What a reducer sees besides the values.
pub struct ReduceContext<'a> {
    pub(crate) marker: Marker,
    pub(crate) tokens: &'a [Token],
    pub(crate) non_terminal: &'a str,
}

impl<'a> ReduceContext<'a> {
    /// Span from the first to the last consumed token.
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    /// Name of the non-terminal being reduced.
    pub fn non_terminal(&self) -> &'a str {
        self.non_terminal
    }

    /// A parse-fatal error anchored at this reduction's span.
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::semantic(message, self.marker.clone())
    }
}

// ============================================================================
// PARSER
// ============================================================================

pub struct Parser<V> {
    lexer: Lexer,
    grammar: CompiledGrammar<V>,
}

impl<V: Clone + FromToken> Parser<V> {
    /// Validates `grammar` against the kinds `lexer` can produce.
    pub fn new(grammar: Grammar<V>, lexer: Lexer) -> Result<Self> {
        let grammar = validate::compile(grammar, &lexer)?;
        debug!(
            rules = grammar.rules.len(),
            non_terminals = grammar.non_terminals.len(),
            "built parser"
        );
        Ok(Self { lexer, grammar })
    }

    pub fn with_default_lexer(grammar: Grammar<V>) -> Result<Self> {
        Self::new(grammar, Lexer::default())
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    /// The token list a parse of `source` would match against.
    pub fn tokens(&self, source: &str, options: &ParseOptions) -> Result<Vec<Token>> {
        let name = options.source_name();
        self.lexer
            .list(source, Some(name))
            .map_err(|e| e.with_source(&SourceContext::new(name, source)))
    }

    /// Matches the start symbol at the first token. The input need not be
    /// fully consumed unless the grammar itself demands EOF.
    pub fn parse(&self, source: &str, options: &ParseOptions) -> Result<ParseOutcome<V>> {
        let name = options.source_name();
        let tokens = self.tokens(source, options)?;
        let mut matcher = Matcher::new(&self.grammar, &tokens);
        let memo = matcher
            .run(self.grammar.start)
            .map_err(|e| e.with_source(&SourceContext::new(name, source)))?;

        let outcome = match memo {
            Some(step) => ParseOutcome::Matched {
                value: step.value,
                next_index: step.next,
            },
            None => {
                let furthest = matcher.furthest().min(tokens.len().saturating_sub(1));
                ParseOutcome::Failed {
                    furthest: tokens[furthest].clone(),
                }
            }
        };
        debug!(
            source = name,
            tokens = tokens.len(),
            matched = outcome.is_ok(),
            next_index = outcome.next_index(),
            "parsed source"
        );
        Ok(outcome)
    }

    /// Like [`Parser::parse`], but a failed match is an error.
    pub fn parse_value(&self, source: &str, options: &ParseOptions) -> Result<V> {
        match self.parse(source, options)? {
            ParseOutcome::Matched { value, .. } => Ok(value),
            ParseOutcome::Failed { furthest } => Err(Error::new(ErrorKind::NoMatch {
                found: furthest.descriptor(),
            })
            .at(furthest.marker)
            .with_source(&SourceContext::new(options.source_name(), source))),
        }
    }
}

impl<V> fmt::Debug for Parser<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("lexer", &self.lexer)
            .field("start", &self.grammar.non_terminals[self.grammar.start].name)
            .field("rules", &self.grammar.rules.len())
            .finish()
    }
}
