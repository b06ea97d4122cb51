//! lexparse error handling - one error type for every phase.
//!
//! Grammar errors surface at parser construction, lex and parse errors during a
//! parse call, config errors while loading a lexer configuration. The kind
//! carries what went wrong; the marker and attached source say where.

use std::{fmt, sync::Arc};

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};

use crate::token::Marker;

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Named source text attached to errors so diagnostics can render snippets.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

// ============================================================================
// ERROR KINDS
// ============================================================================

/// All error kinds as one enum.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    // Grammar errors - structural misconfiguration found at construction
    InvalidNonTerminal {
        name: String,
    },
    EmptySymbol {
        rule: String,
    },
    EmptyProduction {
        non_terminal: String,
    },
    MissingReducer {
        rule: String,
    },
    MalformedLeftRecursion {
        rule: String,
    },
    UndefinedStart {
        start: String,
    },
    UndefinedNonTerminal {
        name: String,
        rule: String,
    },
    UnrecognizedTerminal {
        kind: String,
        rule: String,
    },
    InvalidLexicalSymbol {
        symbol: String,
        reason: String,
    },
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    // Lex errors - input text no spec accepts
    UnrecognizedToken {
        text: String,
    },
    InvalidLiteral {
        literal_type: String,
        value: String,
    },
    Stalled {
        text: String,
    },

    // Parse errors - hard failures, failed parses, reducer rejections
    RequiredMatch {
        non_terminal: String,
        expected: String,
        found: String,
    },
    NoMatch {
        found: String,
    },
    Semantic {
        message: String,
    },

    // Config errors - lexer configuration loading
    Config {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Grammar,
    Lex,
    Parse,
    Config,
}

impl ErrorCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Grammar => "grammar",
            ErrorCategory::Lex => "lex",
            ErrorCategory::Parse => "parse",
            ErrorCategory::Config => "config",
        }
    }
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidNonTerminal { .. }
            | Self::EmptySymbol { .. }
            | Self::EmptyProduction { .. }
            | Self::MissingReducer { .. }
            | Self::MalformedLeftRecursion { .. }
            | Self::UndefinedStart { .. }
            | Self::UndefinedNonTerminal { .. }
            | Self::UnrecognizedTerminal { .. }
            | Self::InvalidLexicalSymbol { .. }
            | Self::InvalidPattern { .. } => ErrorCategory::Grammar,

            Self::UnrecognizedToken { .. }
            | Self::InvalidLiteral { .. }
            | Self::Stalled { .. } => ErrorCategory::Lex,

            Self::RequiredMatch { .. } | Self::NoMatch { .. } | Self::Semantic { .. } => {
                ErrorCategory::Parse
            }

            Self::Config { .. } => ErrorCategory::Config,
        }
    }

    /// Error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::InvalidNonTerminal { .. } => "invalid_non_terminal",
            Self::EmptySymbol { .. } => "empty_symbol",
            Self::EmptyProduction { .. } => "empty_production",
            Self::MissingReducer { .. } => "missing_reducer",
            Self::MalformedLeftRecursion { .. } => "malformed_left_recursion",
            Self::UndefinedStart { .. } => "undefined_start",
            Self::UndefinedNonTerminal { .. } => "undefined_non_terminal",
            Self::UnrecognizedTerminal { .. } => "unrecognized_terminal",
            Self::InvalidLexicalSymbol { .. } => "invalid_lexical_symbol",
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::UnrecognizedToken { .. } => "unrecognized_token",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::Stalled { .. } => "stalled",
            Self::RequiredMatch { .. } => "required_match",
            Self::NoMatch { .. } => "no_match",
            Self::Semantic { .. } => "semantic",
            Self::Config { .. } => "config",
        }
    }

    fn primary_label(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Grammar => "in this grammar",
            ErrorCategory::Lex => "unrecognized input",
            ErrorCategory::Parse => match self {
                Self::Semantic { .. } => "rejected here",
                _ => "failed to match here",
            },
            ErrorCategory::Config => "in this configuration",
        }
    }
}

// ============================================================================
// ERROR
// ============================================================================

/// The single error type.
#[derive(Debug, Clone)]
pub struct Error {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it happened, when known
    pub marker: Option<Marker>,
    pub help: Option<String>,
    source: Option<Arc<NamedSource<String>>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            marker: None,
            help: None,
            source: None,
        }
    }

    pub fn at(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attaches source text unless some is already attached.
    pub fn with_source(mut self, source: &SourceContext) -> Self {
        if self.source.is_none() {
            self.source = Some(source.to_named_source());
        }
        self
    }

    pub fn semantic(message: impl Into<String>, marker: Marker) -> Self {
        Self::new(ErrorKind::Semantic {
            message: message.into(),
        })
        .at(marker)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config {
            message: message.into(),
        })
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn line_number(&self) -> Option<usize> {
        self.marker.as_ref().map(|m| m.line_number)
    }

    pub fn error_code(&self) -> String {
        format!(
            "lexparse::{}::{}",
            self.category().as_str(),
            self.kind.code_suffix()
        )
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::InvalidNonTerminal { name } => write!(
                f,
                "Grammar error: invalid non-terminal name '{}' (must match [A-Za-z_][A-Za-z0-9_-]*)",
                name
            ),
            ErrorKind::EmptySymbol { rule } => {
                write!(f, "Grammar error: empty symbol name in rule {}", rule)
            }
            ErrorKind::EmptyProduction { non_terminal } => write!(
                f,
                "Grammar error: empty production for non-terminal '{}'",
                non_terminal
            ),
            ErrorKind::MissingReducer { rule } => write!(
                f,
                "Grammar error: a reducer may not be omitted when the pattern has more than one symbol ({})",
                rule
            ),
            ErrorKind::MalformedLeftRecursion { rule } => write!(
                f,
                "Grammar error: left-recursive rule needs at least two symbols ({})",
                rule
            ),
            ErrorKind::UndefinedStart { start } => write!(
                f,
                "Grammar error: start symbol '{}' is not a recognized non-terminal",
                start
            ),
            ErrorKind::UndefinedNonTerminal { name, rule } => write!(
                f,
                "Grammar error: no production rule for non-terminal '{}' (referenced by {})",
                name, rule
            ),
            ErrorKind::UnrecognizedTerminal { kind, rule } => write!(
                f,
                "Grammar error: unrecognized terminal symbol '{}' (referenced by {})",
                kind, rule
            ),
            ErrorKind::InvalidLexicalSymbol { symbol, reason } => {
                write!(f, "Grammar error: invalid lexical symbol {:?}: {}", symbol, reason)
            }
            ErrorKind::InvalidPattern { pattern, reason } => {
                write!(f, "Grammar error: invalid pattern {:?}: {}", pattern, reason)
            }
            ErrorKind::UnrecognizedToken { text } => {
                write!(f, "Lex error: unrecognized token '{}'", text)?;
                self.write_line(f)
            }
            ErrorKind::InvalidLiteral {
                literal_type,
                value,
            } => {
                write!(f, "Lex error: invalid {} {}", literal_type, value)?;
                self.write_line(f)
            }
            ErrorKind::Stalled { text } => {
                write!(f, "Lex error: scanner cannot advance at '{}'", text)?;
                self.write_line(f)
            }
            ErrorKind::RequiredMatch {
                non_terminal,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Parse error: failed to match {} (expected {}) at {}",
                    non_terminal, expected, found
                )?;
                self.write_line(f)
            }
            ErrorKind::NoMatch { found } => {
                write!(f, "Parse error: parse failed at {}", found)?;
                self.write_line(f)
            }
            ErrorKind::Semantic { message } => {
                write!(f, "Parse error: {}", message)?;
                self.write_line(f)
            }
            ErrorKind::Config { message } => write!(f, "Config error: {}", message),
        }
    }
}

impl Error {
    fn write_line(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.marker {
            Some(marker) => write!(f, " on line {}", marker.line_number),
            None => Ok(()),
        }
    }
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.error_code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        // Labels only make sense against attached source text.
        self.source.as_ref()?;
        let marker = self.marker.as_ref()?;
        let span = SourceSpan::from((marker.start_index, marker.len()));
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &dyn miette::SourceCode)
    }
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints an error with full miette diagnostics to stderr.
pub fn print_error(error: Error) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use miette::Report;

    use super::*;

    fn marker() -> Marker {
        Marker::at(Arc::from("calc"), 4, 5, 2)
    }

    #[test]
    fn display_includes_line_number() {
        let err = Error::new(ErrorKind::UnrecognizedToken { text: "$".into() }).at(marker());
        assert_eq!(err.to_string(), "Lex error: unrecognized token '$' on line 2");
        assert_eq!(err.category(), ErrorCategory::Lex);
        assert_eq!(err.line_number(), Some(2));
    }

    #[test]
    fn code_names_category_and_kind() {
        let err = Error::new(ErrorKind::UndefinedStart {
            start: "program".into(),
        });
        assert_eq!(err.error_code(), "lexparse::grammar::undefined_start");
    }

    #[test]
    fn report_renders_code_help_and_label() {
        let src = SourceContext::new("calc", "1 +\n2 $ 3");
        let err = Error::new(ErrorKind::UnrecognizedToken { text: "$".into() })
            .at(Marker::at(Arc::from("calc"), 6, 7, 2))
            .with_help("remove the stray character")
            .with_source(&src);
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("lexparse::lex::unrecognized_token"));
        assert!(output.contains("remove the stray character"));
        assert!(output.contains("unrecognized input"));
    }

    #[test]
    fn first_attached_source_wins() {
        let first = SourceContext::new("first", "abc def");
        let second = SourceContext::new("second", "xyz uvw");
        let err = Error::semantic("bad", marker())
            .with_source(&first)
            .with_source(&second);
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("first"));
        assert!(!output.contains("second"));
    }
}
