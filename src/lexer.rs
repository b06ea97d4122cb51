//! Regex-dispatch tokenizer.
//!
//! Every lexical spec becomes one capture group of a single alternation. The
//! scanner runs it anchored at the cursor and the first participating group
//! picks the action, which preserves declaration order as the tie-break.

use std::{collections::BTreeSet, collections::HashSet, collections::VecDeque, fmt, sync::Arc};

use regex_automata::{
    meta::Regex,
    util::captures::Captures,
    Anchored, Input,
};
use tracing::debug;

use crate::{
    errors::{Error, ErrorKind, Result},
    token::{Marker, Token, TokenKind, TokenValue, DEFAULT_SOURCE_NAME},
};

pub mod config;
pub(crate) mod specs;

pub use config::{ConfigError, CustomSpec, Lexeme, LexerConfig, NewlineBehavior};

use specs::{Action, LexSpec};

/// A compiled lexer. Immutable after construction; every scan owns its own
/// cursor, so one lexer may serve any number of calls.
#[derive(Clone)]
pub struct Lexer {
    specs: Vec<LexSpec>,
    regex: Regex,
    /// Capture group index of each spec in the compiled alternation.
    groups: Vec<usize>,
    keywords: HashSet<String>,
    kinds: BTreeSet<TokenKind>,
    newline_behavior: NewlineBehavior,
}

impl Lexer {
    pub fn new(config: LexerConfig) -> Result<Self> {
        for keyword in &config.keywords {
            validate_literal(keyword, "keyword")?;
        }
        for symbol in &config.symbols {
            validate_literal(symbol, "symbol")?;
        }

        let mut kinds: BTreeSet<TokenKind> = TokenKind::categories().into_iter().collect();
        let mut specs = Vec::new();
        for custom in &config.custom_specs {
            kinds.extend(custom.kinds.iter().cloned());
            specs.push(LexSpec {
                pattern: custom.pattern.clone(),
                action: Action::Custom(custom.action.clone()),
            });
        }
        specs.extend(specs::base_specs());
        let literals = config
            .keywords
            .iter()
            .chain(config.symbols.iter())
            .map(String::as_str);
        if let Some(spec) = specs::literal_spec(literals) {
            specs.push(spec);
        }
        specs.push(specs::catch_all_spec());

        kinds.extend(
            config
                .keywords
                .iter()
                .chain(config.symbols.iter())
                .map(|l| TokenKind::literal(l.as_str())),
        );

        let (regex, groups) = compile(&specs)?;
        Ok(Self {
            specs,
            regex,
            groups,
            keywords: config.keywords.into_iter().collect(),
            kinds,
            newline_behavior: config.newline_behavior,
        })
    }

    /// Every kind this lexer can emit: the fixed categories, keywords,
    /// symbols and the kinds declared by custom specs.
    pub fn kinds(&self) -> &BTreeSet<TokenKind> {
        &self.kinds
    }

    pub fn recognizes(&self, kind: &TokenKind) -> bool {
        self.kinds.contains(kind)
    }

    pub fn newline_behavior(&self) -> NewlineBehavior {
        self.newline_behavior
    }

    /// Lazily scans `source`. The iterator is fused: after an error it yields
    /// nothing further.
    pub fn lex<'l, 's>(&'l self, source: &'s str, source_name: Option<&str>) -> Tokens<'l, 's> {
        Tokens {
            lexer: self,
            source,
            source_name: Arc::from(source_name.unwrap_or(DEFAULT_SOURCE_NAME)),
            cursor: 0,
            line_number: 1,
            captures: self.regex.create_captures(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Scans `source` to completion, EOF token included.
    pub fn list(&self, source: &str, source_name: Option<&str>) -> Result<Vec<Token>> {
        let tokens = self.lex(source, source_name).collect::<Result<Vec<_>>>()?;
        debug!(
            source = source_name.unwrap_or(DEFAULT_SOURCE_NAME),
            tokens = tokens.len(),
            "lexed source"
        );
        Ok(tokens)
    }
}

impl Default for Lexer {
    fn default() -> Self {
        // The default configuration holds only plain literals.
        Self::new(LexerConfig::default()).unwrap_or_else(|e| unreachable!("{e}"))
    }
}

impl fmt::Debug for Lexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("kinds", &self.kinds)
            .field("newline_behavior", &self.newline_behavior)
            .finish_non_exhaustive()
    }
}

fn validate_literal(text: &str, what: &str) -> Result<()> {
    let reason = if text.is_empty() {
        format!("{what} must be non-empty")
    } else if TokenKind::is_category_name(text) {
        format!("{what} collides with a token category name")
    } else if text.chars().any(char::is_whitespace) {
        format!("{what} may not contain whitespace")
    } else {
        return Ok(());
    };
    Err(Error::new(ErrorKind::InvalidLexicalSymbol {
        symbol: text.to_string(),
        reason,
    }))
}

/// Compiles the alternation. Custom patterns may carry their own groups, so
/// the group of each spec is computed rather than assumed.
fn compile(specs: &[LexSpec]) -> Result<(Regex, Vec<usize>)> {
    let mut groups = Vec::with_capacity(specs.len());
    let mut next_group = 1;
    for spec in specs {
        let alone = Regex::new(&spec.pattern).map_err(|e| {
            Error::new(ErrorKind::InvalidPattern {
                pattern: spec.pattern.clone(),
                reason: e.to_string(),
            })
        })?;
        groups.push(next_group);
        // captures_len counts the implicit whole-match group
        next_group += alone.captures_len();
    }
    let pattern = specs
        .iter()
        .map(|s| format!("({})", s.pattern))
        .collect::<Vec<_>>()
        .join("|");
    let regex = Regex::new(&pattern).map_err(|e| {
        Error::new(ErrorKind::InvalidPattern {
            pattern,
            reason: e.to_string(),
        })
    })?;
    Ok((regex, groups))
}

// ============================================================================
// SCANNER
// ============================================================================

/// One pass over a source string.
pub struct Tokens<'l, 's> {
    lexer: &'l Lexer,
    source: &'s str,
    source_name: Arc<str>,
    cursor: usize,
    line_number: usize,
    captures: Captures,
    pending: VecDeque<Token>,
    finished: bool,
}

impl Tokens<'_, '_> {
    fn marker(&self, start: usize, end: usize) -> Marker {
        Marker::at(self.source_name.clone(), start, end, self.line_number)
    }

    fn fail(&mut self, error: Error) -> Option<Result<Token>> {
        self.finished = true;
        self.pending.clear();
        Some(Err(error))
    }

    /// Runs the alternation at the cursor and queues what the action emits.
    fn advance(&mut self) -> Result<()> {
        let lexer = self.lexer;
        let source = self.source;
        let start = self.cursor;
        let input = Input::new(source).range(start..).anchored(Anchored::Yes);
        lexer.regex.search_captures(&input, &mut self.captures);

        let branch = lexer
            .groups
            .iter()
            .position(|&group| self.captures.get_group(group).is_some());
        let (spec_index, end) = match (branch, self.captures.get_match()) {
            (Some(index), Some(m)) if m.end() > start => (index, m.end()),
            _ => {
                let rest = &source[start..];
                let text = rest.split_whitespace().next().unwrap_or(rest);
                return Err(Error::new(ErrorKind::Stalled {
                    text: text.to_string(),
                })
                .at(self.marker(start, start)));
            }
        };
        let text = &source[start..end];
        let marker = self.marker(start, end);

        match &lexer.specs[spec_index].action {
            Action::Skip => {}
            Action::Newline => self.emit(Token::new(marker, TokenKind::Newline, None)),
            Action::Identifier => {
                let token = if lexer.keywords.contains(text) {
                    Token::new(marker, TokenKind::literal(text), None)
                } else {
                    Token::new(
                        marker,
                        TokenKind::Name,
                        Some(TokenValue::String(text.to_string())),
                    )
                };
                self.emit(token);
            }
            Action::HexNumber => {
                let n = specs::parse_hex(text, &marker)?;
                self.emit(Token::new(marker, TokenKind::Number, Some(TokenValue::Number(n))));
            }
            Action::Decimal => {
                let n = specs::parse_decimal(text, &marker)?;
                self.emit(Token::new(marker, TokenKind::Number, Some(TokenValue::Number(n))));
            }
            Action::QuotedString => {
                let s = specs::unescape(text, &marker)?;
                self.emit(Token::new(marker, TokenKind::String, Some(TokenValue::String(s))));
            }
            Action::Literal => self.emit(Token::new(marker, TokenKind::literal(text), None)),
            Action::Reject => {
                return Err(Error::new(ErrorKind::UnrecognizedToken {
                    text: text.to_string(),
                })
                .at(marker));
            }
            Action::Custom(action) => {
                let tokens = action(&Lexeme { text, marker })?;
                for token in tokens {
                    self.emit(token);
                }
            }
        }

        self.cursor = end;
        self.line_number += text.matches('\n').count();
        Ok(())
    }

    fn emit(&mut self, token: Token) {
        if token.kind == TokenKind::Newline
            && self.lexer.newline_behavior == NewlineBehavior::Ignore
        {
            return;
        }
        self.pending.push_back(token);
    }
}

impl Iterator for Tokens<'_, '_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }
            if self.cursor >= self.source.len() {
                self.finished = true;
                let end = self.source.len();
                return Some(Ok(Token::new(self.marker(end, end), TokenKind::Eof, None)));
            }
            if let Err(e) = self.advance() {
                return self.fail(e);
            }
        }
    }
}

impl std::iter::FusedIterator for Tokens<'_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;

    fn kinds(lexer: &Lexer, source: &str) -> Vec<String> {
        lexer
            .list(source, None)
            .unwrap()
            .iter()
            .map(|t| t.kind.to_string())
            .collect()
    }

    #[test]
    fn kinds_include_categories_keywords_and_symbols() {
        let lexer = Lexer::new(LexerConfig::empty().keywords(["draw"]).symbols(["<="])).unwrap();
        assert!(lexer.recognizes(&TokenKind::Name));
        assert!(lexer.recognizes(&TokenKind::Eof));
        assert!(lexer.recognizes(&TokenKind::literal("draw")));
        assert!(lexer.recognizes(&TokenKind::literal("<=")));
        assert!(!lexer.recognizes(&TokenKind::literal("<")));
    }

    #[test]
    fn empty_literal_sets_still_lex() {
        let lexer = Lexer::new(LexerConfig::empty()).unwrap();
        assert_eq!(kinds(&lexer, "a 1"), vec!["NAME", "NUMBER", "EOF"]);
        let err = lexer.list("a + 1", None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnrecognizedToken { text: "+".into() });
    }

    #[test]
    fn invalid_literals_are_grammar_errors() {
        for bad in ["", "NAME", "a b"] {
            let err = Lexer::new(LexerConfig::empty().symbols([bad])).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Grammar, "{bad:?}");
        }
    }

    #[test]
    fn bad_custom_pattern_is_a_grammar_error() {
        let config = LexerConfig::default().custom_spec(CustomSpec::skip("(unclosed"));
        let err = Lexer::new(config).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidPattern { .. }));
    }

    #[test]
    fn custom_specs_take_priority_and_may_emit_several_tokens() {
        let pair = CustomSpec::new(r"@[a-z]+", vec![TokenKind::literal("@")], |lexeme| {
            let at = lexeme.token(TokenKind::literal("@"), None);
            let name = lexeme.token(
                TokenKind::Name,
                Some(TokenValue::String(lexeme.text[1..].to_string())),
            );
            Ok(vec![at, name])
        });
        let config = LexerConfig::default()
            .custom_spec(CustomSpec::skip(r"//[^\n]*"))
            .custom_spec(pair);
        let lexer = Lexer::new(config).unwrap();
        assert!(lexer.recognizes(&TokenKind::literal("@")));
        assert_eq!(
            kinds(&lexer, "a // comment / here\n@name"),
            vec!["NAME", "NEWLINE", "@", "NAME", "EOF"]
        );
    }

    #[test]
    fn empty_custom_match_stalls() {
        let config = LexerConfig::default().custom_spec(CustomSpec::skip("x*"));
        let lexer = Lexer::new(config).unwrap();
        let err = lexer.list("abc", None).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Stalled { .. }));
    }

    #[test]
    fn eof_marker_sits_at_end_of_input() {
        let lexer = Lexer::default();
        let tokens = lexer.list("ab\n", Some("file.txt")).unwrap();
        let eof = tokens.last().unwrap();
        assert!(eof.is_eof());
        assert_eq!(eof.marker.start_index, 3);
        assert_eq!(eof.marker.end_index, 3);
        assert_eq!(eof.line_number(), 2);
        assert_eq!(&*eof.marker.source_name, "file.txt");
    }
}
