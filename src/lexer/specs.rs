//! The lexical rule table and the literal decoders it relies on.
//!
//! Order is priority: the compiled alternation reports the first branch that
//! matches at the cursor, so the catch-all must stay last and symbols must be
//! sorted longest-first.

use crate::{
    errors::{Error, ErrorKind, Result},
    lexer::config::CustomAction,
    token::Marker,
};

/// What a matched branch does.
#[derive(Clone)]
pub(crate) enum Action {
    Skip,
    Newline,
    Identifier,
    HexNumber,
    Decimal,
    QuotedString,
    Literal,
    Reject,
    Custom(CustomAction),
}

#[derive(Clone)]
pub(crate) struct LexSpec {
    pub pattern: String,
    pub action: Action,
}

impl LexSpec {
    fn new(pattern: &str, action: Action) -> Self {
        Self {
            pattern: pattern.to_string(),
            action,
        }
    }
}

/// Built-in specs, highest priority first.
pub(crate) fn base_specs() -> Vec<LexSpec> {
    vec![
        // whitespace
        LexSpec::new(r"[ \t\r]+", Action::Skip),
        // newlines
        LexSpec::new(r"\n+", Action::Newline),
        // identifiers
        LexSpec::new(r"[a-zA-Z_][a-zA-Z0-9_]*", Action::Identifier),
        // hex literal
        LexSpec::new(r"0x[0-9a-fA-F]+", Action::HexNumber),
        // base 10 number with explicit '.'
        LexSpec::new(r"[0-9]*\.[0-9]+(?:e(?:\+|-)?[0-9]+)?", Action::Decimal),
        // base 10 number without explicit '.'
        LexSpec::new(r"[0-9]+(?:e(?:\+|-)?[0-9]+)?", Action::Decimal),
        // string literal with double quotes
        LexSpec::new(r#""(?:\\"|[^"])*""#, Action::QuotedString),
        // string literal with single quotes
        LexSpec::new(r"'(?:\\'|[^'])*'", Action::QuotedString),
    ]
}

/// Alternation over keyword and symbol literals, longest first. `None` when
/// there is nothing to match, since an empty alternation matches everywhere.
pub(crate) fn literal_spec<'a, I>(literals: I) -> Option<LexSpec>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut literals: Vec<&str> = literals.into_iter().collect();
    if literals.is_empty() {
        return None;
    }
    literals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    literals.dedup();
    let pattern = literals
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|");
    Some(LexSpec {
        pattern,
        action: Action::Literal,
    })
}

pub(crate) fn catch_all_spec() -> LexSpec {
    LexSpec::new(r".\S*", Action::Reject)
}

// ============================================================================
// LITERAL DECODING
// ============================================================================

pub(crate) fn parse_hex(text: &str, marker: &Marker) -> Result<f64> {
    u64::from_str_radix(&text[2..], 16)
        .map(|n| n as f64)
        .map_err(|_| invalid_literal("hex literal", text, marker))
}

pub(crate) fn parse_decimal(text: &str, marker: &Marker) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| invalid_literal("number", text, marker))
}

/// Decodes a quoted literal (quotes included) into its string value.
pub(crate) fn unescape(literal: &str, marker: &Marker) -> Result<String> {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            return Err(invalid_literal("string escape", literal, marker));
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            '\n' => {}
            'x' => {
                let digits: String = chars.by_ref().take(2).collect();
                out.push(code_point(&digits, 2, literal, marker)?);
            }
            'u' => {
                let rest = chars.as_str();
                if let Some(braced) = rest.strip_prefix('{') {
                    let close = braced
                        .find('}')
                        .ok_or_else(|| invalid_literal("string escape", literal, marker))?;
                    let digits = &braced[..close];
                    if digits.is_empty() || digits.len() > 6 {
                        return Err(invalid_literal("string escape", literal, marker));
                    }
                    out.push(code_point(digits, digits.len(), literal, marker)?);
                    chars = braced[close + 1..].chars();
                } else {
                    let digits: String = chars.by_ref().take(4).collect();
                    out.push(code_point(&digits, 4, literal, marker)?);
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn code_point(digits: &str, width: usize, literal: &str, marker: &Marker) -> Result<char> {
    if digits.len() != width || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid_literal("string escape", literal, marker));
    }
    u32::from_str_radix(digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| invalid_literal("string escape", literal, marker))
}

fn invalid_literal(literal_type: &str, value: &str, marker: &Marker) -> Error {
    Error::new(ErrorKind::InvalidLiteral {
        literal_type: literal_type.into(),
        value: value.into(),
    })
    .at(marker.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn marker() -> Marker {
        Marker::at(Arc::from("test"), 0, 0, 1)
    }

    #[test]
    fn literal_spec_orders_longest_first() {
        let spec = literal_spec(["<", "<=", "=", "<<="]).unwrap();
        assert_eq!(spec.pattern, "<<=|<=|<|=");
        assert!(literal_spec(std::iter::empty()).is_none());
    }

    #[test]
    fn literal_spec_escapes_metacharacters() {
        let spec = literal_spec(["(", "**", "."]).unwrap();
        assert_eq!(spec.pattern, r"\*\*|\(|\.");
    }

    #[test]
    fn unescape_handles_common_escapes() {
        let m = marker();
        assert_eq!(unescape(r#""\"""#, &m).unwrap(), "\"");
        assert_eq!(unescape(r#""a\tb\nc""#, &m).unwrap(), "a\tb\nc");
        assert_eq!(unescape(r"'it\'s'", &m).unwrap(), "it's");
        assert_eq!(unescape(r#""\x41B\u{1F600}""#, &m).unwrap(), "AB\u{1F600}");
        assert_eq!(unescape(r#""\q""#, &m).unwrap(), "q");
        assert_eq!(unescape("\"a\\\nb\"", &m).unwrap(), "ab");
    }

    #[test]
    fn malformed_escapes_are_rejected() {
        let m = marker();
        assert!(unescape(r#""\xZZ""#, &m).is_err());
        assert!(unescape(r#""\u12""#, &m).is_err());
        assert!(unescape(r#""\u{}""#, &m).is_err());
        assert!(unescape(r#""\u{D800}""#, &m).is_err());
    }

    #[test]
    fn numbers_decode() {
        let m = marker();
        assert_eq!(parse_hex("0xAF", &m).unwrap(), 175.0);
        assert_eq!(parse_decimal("8.88", &m).unwrap(), 8.88);
        assert_eq!(parse_decimal(".5e2", &m).unwrap(), 50.0);
        assert_eq!(parse_decimal("1e-1", &m).unwrap(), 0.1);
        assert!(parse_hex("0x10000000000000000", &m).is_err());
    }
}
