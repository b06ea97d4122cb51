//! Grammars as flat production-rule lists.
//!
//! A grammar is pure data: a start non-terminal and an ordered list of rules.
//! Order among rules for the same non-terminal matters, since the first rule
//! that matches wins.

use std::{fmt, sync::Arc};

use crate::{
    errors::{Error, Result},
    parser::ReduceContext,
    token::TokenKind,
};

// ============================================================================
// SYMBOLS
// ============================================================================

/// A right-hand-side symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(TokenKind),
    NonTerminal(String),
}

impl Symbol {
    pub fn terminal(kind: TokenKind) -> Self {
        Symbol::Terminal(kind)
    }

    pub fn non_terminal(name: impl Into<String>) -> Self {
        Symbol::NonTerminal(name.into())
    }

    /// Reads one word of rule notation: `#name` is a non-terminal, the
    /// category names are categories, anything else is a literal kind.
    pub fn parse(word: &str) -> Self {
        match word.strip_prefix('#') {
            Some(name) => Symbol::NonTerminal(name.to_string()),
            None => Symbol::Terminal(TokenKind::from_name(word)),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Symbol::Terminal(kind) => kind.as_str().is_empty(),
            Symbol::NonTerminal(name) => name.is_empty(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(kind) => write!(f, "{}", kind),
            Symbol::NonTerminal(name) => write!(f, "#{}", name),
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

/// Builds a non-terminal's value from the values of its matched symbols.
pub type Reducer<V> = Arc<dyn Fn(&ReduceContext<'_>, Vec<V>) -> Result<V, Error> + Send + Sync>;

/// One production `lhs -> rhs`.
pub struct Rule<V> {
    pub lhs: String,
    pub rhs: Vec<Symbol>,
    pub reducer: Option<Reducer<V>>,
    /// A failed match inside this rule aborts the whole parse instead of
    /// backtracking.
    pub fail_hard: bool,
}

impl<V> Rule<V> {
    /// A rule whose right-hand side is written in notation, e.g.
    /// `Rule::new("sum", "#sum + #product")`.
    pub fn new(lhs: impl AsRef<str>, rhs: &str) -> Self {
        Self::from_symbols(lhs, rhs.split_whitespace().map(Symbol::parse).collect())
    }

    pub fn from_symbols(lhs: impl AsRef<str>, rhs: Vec<Symbol>) -> Self {
        let lhs = lhs.as_ref();
        Self {
            lhs: lhs.strip_prefix('#').unwrap_or(lhs).to_string(),
            rhs,
            reducer: None,
            fail_hard: false,
        }
    }

    pub fn reduce<F>(mut self, reducer: F) -> Self
    where
        F: Fn(&ReduceContext<'_>, Vec<V>) -> Result<V, Error> + Send + Sync + 'static,
    {
        self.reducer = Some(Arc::new(reducer));
        self
    }

    pub fn fail_hard(mut self) -> Self {
        self.fail_hard = true;
        self
    }

    pub fn is_left_recursive(&self) -> bool {
        matches!(self.rhs.first(), Some(Symbol::NonTerminal(name)) if *name == self.lhs)
    }

    /// `#lhs <- rhs...`, as used in diagnostics.
    pub fn notation(&self) -> String {
        let rhs = self
            .rhs
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        format!("#{} <- {}", self.lhs, rhs)
    }
}

impl<V> Clone for Rule<V> {
    fn clone(&self) -> Self {
        Self {
            lhs: self.lhs.clone(),
            rhs: self.rhs.clone(),
            reducer: self.reducer.clone(),
            fail_hard: self.fail_hard,
        }
    }
}

impl<V> fmt::Debug for Rule<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("lhs", &self.lhs)
            .field("rhs", &self.rhs)
            .field("reducer", &self.reducer.is_some())
            .field("fail_hard", &self.fail_hard)
            .finish()
    }
}

// ============================================================================
// GRAMMAR
// ============================================================================

pub struct Grammar<V> {
    pub start: String,
    pub rules: Vec<Rule<V>>,
}

impl<V> Grammar<V> {
    pub fn new(start: impl AsRef<str>) -> Self {
        let start = start.as_ref();
        Self {
            start: start.strip_prefix('#').unwrap_or(start).to_string(),
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule<V>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule<V>>) -> Self {
        self.rules.extend(rules);
        self
    }
}

impl<V> Clone for Grammar<V> {
    fn clone(&self) -> Self {
        Self {
            start: self.start.clone(),
            rules: self.rules.clone(),
        }
    }
}

impl<V> fmt::Debug for Grammar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("start", &self.start)
            .field("rules", &self.rules)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn notation_distinguishes_symbol_classes() {
        let rule: Rule<Value> = Rule::new("#atom", "( #sum ) NUMBER EOF <=");
        assert_eq!(rule.lhs, "atom");
        assert_eq!(
            rule.rhs,
            vec![
                Symbol::Terminal(TokenKind::literal("(")),
                Symbol::non_terminal("sum"),
                Symbol::Terminal(TokenKind::literal(")")),
                Symbol::Terminal(TokenKind::Number),
                Symbol::Terminal(TokenKind::Eof),
                Symbol::Terminal(TokenKind::literal("<=")),
            ]
        );
        assert_eq!(rule.notation(), "#atom <- ( #sum ) NUMBER EOF <=");
    }

    #[test]
    fn left_recursion_is_detected_on_first_symbol_only() {
        let direct: Rule<Value> = Rule::new("sum", "#sum + #product");
        let later: Rule<Value> = Rule::new("sum", "#product + #sum");
        assert!(direct.is_left_recursive());
        assert!(!later.is_left_recursive());
    }

    #[test]
    fn lone_hash_is_an_empty_non_terminal() {
        assert!(Symbol::parse("#").is_empty());
        assert!(!Symbol::parse("#a").is_empty());
    }
}
