//! Grammar validation and compilation.
//!
//! Every structural check runs here, once, at parser construction. The output
//! refers to non-terminals by index and splits each non-terminal's rules into
//! ordinary and direct-left-recursive sets, declaration order preserved.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    errors::{Error, ErrorKind, Result},
    grammar::{Grammar, Reducer, Symbol},
    lexer::Lexer,
    token::TokenKind,
};

static NON_TERMINAL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("non-terminal name pattern is valid")
});

/// A rule symbol after name resolution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Terminal(TokenKind),
    NonTerminal(usize),
}

pub(crate) struct CompiledRule<V> {
    pub lhs: usize,
    pub rhs: Vec<Slot>,
    pub reducer: Option<Reducer<V>>,
    pub fail_hard: bool,
    pub notation: String,
}

#[derive(Debug, Default)]
pub(crate) struct NonTerminalSpec {
    pub name: String,
    pub ordinary: Vec<usize>,
    pub left_recursive: Vec<usize>,
}

pub(crate) struct CompiledGrammar<V> {
    pub start: usize,
    pub rules: Vec<CompiledRule<V>>,
    pub non_terminals: Vec<NonTerminalSpec>,
}

impl<V> CompiledGrammar<V> {
    pub fn slot_name(&self, slot: &Slot) -> String {
        match slot {
            Slot::Terminal(kind) => kind.to_string(),
            Slot::NonTerminal(id) => format!("#{}", self.non_terminals[*id].name),
        }
    }
}

pub(crate) fn compile<V>(grammar: Grammar<V>, lexer: &Lexer) -> Result<CompiledGrammar<V>> {
    let mut ids: HashMap<String, usize> = HashMap::new();
    let mut non_terminals: Vec<NonTerminalSpec> = Vec::new();

    for rule in &grammar.rules {
        let notation = rule.notation();
        if !NON_TERMINAL_NAME.is_match(&rule.lhs) {
            return Err(Error::new(ErrorKind::InvalidNonTerminal {
                name: rule.lhs.clone(),
            }));
        }
        if rule.rhs.is_empty() {
            return Err(Error::new(ErrorKind::EmptyProduction {
                non_terminal: rule.lhs.clone(),
            }));
        }
        if rule.rhs.iter().any(Symbol::is_empty) {
            return Err(Error::new(ErrorKind::EmptySymbol { rule: notation }));
        }
        if rule.is_left_recursive() && rule.rhs.len() < 2 {
            return Err(Error::new(ErrorKind::MalformedLeftRecursion { rule: notation }));
        }
        if rule.reducer.is_none() && rule.rhs.len() > 1 {
            return Err(Error::new(ErrorKind::MissingReducer { rule: notation }));
        }
        if !ids.contains_key(&rule.lhs) {
            ids.insert(rule.lhs.clone(), non_terminals.len());
            non_terminals.push(NonTerminalSpec {
                name: rule.lhs.clone(),
                ..NonTerminalSpec::default()
            });
        }
    }

    let start = *ids.get(&grammar.start).ok_or_else(|| {
        Error::new(ErrorKind::UndefinedStart {
            start: grammar.start.clone(),
        })
    })?;

    let mut rules = Vec::with_capacity(grammar.rules.len());
    for rule in grammar.rules {
        let notation = rule.notation();
        let left_recursive = rule.is_left_recursive();
        let rhs = rule
            .rhs
            .iter()
            .map(|symbol| resolve(symbol, &ids, lexer, &notation))
            .collect::<Result<Vec<_>>>()?;
        let lhs = ids[&rule.lhs];
        let index = rules.len();
        let spec = &mut non_terminals[lhs];
        if left_recursive {
            spec.left_recursive.push(index);
        } else {
            spec.ordinary.push(index);
        }
        rules.push(CompiledRule {
            lhs,
            rhs,
            reducer: rule.reducer,
            fail_hard: rule.fail_hard,
            notation,
        });
    }

    Ok(CompiledGrammar {
        start,
        rules,
        non_terminals,
    })
}

fn resolve(
    symbol: &Symbol,
    ids: &HashMap<String, usize>,
    lexer: &Lexer,
    notation: &str,
) -> Result<Slot> {
    match symbol {
        Symbol::NonTerminal(name) => ids.get(name).map(|&id| Slot::NonTerminal(id)).ok_or_else(|| {
            Error::new(ErrorKind::UndefinedNonTerminal {
                name: name.clone(),
                rule: notation.to_string(),
            })
        }),
        Symbol::Terminal(kind) if lexer.recognizes(kind) => Ok(Slot::Terminal(kind.clone())),
        Symbol::Terminal(kind) => Err(Error::new(ErrorKind::UnrecognizedTerminal {
            kind: kind.to_string(),
            rule: notation.to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grammar::Rule, value::Value};

    fn first(_: &crate::parser::ReduceContext<'_>, mut values: Vec<Value>) -> Result<Value> {
        Ok(values.swap_remove(0))
    }

    #[test]
    fn rules_partition_in_declaration_order() {
        let grammar = Grammar::new("sum").rules([
            Rule::new("sum", "#sum + NUMBER").reduce(first),
            Rule::new("sum", "NUMBER"),
            Rule::new("sum", "#sum - NUMBER").reduce(first),
            Rule::new("sum", "( #sum )").reduce(first),
        ]);
        let compiled = compile(grammar, &Lexer::default()).unwrap();
        let sum = &compiled.non_terminals[compiled.start];
        assert_eq!(sum.name, "sum");
        assert_eq!(sum.ordinary, vec![1, 3]);
        assert_eq!(sum.left_recursive, vec![0, 2]);
        assert_eq!(compiled.rules[0].rhs[0], Slot::NonTerminal(0));
        assert_eq!(compiled.slot_name(&compiled.rules[1].rhs[0]), "NUMBER");
    }

    #[test]
    fn non_terminal_names_must_be_identifiers() {
        for bad in ["", "1abc", "a b", "x!"] {
            let grammar: Grammar<Value> =
                Grammar::new("x").rule(Rule::from_symbols(bad, vec![Symbol::parse("NUMBER")]));
            let err = compile(grammar, &Lexer::default()).err().unwrap();
            assert!(
                matches!(err.kind, ErrorKind::InvalidNonTerminal { .. }),
                "{bad:?}: {err}"
            );
        }
    }

    #[test]
    fn single_symbol_self_reference_is_malformed() {
        let grammar: Grammar<Value> = Grammar::new("a").rules([
            Rule::new("a", "NUMBER"),
            Rule::new("a", "#a"),
        ]);
        let err = compile(grammar, &Lexer::default()).err().unwrap();
        assert!(matches!(err.kind, ErrorKind::MalformedLeftRecursion { .. }));
    }
}
