//! Packrat matching over a materialized token list.
//!
//! Each `(position, non-terminal)` pair is computed at most once. Direct left
//! recursion is matched as a base match followed by an iterative left fold.

use tracing::trace;

use crate::{
    errors::{Error, ErrorKind, Result},
    parser::{
        memo::{Memo, MemoTable, Step},
        validate::{CompiledGrammar, CompiledRule, Slot},
        ReduceContext,
    },
    stack,
    token::Token,
    value::FromToken,
};

pub(crate) struct Matcher<'p, V> {
    grammar: &'p CompiledGrammar<V>,
    tokens: &'p [Token],
    memo: MemoTable<V>,
    furthest: usize,
}

impl<'p, V: Clone + FromToken> Matcher<'p, V> {
    pub fn new(grammar: &'p CompiledGrammar<V>, tokens: &'p [Token]) -> Self {
        Self {
            grammar,
            tokens,
            memo: MemoTable::new(tokens.len() + 1, grammar.non_terminals.len()),
            furthest: 0,
        }
    }

    /// Farthest token index at which a terminal failed to match.
    pub fn furthest(&self) -> usize {
        self.furthest
    }

    pub fn run(&mut self, start: usize) -> Result<Memo<V>> {
        self.match_non_terminal(start, 0)
    }

    fn match_symbol(&mut self, slot: &Slot, at: usize) -> Result<Memo<V>> {
        match slot {
            Slot::Terminal(kind) => match self.tokens.get(at) {
                Some(token) if token.kind == *kind => Ok(Some(Step {
                    value: V::from_token(token),
                    next: at + 1,
                })),
                _ => {
                    self.furthest = self.furthest.max(at);
                    Ok(None)
                }
            },
            Slot::NonTerminal(id) => self.match_non_terminal(*id, at),
        }
    }

    fn match_non_terminal(&mut self, id: usize, at: usize) -> Result<Memo<V>> {
        if let Some(memo) = self.memo.get(at, id) {
            trace!(
                non_terminal = %self.grammar.non_terminals[id].name,
                at,
                matched = memo.is_some(),
                "memo hit"
            );
            return Ok(memo.clone());
        }
        // Seeded as a failure so a re-entrant attempt at the same position
        // backtracks instead of recursing forever.
        self.memo.insert(at, id, None);
        let outcome = stack::ensure_sufficient_stack(|| self.expand(id, at))?;
        self.memo.insert(at, id, outcome.clone());
        Ok(outcome)
    }

    fn expand(&mut self, id: usize, at: usize) -> Result<Memo<V>> {
        let grammar = self.grammar;
        let spec = &grammar.non_terminals[id];

        let mut base = None;
        for &index in &spec.ordinary {
            let rule = &grammar.rules[index];
            if let Some((values, next)) = self.match_sequence(rule, &rule.rhs, at, false)? {
                let value = self.reduce(rule, at, next, values)?;
                base = Some(Step { value, next });
                break;
            }
        }
        let Some(mut acc) = base else {
            return Ok(None);
        };

        // Every successful extension restarts from the first left-recursive
        // rule, so earlier-declared rules win at each extension point.
        'extend: loop {
            for &index in &spec.left_recursive {
                let rule = &grammar.rules[index];
                let tail = self.match_sequence(rule, &rule.rhs[1..], acc.next, true)?;
                if let Some((tail, next)) = tail {
                    trace!(rule = %rule.notation, from = at, to = next, "left-recursive extension");
                    let mut values = Vec::with_capacity(rule.rhs.len());
                    values.push(acc.value);
                    values.extend(tail);
                    let value = self.reduce(rule, at, next, values)?;
                    acc = Step { value, next };
                    continue 'extend;
                }
            }
            break;
        }
        Ok(Some(acc))
    }

    /// Matches `symbols` in sequence from `at`. In a left-recursive
    /// continuation a miss on the first symbol just ends the fold.
    fn match_sequence(
        &mut self,
        rule: &CompiledRule<V>,
        symbols: &[Slot],
        at: usize,
        continuation: bool,
    ) -> Result<Option<(Vec<V>, usize)>> {
        let mut values = Vec::with_capacity(symbols.len());
        let mut next = at;
        for (position, slot) in symbols.iter().enumerate() {
            match self.match_symbol(slot, next)? {
                Some(step) => {
                    values.push(step.value);
                    next = step.next;
                }
                None if rule.fail_hard && (position > 0 || !continuation) => {
                    return Err(self.required_match(rule, slot, next));
                }
                None => return Ok(None),
            }
        }
        Ok(Some((values, next)))
    }

    fn reduce(
        &self,
        rule: &CompiledRule<V>,
        start: usize,
        end: usize,
        mut values: Vec<V>,
    ) -> Result<V> {
        let consumed = &self.tokens[start..end];
        let marker = match (consumed.first(), consumed.last()) {
            (Some(first), Some(last)) => first.marker.through(&last.marker),
            _ => self.token_at(start).marker.clone(),
        };
        let context = ReduceContext {
            marker,
            tokens: consumed,
            non_terminal: &self.grammar.non_terminals[rule.lhs].name,
        };
        match &rule.reducer {
            Some(reducer) => reducer(&context, values),
            None => values
                .pop()
                .ok_or_else(|| context.error("nothing to reduce")),
        }
    }

    /// When a nested non-terminal got further than `at` before failing, the
    /// help names the token it stopped on.
    fn required_match(&self, rule: &CompiledRule<V>, slot: &Slot, at: usize) -> Error {
        let token = self.token_at(at);
        let error = Error::new(ErrorKind::RequiredMatch {
            non_terminal: format!("#{}", self.grammar.non_terminals[rule.lhs].name),
            expected: self.grammar.slot_name(slot),
            found: token.descriptor(),
        })
        .at(token.marker.clone());
        if self.furthest <= at {
            return error;
        }
        let stuck = self.token_at(self.furthest);
        error.with_help(format!(
            "matching stopped at {} on line {}",
            stuck.descriptor(),
            stuck.line_number()
        ))
    }

    /// The token at `at`, or EOF when matching ran past the end.
    fn token_at(&self, at: usize) -> &'p Token {
        let tokens = self.tokens;
        &tokens[at.min(tokens.len().saturating_sub(1))]
    }
}
