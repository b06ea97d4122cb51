//! Shared grammars and helpers for the integration tests.

#![allow(dead_code)]

use lexparse::{
    Grammar, Lexer, LexerConfig, NewlineBehavior, ParseOptions, Parser, ReduceContext, Result,
    Rule, Token, TokenKind, TokenValue, Value,
};

pub fn options() -> ParseOptions {
    ParseOptions::default()
}

pub fn num(ctx: &ReduceContext<'_>, value: &Value) -> Result<f64> {
    value
        .as_number()
        .ok_or_else(|| ctx.error(format!("expected a number, found {}", value.type_name())))
}

pub fn first(_: &ReduceContext<'_>, mut values: Vec<Value>) -> Result<Value> {
    Ok(values.swap_remove(0))
}

pub fn second(_: &ReduceContext<'_>, mut values: Vec<Value>) -> Result<Value> {
    Ok(values.swap_remove(1))
}

pub fn list(_: &ReduceContext<'_>, values: Vec<Value>) -> Result<Value> {
    Ok(Value::List(values))
}

/// Infix operator: `values` is `[lhs, op, rhs]`.
pub fn infix(ctx: &ReduceContext<'_>, values: Vec<Value>) -> Result<Value> {
    let (a, b) = (num(ctx, &values[0])?, num(ctx, &values[2])?);
    apply(ctx, values[1].as_str(), a, b)
}

/// Prefix operator: `values` is `[op, lhs, rhs]`.
pub fn prefix(ctx: &ReduceContext<'_>, values: Vec<Value>) -> Result<Value> {
    let (a, b) = (num(ctx, &values[1])?, num(ctx, &values[2])?);
    apply(ctx, values[0].as_str(), a, b)
}

fn apply(ctx: &ReduceContext<'_>, op: Option<&str>, a: f64, b: f64) -> Result<Value> {
    let n = match op {
        Some("+") => a + b,
        Some("-") => a - b,
        Some("*") => a * b,
        Some("/") => a / b,
        other => return Err(ctx.error(format!("unknown operator {other:?}"))),
    };
    Ok(Value::Number(n))
}

/// Left-recursive infix arithmetic with unary signs and grouping.
pub fn arithmetic() -> Grammar<Value> {
    Grammar::new("expr").rules([
        Rule::new("expr", "#sum"),
        Rule::new("sum", "#sum + #product").reduce(infix),
        Rule::new("sum", "#sum - #product").reduce(infix),
        Rule::new("sum", "#product"),
        Rule::new("product", "#product * #unary").reduce(infix),
        Rule::new("product", "#product / #unary").reduce(infix),
        Rule::new("product", "#unary"),
        Rule::new("unary", "- #unary")
            .reduce(|ctx, v: Vec<Value>| Ok(Value::Number(-num(ctx, &v[1])?))),
        Rule::new("unary", "+ #unary")
            .reduce(|ctx, v: Vec<Value>| Ok(Value::Number(num(ctx, &v[1])?))),
        Rule::new("unary", "#atom"),
        Rule::new("atom", "NUMBER"),
        Rule::new("atom", "( #sum )").reduce(second),
    ])
}

pub fn arithmetic_parser() -> Parser<Value> {
    let lexer = Lexer::new(LexerConfig::default().newline_behavior(NewlineBehavior::Ignore))
        .expect("default lexer config is valid");
    Parser::new(arithmetic(), lexer).expect("arithmetic grammar is valid")
}

/// Prefix-notation arithmetic where `#expr` must match once entered.
pub fn prefix_parser() -> Parser<Value> {
    let grammar = Grammar::new("top").rules([
        Rule::new("top", "#expr"),
        Rule::new("expr", "#e").fail_hard(),
        Rule::new("e", "NUMBER"),
        Rule::new("e", "* #e #expr").reduce(prefix),
        Rule::new("e", "/ #e #expr").reduce(prefix),
        Rule::new("e", "+ #e #expr").reduce(prefix),
        Rule::new("e", "- #e #expr").reduce(prefix),
    ]);
    Parser::with_default_lexer(grammar).expect("prefix grammar is valid")
}

/// `(kind, value)` pairs, dropping positions.
pub fn kinds_and_values(tokens: &[Token]) -> Vec<(TokenKind, Option<TokenValue>)> {
    tokens
        .iter()
        .map(|t| (t.kind.clone(), t.value.clone()))
        .collect()
}

pub fn lex(lexer: &Lexer, source: &str) -> Vec<Token> {
    lexer.list(source, None).expect("source lexes")
}
