//! Arithmetic over the default lexer, with left-recursive sums and products.

use crate::{
    errors::Result,
    grammar::{Grammar, Rule},
    lexer::{Lexer, LexerConfig, NewlineBehavior},
    parser::{ParseOptions, Parser, ReduceContext},
    value::Value,
};

/// `#calc <- #sum EOF`, failing hard so trailing input is reported.
pub fn grammar() -> Grammar<Value> {
    Grammar::new("calc").rules([
        Rule::new("calc", "#sum EOF").reduce(first).fail_hard(),
        Rule::new("sum", "#sum + #product").reduce(binary),
        Rule::new("sum", "#sum - #product").reduce(binary),
        Rule::new("sum", "#product"),
        Rule::new("product", "#product * #unary").reduce(binary),
        Rule::new("product", "#product / #unary").reduce(binary),
        Rule::new("product", "#unary"),
        Rule::new("unary", "- #unary").reduce(negate),
        Rule::new("unary", "+ #unary").reduce(plus),
        Rule::new("unary", "#atom"),
        Rule::new("atom", "NUMBER"),
        Rule::new("atom", "( #sum )").reduce(|_, mut v| Ok(v.swap_remove(1))),
    ])
}

pub fn calculator() -> Result<Parser<Value>> {
    let lexer = Lexer::new(LexerConfig::default().newline_behavior(NewlineBehavior::Ignore))?;
    Parser::new(grammar(), lexer)
}

pub fn evaluate(expression: &str) -> Result<f64> {
    let value = calculator()?.parse_value(expression, &ParseOptions::named("<expression>"))?;
    Ok(value.as_number().unwrap_or(f64::NAN))
}

fn first(_: &ReduceContext<'_>, mut values: Vec<Value>) -> Result<Value> {
    Ok(values.swap_remove(0))
}

fn negate(ctx: &ReduceContext<'_>, values: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(-number(ctx, &values[1])?))
}

fn plus(ctx: &ReduceContext<'_>, values: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(number(ctx, &values[1])?))
}

fn binary(ctx: &ReduceContext<'_>, values: Vec<Value>) -> Result<Value> {
    let lhs = number(ctx, &values[0])?;
    let rhs = number(ctx, &values[2])?;
    let result = match values[1].as_str() {
        Some("+") => lhs + rhs,
        Some("-") => lhs - rhs,
        Some("*") => lhs * rhs,
        Some("/") if rhs == 0.0 => return Err(ctx.error("division by zero")),
        Some("/") => lhs / rhs,
        _ => return Err(ctx.error(format!("unknown operator {}", values[1]))),
    };
    Ok(Value::Number(result))
}

fn number(ctx: &ReduceContext<'_>, value: &Value) -> Result<f64> {
    value
        .as_number()
        .ok_or_else(|| ctx.error(format!("expected a number, found {}", value.type_name())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(evaluate("2 + 7 * 8").unwrap(), 58.0);
        assert_eq!(evaluate("(2 + -7) * 8").unwrap(), -40.0);
        assert_eq!(evaluate("20 - 5 - 3").unwrap(), 12.0);
        assert_eq!(evaluate("64 / 4 / 2").unwrap(), 8.0);
        assert_eq!(evaluate("+2 * -3").unwrap(), -6.0);
        assert_eq!(evaluate("-(+4)").unwrap(), -4.0);
    }

    #[test]
    fn trailing_input_is_a_hard_error() {
        let err = evaluate("1 + 2 )").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::RequiredMatch { .. }), "{err}");
    }

    #[test]
    fn division_by_zero_is_semantic() {
        let err = evaluate("1 / (2 - 2)").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::Semantic {
                message: "division by zero".into()
            }
        );
    }
}
