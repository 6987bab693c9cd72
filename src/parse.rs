use pest::Parser;
use std::f64::consts::{E, PI};

use crate::errors::CalcError;
use crate::stack::{AngleMode, Stack, UNARY_MINUS};

#[derive(Parser)]
#[grammar = "calc.pest"]
pub struct CalcParser;

// tracks enough of the token stream to insert implicit multiplication and
// to tell unary from binary plus/minus
#[derive(Default)]
struct EvalState {
    is_last_value: bool,
    is_last_func: bool,
}

/// Returns a constant value by its name. Name is case-insensitive
pub fn constant(name: &str) -> Option<f64> {
    match name.to_lowercase().as_str() {
        "e" => Some(E),
        "pi" => Some(PI),
        _ => None,
    }
}

fn push_number(stk: &mut Stack, state: &mut EvalState, v: f64) -> Result<(), CalcError> {
    if state.is_last_func {
        // a function without brackets applies to the next value: "sin 2"
        stk.push("(", None)?;
    } else if state.is_last_value {
        stk.push("*", None)?;
    }
    stk.push("", Some(v))?;
    if state.is_last_func {
        stk.push(")", None)?;
    }
    state.is_last_value = true;
    state.is_last_func = false;
    Ok(())
}

/// Evaluates a normalized arithmetic expression to a floating point number.
///
/// The grammar is fixed: numeric literals, `+ - * / %`, power (`^` or `**`),
/// brackets, and the single-argument functions `sin cos tan asin acos atan
/// log ln sqrt`. Unknown identifiers are rejected, never executed.
pub fn evaluate(expr: &str, angle_mode: AngleMode) -> Result<f64, CalcError> {
    let pairs = match CalcParser::parse(Rule::expr, expr) {
        Ok(p) => p,
        Err(..) => return Err(CalcError::ParseFailed("invalid expression".to_string())),
    };

    let mut state = EvalState::default();
    let mut stk = Stack::new(angle_mode);
    for pair in pairs {
        let rule = pair.as_rule();
        let val = pair.as_span().as_str().to_lowercase();
        match rule {
            Rule::int | Rule::float => {
                let v = val
                    .parse::<f64>()
                    .map_err(|_| CalcError::ParseFailed(val.to_string()))?;
                push_number(&mut stk, &mut state, v)?;
            }
            Rule::open_b => {
                if state.is_last_value {
                    stk.push("*", None)?;
                }
                stk.push("(", None)?;
                state.is_last_value = false;
                state.is_last_func = false;
            }
            Rule::close_b => {
                stk.push(")", None)?;
                state.is_last_value = true;
                state.is_last_func = false;
            }
            Rule::operator => {
                if val == "+" && !state.is_last_value {
                    // unary plus - no-op
                } else if val == "-" && !state.is_last_value {
                    stk.push(UNARY_MINUS, None)?;
                } else {
                    stk.push(&val, None)?;
                }
                state.is_last_value = false;
                state.is_last_func = false;
            }
            Rule::ident => {
                if Stack::is_func(&val) {
                    if state.is_last_value {
                        stk.push("*", None)?;
                    }
                    stk.push(&val, None)?;
                    state.is_last_value = false;
                    state.is_last_func = true;
                } else if let Some(v) = constant(&val) {
                    push_number(&mut stk, &mut state, v)?;
                } else {
                    return Err(CalcError::UnknownIdent(val));
                }
            }
            Rule::EOI => {}
            _ => return Err(CalcError::Unreachable),
        }
    }

    stk.calculate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_rad(expr: &str) -> Result<f64, CalcError> {
        evaluate(expr, AngleMode::Rad)
    }

    #[test]
    fn test_expr() {
        assert_eq!(eval_rad("2+3"), Ok(5.0));
        assert_eq!(eval_rad("2+3*4"), Ok(14.0));
        assert_eq!(eval_rad("(2+3)*4"), Ok(20.0));
        assert_eq!(eval_rad("(3+2)(4-9)"), Ok(-25.0));
        assert_eq!(eval_rad("2(3+4)"), Ok(14.0));
        assert_eq!(eval_rad("10-2-3"), Ok(5.0));
        assert_eq!(eval_rad("20/4/5"), Ok(1.0));
        assert_eq!(eval_rad("7%3"), Ok(1.0));
        assert_eq!(eval_rad("1.5e2+0.5"), Ok(150.5));
        assert_eq!(eval_rad(".5*4"), Ok(2.0));
    }

    #[test]
    fn test_power() {
        // right-associative, calculator convention
        assert_eq!(eval_rad("2^3^2"), Ok(512.0));
        assert_eq!(eval_rad("2**3**2"), Ok(512.0));
        // unary minus binds tighter than power
        assert_eq!(eval_rad("-2^2"), Ok(4.0));
        assert_eq!(eval_rad("2^-1"), Ok(0.5));
    }

    #[test]
    fn test_unary() {
        assert_eq!(eval_rad("-3+5"), Ok(2.0));
        assert_eq!(eval_rad("+3+5"), Ok(8.0));
        assert_eq!(eval_rad("2--3"), Ok(5.0));
        assert_eq!(eval_rad("-(2+3)"), Ok(-5.0));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval_rad("sqrt(16)"), Ok(4.0));
        let v = eval_rad("log(1000)").unwrap();
        assert!((v - 3.0).abs() < 1e-12);
        assert_eq!(eval_rad("ln(1)"), Ok(0.0));
        assert_eq!(eval_rad("sin(0)"), Ok(0.0));
        assert_eq!(eval_rad("sin(-0.5)"), Ok((-0.5f64).sin()));
        // trailing closing bracket may be omitted
        assert_eq!(eval_rad("sqrt(16"), Ok(4.0));
        // implicit multiplication before a function call
        assert_eq!(eval_rad("2sqrt(9)"), Ok(6.0));
        assert_eq!(eval_rad("sqrt(9)sqrt(4)"), Ok(6.0));
    }

    #[test]
    fn test_constants() {
        assert_eq!(eval_rad("pi"), Ok(std::f64::consts::PI));
        assert_eq!(eval_rad("2pi"), Ok(2.0 * std::f64::consts::PI));
        assert_eq!(eval_rad("e"), Ok(std::f64::consts::E));
    }

    #[test]
    fn test_degrees() {
        let v = evaluate("sin(30)", AngleMode::Deg).unwrap();
        assert!((v - 0.5).abs() < 1e-12);
        let v = evaluate("atan(1)", AngleMode::Deg).unwrap();
        assert!((v - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_failures() {
        assert_eq!(eval_rad(""), Err(CalcError::EmptyExpression));
        assert_eq!(eval_rad("2+"), Err(CalcError::TooManyOps));
        assert_eq!(eval_rad("*2"), Err(CalcError::TooManyOps));
        assert_eq!(
            eval_rad("2)"),
            Err(CalcError::ClosingBracketMismatch)
        );
        assert_eq!(
            eval_rad("1/0"),
            Err(CalcError::DividedByZero("1".to_string()))
        );
        assert!(matches!(eval_rad("2@5"), Err(CalcError::ParseFailed(..))));
        assert!(matches!(eval_rad("2 = 3"), Err(CalcError::ParseFailed(..))));
    }

    #[test]
    fn test_injection_rejected() {
        assert_eq!(
            eval_rad("system(1)"),
            Err(CalcError::UnknownIdent("system".to_string()))
        );
        assert_eq!(
            eval_rad("alert(1)+2"),
            Err(CalcError::UnknownIdent("alert".to_string()))
        );
        assert!(eval_rad("2; drop table").is_err());
    }
}
