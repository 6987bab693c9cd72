use std::f64::consts::{E, PI};

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::CalcError;
use crate::stack::Stack;

lazy_static! {
    // only a plain digit run right before '!' is a factorial
    static ref FACT_RE: Regex = Regex::new(r"(\d+)!").unwrap();
}

/// Appends one UI token (button press or key) to the raw input buffer.
///
/// Function names get their opening bracket appended, `pi`/`e` are replaced
/// by their literal values at insertion time, `x2`/`x3` become power
/// notation, and `ans` becomes the decimal string of the last raw answer.
/// Everything else (digits, `.`, operators, brackets, `!`) is appended
/// verbatim.
pub fn push_token(buf: &mut String, token: &str, last_answer: f64) {
    if Stack::is_func(token) {
        buf.push_str(token);
        buf.push('(');
    } else if token == "pi" {
        buf.push_str(&PI.to_string());
    } else if token == "e" {
        buf.push_str(&E.to_string());
    } else if token == "x2" {
        buf.push_str("^2");
    } else if token == "x3" {
        buf.push_str("^3");
    } else if token == "ans" {
        buf.push_str(&last_answer.to_string());
    } else {
        buf.push_str(token);
    }
}

/// Factorial of a non-negative integer value.
///
/// Returns infinity above 170 (171! does not fit into f64).
pub fn factorial(n: f64) -> Result<f64, CalcError> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(CalcError::InvalidFactorial(n.to_string()));
    }
    if n > 170.0 {
        return Ok(f64::INFINITY);
    }
    let mut result = 1.0;
    let mut i = 2.0;
    while i <= n {
        result *= i;
        i += 1.0;
    }
    Ok(result)
}

/// Rewrites a raw calculator string into a form the evaluator accepts.
///
/// Expands every `N!` (a digit run followed by `!`) left to right into the
/// computed factorial value. Factorial of a sub-expression is not supported;
/// any remaining `!` surfaces later as an evaluator failure, as does any
/// other malformed input - this function never validates the expression.
pub fn normalize(raw: &str) -> Result<String, CalcError> {
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for caps in FACT_RE.captures_iter(raw) {
        // both groups always exist on a match - unwrap is fine
        let whole = caps.get(0).unwrap();
        let digits = caps.get(1).unwrap().as_str();
        let n = digits
            .parse::<f64>()
            .map_err(|_| CalcError::ParseFailed(digits.to_string()))?;
        let f = factorial(n)?;
        out.push_str(&raw[last..whole.start()]);
        out.push_str(&f.to_string());
        last = whole.end();
    }
    out.push_str(&raw[last..]);
    Ok(out)
}
