use thiserror::Error;

/// Errors raised while normalizing or evaluating an expression.
///
/// All of them are recoverable: the caller shows `"Error"` and keeps the
/// previous answer and the history intact.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("failed to parse expression: {0}")]
    ParseFailed(String),
    #[error("nothing to calculate")]
    EmptyExpression,
    #[error("mismatched closing bracket")]
    ClosingBracketMismatch,
    #[error("invalid operator '{0}'")]
    InvalidOp(String),
    #[error("unknown name '{0}'")]
    UnknownIdent(String),
    #[error("too many operators")]
    TooManyOps,
    #[error("too many numbers")]
    InsufficientOps,

    #[error("'{0}' divided by zero")]
    DividedByZero(String),
    #[error("square root of a negative number: {0}")]
    NegativeSqrt(String),
    #[error("logarithm of a non-positive number: {0}")]
    LogNonPositive(String),
    #[error("argument {1} of '{0}' out of range [-1..1]")]
    ArgumentOutOfRange(String, String),
    #[error("factorial is defined only for non-negative integers, got {0}")]
    InvalidFactorial(String),

    #[error("unreachable")]
    Unreachable,
}

/// Formula invocation with missing or non-numeric inputs.
///
/// Lists every offending input id so the UI can prompt for all of them at
/// once. No computation happens when validation fails.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid formula inputs (missing: [{}], invalid: [{}])", .missing.join(", "), .invalid.join(", "))]
pub struct ValidationError {
    pub missing: Vec<String>,
    pub invalid: Vec<String>,
}

/// Failure of a formula invocation as a whole.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("unknown formula '{0}:{1}'")]
    UnknownFormula(String, String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = CalcError::DividedByZero("5".to_string());
        assert_eq!(format!("{}", e), "'5' divided by zero");
        let e = ValidationError {
            missing: vec!["a".to_string(), "b".to_string()],
            invalid: vec!["c".to_string()],
        };
        assert_eq!(
            format!("{}", e),
            "invalid formula inputs (missing: [a, b], invalid: [c])"
        );
    }
}
