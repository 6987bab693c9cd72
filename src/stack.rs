use std::f64::consts;

use lazy_static::lazy_static;

use crate::errors::CalcError;

pub(crate) type CalcErrorResult = Result<(), CalcError>;

/// Angle unit used by the trigonometric functions.
///
/// In degree mode a forward function converts its argument to radians before
/// the primitive is applied and an inverse function converts the primitive's
/// result back to degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AngleMode {
    Deg,
    Rad,
}

impl Default for AngleMode {
    fn default() -> AngleMode {
        AngleMode::Deg
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Entry {
    Val(f64),
    Op(String, i32, bool),
    OpenB,
    Func(String),
}

const PRI_NONE: i32 = 0;
pub(crate) const UNARY_MINUS: &str = "---";

lazy_static! {
    pub(crate) static ref STD_FUNCS: Vec<&'static str> =
        ["sin", "cos", "tan", "asin", "acos", "atan", "log", "ln", "sqrt"].to_vec();
}

/// Shunting-yard evaluation stack for plain f64 arithmetic.
///
/// Operators and values are pushed in infix order, converted to postfix in
/// `queue`/`output`, and reduced by `calculate`.
pub(crate) struct Stack {
    queue: Vec<Entry>,
    output: Vec<Entry>,
    values: Vec<f64>,
    angle_mode: AngleMode,
}

macro_rules! two_arg_op {
    ($id:ident, $op:tt) => {
        fn $id(&mut self) -> CalcErrorResult {
            if self.values.len() < 2 {
                return Err(CalcError::TooManyOps);
            }
            let v2 = self.values.pop().unwrap();
            let v1 = self.values.pop().unwrap();
            self.values.push(v1 $op v2);
            Ok(())
        }
    };
}

impl Stack {
    fn priority(op: &str) -> (i32, bool) {
        match op {
            UNARY_MINUS => (20, true),    // negate
            "^" | "**" => (17, true),     // power
            "*" | "/" | "%" => (12, false), // mult, div, remainder
            "+" | "-" => (8, false),      // add, sub
            _ => (PRI_NONE, false),       // invalid op
        }
    }

    pub(crate) fn is_func(s: &str) -> bool {
        STD_FUNCS.iter().any(|fname| *fname == s)
    }

    // move operators from the queue to output while the top operator in the
    // queue has equal or greater priority
    fn pop_while_priority(&mut self, priority: i32) {
        loop {
            if self.queue.is_empty() {
                return;
            }
            // queue is not empty, so unwrap is OK
            let e = self.queue.pop().unwrap();
            match &e {
                Entry::OpenB => {
                    self.queue.push(e);
                    return;
                }
                Entry::Func(..) => {
                    self.output.push(e);
                }
                Entry::Op(_, p, right) => {
                    if *p > priority || (*p == priority && !*right) {
                        self.output.push(e);
                    } else {
                        self.queue.push(e);
                        return;
                    }
                }
                _ => return, // unreachable
            }
        }
    }

    // move operators from the queue to output until the opening bracket
    fn pop_until_bracket(&mut self) -> CalcErrorResult {
        loop {
            if self.queue.is_empty() {
                return Err(CalcError::ClosingBracketMismatch);
            }

            // unwrap is ok - vector is not empty
            let e = self.queue.pop().unwrap();
            match &e {
                Entry::Val(..) | Entry::Op(..) | Entry::Func(..) => self.output.push(e),
                Entry::OpenB => return Ok(()),
            }
        }
    }

    // move all operators from queue to output.
    // Must be called only after the expression ends.
    fn pop_all(&mut self) -> CalcErrorResult {
        while let Some(v) = self.queue.pop() {
            match &v {
                Entry::OpenB => {} // do nothing - allows to omit last closing brackets
                Entry::Op(..) | Entry::Func(..) => self.output.push(v),
                _ => return Err(CalcError::Unreachable),
            }
        }
        Ok(())
    }

    // ------------ PUBLIC -----------------

    pub(crate) fn new(angle_mode: AngleMode) -> Self {
        Stack {
            queue: Vec::new(),
            output: Vec::new(),
            values: Vec::new(),
            angle_mode,
        }
    }

    pub(crate) fn push(&mut self, op: &str, val: Option<f64>) -> CalcErrorResult {
        if op.is_empty() {
            if let Some(v) = val {
                self.output.push(Entry::Val(v));
                return Ok(());
            }
            return Err(CalcError::EmptyExpression);
        }

        if Stack::is_func(op) {
            self.queue.push(Entry::Func(op.to_owned()));
            return Ok(());
        }

        if op == "(" {
            self.queue.push(Entry::OpenB);
            return Ok(());
        }
        if op == ")" {
            return self.pop_until_bracket();
        }

        let (pri, right_assoc) = Stack::priority(op);
        if pri == PRI_NONE {
            return Err(CalcError::InvalidOp(op.to_owned()));
        }

        self.pop_while_priority(pri);
        self.queue.push(Entry::Op(op.to_owned(), pri, right_assoc));

        Ok(())
    }

    pub(crate) fn calculate(&mut self) -> Result<f64, CalcError> {
        self.pop_all()?;
        if self.output.is_empty() {
            return Err(CalcError::EmptyExpression);
        }

        self.values = Vec::new();
        for i in 0..self.output.len() {
            let o = self.output[i].clone();
            match o {
                Entry::Val(v) => self.values.push(v),
                Entry::Op(op, ..) => self.process_operator(&op)?,
                Entry::Func(fname) => self.process_function(&fname)?,
                _ => return Err(CalcError::Unreachable),
            }
        }

        if self.values.len() != 1 {
            return Err(CalcError::InsufficientOps);
        }

        // values is never empty after calculation - unwrap is fine
        Ok(self.values.pop().unwrap())
    }

    fn process_operator(&mut self, op: &str) -> CalcErrorResult {
        match op {
            "+" => self.addition(),
            "-" => self.subtract(),
            "*" => self.multiply(),
            "/" => self.divide(),
            "%" => self.remainder(),
            "^" | "**" => self.power(),
            UNARY_MINUS => self.negate(),
            _ => Err(CalcError::InvalidOp(op.to_string())),
        }
    }

    fn process_function(&mut self, fname: &str) -> CalcErrorResult {
        if self.values.is_empty() {
            return Err(CalcError::TooManyOps);
        }
        // checked above - unwrap is fine
        let v = self.values.pop().unwrap();
        let r = match fname {
            "sin" => self.to_radians(v).sin(),
            "cos" => self.to_radians(v).cos(),
            "tan" => self.to_radians(v).tan(),
            "asin" => self.from_radians(Stack::checked_inverse(fname, v)?.asin()),
            "acos" => self.from_radians(Stack::checked_inverse(fname, v)?.acos()),
            "atan" => self.from_radians(v.atan()),
            "log" => Stack::checked_log(v)?.log10(),
            "ln" => Stack::checked_log(v)?.ln(),
            "sqrt" => {
                if v < 0.0 {
                    return Err(CalcError::NegativeSqrt(format!("{}", v)));
                }
                v.sqrt()
            }
            _ => return Err(CalcError::InvalidOp(fname.to_string())),
        };
        self.values.push(r);
        Ok(())
    }

    fn checked_inverse(fname: &str, v: f64) -> Result<f64, CalcError> {
        if !(-1.0..=1.0).contains(&v) {
            return Err(CalcError::ArgumentOutOfRange(
                fname.to_string(),
                format!("{}", v),
            ));
        }
        Ok(v)
    }

    fn checked_log(v: f64) -> Result<f64, CalcError> {
        if v <= 0.0 {
            return Err(CalcError::LogNonPositive(format!("{}", v)));
        }
        Ok(v)
    }

    fn to_radians(&self, v: f64) -> f64 {
        match self.angle_mode {
            AngleMode::Deg => v * consts::PI / 180.0,
            AngleMode::Rad => v,
        }
    }

    fn from_radians(&self, v: f64) -> f64 {
        match self.angle_mode {
            AngleMode::Deg => v * 180.0 / consts::PI,
            AngleMode::Rad => v,
        }
    }

    two_arg_op!(addition, +);
    two_arg_op!(subtract, -);
    two_arg_op!(multiply, *);

    fn divide(&mut self) -> CalcErrorResult {
        if self.values.len() < 2 {
            return Err(CalcError::TooManyOps);
        }
        let v2 = self.values.pop().unwrap();
        let v1 = self.values.pop().unwrap();
        if v2 == 0.0 {
            return Err(CalcError::DividedByZero(format!("{}", v1)));
        }
        self.values.push(v1 / v2);
        Ok(())
    }

    fn remainder(&mut self) -> CalcErrorResult {
        if self.values.len() < 2 {
            return Err(CalcError::TooManyOps);
        }
        let v2 = self.values.pop().unwrap();
        let v1 = self.values.pop().unwrap();
        if v2 == 0.0 {
            return Err(CalcError::DividedByZero(format!("{}", v1)));
        }
        self.values.push(v1 % v2);
        Ok(())
    }

    fn power(&mut self) -> CalcErrorResult {
        if self.values.len() < 2 {
            return Err(CalcError::TooManyOps);
        }
        let v2 = self.values.pop().unwrap();
        let v1 = self.values.pop().unwrap();
        self.values.push(v1.powf(v2));
        Ok(())
    }

    fn negate(&mut self) -> CalcErrorResult {
        if self.values.is_empty() {
            return Err(CalcError::TooManyOps);
        }
        let v = self.values.pop().unwrap();
        self.values.push(-v);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_order() {
        let mut stack = Stack::new(AngleMode::Rad);
        // 2 + 3 * 2 + 5 = 13
        let _ = stack.push("", Some(2.0));
        let _ = stack.push("+", None);
        let _ = stack.push("", Some(3.0));
        let _ = stack.push("*", None);
        let _ = stack.push("", Some(2.0));
        let _ = stack.push("+", None);
        let _ = stack.push("", Some(5.0));
        assert_eq!(stack.calculate(), Ok(13.0));
    }

    #[test]
    fn test_braces() {
        let mut stack = Stack::new(AngleMode::Rad);
        // 2 + 3 * (2 + 5) + 1 = 24
        let _ = stack.push("", Some(2.0));
        let _ = stack.push("+", None);
        let _ = stack.push("", Some(3.0));
        let _ = stack.push("*", None);
        let _ = stack.push("(", None);
        let _ = stack.push("", Some(2.0));
        let _ = stack.push("+", None);
        let _ = stack.push("", Some(5.0));
        let _ = stack.push(")", None);
        let _ = stack.push("+", None);
        let _ = stack.push("", Some(1.0));
        assert_eq!(stack.calculate(), Ok(24.0));
    }

    #[test]
    fn test_power_right_assoc() {
        let mut stack = Stack::new(AngleMode::Rad);
        // 5 + 2 ^ 2 ^ 3 + 1 = 262
        let _ = stack.push("", Some(5.0));
        let _ = stack.push("+", None);
        let _ = stack.push("", Some(2.0));
        let _ = stack.push("^", None);
        let _ = stack.push("", Some(2.0));
        let _ = stack.push("^", None);
        let _ = stack.push("", Some(3.0));
        let _ = stack.push("+", None);
        let _ = stack.push("", Some(1.0));
        assert_eq!(stack.calculate(), Ok(262.0));
    }

    #[test]
    fn test_functions() {
        let mut stack = Stack::new(AngleMode::Rad);
        // 2 + sqrt(25) = 7
        let _ = stack.push("", Some(2.0));
        let _ = stack.push("+", None);
        let _ = stack.push("sqrt", None);
        let _ = stack.push("(", None);
        let _ = stack.push("", Some(25.0));
        let _ = stack.push(")", None);
        assert_eq!(stack.calculate(), Ok(7.0));
    }

    #[test]
    fn test_degree_mode() {
        let mut stack = Stack::new(AngleMode::Deg);
        let _ = stack.push("sin", None);
        let _ = stack.push("(", None);
        let _ = stack.push("", Some(90.0));
        let _ = stack.push(")", None);
        let v = stack.calculate().unwrap();
        assert!((v - 1.0).abs() < 1e-12);

        let mut stack = Stack::new(AngleMode::Deg);
        let _ = stack.push("asin", None);
        let _ = stack.push("(", None);
        let _ = stack.push("", Some(1.0));
        let _ = stack.push(")", None);
        let v = stack.calculate().unwrap();
        assert!((v - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_domain_errors() {
        let mut stack = Stack::new(AngleMode::Rad);
        let _ = stack.push("", Some(1.0));
        let _ = stack.push("/", None);
        let _ = stack.push("", Some(0.0));
        assert_eq!(
            stack.calculate(),
            Err(CalcError::DividedByZero("1".to_string()))
        );

        let mut stack = Stack::new(AngleMode::Rad);
        let _ = stack.push("sqrt", None);
        let _ = stack.push("(", None);
        let _ = stack.push("", Some(-4.0));
        let _ = stack.push(")", None);
        assert_eq!(
            stack.calculate(),
            Err(CalcError::NegativeSqrt("-4".to_string()))
        );

        let mut stack = Stack::new(AngleMode::Rad);
        let _ = stack.push("ln", None);
        let _ = stack.push("(", None);
        let _ = stack.push("", Some(0.0));
        let _ = stack.push(")", None);
        assert_eq!(
            stack.calculate(),
            Err(CalcError::LogNonPositive("0".to_string()))
        );

        let mut stack = Stack::new(AngleMode::Rad);
        let _ = stack.push("asin", None);
        let _ = stack.push("(", None);
        let _ = stack.push("", Some(5.0));
        let _ = stack.push(")", None);
        assert_eq!(
            stack.calculate(),
            Err(CalcError::ArgumentOutOfRange("asin".to_string(), "5".to_string()))
        );
    }

    #[test]
    fn test_mismatched_bracket() {
        let mut stack = Stack::new(AngleMode::Rad);
        let _ = stack.push("", Some(2.0));
        assert_eq!(stack.push(")", None), Err(CalcError::ClosingBracketMismatch));
    }
}
