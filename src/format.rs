use std::str;

use crate::formula::FormulaResult;

/// Display text for any evaluation that produced no usable number.
pub const ERROR_DISPLAY: &str = "Error";

const ROUND_SCALE: f64 = 1e10;
const EXP_UPPER: f64 = 1e10;
const EXP_LOWER: f64 = 1e-6;
const EXP_DIGITS: usize = 6;

const F64_BUF_LEN: usize = 48;
fn format_f64(g: f64) -> String {
    let mut buf = [b'\0'; F64_BUF_LEN];
    match dtoa::write(&mut buf[..], g) {
        Ok(len) => match str::from_utf8(&buf[..len]) {
            Ok(s) => s.to_string(),
            Err(..) => format!("{}", g),
        },
        Err(..) => format!("{}", g),
    }
}

// exponential notation with a fixed number of fractional digits and an
// explicit exponent sign: 1.000000e+15, 1.000000e-8
fn format_exponential(v: f64, digits: usize) -> String {
    let s = format!("{:.*e}", digits, v);
    match s.find('e') {
        Some(pos) if !s[pos + 1..].starts_with('-') => {
            format!("{}e+{}", &s[..pos], &s[pos + 1..])
        }
        _ => s,
    }
}

/// Maps a raw numeric result to its canonical display string.
///
/// The value is rounded to 10 decimal digits to suppress floating point
/// noise, then rendered as a plain decimal unless its magnitude is above
/// 1e10 or below 1e-6 (nonzero), in which case exponential notation with 6
/// fractional digits is used. NaN and infinities render as `"Error"`.
pub fn format_result(num: f64) -> String {
    if num.is_nan() || !num.is_finite() {
        return ERROR_DISPLAY.to_string();
    }

    let scaled = num * ROUND_SCALE;
    // very large values overflow the scaling step and need no rounding anyway
    let rounded = if scaled.is_finite() {
        scaled.round() / ROUND_SCALE
    } else {
        num
    };

    if rounded.abs() > EXP_UPPER || (rounded != 0.0 && rounded.abs() < EXP_LOWER) {
        return format_exponential(rounded, EXP_DIGITS);
    }

    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        return format!("{}", rounded as i64);
    }
    format_f64(rounded)
}

/// Formats a formula outcome: numbers follow [`format_result`], textual
/// results (like "No real roots") pass through unchanged.
pub fn format_formula_result(res: &FormulaResult) -> String {
    match res {
        FormulaResult::Number(n) => format_result(*n),
        FormulaResult::Text(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_suppression() {
        assert_eq!(format_result(0.1 + 0.2), "0.3");
        assert_eq!(format_result(1.0 / 3.0), "0.3333333333");
    }

    #[test]
    fn test_plain_decimal() {
        assert_eq!(format_result(0.0), "0");
        assert_eq!(format_result(120.0), "120");
        assert_eq!(format_result(-14.0), "-14");
        assert_eq!(format_result(12.5), "12.5");
        assert_eq!(format_result(1e-6), "0.000001");
    }

    #[test]
    fn test_exponential() {
        assert_eq!(format_result(1e15), "1.000000e+15");
        assert_eq!(format_result(1e-8), "1.000000e-8");
        assert_eq!(format_result(-2.5e12), "-2.500000e+12");
        // too large for the rounding step
        assert_eq!(format_result(1e300), "1.000000e+300");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_result(f64::NAN), "Error");
        assert_eq!(format_result(f64::INFINITY), "Error");
        assert_eq!(format_result(f64::NEG_INFINITY), "Error");
    }

    #[test]
    fn test_formula_text_passthrough() {
        let r = FormulaResult::Text("No real roots".to_string());
        assert_eq!(format_formula_result(&r), "No real roots");
        let r = FormulaResult::Number(0.5);
        assert_eq!(format_formula_result(&r), "0.5");
    }
}
