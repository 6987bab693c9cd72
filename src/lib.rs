//! # Educational calculator core
//!
//! The evaluation core of a calculator widget for school subjects: it turns
//! raw button/keyboard input into numeric results, evaluates a fixed catalog
//! of subject formulas, and keeps a bounded history of past calculations.
//! All DOM/rendering/storage plumbing lives in a UI collaborator; this crate
//! only computes and formats.
//!
//! The pipeline for an `=` press is
//! normalize -> evaluate -> format -> (display + history):
//! * [`normalize`] rewrites the raw string (factorials like `5!`, power
//!   shorthand `x2`/`x3`, `pi`/`e`/`ans` substitution at insertion time)
//! * [`parse`] and [`stack`] evaluate the arithmetic with a fixed grammar -
//!   user input is parsed, never executed
//! * [`format`] produces the canonical display string (10-digit rounding,
//!   exponential fallback, `"Error"` for non-finite results)
//!
//! The list of supported functions: sin, cos, tan, asin, acos, atan
//! (radians or degrees, see [`stack::AngleMode`]), log (base 10), ln, sqrt.
//!
//! Operators (starting from highest priority):
//! * `-` - unary minus
//! * `^` (or `**`) - power, right-associative
//! * `*`, `/`, `%` - multiplication, division, remainder
//! * `+`, `-` - addition, subtraction
//!
//! Implicit multiplication is inserted where a calculator user expects it:
//! `2(3+4)`, `(2+3)(4-9)`, `2pi`, `sqrt(4)sqrt(9)`.
//!
//! Predefined constants: `pi` and `e`.
//!
//! The formula catalog ([`formula`]) maps subject and formula keys to
//! metadata and pure computations (quadratic roots, Ohm's law, compound
//! interest, ...); its results flow through the same formatter and history.

#[macro_use]
extern crate pest_derive;

pub mod calculator;
pub mod errors;
pub mod format;
pub mod formula;
pub mod history;
pub mod normalize;
pub mod parse;
pub mod stack;

pub use calculator::{CalcMode, CalculatorState, RevertToken, DEFAULT_DISPLAY};
pub use errors::{CalcError, FormulaError, ValidationError};
pub use stack::AngleMode;
