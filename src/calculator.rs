use std::collections::HashMap;

use tracing::debug;

use crate::errors::{CalcError, FormulaError};
use crate::format::{self, ERROR_DISPLAY};
use crate::formula;
use crate::history::HistoryLog;
use crate::normalize;
use crate::parse;
use crate::stack::AngleMode;

/// The display text outside of any calculation.
pub const DEFAULT_DISPLAY: &str = "0";

/// Which input surface is active. In formula mode the expression input is
/// inert; the formula catalog is driven directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalcMode {
    Normal,
    Scientific,
    Formula,
}

/// Handle for the delayed error-display reset.
///
/// A failed evaluation shows `"Error"` and hands the caller a token; the UI
/// schedules the reset and later calls [`CalculatorState::revert_display`]
/// with it. Any input action in between invalidates the token, so a stale
/// timer can never clobber newer display state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevertToken {
    epoch: u64,
}

/// The calculator state: one value, created at startup, owned by the single
/// UI-driven control flow for the process lifetime.
pub struct CalculatorState {
    mode: CalcMode,
    raw_input: String,
    display_result: String,
    angle_mode: AngleMode,
    last_answer: f64,
    history: HistoryLog,
    epoch: u64,
}

impl Default for CalculatorState {
    fn default() -> CalculatorState {
        CalculatorState::with_history(HistoryLog::new())
    }
}

impl CalculatorState {
    pub fn new() -> Self {
        Default::default()
    }

    /// Starts with a history restored by the UI collaborator.
    pub fn with_history(history: HistoryLog) -> Self {
        CalculatorState {
            mode: CalcMode::Normal,
            raw_input: String::new(),
            display_result: DEFAULT_DISPLAY.to_string(),
            angle_mode: AngleMode::default(),
            last_answer: 0.0,
            history,
            epoch: 0,
        }
    }

    pub fn mode(&self) -> CalcMode {
        self.mode
    }

    pub fn angle_mode(&self) -> AngleMode {
        self.angle_mode
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn display_result(&self) -> &str {
        &self.display_result
    }

    pub fn last_answer(&self) -> f64 {
        self.last_answer
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Empties the history. User confirmation is the UI's concern.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Switching the input surface resets the current calculation.
    pub fn set_mode(&mut self, mode: CalcMode) {
        self.mode = mode;
        self.clear();
    }

    pub fn set_angle_mode(&mut self, angle_mode: AngleMode) {
        self.angle_mode = angle_mode;
    }

    /// Appends one UI token to the input buffer. Inert in formula mode.
    pub fn push_token(&mut self, token: &str) {
        if self.mode == CalcMode::Formula {
            return;
        }
        self.epoch += 1;
        normalize::push_token(&mut self.raw_input, token, self.last_answer);
    }

    pub fn backspace(&mut self) {
        if self.mode == CalcMode::Formula {
            return;
        }
        self.epoch += 1;
        self.raw_input.pop();
    }

    pub fn clear(&mut self) {
        self.epoch += 1;
        self.raw_input.clear();
        self.display_result = DEFAULT_DISPLAY.to_string();
    }

    /// Runs the full pipeline on the current input buffer.
    ///
    /// On success the display, the last answer (the raw value, before
    /// formatting), and the history are updated and `None` is returned. On
    /// failure the display shows `"Error"` and the returned token lets the
    /// UI schedule [`revert_display`](Self::revert_display); the last answer
    /// and the history stay untouched. Empty input is a no-op.
    pub fn evaluate(&mut self) -> Option<RevertToken> {
        if self.mode == CalcMode::Formula || self.raw_input.is_empty() {
            return None;
        }
        self.epoch += 1;
        match run_pipeline(&self.raw_input, self.angle_mode) {
            Ok(value) => {
                let formatted = format::format_result(value);
                debug!(expr = %self.raw_input, result = %formatted, "evaluated");
                self.last_answer = value;
                self.display_result = formatted.clone();
                self.history.record(&self.raw_input, &formatted);
                None
            }
            Err(err) => {
                debug!(expr = %self.raw_input, error = %err, "evaluation failed");
                self.display_result = ERROR_DISPLAY.to_string();
                Some(RevertToken { epoch: self.epoch })
            }
        }
    }

    /// Resets the display to the default if nothing happened since the token
    /// was issued. Returns whether the reset was applied.
    pub fn revert_display(&mut self, token: RevertToken) -> bool {
        if token.epoch != self.epoch {
            return false;
        }
        self.display_result = DEFAULT_DISPLAY.to_string();
        true
    }

    /// Evaluates a catalog formula with user-supplied raw input strings and
    /// routes the outcome through the formatter and the history, the same as
    /// an expression evaluation. The input buffer is left showing the
    /// formula's display text. The last answer is not changed.
    pub fn apply_formula(
        &mut self,
        subject: &str,
        key: &str,
        raw: &HashMap<String, String>,
    ) -> Result<String, FormulaError> {
        let def = formula::lookup(subject, key)
            .ok_or_else(|| FormulaError::UnknownFormula(subject.to_string(), key.to_string()))?;
        let values = def.validate(raw)?;
        let result = def.apply(&values);
        let formatted = format::format_formula_result(&result);
        debug!(formula = %def.name, result = %formatted, "formula evaluated");

        self.epoch += 1;
        self.display_result = formatted.clone();
        self.history.record(&def.describe_invocation(&values), &formatted);
        self.raw_input = def.formula_text.to_string();
        Ok(formatted)
    }
}

fn run_pipeline(raw: &str, angle_mode: AngleMode) -> Result<f64, CalcError> {
    let normalized = normalize::normalize(raw)?;
    parse::evaluate(&normalized, angle_mode)
}
