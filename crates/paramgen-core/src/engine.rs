//! Seam between the reducer and the guard expression language.

use paramgen_formula::{FormulaError, Value};

/// Classifies and evaluates guard keys.
///
/// The reducer only relies on this trait, so the expression grammar can be
/// swapped without touching reduction.
pub trait GuardEngine {
    /// Whether `key` is a guard (the literal `else` included).
    fn is_guard(&self, key: &str) -> bool;

    /// Whether `token` still contains a `$NAME` / `${NAME}` placeholder.
    fn has_expandable_var(&self, token: &str) -> bool;

    /// Evaluate an expanded guard expression.
    fn evaluate(&self, guard: &str) -> Result<Value, FormulaError>;
}

/// Default engine backed by `paramgen-formula`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaEngine;

impl GuardEngine for FormulaEngine {
    fn is_guard(&self, key: &str) -> bool {
        paramgen_formula::is_logical_expr(key)
    }

    fn has_expandable_var(&self, token: &str) -> bool {
        paramgen_formula::has_expandable_var(token)
    }

    fn evaluate(&self, guard: &str) -> Result<Value, FormulaError> {
        paramgen_formula::eval_formula(guard)
    }
}
