//! Guard expressions for ParamGen configuration trees.
//!
//! A guard is a mapping key such as `$COMP > 1` or `OCN_GRID == 'gx1v7'`
//! that selects a branch of the tree. This crate owns the three primitives
//! the reducer needs: classifying a key as a guard, detecting unexpanded
//! `$NAME` / `${NAME}` placeholders, and evaluating an expanded guard.

mod error;
mod eval;
mod lexer;
mod parser;


use log::trace;
use regex::Regex;
use std::sync::LazyLock;

/// Error type returned by expression parsing and evaluation.
pub use error::FormulaError;
/// Value produced by evaluating an expression.
pub use eval::Value;

/// Literal key that always matches, with the lowest priority.
pub const ELSE_GUARD: &str = "else";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\w+|\$\{\w+\}").expect("placeholder regex"));

/// Returns true if `token` is `else` or a boolean-valued expression.
///
/// Classification is purely syntactic: placeholders are accepted as operands,
/// so `$COMP > 1` is a guard before its variables are expanded.
pub fn is_logical_expr(token: &str) -> bool {
    if token == ELSE_GUARD {
        return true;
    }
    match parser::parse(token) {
        Ok(expr) => expr.is_logical(),
        Err(err) => {
            trace!("not a guard: {err}");
            false
        }
    }
}

/// Returns true if `token` contains a `$NAME` or `${NAME}` placeholder.
pub fn has_expandable_var(token: &str) -> bool {
    PLACEHOLDER.is_match(token)
}

/// Parse and evaluate `expr`.
pub fn eval_formula(expr: &str) -> Result<Value, FormulaError> {
    let tree = parser::parse(expr)?;
    eval::Evaluator::new(expr).eval(&tree)
}
