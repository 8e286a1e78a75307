//! Error types for guard expression parsing and evaluation.

use thiserror::Error;

/// Errors returned while parsing or evaluating a guard expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// The expression is not well formed.
    #[error("syntax error in `{expr}` at offset {position}: {message}")]
    Syntax {
        expr: String,
        position: usize,
        message: String,
    },
    /// A `$NAME` placeholder reached evaluation without being expanded.
    #[error("unresolved variable `{name}` in `{expr}`")]
    UnresolvedVariable { expr: String, name: String },
    /// Operands of incompatible types.
    #[error("type error in `{expr}`: {message}")]
    Type { expr: String, message: String },
    /// Division or modulo by zero.
    #[error("division by zero in `{expr}`")]
    DivisionByZero { expr: String },
}

impl FormulaError {
    pub(crate) fn syntax(expr: &str, position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            expr: expr.to_string(),
            position,
            message: message.into(),
        }
    }

    pub(crate) fn type_error(expr: &str, message: impl Into<String>) -> Self {
        Self::Type {
            expr: expr.to_string(),
            message: message.into(),
        }
    }
}
