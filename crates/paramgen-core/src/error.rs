//! Error types for tree reduction.

use paramgen_formula::FormulaError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while building or reducing a parameter tree.
///
/// Every variant carries the offending key, mapping or expression verbatim.
/// Mappings are rendered as compact JSON in document order.
#[derive(Debug, Error)]
pub enum ParamGenError {
    /// Constructor input is not a mapping.
    #[error("parameter data must be a mapping, got {kind}: {value}")]
    Schema { kind: String, value: String },
    /// Some but not all keys of a mapping are guards.
    #[error("only a subset of the keys are guards (logical expressions): {mapping}")]
    MixedGuard { mapping: String },
    /// A guard still contains a placeholder when it is evaluated.
    #[error(
        "the guard `{guard}` has an expandable variable; all variables must be expanded before guards are evaluated"
    )]
    UnresolvedGuardVariable { guard: String },
    /// The guard evaluated to something other than a boolean.
    #[error("guard `{guard}` is not boolean (evaluated to {value})")]
    NonBooleanGuard { guard: String, value: String },
    /// No guard, including `else`, evaluated to true.
    #[error("none of the guards evaluate to true: {mapping}")]
    NoGuardSatisfied { mapping: String },
    /// Match policy is neither `first` nor `last`.
    #[error("unknown match policy `{0}` (expected `first` or `last`)")]
    UnknownMatchPolicy(String),
    /// A placeholder could not be expanded.
    #[error("cannot expand the variable `{placeholder}`: {reason}")]
    VariableExpansion { placeholder: String, reason: String },
    /// `reduce` was called on an instance that is already reduced.
    #[error("parameter data already reduced")]
    AlreadyReduced,
    /// `reduce` was called on an empty mapping.
    #[error("empty parameter data")]
    EmptyData,
    /// The guard failed to parse or evaluate.
    #[error("failed to evaluate guard `{guard}`: {source}")]
    Formula {
        guard: String,
        #[source]
        source: FormulaError,
    },
    /// Reading an input file failed.
    #[error("failed to read parameter file: {0}")]
    Read(#[from] std::io::Error),
    /// JSON input could not be decoded.
    #[error("failed to parse json: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML input could not be decoded.
    #[error("failed to parse yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Input file extension is not recognized.
    #[error("unsupported parameter file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}
