//! Reduction engine for guarded parameter trees.
//!
//! A parameter tree is a nested mapping whose keys may be guards
//! (`"$COMP > 1"`, `"else"`) and whose keys and string values may hold
//! `$NAME` / `${NAME}` placeholders. [`ParamGen::reduce_with`] expands the
//! placeholders through a caller-supplied [`VarResolver`], keeps the branch
//! chosen by the guards under the configured [`MatchPolicy`], and leaves a
//! concrete tree behind.

mod engine;
mod error;
mod expand;
mod guard;
mod loader;
mod model;
mod paramgen;
mod policy;
mod reducer;

/// Guard language seam and its default implementation.
pub use engine::{FormulaEngine, GuardEngine};
/// Error type returned by every fallible operation.
pub use error::ParamGenError;
/// Placeholder expansion and resolvers.
pub use expand::{EnvResolver, VarResolver, expand};
/// Guard detection and selection primitives.
pub use guard::{evaluate_guards, is_guarded};
pub use loader::Format;
/// Tree model.
pub use model::{ConfigNode, Mapping, Scalar};
pub use paramgen::ParamGen;
pub use policy::{MatchPolicy, ReductionState};
pub use reducer::Reducer;
