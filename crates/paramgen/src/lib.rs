//! Public SDK surface for ParamGen.
//!
//! This crate re-exports the reduction engine and the guard language, and
//! hosts the command-line front end used by the `paramgen` binary.

pub mod cli;

/// Re-export for convenience.
pub use paramgen_core as core;
/// Re-export for convenience.
pub use paramgen_formula as formula;

pub use paramgen_core::{
    ConfigNode, EnvResolver, Mapping, MatchPolicy, ParamGen, ParamGenError, Scalar, VarResolver,
};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Library consumers that want
/// reduction traces call this once at startup and set `RUST_LOG`.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
