//! Test helpers shared across ParamGen crates.

pub mod engine;
pub mod fixtures;
pub mod resolver;

pub use engine::ScriptedEngine;
pub use fixtures::{mapping, node, render};
pub use resolver::{RecordingResolver, vars};
