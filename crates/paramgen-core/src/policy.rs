//! Guard match policy and reduction lifecycle state.

use crate::ParamGenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule for picking among several guards that evaluate to true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// The first true guard in mapping order wins.
    First,
    /// The last true guard in mapping order wins.
    #[default]
    Last,
}

impl MatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPolicy::First => "first",
            MatchPolicy::Last => "last",
        }
    }
}

impl FromStr for MatchPolicy {
    type Err = ParamGenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "first" => Ok(MatchPolicy::First),
            "last" => Ok(MatchPolicy::Last),
            other => Err(ParamGenError::UnknownMatchPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a `ParamGen` instance. `Reduced` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReductionState {
    #[default]
    Unreduced,
    Reduced,
}
