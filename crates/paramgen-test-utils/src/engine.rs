use paramgen_core::GuardEngine;
use paramgen_formula::{FormulaError, Value};
use std::collections::BTreeMap;

/// Guard engine with fixed answers, independent of any expression grammar.
///
/// Keys listed in the script (plus `else`) are guards; evaluating them
/// returns the scripted value. Placeholder detection is delegated to
/// `paramgen-formula`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEngine {
    answers: BTreeMap<String, Value>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, guard: &str, value: Value) -> Self {
        self.answers.insert(guard.to_string(), value);
        self
    }
}

impl GuardEngine for ScriptedEngine {
    fn is_guard(&self, key: &str) -> bool {
        key == paramgen_formula::ELSE_GUARD || self.answers.contains_key(key)
    }

    fn has_expandable_var(&self, token: &str) -> bool {
        paramgen_formula::has_expandable_var(token)
    }

    fn evaluate(&self, guard: &str) -> Result<Value, FormulaError> {
        self.answers
            .get(guard)
            .cloned()
            .ok_or_else(|| FormulaError::Type {
                expr: guard.to_string(),
                message: "no scripted answer".to_string(),
            })
    }
}
