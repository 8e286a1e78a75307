use paramgen_core::VarResolver;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Build a map resolver from literal pairs.
pub fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Map resolver that records every name it is asked for.
#[derive(Debug, Default)]
pub struct RecordingResolver {
    values: BTreeMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingResolver {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: vars(pairs),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl VarResolver for RecordingResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(name.to_string());
        self.values.get(name).cloned()
    }
}
