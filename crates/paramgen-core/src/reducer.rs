//! Recursive reduction of a configuration tree.

use crate::engine::GuardEngine;
use crate::expand::{VarResolver, expand};
use crate::guard::{evaluate_guards, is_guarded_mapping};
use crate::{ConfigNode, Mapping, MatchPolicy, ParamGenError, Scalar};
use log::debug;

/// Walks a tree, expanding placeholders and collapsing guarded mappings.
pub struct Reducer<'a, E: GuardEngine + ?Sized> {
    engine: &'a E,
    policy: MatchPolicy,
}

impl<'a, E: GuardEngine + ?Sized> Reducer<'a, E> {
    pub fn new(engine: &'a E, policy: MatchPolicy) -> Self {
        Self { engine, policy }
    }

    /// Reduce one node.
    ///
    /// Scalars and lists are returned untouched; list elements are not walked.
    /// For a mapping: placeholder keys are expanded, guards are resolved until
    /// the node is no longer a guarded mapping, string values are expanded,
    /// and child mappings are reduced recursively.
    pub fn reduce_node(
        &self,
        node: ConfigNode,
        resolver: Option<&dyn VarResolver>,
    ) -> Result<ConfigNode, ParamGenError> {
        let ConfigNode::Mapping(mapping) = node else {
            return Ok(node);
        };

        let mapping = self.expand_keys(mapping, resolver)?;
        let mut mapping = match self.collapse_guards(mapping)? {
            ConfigNode::Mapping(mapping) => mapping,
            other => return Ok(other),
        };

        for (_, value) in mapping.iter_mut() {
            if let ConfigNode::Scalar(Scalar::String(text)) = value {
                *text = expand(text, resolver)?;
            }
        }

        for (key, value) in mapping.iter_mut() {
            if value.is_mapping() {
                debug!("reducing nested mapping `{key}`");
                let child = std::mem::take(value);
                *value = self.reduce_node(child, resolver)?;
            }
        }

        Ok(ConfigNode::Mapping(mapping))
    }

    /// Expand placeholder keys.
    ///
    /// A renamed key is removed and re-inserted, so it moves to the end of the
    /// mapping; if the new name already exists, that entry is overwritten in
    /// its original position.
    fn expand_keys(
        &self,
        mapping: Mapping,
        resolver: Option<&dyn VarResolver>,
    ) -> Result<Mapping, ParamGenError> {
        if !mapping.keys().any(|key| self.engine.has_expandable_var(key)) {
            return Ok(mapping);
        }

        let mut kept = Mapping::with_capacity(mapping.len());
        let mut renamed = Vec::new();
        for (key, value) in mapping {
            if self.engine.has_expandable_var(&key) {
                let expanded = expand(&key, resolver)?;
                debug!("renamed key `{key}` -> `{expanded}`");
                renamed.push((expanded, value));
            } else {
                kept.insert(key, value);
            }
        }
        for (key, value) in renamed {
            kept.insert(key, value);
        }
        Ok(kept)
    }

    /// Resolve guards until the node is a scalar, a list or a plain mapping.
    ///
    /// Always terminates: each step descends into a strictly smaller subtree.
    /// Keys of a selected branch are not re-expanded before its own guards
    /// are evaluated.
    fn collapse_guards(&self, mut mapping: Mapping) -> Result<ConfigNode, ParamGenError> {
        while is_guarded_mapping(self.engine, &mapping)? {
            match evaluate_guards(self.engine, mapping, self.policy)? {
                ConfigNode::Mapping(selected) => mapping = selected,
                other => return Ok(other),
            }
        }
        Ok(ConfigNode::Mapping(mapping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FormulaEngine;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn node(json: &str) -> ConfigNode {
        serde_json::from_str(json).expect("node")
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn renamed_key_moves_to_end() {
        let engine = FormulaEngine;
        let reducer = Reducer::new(&engine, MatchPolicy::Last);
        let resolver = vars(&[("GRID", "gx1v7")]);
        let reduced = reducer
            .reduce_node(node(r#"{"$GRID": 1, "a": 2, "b": 3}"#), Some(&resolver))
            .expect("reduce");
        assert_eq!(reduced.render(), r#"{"a":2,"b":3,"gx1v7":1}"#);
    }

    #[test]
    fn renamed_key_overwrites_existing_entry_in_place() {
        let engine = FormulaEngine;
        let reducer = Reducer::new(&engine, MatchPolicy::Last);
        let resolver = vars(&[("NAME", "b")]);
        let reduced = reducer
            .reduce_node(node(r#"{"$NAME": "new", "a": 1, "b": "old"}"#), Some(&resolver))
            .expect("reduce");
        assert_eq!(reduced.render(), r#"{"a":1,"b":"new"}"#);
    }

    #[test]
    fn list_elements_are_not_walked() {
        let engine = FormulaEngine;
        let reducer = Reducer::new(&engine, MatchPolicy::Last);
        let source = r#"{"items": [{"1 > 0": "a", "else": "b"}, "$X"]}"#;
        let reduced = reducer.reduce_node(node(source), None).expect("reduce");
        assert_eq!(reduced, node(source));
    }

    #[test]
    fn guard_resolving_to_scalar_stops_descent() {
        let engine = FormulaEngine;
        let reducer = Reducer::new(&engine, MatchPolicy::First);
        let reduced = reducer
            .reduce_node(node(r#"{"1 > 0": "$X", "else": "y"}"#), None)
            .expect("reduce");
        // Values selected straight out of a guard are not expanded.
        assert_eq!(reduced, ConfigNode::from("$X"));
    }

    #[test]
    fn non_string_values_are_untouched() {
        let engine = FormulaEngine;
        let reducer = Reducer::new(&engine, MatchPolicy::Last);
        let source = r#"{"n": 1, "f": 0.5, "b": false, "z": null}"#;
        let reduced = reducer.reduce_node(node(source), None).expect("reduce");
        assert_eq!(reduced, node(source));
    }
}
