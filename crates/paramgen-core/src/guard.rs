//! Guard detection and branch selection.

use crate::engine::GuardEngine;
use crate::{ConfigNode, Mapping, MatchPolicy, ParamGenError};
use log::debug;
use paramgen_formula::ELSE_GUARD;

/// Whether every key of `node` is a guard.
///
/// Non-mappings and empty mappings are not guarded. A mapping mixing guard
/// and plain keys is rejected.
pub fn is_guarded<E: GuardEngine + ?Sized>(
    engine: &E,
    node: &ConfigNode,
) -> Result<bool, ParamGenError> {
    match node {
        ConfigNode::Mapping(mapping) => is_guarded_mapping(engine, mapping),
        _ => Ok(false),
    }
}

pub(crate) fn is_guarded_mapping<E: GuardEngine + ?Sized>(
    engine: &E,
    mapping: &Mapping,
) -> Result<bool, ParamGenError> {
    if mapping.is_empty() {
        return Ok(false);
    }
    let guards = mapping.keys().filter(|key| engine.is_guard(key)).count();
    if guards == mapping.len() {
        Ok(true)
    } else if guards == 0 {
        Ok(false)
    } else {
        Err(ParamGenError::MixedGuard {
            mapping: ConfigNode::Mapping(mapping.clone()).render(),
        })
    }
}

/// Evaluate the guards of a guarded mapping and return the selected value.
///
/// Every guard is evaluated in mapping order. `else` only wins when nothing
/// else is true; among the remaining true guards `policy` picks one.
pub fn evaluate_guards<E: GuardEngine + ?Sized>(
    engine: &E,
    mapping: Mapping,
    policy: MatchPolicy,
) -> Result<ConfigNode, ParamGenError> {
    let mut candidates = Vec::new();
    for key in mapping.keys() {
        if key == ELSE_GUARD || eval_guard(engine, key)? {
            candidates.push(key.clone());
        }
    }

    if candidates.len() > 1 {
        candidates.retain(|key| key != ELSE_GUARD);
    }

    let selected = match policy {
        MatchPolicy::First => candidates.first(),
        MatchPolicy::Last => candidates.last(),
    };
    let Some(selected) = selected.cloned() else {
        return Err(ParamGenError::NoGuardSatisfied {
            mapping: ConfigNode::Mapping(mapping).render(),
        });
    };

    debug!(
        "selected guard `{selected}` (policy={policy}, true={})",
        candidates.len()
    );
    let mut mapping = mapping;
    Ok(mapping.remove(&selected).unwrap_or_default())
}

fn eval_guard<E: GuardEngine + ?Sized>(engine: &E, guard: &str) -> Result<bool, ParamGenError> {
    if engine.has_expandable_var(guard) {
        return Err(ParamGenError::UnresolvedGuardVariable {
            guard: guard.to_string(),
        });
    }
    let value = engine
        .evaluate(guard)
        .map_err(|source| ParamGenError::Formula {
            guard: guard.to_string(),
            source,
        })?;
    value.as_bool().ok_or_else(|| ParamGenError::NonBooleanGuard {
        guard: guard.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FormulaEngine;
    use pretty_assertions::assert_eq;

    fn mapping(json: &str) -> Mapping {
        serde_json::from_str(json).expect("mapping")
    }

    #[test]
    fn empty_and_scalar_nodes_are_not_guarded() {
        let engine = FormulaEngine;
        assert!(!is_guarded(&engine, &ConfigNode::Mapping(Mapping::new())).expect("empty"));
        assert!(!is_guarded(&engine, &ConfigNode::from("1 > 0")).expect("scalar"));
    }

    #[test]
    fn plain_and_guarded_mappings() {
        let engine = FormulaEngine;
        let plain = ConfigNode::Mapping(mapping(r#"{"NTASKS": 4, "ROOTPE": 0}"#));
        let guarded = ConfigNode::Mapping(mapping(r#"{"1 > 2": 4, "else": 0}"#));
        assert!(!is_guarded(&engine, &plain).expect("plain"));
        assert!(is_guarded(&engine, &guarded).expect("guarded"));
    }

    #[test]
    fn mixed_mapping_is_rejected_verbatim() {
        let engine = FormulaEngine;
        let mixed = ConfigNode::Mapping(mapping(r#"{"A > 1": 1, "NTASKS": 2}"#));
        let err = is_guarded(&engine, &mixed).unwrap_err();
        assert_eq!(
            format!("{err}"),
            r#"only a subset of the keys are guards (logical expressions): {"A > 1":1,"NTASKS":2}"#
        );
    }

    #[test]
    fn else_is_dropped_when_another_guard_matches() {
        let engine = FormulaEngine;
        for policy in [MatchPolicy::First, MatchPolicy::Last] {
            let selected = evaluate_guards(
                &engine,
                mapping(r#"{"else": "fallback", "2 > 1": "hit"}"#),
                policy,
            )
            .expect("select");
            assert_eq!(selected, ConfigNode::from("hit"));
        }
    }

    #[test]
    fn policy_picks_first_or_last_true_guard() {
        let engine = FormulaEngine;
        let source = r#"{"1 > 0": "a", "0 > 1": "b", "2 > 0": "c", "else": "d"}"#;
        let first = evaluate_guards(&engine, mapping(source), MatchPolicy::First).expect("first");
        let last = evaluate_guards(&engine, mapping(source), MatchPolicy::Last).expect("last");
        assert_eq!(first, ConfigNode::from("a"));
        assert_eq!(last, ConfigNode::from("c"));
    }

    #[test]
    fn unexpanded_guard_is_rejected() {
        let engine = FormulaEngine;
        let err = evaluate_guards(&engine, mapping(r#"{"$COMP > 1": 1}"#), MatchPolicy::Last)
            .unwrap_err();
        assert!(matches!(
            err,
            ParamGenError::UnresolvedGuardVariable { ref guard } if guard == "$COMP > 1"
        ));
    }

    #[test]
    fn non_boolean_guard_is_rejected() {
        let engine = FormulaEngine;
        let err = evaluate_guards(&engine, mapping(r#"{"1 and 2": 1}"#), MatchPolicy::Last)
            .unwrap_err();
        match err {
            ParamGenError::NonBooleanGuard { guard, value } => {
                assert_eq!(guard, "1 and 2");
                assert_eq!(value, "2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_true_guard_is_an_error() {
        let engine = FormulaEngine;
        let source = mapping(r#"{"1 > 2": 1, "0 > 1": 2}"#);
        let err = evaluate_guards(&engine, source, MatchPolicy::First).unwrap_err();
        assert!(matches!(err, ParamGenError::NoGuardSatisfied { .. }));
        assert!(format!("{err}").contains(r#"{"1 > 2":1,"0 > 1":2}"#));
    }
}
