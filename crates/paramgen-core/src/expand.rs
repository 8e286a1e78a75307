//! `$NAME` / `${NAME}` placeholder expansion.

use crate::ParamGenError;
use log::{debug, trace};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}|\$(\w+)").expect("placeholder regex"));

/// Caller-supplied variable lookup.
///
/// Returning `None` means the variable is unknown; expansion then fails.
pub trait VarResolver {
    fn resolve(&self, name: &str) -> Option<String>;
}

impl<F> VarResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, name: &str) -> Option<String> {
        self(name)
    }
}

impl VarResolver for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl VarResolver for BTreeMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Resolves variables from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvResolver;

impl VarResolver for EnvResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Expand every placeholder in `text`.
///
/// Each distinct spelling is resolved once and every occurrence of it is
/// replaced. Text without placeholders is returned as-is and the resolver is
/// never consulted, so `None` is fine for such input.
pub fn expand(text: &str, resolver: Option<&dyn VarResolver>) -> Result<String, ParamGenError> {
    if !PLACEHOLDER.is_match(text) {
        return Ok(text.to_string());
    }

    let mut resolved: HashMap<&str, String> = HashMap::new();
    for caps in PLACEHOLDER.captures_iter(text) {
        let spelling = caps.get(0).map_or("", |m| m.as_str());
        if resolved.contains_key(spelling) {
            continue;
        }
        let Some(resolver) = resolver else {
            return Err(ParamGenError::VariableExpansion {
                placeholder: spelling.to_string(),
                reason: "no resolver was provided".to_string(),
            });
        };
        let value = resolve_placeholder(resolver, &caps).ok_or_else(|| {
            ParamGenError::VariableExpansion {
                placeholder: spelling.to_string(),
                reason: "the resolver returned no value".to_string(),
            }
        })?;
        trace!("expanded {spelling} -> {value}");
        resolved.insert(spelling, value);
    }

    // Single pass so `$X` never rewrites inside `$XY` or inside resolved text.
    let expanded = PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
        let spelling = caps.get(0).map_or("", |m| m.as_str());
        resolved.get(spelling).cloned().unwrap_or_default()
    });
    Ok(expanded.into_owned())
}

/// Resolve one placeholder match to its replacement text.
///
/// `${NAME}` resolves exactly. A bare `$NAME` that the resolver does not know
/// falls back to its longest `_`-delimited prefix that it does know, with the
/// rest kept literally, so `$X_suffix` reads as `$X` followed by `_suffix`.
///
/// The fallback is silent to callers: with only `OCN` known, a misspelled
/// `$OCN_GRDI` expands to `<ocn>_GRDI` instead of failing. Each fallback is
/// logged at debug level; use `${NAME}` where an exact match is required.
fn resolve_placeholder(resolver: &dyn VarResolver, caps: &Captures<'_>) -> Option<String> {
    if let Some(name) = caps.get(1) {
        return resolver.resolve(name.as_str());
    }
    let name = caps.get(2)?.as_str();
    if let Some(value) = resolver.resolve(name) {
        return Some(value);
    }
    name.char_indices()
        .rev()
        .filter(|&(idx, ch)| ch == '_' && idx > 0)
        .find_map(|(idx, _)| {
            let (prefix, rest) = name.split_at(idx);
            let value = resolver.resolve(prefix)?;
            debug!("`${name}` is unknown; expanded `${prefix}` and kept `{rest}` literally");
            Some(format!("{value}{rest}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn expands_both_spellings() {
        let vars = map(&[("X", "mid"), ("Y", "end")]);
        assert_eq!(
            expand("prefix_${X}_$Y", Some(&vars)).expect("expand"),
            "prefix_mid_end"
        );
    }

    #[test]
    fn word_characters_belong_to_the_name() {
        let vars = map(&[("X_suffix", "whole")]);
        assert_eq!(
            expand("prefix_$X_suffix", Some(&vars)).expect("expand"),
            "prefix_whole"
        );
    }

    #[test]
    fn bare_name_falls_back_to_known_prefix() {
        let vars = map(&[("X", "mid")]);
        assert_eq!(
            expand("prefix_$X_suffix", Some(&vars)).expect("expand"),
            "prefix_mid_suffix"
        );
        let vars = map(&[("OCN", "ocean"), ("OCN_GRID", "gx1v7")]);
        assert_eq!(expand("$OCN_GRID", Some(&vars)).expect("expand"), "gx1v7");
    }

    #[test]
    fn unknown_name_with_known_prefix_keeps_the_rest() {
        let vars = map(&[("OCN", "ocean")]);
        assert_eq!(expand("$OCN_GRID", Some(&vars)).expect("expand"), "ocean_GRID");
        assert!(expand("${OCN_GRID}", Some(&vars)).is_err());
    }

    #[test]
    fn braced_name_never_falls_back() {
        let vars = map(&[("X", "mid")]);
        assert!(expand("${X_suffix}", Some(&vars)).is_err());
    }

    #[test]
    fn shorter_name_does_not_clobber_longer_one() {
        let vars = map(&[("X", "1"), ("XY", "2")]);
        assert_eq!(expand("$X $XY $X", Some(&vars)).expect("expand"), "1 2 1");
    }

    #[test]
    fn resolves_each_spelling_once() {
        let calls = RefCell::new(Vec::new());
        let resolver = |name: &str| {
            calls.borrow_mut().push(name.to_string());
            Some(name.to_lowercase())
        };
        let out = expand("$A/$A/${A}/$B", Some(&resolver)).expect("expand");
        assert_eq!(out, "a/a/a/b");
        assert_eq!(*calls.borrow(), vec!["A", "A", "B"]);
    }

    #[test]
    fn resolved_text_is_not_expanded_again() {
        let vars = map(&[("X", "$Y"), ("Y", "never")]);
        assert_eq!(expand("$X", Some(&vars)).expect("expand"), "$Y");
    }

    #[test]
    fn text_without_placeholders_skips_resolver() {
        assert_eq!(expand("plain $ text", None).expect("expand"), "plain $ text");
    }

    #[test]
    fn missing_resolver_fails_on_placeholder() {
        let err = expand("$GRID", None).unwrap_err();
        assert!(matches!(
            err,
            ParamGenError::VariableExpansion { ref placeholder, .. } if placeholder == "$GRID"
        ));
    }

    #[test]
    fn unknown_variable_fails() {
        let vars = map(&[]);
        let err = expand("${GRID}", Some(&vars)).unwrap_err();
        assert!(format!("{err}").contains("${GRID}"));
    }
}
