//! Configuration tree model.
//!
//! The tree is a tagged union of scalars, lists and ordered mappings. Mapping
//! order is part of the data: guard selection under a match policy depends on
//! it, so serde impls are written by hand to keep document order on both read
//! and write.

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Leaf value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Integer(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::String(value) => write!(f, "{value}"),
        }
    }
}

/// A node of the configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    Scalar(Scalar),
    List(Vec<ConfigNode>),
    Mapping(Mapping),
}

impl Default for ConfigNode {
    fn default() -> Self {
        ConfigNode::Scalar(Scalar::Null)
    }
}

impl ConfigNode {
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigNode::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, ConfigNode::Mapping(_))
    }

    /// Short description of the node kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigNode::Scalar(Scalar::Null) => "null",
            ConfigNode::Scalar(Scalar::Bool(_)) => "bool",
            ConfigNode::Scalar(Scalar::Integer(_)) => "integer",
            ConfigNode::Scalar(Scalar::Float(_)) => "float",
            ConfigNode::Scalar(Scalar::String(_)) => "string",
            ConfigNode::List(_) => "list",
            ConfigNode::Mapping(_) => "mapping",
        }
    }

    /// Render as compact JSON for diagnostics.
    pub fn render(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

impl From<Scalar> for ConfigNode {
    fn from(value: Scalar) -> Self {
        ConfigNode::Scalar(value)
    }
}

impl From<Mapping> for ConfigNode {
    fn from(value: Mapping) -> Self {
        ConfigNode::Mapping(value)
    }
}

impl From<Vec<ConfigNode>> for ConfigNode {
    fn from(value: Vec<ConfigNode>) -> Self {
        ConfigNode::List(value)
    }
}

impl From<&str> for ConfigNode {
    fn from(value: &str) -> Self {
        ConfigNode::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for ConfigNode {
    fn from(value: String) -> Self {
        ConfigNode::Scalar(Scalar::String(value))
    }
}

impl From<i64> for ConfigNode {
    fn from(value: i64) -> Self {
        ConfigNode::Scalar(Scalar::Integer(value))
    }
}

impl From<f64> for ConfigNode {
    fn from(value: f64) -> Self {
        ConfigNode::Scalar(Scalar::Float(value))
    }
}

impl From<bool> for ConfigNode {
    fn from(value: bool) -> Self {
        ConfigNode::Scalar(Scalar::Bool(value))
    }
}

/// Insertion-ordered map with unique string keys.
///
/// Entries live in a vector in document order; `index` maps each key to its
/// slot so lookups and inserts stay constant time on wide mappings.
#[derive(Clone, Default)]
pub struct Mapping {
    entries: Vec<(String, ConfigNode)>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigNode> {
        self.position(key).map(|idx| &mut self.entries[idx].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Insert a value. An existing key keeps its position and the previous
    /// value is returned; a new key is appended.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigNode>,
    ) -> Option<ConfigNode> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a key, keeping the order of the remaining entries.
    ///
    /// Linear in the number of entries after the removed one.
    pub fn remove(&mut self, key: &str) -> Option<ConfigNode> {
        let idx = self.index.remove(key)?;
        let (_, value) = self.entries.remove(idx);
        for (slot, (key, _)) in self.entries.iter().enumerate().skip(idx) {
            if let Some(position) = self.index.get_mut(key) {
                *position = slot;
            }
        }
        Some(value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &ConfigNode> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigNode)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut ConfigNode)> {
        self.entries.iter_mut().map(|(key, value)| (&*key, value))
    }
}

impl IntoIterator for Mapping {
    type Item = (String, ConfigNode);
    type IntoIter = std::vec::IntoIter<(String, ConfigNode)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<ConfigNode>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(value) => serializer.serialize_bool(*value),
            Scalar::Integer(value) => serializer.serialize_i64(*value),
            Scalar::Float(value) => serializer.serialize_f64(*value),
            Scalar::String(value) => serializer.serialize_str(value),
        }
    }
}

impl Serialize for ConfigNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigNode::Scalar(scalar) => scalar.serialize(serializer),
            ConfigNode::List(items) => items.serialize(serializer),
            ConfigNode::Mapping(mapping) => mapping.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ConfigNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ConfigNode::deserialize(deserializer)? {
            ConfigNode::Mapping(mapping) => Ok(mapping),
            other => Err(de::Error::invalid_type(
                de::Unexpected::Other(other.kind()),
                &"a mapping",
            )),
        }
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = ConfigNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar, list or mapping")
    }

    fn visit_unit<E: de::Error>(self) -> Result<ConfigNode, E> {
        Ok(ConfigNode::Scalar(Scalar::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<ConfigNode, E> {
        Ok(ConfigNode::Scalar(Scalar::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<ConfigNode, D::Error> {
        ConfigNode::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<ConfigNode, E> {
        Ok(ConfigNode::Scalar(Scalar::Bool(value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<ConfigNode, E> {
        Ok(ConfigNode::Scalar(Scalar::Integer(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<ConfigNode, E> {
        Ok(ConfigNode::Scalar(match i64::try_from(value) {
            Ok(value) => Scalar::Integer(value),
            Err(_) => Scalar::Float(value as f64),
        }))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<ConfigNode, E> {
        Ok(ConfigNode::Scalar(Scalar::Float(value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<ConfigNode, E> {
        Ok(ConfigNode::Scalar(Scalar::String(value.to_string())))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<ConfigNode, E> {
        Ok(ConfigNode::Scalar(Scalar::String(value)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ConfigNode, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ConfigNode::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ConfigNode, A::Error> {
        let mut mapping = Mapping::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((MapKey(key), value)) = map.next_entry::<MapKey, ConfigNode>()? {
            mapping.insert(key, value);
        }
        Ok(ConfigNode::Mapping(mapping))
    }
}

/// Mapping key; YAML allows non-string keys, which are stringified.
struct MapKey(String);

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MapKeyVisitor).map(MapKey)
    }
}

struct MapKeyVisitor;

impl Visitor<'_> for MapKeyVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean or null key")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
        Ok(value)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok("null".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_existing_key_keeps_position() {
        let mut mapping: Mapping = [("a", 1_i64), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(mapping.insert("a", 10_i64), Some(ConfigNode::from(1_i64)));
        let keys: Vec<_> = mapping.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(mapping.get("a"), Some(&ConfigNode::from(10_i64)));
    }

    #[test]
    fn remove_then_insert_moves_key_to_end() {
        let mut mapping: Mapping = [("a", 1_i64), ("b", 2), ("c", 3)].into_iter().collect();
        let value = mapping.remove("a").expect("present");
        mapping.insert("a", value);
        let keys: Vec<_> = mapping.keys().cloned().collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
    }

    #[test]
    fn remove_shifts_later_lookups() {
        let mut mapping: Mapping = [("a", 1_i64), ("b", 2), ("c", 3), ("d", 4)]
            .into_iter()
            .collect();
        assert_eq!(mapping.remove("b"), Some(ConfigNode::from(2_i64)));
        assert_eq!(mapping.remove("b"), None);
        assert_eq!(mapping.get("c"), Some(&ConfigNode::from(3_i64)));
        assert_eq!(mapping.insert("d", 40_i64), Some(ConfigNode::from(4_i64)));
        let keys: Vec<_> = mapping.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c", "d"]);
        assert!(!mapping.contains_key("b"));
    }

    #[test]
    fn wide_mapping_loads_with_constant_time_lookups() {
        const WIDTH: usize = 200_000;
        let body: Vec<String> = (0..WIDTH).map(|idx| format!("\"k{idx}\":{idx}")).collect();
        let json = format!("{{{},\"k0\":-1}}", body.join(","));

        let node: ConfigNode = serde_json::from_str(&json).expect("parse");
        let mapping = node.as_mapping().expect("mapping");
        assert_eq!(mapping.len(), WIDTH);
        assert_eq!(mapping.keys().next().map(String::as_str), Some("k0"));
        assert_eq!(mapping.get("k0"), Some(&ConfigNode::from(-1_i64)));
        let last = format!("k{}", WIDTH - 1);
        assert_eq!(mapping.get(&last), Some(&ConfigNode::from((WIDTH - 1) as i64)));
    }

    #[test]
    fn json_round_trip_preserves_order_and_kinds() {
        let json = r#"{"z":1,"a":[true,null,2.5],"m":{"y":"s","b":-3}}"#;
        let node: ConfigNode = serde_json::from_str(json).expect("parse");
        let mapping = node.as_mapping().expect("mapping");
        let keys: Vec<_> = mapping.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(
            mapping.get("a"),
            Some(&ConfigNode::List(vec![
                ConfigNode::from(true),
                ConfigNode::Scalar(Scalar::Null),
                ConfigNode::from(2.5),
            ]))
        );
        assert_eq!(node.render(), json);
    }

    #[test]
    fn yaml_keys_are_stringified() {
        let yaml = "1: one\ntrue: yes\nname: x\n";
        let node: ConfigNode = serde_yaml::from_str(yaml).expect("parse");
        let mapping = node.as_mapping().expect("mapping");
        let keys: Vec<_> = mapping.keys().cloned().collect();
        assert_eq!(keys, vec!["1", "true", "name"]);
    }

    #[test]
    fn duplicate_json_keys_keep_last_value() {
        let node: ConfigNode = serde_json::from_str(r#"{"a":1,"b":2,"a":3}"#).expect("parse");
        assert_eq!(node.render(), r#"{"a":3,"b":2}"#);
    }
}
