//! JSON and YAML loaders.
//!
//! Documents are decoded straight into [`ConfigNode`], keeping key order and
//! scalar kinds. Generators built here use the default `last` match policy.

use crate::{ConfigNode, MatchPolicy, ParamGen, ParamGenError};
use log::{debug, info};
use std::fs;
use std::path::Path;

impl ConfigNode {
    /// Parse a JSON document.
    pub fn from_json_str(contents: &str) -> Result<Self, ParamGenError> {
        debug!("parsing json parameters (len={})", contents.len());
        Ok(serde_json::from_str(contents)?)
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ParamGenError> {
        debug!("parsing yaml parameters (len={})", contents.len());
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Read a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParamGenError> {
        let path = path.as_ref();
        info!("loading parameters from path: {}", path.display());
        let format = Format::from_path(path)?;
        let contents = fs::read_to_string(path)?;
        match format {
            Format::Json => Self::from_json_str(&contents),
            Format::Yaml => Self::from_yaml_str(&contents),
        }
    }
}

impl ParamGen {
    pub fn from_json_str(contents: &str) -> Result<Self, ParamGenError> {
        Self::new(&ConfigNode::from_json_str(contents)?, MatchPolicy::default())
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ParamGenError> {
        Self::new(&ConfigNode::from_yaml_str(contents)?, MatchPolicy::default())
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ParamGenError> {
        let path = path.as_ref();
        info!("loading json parameters from path: {}", path.display());
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, ParamGenError> {
        let path = path.as_ref();
        info!("loading yaml parameters from path: {}", path.display());
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    /// Load a file, choosing the decoder from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParamGenError> {
        Self::new(&ConfigNode::from_path(path)?, MatchPolicy::default())
    }
}

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ParamGenError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Format::Json),
            Some("yaml" | "yml") => Ok(Format::Yaml),
            _ => Err(ParamGenError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a/b.json")).expect("json"), Format::Json);
        assert_eq!(Format::from_path(Path::new("b.YML")).expect("yml"), Format::Yaml);
        assert!(matches!(
            Format::from_path(&PathBuf::from("b.toml")),
            Err(ParamGenError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn non_mapping_document_is_a_schema_error() {
        let err = ParamGen::from_json_str("[1, 2]").unwrap_err();
        match err {
            ParamGenError::Schema { kind, value } => {
                assert_eq!(kind, "list");
                assert_eq!(value, "[1,2]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn yaml_and_json_load_to_the_same_tree() {
        let json = ConfigNode::from_json_str(r#"{"b": {"x": [1, "two", null]}, "a": true}"#)
            .expect("json");
        let yaml = ConfigNode::from_yaml_str("b:\n  x: [1, two, ~]\na: true\n").expect("yaml");
        assert_eq!(json, yaml);
    }
}
