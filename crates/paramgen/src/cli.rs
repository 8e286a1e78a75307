//! Command-line front end: load a document, reduce it, print the result.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use paramgen_core::{ConfigNode, EnvResolver, ParamGen, VarResolver};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Command-line options for the `paramgen` binary.
#[derive(Debug, Parser)]
#[command(name = "paramgen", version, about)]
pub struct Cli {
    /// Parameter file (.json, .yaml or .yml)
    pub input: PathBuf,
    /// Which satisfied guard wins: `first` or `last`
    #[arg(long = "match", default_value = "last")]
    pub match_policy: String,
    /// Placeholder value as NAME=VALUE; may be repeated
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,
    /// Fall back to environment variables for names not given with --var
    #[arg(long)]
    pub env: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
    /// Single-line JSON output
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    if name.is_empty() || !name.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
        return Err(format!("invalid variable name `{name}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// `--var` values layered over an optional environment lookup.
#[derive(Debug, Default)]
pub struct CliResolver {
    vars: BTreeMap<String, String>,
    env: bool,
}

impl CliResolver {
    pub fn new(vars: impl IntoIterator<Item = (String, String)>, env: bool) -> Self {
        Self {
            vars: vars.into_iter().collect(),
            env,
        }
    }

    /// Whether any source of values is configured.
    pub fn is_configured(&self) -> bool {
        self.env || !self.vars.is_empty()
    }
}

impl VarResolver for CliResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        if self.env {
            return EnvResolver.resolve(name);
        }
        None
    }
}

/// Execute the command and return the text to print.
pub fn run(cli: &Cli) -> anyhow::Result<String> {
    let data = ConfigNode::from_path(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    let mut paramgen = ParamGen::with_match(&data, &cli.match_policy)?;

    let resolver = CliResolver::new(cli.vars.iter().cloned(), cli.env);
    debug!("cli resolver (vars={}, env={})", resolver.vars.len(), resolver.env);
    if resolver.is_configured() {
        paramgen.reduce_with(&resolver)
    } else {
        paramgen.reduce()
    }
    .with_context(|| format!("failed to reduce {}", cli.input.display()))?;
    info!("reduced {}", cli.input.display());

    render_output(paramgen.data(), cli.output, cli.compact)
}

fn render_output(data: &ConfigNode, format: OutputFormat, compact: bool) -> anyhow::Result<String> {
    let text = match format {
        OutputFormat::Json if compact => serde_json::to_string(data)?,
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
    };
    Ok(text.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_var_pairs() {
        assert_eq!(
            parse_var("COMP=a=b").expect("var"),
            ("COMP".to_string(), "a=b".to_string())
        );
        assert!(parse_var("COMP").is_err());
        assert!(parse_var("=1").is_err());
        assert!(parse_var("A-B=1").is_err());
    }

    #[test]
    fn vars_take_precedence_over_environment() {
        let resolver = CliResolver::new([("PATH".to_string(), "mine".to_string())], true);
        assert_eq!(resolver.resolve("PATH").as_deref(), Some("mine"));
        assert_eq!(resolver.resolve("PARAMGEN_CLI_SURELY_UNSET_VARIABLE"), None);
    }

    #[test]
    fn unconfigured_resolver_knows_nothing() {
        let resolver = CliResolver::default();
        assert!(!resolver.is_configured());
        assert_eq!(resolver.resolve("PATH"), None);
    }

    #[test]
    fn clap_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
