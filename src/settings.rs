//! Configuration loader for histoire.
//!
//! `defaults/histoire.default.toml` is embedded into every binary so that the built-in rule
//! set and the documented defaults never drift apart. Applications layer user-specific files
//! on top of those defaults via [`Loader`] before deserializing into [`HistoireConfig`], then
//! compile the rule section into a [`RuleRegistry`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::annotate::{
    LinkTemplate, Lookup, PatternRule, RegistryError, Rewriter, RuleRegistry,
};

const DEFAULT_TOML: &str = include_str!("../defaults/histoire.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoireConfig {
    pub feed: FeedConfig,
    pub rules: Vec<RuleConfig>,
    #[serde(default)]
    pub tables: BTreeMap<String, BTreeMap<String, String>>,
}

/// Where update logs live and how they are partitioned.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub base_repo: String,
    pub lookback_seconds: i64,
    pub era_seconds: i64,
    /// No log predates this era; feed windows never reach further back.
    pub oldest_era: i64,
}

/// One annotation rule as written in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub case_insensitive: bool,
    pub captures: usize,
    pub link: String,
    #[serde(default)]
    pub lookup: Option<LookupConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    pub table: String,
    pub capture: usize,
}

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl HistoireConfig {
    /// Compile the configured rules, in declaration order.
    pub fn registry(&self) -> Result<RuleRegistry, RegistryError> {
        let tables: BTreeMap<&str, Arc<BTreeMap<String, String>>> = self
            .tables
            .iter()
            .map(|(name, entries)| {
                let lowered = entries
                    .iter()
                    .map(|(key, value)| (key.to_lowercase(), value.clone()))
                    .collect();
                (name.as_str(), Arc::new(lowered))
            })
            .collect();

        let rules = self
            .rules
            .iter()
            .map(|rule| rule.compile(&tables))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rules = rules.len(), "compiled rule registry");
        RuleRegistry::new(rules)
    }

    pub fn rewriter(&self) -> Result<Rewriter, RegistryError> {
        Ok(Rewriter::new(self.registry()?))
    }
}

impl RuleConfig {
    fn compile(
        &self,
        tables: &BTreeMap<&str, Arc<BTreeMap<String, String>>>,
    ) -> Result<PatternRule, RegistryError> {
        let lookup = match &self.lookup {
            Some(lookup) => {
                let table = tables.get(lookup.table.as_str()).ok_or_else(|| {
                    RegistryError::UnknownTable {
                        rule: self.name.clone(),
                        table: lookup.table.clone(),
                    }
                })?;
                Some(Lookup::new(lookup.capture, Arc::clone(table)))
            }
            None => None,
        };

        let template = LinkTemplate::parse(&self.link, self.captures, lookup).map_err(|source| {
            RegistryError::InvalidTemplate {
                rule: self.name.clone(),
                source,
            }
        })?;

        PatternRule::from_pattern(
            self.name.clone(),
            &self.pattern,
            self.case_insensitive,
            self.captures,
            template,
        )
    }
}

/// Layers configuration files over the built-in defaults, in the order they are added.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a file that must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Layer a file if it exists; a missing file is skipped.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        debug!(path = %path.display(), required, "layering configuration file");
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    pub fn build(self) -> Result<HistoireConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }

    /// Build and compile the rules into a rewriter.
    pub fn build_rewriter(self) -> Result<Rewriter, ConfigLoadError> {
        Ok(self.build()?.rewriter()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<HistoireConfig, ConfigError> {
    Loader::new().build()
}

/// Rewriter built from the embedded rule set.
pub fn default_rewriter() -> Result<Rewriter, ConfigLoadError> {
    Loader::new().build_rewriter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.feed.base_repo, "robotzilla/histoire");
        assert_eq!(config.feed.era_seconds, 1_000_000);
        assert_eq!(config.feed.lookback_seconds, 60 * 60 * 24 * 7 * 4);
        assert_eq!(config.feed.oldest_era, 1_538_000_000);
        let names: Vec<&str> = config.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["bug", "gh-shorthand"]);
        assert_eq!(
            config.tables["repo_owners"].get("binjs-ref").map(String::as_str),
            Some("binast")
        );
    }

    #[test]
    fn default_rules_compile() {
        let rewriter = default_rewriter().expect("default rules to compile");
        let names: Vec<&str> = rewriter.registry().names().collect();
        assert_eq!(names, vec!["bug", "gh-shorthand"]);
    }

    #[test]
    fn optional_file_is_layered_when_present() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[feed]\nera_seconds = 500").unwrap();

        let config = Loader::new().with_optional_file(file.path()).build().unwrap();
        assert_eq!(config.feed.era_seconds, 500);
        assert_eq!(config.feed.base_repo, "robotzilla/histoire");
    }

    #[test]
    fn user_file_extends_tables() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[tables.repo_owners]\nmy-tool = \"someone\"").unwrap();

        let config = Loader::new().with_file(file.path()).build().unwrap();
        let owners = &config.tables["repo_owners"];
        assert_eq!(owners.get("my-tool").map(String::as_str), Some("someone"));
        assert_eq!(owners.get("cranelift").map(String::as_str), Some("cranestation"));
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/histoire.toml")
            .build()
            .unwrap();
        assert_eq!(config.rules.len(), 2);
    }

    fn rule(name: &str, pattern: &str, captures: usize, link: &str) -> RuleConfig {
        RuleConfig {
            name: name.into(),
            pattern: pattern.into(),
            case_insensitive: false,
            captures,
            link: link.into(),
            lookup: None,
        }
    }

    fn config_with(rules: Vec<RuleConfig>) -> HistoireConfig {
        let mut config = load_defaults().unwrap();
        config.rules = rules;
        config
    }

    #[test]
    fn arity_mismatch_is_fatal() {
        let config = config_with(vec![rule("bug", r"bug (\d+)", 2, "https://b/{1}")]);
        assert!(matches!(
            config.registry(),
            Err(RegistryError::ArityMismatch { declared: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn duplicate_rule_is_fatal() {
        let config = config_with(vec![
            rule("bug", r"bug (\d+)", 1, "https://b/{1}"),
            rule("bug", r"issue (\d+)", 1, "https://i/{1}"),
        ]);
        assert!(matches!(config.registry(), Err(RegistryError::DuplicateRule(_))));
    }

    #[test]
    fn unknown_table_is_fatal() {
        let mut bad = rule("gh", r"(\w+)#(\d+)", 2, "https://gh/{lookup}/{1}");
        bad.lookup = Some(LookupConfig {
            table: "nope".into(),
            capture: 1,
        });
        let config = config_with(vec![bad]);
        assert!(matches!(
            config.registry(),
            Err(RegistryError::UnknownTable { ref table, .. }) if table == "nope"
        ));
    }

    #[test]
    fn bad_template_is_fatal() {
        let config = config_with(vec![rule("bug", r"bug (\d+)", 1, "https://b/{2}")]);
        assert!(matches!(
            config.registry(),
            Err(RegistryError::InvalidTemplate { .. })
        ));
    }
}
