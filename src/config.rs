use crate::model::EntityDef;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub project: ProjectConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    /// Entities declared inline in the config file
    #[serde(default)]
    pub entities: Vec<EntityDef>,
    #[serde(default)]
    pub type_mappings: HashMap<String, String>,
    /// Field names matching any of these patterns are excluded from search
    #[serde(default = "default_hidden_fields")]
    pub hidden_fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_model_package")]
    pub model_package: String,
    #[serde(default = "default_rest_package")]
    pub rest_package: String,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    /// Spaces per indentation level in generated sources
    #[serde(default = "default_indent")]
    pub indent: usize,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Directory { path: PathBuf },
    File { path: PathBuf },
    Glob { pattern: String },
}

fn default_model_package() -> String {
    "com.test.model".to_string()
}

fn default_rest_package() -> String {
    "com.test.rest".to_string()
}

fn default_cache_file() -> PathBuf {
    PathBuf::from(".qbe-cache.json")
}

fn default_indent() -> usize {
    3
}

fn default_hidden_fields() -> Vec<String> {
    vec!["^id$".to_string(), "^version$".to_string()]
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Fingerprint of the settings that shape generated output.
    /// Cached entries are only reused while this stays the same.
    pub fn fingerprint(&self) -> String {
        let mut mappings: Vec<_> = self.type_mappings.iter().collect();
        mappings.sort();
        format!(
            "{}|{}|{}|{:?}|{:?}",
            self.project.model_package,
            self.project.rest_package,
            self.output.indent,
            mappings,
            self.hidden_fields
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_basic() {
        let toml_str = r#"
[project]
model_package = "com.test.model"
rest_package = "com.test.rest"

[output]
path = "src/main/java"
cache_file = ".qbe-cache.json"

[[sources]]
type = "directory"
path = "model"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project.rest_package, "com.test.rest");
        assert_eq!(config.output.path, PathBuf::from("src/main/java"));
        assert_eq!(config.output.indent, 3);
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.hidden_fields, vec!["^id$", "^version$"]);
    }

    #[test]
    fn test_parse_source_variants() {
        let toml_str = r#"
[project]

[output]
path = "out"

[[sources]]
type = "file"
path = "model/owner.toml"

[[sources]]
type = "glob"
pattern = "model/**/*.toml"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project.model_package, "com.test.model");
        assert!(matches!(config.sources[0], SourceConfig::File { .. }));
        match &config.sources[1] {
            SourceConfig::Glob { pattern } => assert_eq!(pattern, "model/**/*.toml"),
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn test_parse_inline_entities_and_mappings() {
        let toml_str = r#"
hidden_fields = ["^secret"]

[project]

[output]
path = "out"
indent = 4

[type_mappings]
Money = "java.math.BigDecimal"

[[entities]]
name = "Owner"

[[entities.fields]]
name = "firstName"
kind = "string"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.output.indent, 4);
        assert_eq!(config.hidden_fields, vec!["^secret"]);
        assert_eq!(
            config.type_mappings.get("Money"),
            Some(&"java.math.BigDecimal".to_string())
        );
        assert_eq!(config.entities.len(), 1);
        assert_eq!(config.entities[0].fields[0].name, "firstName");
    }

    #[test]
    fn test_fingerprint_tracks_output_settings() {
        let base = r#"
[project]

[output]
path = "out"
"#;
        let a: Config = toml::from_str(base).unwrap();
        let b: Config = toml::from_str(&base.replace("path = \"out\"", "path = \"out\"\nindent = 2")).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), toml::from_str::<Config>(base).unwrap().fingerprint());
    }
}
