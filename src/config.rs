use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::Rule;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Rendering knobs shared by both backends.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Column budget after which an alternative wraps in the XML document.
    pub column_budget: usize,
    /// Column budget of the plain notation listing.
    pub text_column_budget: usize,
    /// How many lines above a rule its `// SECTION:` marker sits.
    pub section_marker_offset: usize,
    /// Entry rules, annotated with `start`.
    pub start_rules: Vec<String>,
    /// Noise rules removed from listings and from every rule body.
    pub excluded_rules: Vec<String>,
    /// Tokens never inlined, even when simple.
    pub stop_terminals: Vec<String>,
    pub hidden_lexer_modes: Vec<String>,
    pub hidden_lexer_prefixes: Vec<String>,
    /// Rule name -> child indices of an alternative that start a new line.
    pub custom_line_breaks: HashMap<String, BTreeSet<usize>>,
    /// Token name -> URL, rendered as a link instead of a reference.
    pub terminal_links: HashMap<String, String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            column_budget: 80,
            text_column_budget: 120,
            section_marker_offset: 2,
            start_rules: Vec::new(),
            excluded_rules: vec!["NL".to_owned()],
            stop_terminals: Vec::new(),
            hidden_lexer_modes: vec!["Inside".to_owned()],
            hidden_lexer_prefixes: Vec::new(),
            custom_line_breaks: HashMap::new(),
            terminal_links: HashMap::new(),
        }
    }
}

impl RenderConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: config_path.to_path_buf(),
            source,
        })
    }

    pub fn is_start_rule(&self, name: &str) -> bool {
        self.start_rules.iter().any(|rule| rule == name)
    }

    pub fn is_stop_terminal(&self, name: &str) -> bool {
        self.stop_terminals.iter().any(|token| token == name)
    }

    pub fn line_breaks(&self, rule: &str) -> Option<&BTreeSet<usize>> {
        self.custom_line_breaks.get(rule)
    }

    pub fn terminal_link(&self, token: &str) -> Option<&str> {
        self.terminal_links.get(token).map(String::as_str)
    }

    /// Lexer rules kept out of the standalone listing: hidden modes and
    /// hidden name prefixes.
    pub fn is_hidden_lexer_rule(&self, rule: &Rule) -> bool {
        self.hidden_lexer_modes.iter().any(|mode| *mode == rule.mode)
            || self
                .hidden_lexer_prefixes
                .iter()
                .any(|prefix| rule.name.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Rule};
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_keeps_defaults() {
        let config: RenderConfig = toml::from_str("").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.column_budget, 80);
        assert_eq!(config.excluded_rules, vec!["NL"]);
    }

    #[test]
    fn test_kotlin_preset() {
        let config: RenderConfig =
            toml::from_str(include_str!("../config/kotlin-spec.toml")).unwrap();

        assert_eq!(config.text_column_budget, 120);
        assert!(config.is_start_rule("kotlinFile"));
        assert!(config.is_start_rule("script"));
        assert_eq!(
            config.line_breaks("forStatement"),
            Some(&BTreeSet::from([1, 7]))
        );
        assert!(config
            .terminal_link("UNICODE_CLASS_LL")
            .unwrap()
            .ends_with("UnicodeClasses.g4#L9"));
    }

    #[test]
    fn test_hidden_lexer_rules() {
        let config = RenderConfig {
            hidden_lexer_prefixes: vec!["UNICODE_CLASS".to_owned()],
            ..RenderConfig::default()
        };
        let body = Node::seq_block(vec![Node::literal("x")]);

        assert!(config.is_hidden_lexer_rule(&Rule::lexer("UNICODE_CLASS_LL", 1, body.clone())));
        assert!(config.is_hidden_lexer_rule(&Rule::lexer("Inside_WS", 2, body.clone()).in_mode("Inside")));
        assert!(!config.is_hidden_lexer_rule(&Rule::lexer("WS", 3, body)));
    }

    #[test]
    fn test_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("render.toml");
        std::fs::write(&path, "column_budget = 40\nstart_rules = [\"file\"]\n").unwrap();

        let config = RenderConfig::load_from_path(&path).unwrap();
        assert_eq!(config.column_budget, 40);
        assert!(config.is_start_rule("file"));
        assert_eq!(config.section_marker_offset, 2);
    }

    #[test]
    fn test_load_errors() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            RenderConfig::load_from_path(&missing),
            Err(ConfigError::ConfigReadError { .. })
        ));

        let broken = temp_dir.path().join("broken.toml");
        std::fs::write(&broken, "column_budget = \"wide\"").unwrap();
        assert!(matches!(
            RenderConfig::load_from_path(&broken),
            Err(ConfigError::ConfigParseError { .. })
        ));
    }
}
