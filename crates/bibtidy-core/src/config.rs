//! Tidy configuration data
//!
//! Venue alias tables, clutter-field lists and title stop words are data,
//! not code. The built-in set lives in `data/default.toml` and is embedded
//! at compile time; a user file can replace any of its sections:
//!
//! ```toml
//! [pruning]
//! always = ["file"]
//! extended = ["abstract", "url", "doi"]
//!
//! [keys]
//! stop_words = ["a", "an", "the"]
//!
//! [[conference]]
//! canonical = "NeurIPS"
//! aliases = ["neural information processing systems", "nips"]
//!
//! [[journal]]
//! canonical = "Journal of Machine Learning Research"
//! aliases = ["jmlr"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

const BUILTIN_CONFIG: &str = include_str!("../data/default.toml");

/// Errors that can occur when loading tidy configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("Invalid venue rule: {0}")]
    InvalidRule(String),
}

/// Complete tidy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyConfig {
    pub pruning: PruningConfig,
    pub keys: KeyConfig,
    /// Rules applied to `booktitle`, in priority order
    pub conference: Vec<VenueRuleConfig>,
    /// Rules applied to `journal`, in priority order
    pub journal: Vec<VenueRuleConfig>,
}

/// Clutter-field lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruningConfig {
    /// Removed on every run
    #[serde(default)]
    pub always: Vec<String>,
    /// Removed unless metadata is kept
    #[serde(default)]
    pub extended: Vec<String>,
}

/// Citation key generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyConfig {
    /// Title words skipped when picking the key's title word
    pub stop_words: Vec<String>,
}

/// One venue rule: any alias maps to `canonical`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRuleConfig {
    pub canonical: String,
    pub aliases: Vec<String>,
}

/// Partial document used for user overrides
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverlay {
    pruning: Option<PruningConfig>,
    keys: Option<KeyConfig>,
    conference: Option<Vec<VenueRuleConfig>>,
    journal: Option<Vec<VenueRuleConfig>>,
}

impl TidyConfig {
    /// The configuration embedded in the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml(BUILTIN_CONFIG)
    }

    /// Parse a complete configuration; every section must be present
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: TidyConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Replace the sections present in `toml_str`, keeping the rest
    pub fn merge_toml(mut self, toml_str: &str) -> Result<Self, ConfigError> {
        let overlay: ConfigOverlay =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;

        if let Some(pruning) = overlay.pruning {
            self.pruning = pruning;
        }
        if let Some(keys) = overlay.keys {
            self.keys = keys;
        }
        if let Some(conference) = overlay.conference {
            self.conference = conference;
        }
        if let Some(journal) = overlay.journal {
            self.journal = journal;
        }

        self.validate()?;
        Ok(self)
    }

    /// Built-in configuration, overlaid with a user file when one is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let builtin = Self::builtin()?;
        match path {
            None => Ok(builtin),
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
                tracing::debug!("Loaded tidy configuration from {}", path.display());
                builtin.merge_toml(&content)
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule in self.conference.iter().chain(self.journal.iter()) {
            if rule.canonical.trim().is_empty() {
                return Err(ConfigError::InvalidRule(
                    "canonical venue name must not be empty".to_string(),
                ));
            }
            if rule.aliases.is_empty() {
                return Err(ConfigError::InvalidRule(format!(
                    "{} has no aliases",
                    rule.canonical
                )));
            }
            if let Some(alias) = rule
                .aliases
                .iter()
                .find(|a| !a.chars().any(char::is_alphanumeric))
            {
                return Err(ConfigError::InvalidRule(format!(
                    "{} has an alias without letters or digits: {:?}",
                    rule.canonical, alias
                )));
            }
        }
        Ok(())
    }
}
