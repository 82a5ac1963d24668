//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `verdant-config.yaml` at the
//! project root. Every section is optional; an empty file yields the
//! built-in factor table, conversion constants and offset catalog.
//!
//! ```yaml
//! factors:
//!   table:
//!     ferry: { kind: transport, kg_co2e_per_unit: "0.12" }
//!   regional_grid:
//!     norway: "0.01"
//! equivalence:
//!   kg_co2_per_tree_year: "21"
//! aggregator:
//!   active_window_days: 30
//! logging:
//!   level: info
//! ```
//!
//! Loading validates the result: a negative factor, an empty category
//! key or a zero conversion constant is a [`ConfigError::Invalid`].

use std::path::Path;

use serde::Deserialize;

use verdant_aggregator::{AggregatorConfig, ChallengeConfig};
use verdant_estimator::{EmissionFactorTable, EquivalenceConfig, FactorConfig};
use verdant_offsets::{OffsetConfig, OffsetMarketplace};

/// Environment variable that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "VERDANT_LOG_LEVEL";

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "verdant-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds unusable values.
    #[error("invalid config section `{section}`: {reason}")]
    Invalid {
        /// The section at fault.
        section: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `verdant-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerdantConfig {
    /// Emission factor table, regional grid factors and defaults.
    #[serde(default)]
    pub factors: FactorConfig,

    /// Conversion constants for equivalents.
    #[serde(default)]
    pub equivalence: EquivalenceConfig,

    /// Report constants for the impact aggregator.
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// Community challenge constants.
    #[serde(default)]
    pub challenges: ChallengeConfig,

    /// Offset catalog and pricing.
    #[serde(default)]
    pub offsets: OffsetConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VerdantConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `VERDANT_LOG_LEVEL` overrides `logging.level`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a section fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a section fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config
            .logging
            .apply_env_override(std::env::var(LOG_LEVEL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] in the working
    /// directory if it exists, or fall back to the built-in defaults.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::from_file(local)
                } else {
                    Self::parse("")
                }
            }
        }
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first failing section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        EmissionFactorTable::from_config(&self.factors).map_err(|e| ConfigError::Invalid {
            section: "factors",
            reason: e.to_string(),
        })?;
        OffsetMarketplace::new(self.offsets.clone()).map_err(|e| ConfigError::Invalid {
            section: "offsets",
            reason: e.to_string(),
        })?;

        for (section, invalid) in [
            ("equivalence", self.equivalence.invalid_constants()),
            ("aggregator", self.aggregator.invalid_constants()),
            ("challenges", self.challenges.invalid_constants()),
        ] {
            if !invalid.is_empty() {
                return Err(ConfigError::Invalid {
                    section,
                    reason: format!("out of range: {}", invalid.join(", ")),
                });
            }
        }
        Ok(())
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Replace `level` with a non-empty override.
    pub fn apply_env_override(&mut self, level: Option<String>) {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.level = level;
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}
