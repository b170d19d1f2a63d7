//! Configuration loading utilities

use crate::{Config, MonthComparison};
use callmetrics_common::Result as CallMetricsResult;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable pointing at the configuration file.
pub const CONFIG_PATH_ENV: &str = "CALLMETRICS_CONFIG_PATH";

/// Files looked for in the working directory when no path is given.
const DEFAULT_CONFIG_FILES: [&str; 3] = ["callmetrics.yaml", "callmetrics.yml", "callmetrics.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// File extension is neither YAML nor TOML
    #[error("Unsupported configuration format for '{}'", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[source] callmetrics_common::CallMetricsError),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name
        var: String,
        /// Parse failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for callmetrics_common::CallMetricsError {
    fn from(err: ConfigError) -> Self {
        Self::config_with_source(err.to_string(), err)
    }
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.toml`
    Toml,
}

impl ConfigFormat {
    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Some(Self::Yaml),
            Some("toml") => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML or TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse_str(&content, format)?;
        debug!(path = %path.display(), "Parsed configuration file");

        Self::apply_env_overrides(&mut config, |var| env::var(var).ok())?;
        config.validate().map_err(ConfigError::ValidationError)?;

        Ok(config)
    }

    /// Parse configuration text without touching the environment
    pub fn parse_str(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
        let config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        Ok(config)
    }

    /// Finds the file [`ConfigLoader::load`] would read, if any.
    pub fn locate() -> Option<PathBuf> {
        Self::locate_in(Path::new("."), |var| env::var(var).ok())
    }

    /// Resolves the configuration file: the path named by
    /// `CALLMETRICS_CONFIG_PATH` if set, otherwise the first default file
    /// name present in `dir`.
    pub fn locate_in<F>(dir: &Path, lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
    }

    /// Load configuration from environment variables and files
    pub fn load() -> CallMetricsResult<Config> {
        if let Some(path) = Self::locate() {
            return Self::load_from_file(path);
        }

        info!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config, |var| env::var(var).ok())?;
        config.validate().map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CallMetricsResult<Config> {
        let config = Self::load_config(path.as_ref())?;
        info!(path = %path.as_ref().display(), "Configuration loaded");
        Ok(config)
    }

    /// Apply environment variable overrides to configuration.
    ///
    /// `lookup` resolves a variable name to its value.
    pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timezone) = lookup("CALLMETRICS_TIMEZONE") {
            config.analytics.timezone = timezone;
        }

        if let Some(days) = lookup("CALLMETRICS_LOOKBACK_DAYS") {
            config.analytics.default_lookback_days =
                days.trim().parse().map_err(|e| ConfigError::EnvParseError {
                    var: "CALLMETRICS_LOOKBACK_DAYS".to_string(),
                    source: Box::new(e),
                })?;
        }

        if let Some(mode) = lookup("CALLMETRICS_MONTH_COMPARISON") {
            config.analytics.month_comparison =
                mode.parse::<MonthComparison>()
                    .map_err(|e| ConfigError::EnvParseError {
                        var: "CALLMETRICS_MONTH_COMPARISON".to_string(),
                        source: Box::new(e),
                    })?;
        }

        if let Some(level) = lookup("CALLMETRICS_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(path) = lookup("CALLMETRICS_RECORDS_PATH") {
            config.storage.records_path = Some(PathBuf::from(path));
        }

        Ok(())
    }
}
