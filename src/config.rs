/*!
 * Configuration support for the directory
 *
 * Provides runtime configuration for where the payload comes from and how
 * results are presented.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ENDPOINT_URL;

/// Directory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// URL of the provider payload
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Request timeout in seconds (None = wait indefinitely)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Custom user agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: Option<String>,

    /// Maximum number of autocomplete suggestions
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Default output format for rendered views
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// How a view is rendered on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per provider
    #[default]
    Text,
    /// The derived view as a JSON array
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            timeout_seconds: None,
            user_agent: default_user_agent(),
            suggestion_limit: default_suggestion_limit(),
            output_format: OutputFormat::Text,
        }
    }
}

// Default value functions for serde
fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

fn default_user_agent() -> Option<String> {
    Some(format!("docdir/{}", env!("CARGO_PKG_VERSION")))
}

fn default_suggestion_limit() -> usize {
    3
}

impl DirectoryConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - `DOCDIR_ENDPOINT_URL`: payload URL
    /// - `DOCDIR_TIMEOUT_SECONDS`: number, or "none"
    /// - `DOCDIR_USER_AGENT`: user agent string
    /// - `DOCDIR_SUGGESTION_LIMIT`: number
    /// - `DOCDIR_OUTPUT_FORMAT`: "text" or "json"
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("DOCDIR_ENDPOINT_URL") {
            config.endpoint_url = val;
        }

        if let Some(val) = lookup("DOCDIR_TIMEOUT_SECONDS") {
            config.timeout_seconds = match val.to_lowercase().as_str() {
                "none" | "0" => None,
                num => num.parse().ok(),
            };
        }

        if let Some(val) = lookup("DOCDIR_USER_AGENT") {
            config.user_agent = Some(val);
        }

        if let Some(val) = lookup("DOCDIR_SUGGESTION_LIMIT") {
            if let Ok(limit) = val.parse() {
                config.suggestion_limit = limit;
            }
        }

        if let Some(val) = lookup("DOCDIR_OUTPUT_FORMAT") {
            if let Ok(format) = val.parse() {
                config.output_format = format;
            }
        }

        config
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| crate::DirectoryError::io_at(e, path.as_ref()))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| crate::DirectoryError::Configuration {
                message: format!("Failed to parse config file: {}", e),
                suggestion: Some("Check that the file is valid TOML format".to_string()),
            })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::DirectoryError::Configuration {
                message: format!("Failed to serialize config: {}", e),
                suggestion: None,
            })?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/docdir/config.toml` on Unix-like systems
    /// or `%APPDATA%\docdir\config.toml` on Windows
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "docdir")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location, environment, or defaults
    ///
    /// Priority order:
    /// 1. Default config file (if exists)
    /// 2. Environment variables
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Some(config_path) = Self::default_config_path() {
            if config_path.exists() {
                match Self::from_file(&config_path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!(path = %config_path.display(), error = %e, "ignoring unreadable config file"),
                }
            }
        }

        Self::from_env()
    }
}

/// Builder for customizing configuration
#[derive(Default)]
pub struct ConfigBuilder {
    config: DirectoryConfig,
}

impl ConfigBuilder {
    /// Start building from defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building from an existing configuration
    pub fn from_config(config: DirectoryConfig) -> Self {
        Self { config }
    }

    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint_url = url.into();
        self
    }

    pub fn timeout_seconds(mut self, timeout: Option<u64>) -> Self {
        self.config.timeout_seconds = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: Option<String>) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    pub fn suggestion_limit(mut self, limit: usize) -> Self {
        self.config.suggestion_limit = limit;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Build the configuration
    pub fn build(self) -> DirectoryConfig {
        self.config
    }
}
