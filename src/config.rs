//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.tsxcheck.toml` files.

use crate::cli::OutputFormat;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".tsxcheck.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Analyzer service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the analyzer; requests go to `<endpoint>/analyze`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds. Unset means no timeout.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: None,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

fn default_endpoint() -> String {
    "http://localhost:8080".to_string()
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Include the token table in reports.
    #[serde(default = "default_true")]
    pub show_tokens: bool,

    /// Include the optimized code in reports.
    #[serde(default = "default_true")]
    pub show_optimized_code: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            show_tokens: true,
            show_optimized_code: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.tsxcheck.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref endpoint) = args.endpoint {
            self.service.endpoint = endpoint.clone();
        }
        if let Some(timeout) = args.timeout {
            self.service.timeout_seconds = Some(timeout);
        }
        if let Some(format) = args.format {
            self.output.format = format;
        }
    }

    /// Check values that may have come from the file.
    pub fn validate(&self) -> Result<()> {
        let endpoint = &self.service.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            bail!(
                "Endpoint URL must start with 'http://' or 'https://': {}",
                endpoint
            );
        }
        if self.service.timeout_seconds == Some(0) {
            bail!("timeout_seconds must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.endpoint, "http://localhost:8080");
        assert!(config.service.timeout().is_none());
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.output.show_tokens);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[service]
endpoint = "https://analyzer.example.com"
timeout_seconds = 30

[output]
format = "markdown"
show_optimized_code = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.service.endpoint, "https://analyzer.example.com");
        assert_eq!(config.service.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.output.format, OutputFormat::Markdown);
        assert!(config.output.show_tokens);
        assert!(!config.output.show_optimized_code);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.service.timeout_seconds = Some(10);

        let args = Args::try_parse_from([
            "tsxcheck",
            "--endpoint",
            "http://127.0.0.1:9000",
            "--format",
            "json",
        ])
        .unwrap();
        config.merge_with_args(&args);

        assert_eq!(config.service.endpoint, "http://127.0.0.1:9000");
        assert_eq!(config.service.timeout_seconds, Some(10));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut config = Config::default();
        config.service.endpoint = "ftp://nope".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[service]\nendpoint = \"http://10.0.0.2:8080\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.service.endpoint, "http://10.0.0.2:8080");

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[service\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[service]"));
        assert!(toml_str.contains("[output]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.service.endpoint, "http://localhost:8080");
    }
}
