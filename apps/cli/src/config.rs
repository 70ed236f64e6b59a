//! CLI configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tool configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CliConfig {
    /// SSDP search window in seconds.
    /// Override: `DLNAFIND_DISCOVERY_TIMEOUT`
    pub discovery_timeout: u64,

    /// Timeout for each media server Search, in seconds.
    /// Override: `DLNAFIND_SEARCH_TIMEOUT`
    pub search_timeout: u64,

    /// Timeout for each renderer command, in seconds.
    /// Override: `DLNAFIND_CONTROL_TIMEOUT`
    pub control_timeout: u64,

    /// Number of media servers searched at the same time.
    /// Override: `DLNAFIND_MAX_CONCURRENCY`
    pub max_concurrency: usize,

    /// Renderer registry file. Defaults to the platform config directory.
    /// Override: `DLNAFIND_REGISTRY`
    pub registry: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        let core = dlnafind_core::Config::default();
        Self {
            discovery_timeout: core.discovery_timeout_secs,
            search_timeout: core.search_timeout_secs,
            control_timeout: core.control_timeout_secs,
            max_concurrency: core.max_concurrency,
            registry: None,
        }
    }
}

impl CliConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(secs) = var("DLNAFIND_DISCOVERY_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.discovery_timeout = secs;
        }

        if let Some(secs) = var("DLNAFIND_SEARCH_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.search_timeout = secs;
        }

        if let Some(secs) = var("DLNAFIND_CONTROL_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.control_timeout = secs;
        }

        if let Some(n) = var("DLNAFIND_MAX_CONCURRENCY").and_then(|v| v.parse().ok()) {
            self.max_concurrency = n;
        }

        // Note: DLNAFIND_REGISTRY is handled by clap via #[arg(env = ...)] in main.rs
    }

    /// Converts to dlnafind-core's Config type.
    pub fn to_core_config(&self) -> dlnafind_core::Config {
        let defaults = dlnafind_core::Config::default();
        dlnafind_core::Config {
            discovery_timeout_secs: self.discovery_timeout,
            search_timeout_secs: self.search_timeout,
            control_timeout_secs: self.control_timeout,
            max_concurrency: self.max_concurrency,
            registry_path: self.registry.clone().unwrap_or(defaults.registry_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = CliConfig::from_yaml("search_timeout: 4\nregistry: /tmp/r.json\n").unwrap();
        assert_eq!(config.search_timeout, 4);
        assert_eq!(config.registry, Some(PathBuf::from("/tmp/r.json")));
        assert_eq!(config.discovery_timeout, CliConfig::default().discovery_timeout);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(CliConfig::from_yaml("  \n").unwrap(), CliConfig::default());
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(CliConfig::from_yaml("max_concurrency: lots\n").is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("DLNAFIND_SEARCH_TIMEOUT", "3"),
            ("DLNAFIND_MAX_CONCURRENCY", "8"),
            ("DLNAFIND_CONTROL_TIMEOUT", "not a number"),
        ]
        .into_iter()
        .collect();

        let mut config = CliConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.search_timeout, 3);
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.control_timeout, CliConfig::default().control_timeout);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "discovery_timeout: 7").unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();
        let core = config.to_core_config();
        assert_eq!(core.discovery_timeout_secs, 7);
        assert!(core.validate().is_ok());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(CliConfig::load(Some(Path::new("/nonexistent/dlnafind.yaml"))).is_err());
    }
}
