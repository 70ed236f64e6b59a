//! Core configuration.
//!
//! A single [`Config`] value is built once by the binary and handed to every
//! component. There is no process-wide mutable configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol_constants::{
    DEFAULT_SEARCH_CONCURRENCY, DISCOVERY_TIMEOUT_SECS, SOAP_TIMEOUT_SECS,
};

/// File name of the persisted renderer registry.
pub const REGISTRY_FILE_NAME: &str = "renderers.json";

/// Runtime configuration for discovery, search and playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SSDP search window in seconds.
    pub discovery_timeout_secs: u64,

    /// Timeout for a single ContentDirectory Search call (seconds).
    /// Also bounds the device description lookup that precedes it.
    pub search_timeout_secs: u64,

    /// Timeout for a single AVTransport call (seconds).
    pub control_timeout_secs: u64,

    /// Maximum number of media servers searched at the same time.
    pub max_concurrency: usize,

    /// Location of the renderer registry file.
    pub registry_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discovery_timeout_secs: DISCOVERY_TIMEOUT_SECS,
            search_timeout_secs: SOAP_TIMEOUT_SECS,
            control_timeout_secs: SOAP_TIMEOUT_SECS,
            max_concurrency: DEFAULT_SEARCH_CONCURRENCY,
            registry_path: default_registry_path(),
        }
    }
}

impl Config {
    /// Validates values that would otherwise cause runtime issues.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be at least 1".to_string());
        }
        if self.discovery_timeout_secs == 0 {
            return Err("discovery_timeout_secs must be at least 1".to_string());
        }
        if self.search_timeout_secs == 0 || self.control_timeout_secs == 0 {
            return Err("request timeouts must be at least 1 second".to_string());
        }
        Ok(())
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_secs(self.control_timeout_secs)
    }
}

/// Returns `<config dir>/dlnafind/renderers.json`, or a file in the working
/// directory when the platform has no config directory.
pub fn default_registry_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("dlnafind").join(REGISTRY_FILE_NAME),
        None => PathBuf::from(REGISTRY_FILE_NAME),
    }
}
