//! Simulator configuration
//!
//! One TOML file names every node (id, endpoint URL, schema file) plus the
//! dispatch and health-polling settings. Everything the run needs travels
//! in this struct; nothing is read from ambient process state.

use sensegrid_dispatch::DispatchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Top-level simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Simulated nodes; order defines topology iteration order
    pub nodes: Vec<NodeEntry>,

    /// RNG seed for reproducible generation; omitted means entropy-seeded
    #[serde(default)]
    pub seed: Option<u64>,

    /// Dispatch harness settings
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Health polling before dispatch starts
    #[serde(default)]
    pub health: HealthSettings,
}

/// One simulated node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEntry {
    /// Stable node identifier
    pub id: String,
    /// Base URL of the node's service endpoint
    pub endpoint: String,
    /// Path to the node's field schema (JSON)
    pub schema: PathBuf,
}

/// Dispatch harness settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Maximum in-flight invocations per phase
    pub max_in_flight: usize,
    /// Per-invocation timeout in seconds
    pub invoke_timeout_secs: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_in_flight: 8,
            invoke_timeout_secs: 30,
        }
    }
}

impl DispatchSettings {
    pub fn to_dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            max_in_flight: self.max_in_flight,
            invoke_timeout: Duration::from_secs(self.invoke_timeout_secs),
        }
    }
}

/// Bounded health polling settings
///
/// An endpoint that never answers is logged and left to fail unit by unit;
/// polling never aborts the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    /// Attempts per node before giving up
    pub attempts: u32,
    /// Delay between attempts in seconds
    pub interval_secs: u64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            attempts: 12,
            interval_secs: 5,
        }
    }
}

impl HealthSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Configuration(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Configuration(format!("Failed to parse config: {}", e)))
    }
}
