//! Configuration loading from `.taskdeck.toml`.
//!
//! All fields are optional; absent files and absent keys fall back to
//! defaults. The latency section exists to exercise the store against a
//! slow backing store; it is off unless explicitly enabled.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::store::Latency;
use crate::task::Priority;

pub const CONFIG_FILE: &str = ".taskdeck.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Priority assigned when a new task does not specify one.
    pub default_priority: Priority,
    pub latency: LatencyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    /// Simulate backing-store latency on every operation.
    pub simulate: bool,
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_priority: Priority::Medium,
            latency: LatencyConfig::default(),
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            simulate: false,
            min_ms: 200,
            max_ms: 500,
        }
    }
}

impl Config {
    /// Load from `<data_dir>/.taskdeck.toml`; defaults when missing.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The store latency implied by this config.
    pub fn latency(&self) -> Latency {
        if self.latency.simulate {
            Latency::Uniform {
                min_ms: self.latency.min_ms,
                max_ms: self.latency.max_ms,
            }
        } else {
            Latency::None
        }
    }
}
