//! Configuration for the classification cascade

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the HS code classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Remote classification service
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Descriptions shorter than this (trimmed, in characters) skip the remote tier
    #[serde(default = "default_min_description_len")]
    pub min_description_len: usize,

    /// YAML file replacing the built-in reference tables
    #[serde(default)]
    pub tables_path: Option<PathBuf>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            min_description_len: default_min_description_len(),
            tables_path: None,
        }
    }
}

/// Remote classification service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Endpoint URL; no endpoint disables the remote tier
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The endpoint, if set and non-blank
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_min_description_len() -> usize {
    3
}

fn default_timeout_ms() -> u64 {
    5_000
}
