//! Service configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tradenav_classifiers::ClassifierConfig;

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to call the API from a browser; empty allows any
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub max_body_bytes: usize,

    /// Classification cascade configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Command-line overrides applied on top of the file configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub remote_endpoint: Option<String>,
    pub tables: Option<PathBuf>,
    pub listen: Option<String>,
    pub port: Option<u16>,
}

impl ServiceConfig {
    /// Load configuration from file and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(config_path: impl AsRef<Path>, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let config_path = config_path.as_ref();
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply(overrides);
        Ok(config)
    }

    /// Apply CLI overrides
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(endpoint) = &overrides.remote_endpoint {
            self.classifier.remote.endpoint = Some(endpoint.clone());
        }

        if let Some(tables) = &overrides.tables {
            self.classifier.tables_path = Some(tables.clone());
        }

        if let Some(listen) = &overrides.listen {
            self.listen = listen.clone();
        }

        if let Some(port) = overrides.port {
            self.port = port;
        }
    }

    /// `listen:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen, self.port)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            allowed_origins: Vec::new(),
            max_body_bytes: default_body_limit(),
            classifier: ClassifierConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    64 * 1024
}
