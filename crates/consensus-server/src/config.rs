//! Configuration for the Consensus Server
//!
//! This module contains the configuration types and loading functionality.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use tracing::{info, warn};

use consensus_core::{AggregationConfig, LabelSet, DEFAULT_CANVAS_SCALE, DEFAULT_EXPECTED_LABELS};

use crate::error::{ServerError, ServerResult};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// URL of the submission store
    #[serde(default = "default_store_url")]
    pub store_url: String,

    /// Labels the activity expects, in ranking tiebreak order
    #[serde(default = "default_expected_labels")]
    pub expected_labels: Vec<String>,

    /// Canvas extent used to normalize positional spread
    #[serde(default = "default_canvas_scale")]
    pub canvas_scale: f64,

    /// Reject submissions naming labels outside the vocabulary
    #[serde(default)]
    pub strict_labels: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_store_url() -> String {
    "memory://local".to_string()
}

fn default_expected_labels() -> Vec<String> {
    DEFAULT_EXPECTED_LABELS.iter().map(|l| l.to_string()).collect()
}

fn default_canvas_scale() -> f64 {
    DEFAULT_CANVAS_SCALE
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> ServerResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Start with defaults
        let mut config = Self::default();

        if let Some(port) = lookup("SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            } else {
                warn!("Invalid SERVER_PORT value: {}", port);
            }
        }

        if let Some(host) = lookup("SERVER_HOST") {
            config.bind_address = host;
        }

        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = match format.to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    warn!("Invalid LOG_FORMAT value: {}, using pretty", format);
                    LogFormat::Pretty
                }
            };
        }

        if let Some(store_url) = lookup("STORE_URL") {
            config.store_url = store_url;
        }

        if let Some(labels) = lookup("EXPECTED_LABELS") {
            let parsed: Vec<String> = labels
                .split(';')
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
            if parsed.is_empty() {
                warn!("Invalid EXPECTED_LABELS value: {:?}", labels);
            } else {
                config.expected_labels = parsed;
            }
        }

        if let Some(scale) = lookup("CANVAS_SCALE") {
            match scale.parse::<f64>() {
                Ok(value) if value.is_finite() && value > 0.0 => config.canvas_scale = value,
                _ => warn!("Invalid CANVAS_SCALE value: {}", scale),
            }
        }

        if let Some(strict) = lookup("STRICT_LABELS") {
            match strict.to_lowercase().as_str() {
                "true" | "1" => config.strict_labels = true,
                "false" | "0" => config.strict_labels = false,
                _ => warn!("Invalid STRICT_LABELS value: {}", strict),
            }
        }

        config.validate()?;

        info!("Loaded server configuration");
        Ok(config)
    }

    /// Check the invariants `load` cannot repair by ignoring a value
    pub fn validate(&self) -> ServerResult<()> {
        if !self.store_url.starts_with("memory://") {
            return Err(ServerError::ConfigError(format!(
                "Unsupported store URL: {}",
                self.store_url
            )));
        }

        if !(self.canvas_scale.is_finite() && self.canvas_scale > 0.0) {
            return Err(ServerError::ConfigError(format!(
                "Canvas scale must be a positive number, got {}",
                self.canvas_scale
            )));
        }

        if self.expected_labels.is_empty() {
            return Err(ServerError::ConfigError(
                "At least one expected label is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Expected labels as a label set
    pub fn label_set(&self) -> LabelSet {
        LabelSet::new(self.expected_labels.iter().cloned())
    }

    /// Aggregation tunables
    pub fn aggregation_config(&self) -> AggregationConfig {
        AggregationConfig {
            canvas_scale: self.canvas_scale,
        }
    }

    /// Address to bind the listener to
    pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| {
                ServerError::ConfigError(format!(
                    "Invalid bind address {}:{}: {}",
                    self.bind_address, self.port, e
                ))
            })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            store_url: default_store_url(),
            expected_labels: default_expected_labels(),
            canvas_scale: default_canvas_scale(),
            strict_labels: false,
        }
    }
}
