use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::cli::CliArgs;
use crate::controller::ControllerConfig;
use crate::error::AppError;
use crate::transport::ZmqEndpointConfig;

/// Longest simulated actuation accepted from configuration.
const MAX_ACTION_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub endpoint: String,
    pub poll_interval_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub action_delay_ms: u64,
    pub device_id: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbosity: u8,
    pub log_file: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let peer = ZmqEndpointConfig::default();
        Self {
            endpoint: peer.endpoint,
            poll_interval_ms: peer.poll_interval_ms,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            action_delay_ms: 1000,
            device_id: 1,
        }
    }
}

impl Config {
    /// Loads the optional TOML file, applies CLI overrides and validates.
    pub fn load(cli_args: &CliArgs) -> Result<Self> {
        let mut config = match cli_args.config.as_deref() {
            Some(config_path) => {
                info!("Loading configuration from {}", config_path);
                let config_str = fs::read_to_string(config_path)
                    .with_context(|| format!("Failed to read config file: {}", config_path))?;
                Self::from_toml_str(&config_str)
                    .with_context(|| format!("Failed to parse config file: {}", config_path))?
            }
            None => Self::default(),
        };

        config.override_with_cli_args(cli_args);
        config.validate().context("Invalid configuration")?;

        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> std::result::Result<Self, AppError> {
        toml::from_str(config_str).map_err(|e| AppError::config(e.to_string()))
    }

    fn override_with_cli_args(&mut self, args: &CliArgs) {
        if let Some(endpoint) = &args.endpoint {
            self.network.endpoint = endpoint.clone();
        }
        if let Some(delay) = args.action_delay_ms {
            self.simulation.action_delay_ms = delay;
        }
        if let Some(device_id) = args.device_id {
            self.simulation.device_id = device_id;
        }
        if let Some(log_file) = &args.log_file {
            self.logging.log_file = Some(log_file.clone());
        }
        if args.debug {
            self.logging.verbosity = self.logging.verbosity.max(1);
        }
    }

    pub fn validate(&self) -> std::result::Result<(), AppError> {
        self.peer_config()
            .validate()
            .map_err(|e| AppError::config(e.to_string()))?;

        if self.simulation.action_delay_ms > MAX_ACTION_DELAY_MS {
            return Err(AppError::config(format!(
                "action_delay_ms must be at most {}",
                MAX_ACTION_DELAY_MS
            )));
        }

        if matches!(&self.logging.log_file, Some(path) if path.trim().is_empty()) {
            return Err(AppError::config("log_file cannot be empty"));
        }

        Ok(())
    }

    pub fn peer_config(&self) -> ZmqEndpointConfig {
        ZmqEndpointConfig {
            endpoint: self.network.endpoint.clone(),
            poll_interval_ms: self.network.poll_interval_ms,
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            action_delay: Duration::from_millis(self.simulation.action_delay_ms),
            device_id: self.simulation.device_id,
        }
    }
}
