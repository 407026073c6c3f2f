use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::mqtt::config::{ConnectionParams, ReconnectPolicy};
use crate::mqtt::topics::{RegistryError, TopicRegistry, DEFAULT_DEVICE_PREFIXES, DEFAULT_LOG_TOPIC};
use crate::telemetry::series::DEFAULT_CAPACITY;
use crate::telemetry::DeviceId;

const CONFIG_DIR: &str = "scale-monitor";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_ENV: &str = "SCALE_MONITOR_CONFIG";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("At least one device must be configured")]
    NoDevices,

    #[error("Device id {0} is configured more than once")]
    DuplicateDeviceId(u8),

    #[error("Topic prefix '{0}' is used by more than one device")]
    DuplicatePrefix(String),

    #[error("Broker host must not be empty")]
    EmptyHost,

    #[error("Broker port must be greater than 0")]
    InvalidPort,

    #[error("{0} must be greater than 0")]
    Zero(&'static str),

    #[error("reconnect.initial_delay_ms ({initial}) exceeds reconnect.max_delay_ms ({max})")]
    DelayOrder { initial: u64, max: u64 },

    #[error(transparent)]
    Topics(#[from] RegistryError),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keepalive_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "scale-monitor".to_string(),
            keepalive_secs: 60,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct DeviceConfig {
    pub id: u8,
    pub prefix: String,
    pub label: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_topic: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_topic: DEFAULT_LOG_TOPIC.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_plot_points: usize,
    pub refresh_interval_ms: u64,
    pub log_lines: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_plot_points: DEFAULT_CAPACITY,
            refresh_interval_ms: 150,
            log_lines: 500,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ReconnectConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            max_attempts: None,
        }
    }
}

/// Contents of `config.toml`. Missing sections fall back to their defaults.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub shutdown_timeout_ms: u64,
    pub broker: BrokerConfig,
    pub devices: Vec<DeviceConfig>,
    pub telemetry: TelemetryConfig,
    pub display: DisplayConfig,
    pub reconnect: ReconnectConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: 3000,
            broker: BrokerConfig::default(),
            devices: DEFAULT_DEVICE_PREFIXES
                .iter()
                .map(|(id, prefix)| DeviceConfig {
                    id: *id,
                    prefix: prefix.to_string(),
                    label: format!("Scale {}", DeviceId(*id)),
                })
                .collect(),
            telemetry: TelemetryConfig::default(),
            display: DisplayConfig::default(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl AppConfig {
    /// Location of the config file, honouring `SCALE_MONITOR_CONFIG`.
    pub fn path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let mut path = dirs::config_dir().ok_or_else(|| eyre!("Could not determine config directory"))?;
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        Ok(path)
    }

    /// Writes the default config if nothing exists at `path` yet.
    pub async fn ensure_default_config(path: &Path) -> Result<()> {
        if tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }

        let content = toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| eyre!("Failed to serialize default config: {}", e))?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| eyre!("Failed to write default config file: {}", e))?;

        info!("Default config written to {}", path.display());
        Ok(())
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub async fn load_or_default() -> Result<Self> {
        let path = Self::path()?;
        Self::ensure_default_config(&path).await?;
        Self::load(&path).await
    }

    /// Parses and validates a config document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| eyre!("Failed to parse config: {}", e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid config: {}", e))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }
        let mut ids = HashSet::new();
        let mut prefixes = HashSet::new();
        for device in &self.devices {
            if !ids.insert(device.id) {
                return Err(ConfigError::DuplicateDeviceId(device.id));
            }
            if !prefixes.insert(device.prefix.trim_end_matches('/')) {
                return Err(ConfigError::DuplicatePrefix(device.prefix.clone()));
            }
        }
        if self.broker.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.broker.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.display.max_plot_points == 0 {
            return Err(ConfigError::Zero("display.max_plot_points"));
        }
        if self.display.refresh_interval_ms == 0 {
            return Err(ConfigError::Zero("display.refresh_interval_ms"));
        }
        if self.reconnect.initial_delay_ms > self.reconnect.max_delay_ms {
            return Err(ConfigError::DelayOrder {
                initial: self.reconnect.initial_delay_ms,
                max: self.reconnect.max_delay_ms,
            });
        }
        self.registry()?;
        Ok(())
    }

    pub fn registry(&self) -> Result<TopicRegistry, RegistryError> {
        TopicRegistry::new(
            self.devices
                .iter()
                .map(|d| (DeviceId(d.id), d.prefix.as_str())),
            &self.telemetry.log_topic,
        )
    }

    pub fn device_labels(&self) -> Vec<(DeviceId, String)> {
        self.devices
            .iter()
            .map(|d| (DeviceId(d.id), d.label.clone()))
            .collect()
    }

    pub fn connection_params(&self, registry: &TopicRegistry) -> ConnectionParams {
        ConnectionParams {
            host: self.broker.host.clone(),
            port: self.broker.port,
            client_id: self.broker.client_id.clone(),
            keep_alive: Duration::from_secs(self.broker.keepalive_secs),
            topics: registry.subscriptions(),
        }
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(self.reconnect.initial_delay_ms),
            max_delay: Duration::from_millis(self.reconnect.max_delay_ms),
            max_attempts: self.reconnect.max_attempts,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.display.refresh_interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
