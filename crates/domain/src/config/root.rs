use serde::{Deserialize, Serialize};

use super::blocking::BlockingConfig;
use super::cache::CacheConfig;
use super::errors::ConfigError;
use super::interception::InterceptionConfig;
use super::logging::LoggingConfig;
use super::upstream::UpstreamConfig;
use crate::BlockPolicy;

/// Main configuration structure for dnstrap
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Virtual interface and block answer settings
    #[serde(default)]
    pub interception: InterceptionConfig,

    /// Upstream resolvers and failover
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Response cache sizing
    #[serde(default)]
    pub cache: CacheConfig,

    /// Rule inputs
    #[serde(default)]
    pub blocking: BlockingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dnstrap.toml in current directory
    /// 3. /etc/dnstrap/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("dnstrap.toml").exists() {
            Self::from_file("dnstrap.toml")?
        } else if std::path::Path::new("/etc/dnstrap/config.toml").exists() {
            Self::from_file("/etc/dnstrap/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml_str(&contents)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(name) = overrides.interface_name {
            self.interception.interface_name = name;
        }
        if let Some(policy) = overrides.block_policy {
            self.interception.block_policy = BlockPolicy::from_name(&policy);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interception.mtu == 0 {
            return Err(ConfigError::Validation("MTU cannot be 0".to_string()));
        }

        if self.interception.max_in_flight == 0 {
            return Err(ConfigError::Validation(
                "max_in_flight cannot be 0".to_string(),
            ));
        }

        if self.cache.positive_capacity == 0 || self.cache.negative_capacity == 0 {
            return Err(ConfigError::Validation(
                "Cache capacities must be greater than 0".to_string(),
            ));
        }

        if self.upstream.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Upstream query timeout cannot be 0".to_string(),
            ));
        }

        if self.upstream.endpoints.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream endpoints configured".to_string(),
            ));
        }

        self.upstream
            .resolved_endpoints()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub interface_name: Option<String>,
    pub block_policy: Option<String>,
    pub log_level: Option<String>,
}
