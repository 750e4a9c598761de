//! Configuration management for the server.

use std::env;

use spacesync_engine::ContainerId;

/// Container hosted when `CONTAINERS` is not set.
pub const DEFAULT_CONTAINER: &str = "iCloud.spacesync";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Containers the record store hosts
    pub containers: Vec<ContainerId>,
    /// When set, every request must carry a bearer token
    pub auth_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let containers: Vec<ContainerId> = lookup("CONTAINERS")
            .unwrap_or_else(|| DEFAULT_CONTAINER.to_string())
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        if containers.is_empty() {
            return Err(ConfigError::NoContainers);
        }

        let auth_secret = lookup("AUTH_SECRET").filter(|secret| !secret.is_empty());

        Ok(Self {
            host,
            port,
            containers,
            auth_secret,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("CONTAINERS must name at least one container")]
    NoContainers,
}
