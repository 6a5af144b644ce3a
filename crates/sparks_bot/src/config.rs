//! Bot configuration file.

use crate::parse_duration;
use serde::{Deserialize, Serialize};
use sparks_cache::CacheConfig;
use sparks_error::{ConfigError, SparksError, SparksResult};
use sparks_rate_limit::RateLimitConfig;
use std::path::Path;
use std::time::Duration;

/// XP settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpConfig {
    /// Cooldown between XP awards, e.g. `"30s"`
    #[serde(default = "default_xp_interval")]
    pub default_interval: String,
}

fn default_xp_interval() -> String {
    "30s".to_string()
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            default_interval: default_xp_interval(),
        }
    }
}

impl XpConfig {
    /// The cooldown as a duration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the interval does not parse or is zero.
    pub fn default_interval(&self) -> SparksResult<Duration> {
        let interval = parse_duration(&self.default_interval)?.duration();
        if interval.is_zero() {
            return Err(ConfigError::new("[xp] default_interval must be positive").into());
        }
        Ok(interval)
    }
}

/// Everything the bot state is built from.
///
/// ```toml
/// [cache]
/// message_capacity = 30000
///
/// [xp]
/// default_interval = "30s"
///
/// [commands.leaderboard]
/// window_secs = 300
/// per_user = 1
/// per_guild = 2
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Cache sizing and lifetimes
    #[serde(default)]
    pub cache: CacheConfig,
    /// XP settings
    #[serde(default)]
    pub xp: XpConfig,
    /// Command rate limits
    #[serde(flatten)]
    pub rate_limits: RateLimitConfig,
}

impl BotConfig {
    /// Load bot configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> SparksResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SparksError::from(ConfigError::new(format!(
                "Failed to read config file: {}",
                e
            )))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse bot configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the text does not parse.
    pub fn from_toml_str(content: &str) -> SparksResult<Self> {
        toml::from_str(content).map_err(|e| {
            SparksError::from(ConfigError::new(format!("Failed to parse config: {}", e)))
        })
    }
}
