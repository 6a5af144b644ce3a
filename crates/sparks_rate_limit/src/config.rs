//! TOML configuration for command rate limits.
//!
//! Sources, later ones overriding earlier:
//! - Bundled defaults (include_str! from sparks.toml)
//! - ~/.config/sparks/sparks.toml
//! - ./sparks.toml

use crate::{CommandRateLimit, RateLimitResult, SlidingWindowRateLimiter};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use sparks_cache::Clock;
use sparks_error::{ConfigError, SparksError, SparksResult};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../sparks.toml");

/// One `[commands.<name>]` table.
///
/// ```toml
/// [commands.leaderboard]
/// window_secs = 300
/// per_user = 1
/// per_guild = 2
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommandLimitConfig {
    /// Window length in seconds
    pub window_secs: u64,
    /// Requests per user within the window
    pub per_user: u32,
    /// Requests per guild within the window
    pub per_guild: u32,
}

impl CommandLimitConfig {
    /// Validate into a limiter-ready limit.
    pub fn to_rate_limit(&self) -> RateLimitResult<CommandRateLimit> {
        CommandRateLimit::new(
            Duration::from_secs(self.window_secs),
            self.per_user,
            self.per_guild,
        )
    }
}

/// Command rate limits keyed by command name.
///
/// Unrelated tables in the same file (`[cache]`, `[xp]`) are ignored.
///
/// # Example
///
/// ```
/// use sparks_rate_limit::RateLimitConfig;
///
/// let config = RateLimitConfig::load().unwrap();
/// assert!(config.commands.contains_key("leaderboard"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct RateLimitConfig {
    /// Map of command name to its limit
    #[serde(default)]
    pub commands: HashMap<String, CommandLimitConfig>,
}

impl RateLimitConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> SparksResult<Self> {
        debug!("Loading rate limit configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                SparksError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                SparksError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load with precedence: current dir > home dir > bundled defaults.
    ///
    /// Missing user files are skipped.
    pub fn load() -> SparksResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/sparks/sparks.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("sparks").required(false));

        builder
            .build()
            .map_err(|e| {
                SparksError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                SparksError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Install every configured limit into `limiter`.
    ///
    /// Nothing is installed if any entry is invalid.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first invalid command.
    pub fn apply_to<C: Clock>(&self, limiter: &SlidingWindowRateLimiter<C>) -> SparksResult<()> {
        let mut validated = Vec::with_capacity(self.commands.len());
        for (name, entry) in &self.commands {
            let limit = entry.to_rate_limit().map_err(|e| {
                SparksError::from(ConfigError::new(format!("[commands.{}]: {}", name, e.kind())))
            })?;
            validated.push((name, limit));
        }
        for (name, limit) in validated {
            limiter.set_rate_limit(name, limit);
        }
        Ok(())
    }
}
