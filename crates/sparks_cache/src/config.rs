//! Sizing and lifetime settings for the bot's caches.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the bot's cache layer.
///
/// # Example
///
/// ```
/// use sparks_cache::CacheConfig;
///
/// let config = CacheConfig::default().with_message_capacity(500);
/// assert_eq!(*config.message_capacity(), 500);
/// assert_eq!(*config.settings_ttl_secs(), 30);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct CacheConfig {
    /// Maximum number of messages kept for edit/delete logs
    #[serde(default = "default_message_capacity")]
    #[builder(default = "default_message_capacity()")]
    message_capacity: usize,

    /// Seconds a per-guild settings snapshot stays fresh
    #[serde(default = "default_settings_ttl_secs")]
    #[builder(default = "default_settings_ttl_secs()")]
    settings_ttl_secs: u64,

    /// Seconds a departed member stays available to the ban log
    #[serde(default = "default_left_member_retention_secs")]
    #[builder(default = "default_left_member_retention_secs()")]
    left_member_retention_secs: u64,
}

fn default_message_capacity() -> usize {
    30_000
}

fn default_settings_ttl_secs() -> u64 {
    30
}

fn default_left_member_retention_secs() -> u64 {
    30
}

impl CacheConfig {
    /// Settings freshness as a duration.
    pub fn settings_ttl(&self) -> Duration {
        Duration::from_secs(self.settings_ttl_secs)
    }

    /// Departed-member retention as a duration.
    pub fn left_member_retention(&self) -> Duration {
        Duration::from_secs(self.left_member_retention_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            message_capacity: default_message_capacity(),
            settings_ttl_secs: default_settings_ttl_secs(),
            left_member_retention_secs: default_left_member_retention_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_fills_defaults() {
        let config = CacheConfigBuilder::default()
            .settings_ttl_secs(60)
            .build()
            .unwrap();

        assert_eq!(*config.message_capacity(), 30_000);
        assert_eq!(config.settings_ttl(), Duration::from_secs(60));
        assert_eq!(config.left_member_retention(), Duration::from_secs(30));
    }
}
