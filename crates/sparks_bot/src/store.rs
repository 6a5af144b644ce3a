//! The settings store behind the per-guild caches.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sparks_error::StoreError;

/// What happens to a member who posts a filtered word.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FilterAction {
    /// Ban the author
    #[default]
    Ban,
    /// Kick the author
    Kick,
    /// Time the author out
    Timeout,
    /// Add a warning to the author
    Warn,
}

/// A word that triggers moderation in one guild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterWord {
    /// The word, matched case-insensitively anywhere in a message
    pub name: String,
    /// Action taken on a match
    #[serde(default)]
    pub action: FilterAction,
}

impl FilterWord {
    /// A word with the default ban action.
    pub fn ban(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: FilterAction::Ban,
        }
    }
}

/// Persistent per-guild settings.
///
/// Implementations may do I/O; every method must be safe to call again
/// after a failure.
#[async_trait]
pub trait SettingsStore: Send + Sync + 'static {
    /// Filter words configured for a guild.
    async fn filter_words(&self, guild_id: u64) -> Result<Vec<FilterWord>, StoreError>;

    /// Add or replace a filter word.
    async fn save_filter_word(&self, guild_id: u64, word: FilterWord) -> Result<(), StoreError>;

    /// Delete a filter word. Returns whether it existed.
    async fn delete_filter_word(&self, guild_id: u64, name: &str) -> Result<bool, StoreError>;

    /// Channels watched by the spam detector, in the order a spammer hits them.
    async fn spam_channels(&self, guild_id: u64) -> Result<Vec<u64>, StoreError>;
}
