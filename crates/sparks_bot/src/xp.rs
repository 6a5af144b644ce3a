//! Cooldown gate in front of the XP award.

use sparks_cache::ExpiringSet;
use std::future::Future;
use std::time::Duration;
use tracing::trace;

/// Members who earned XP recently, keyed by `(user_id, guild_id)`.
///
/// A member earns XP for at most one message per interval; the entry
/// expires on its own when the interval ends.
#[derive(Debug, Default)]
pub struct XpCooldowns {
    active: ExpiringSet<(u64, u64)>,
}

impl XpCooldowns {
    /// Create a gate with no member on cooldown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `award` unless the member is on cooldown, then start the cooldown.
    ///
    /// The check and the cooldown start are one step, so two messages
    /// arriving together award once. Returns `None` when skipped.
    pub async fn try_award<F, Fut>(
        &self,
        user_id: u64,
        guild_id: u64,
        interval: Duration,
        award: F,
    ) -> Option<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        if self
            .active
            .add_scheduled_if_absent((user_id, guild_id), interval)
            .is_none()
        {
            trace!(user_id, guild_id, "XP on cooldown");
            return None;
        }
        Some(award().await)
    }

    /// Whether the member is on cooldown.
    pub fn is_on_cooldown(&self, user_id: u64, guild_id: u64) -> bool {
        self.active.contains(&(user_id, guild_id))
    }

    /// Members on cooldown in one guild.
    pub fn members_on_cooldown(&self, guild_id: u64) -> Vec<u64> {
        self.active
            .snapshot()
            .into_iter()
            .filter(|(_, guild)| *guild == guild_id)
            .map(|(user, _)| user)
            .collect()
    }
}
