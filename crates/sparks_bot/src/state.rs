//! Owner of every cache the bot keeps.

use crate::{
    BotConfig, CommandThrottle, MessageCache, RecentlyLeftMembers, SettingsStore, SpamChannels,
    WordFilter, XpCooldowns,
};
use derive_getters::Getters;
use sparks_error::SparksResult;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// All in-process state of a running bot.
///
/// Built once at startup and shared by the event handlers. Nothing in here
/// is global: dropping the state drops every cache.
#[derive(Debug, Getters)]
pub struct BotState {
    /// Recent messages for edit and delete logs
    messages: MessageCache,
    /// Per-guild filtered words
    word_filter: WordFilter,
    /// Per-guild spam trap channels
    spam_channels: SpamChannels,
    /// XP award cooldowns
    xp: XpCooldowns,
    /// Cooldown between XP awards
    xp_interval: Duration,
    /// Members who just left, for the ban log
    left_members: RecentlyLeftMembers,
    /// Command rate limits
    throttle: CommandThrottle,
}

impl BotState {
    /// Build every component from `config`, backed by `store`.
    ///
    /// # Errors
    ///
    /// Returns an error when any configured size, lifetime or limit is invalid.
    #[instrument(skip_all)]
    pub fn new(config: &BotConfig, store: Arc<dyn SettingsStore>) -> SparksResult<Self> {
        let settings_ttl = config.cache.settings_ttl();
        let state = Self {
            messages: MessageCache::new(*config.cache.message_capacity())?,
            word_filter: WordFilter::new(Arc::clone(&store), settings_ttl)?,
            spam_channels: SpamChannels::new(store, settings_ttl)?,
            xp: XpCooldowns::new(),
            xp_interval: config.xp.default_interval()?,
            left_members: RecentlyLeftMembers::new(config.cache.left_member_retention()),
            throttle: CommandThrottle::from_config(&config.rate_limits)?,
        };
        info!(
            message_capacity = config.cache.message_capacity(),
            settings_ttl = ?settings_ttl,
            "Bot state initialised"
        );
        Ok(state)
    }

    /// Drop every per-guild cache after the bot leaves a guild.
    #[instrument(skip(self))]
    pub fn forget_guild(&self, guild_id: u64) {
        self.word_filter.forget_guild(guild_id);
        self.spam_channels.forget_guild(guild_id);
    }
}
