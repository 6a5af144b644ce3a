//! Per-guild settings served through single-flight caches.

use crate::SettingsStore;
use futures::future::BoxFuture;
use sparks_cache::{CacheRegistry, SingleFlightCache};
use sparks_error::{CacheError, CacheErrorKind, CacheResult, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type Loader<T> = Arc<dyn Fn(u64) -> BoxFuture<'static, Result<T, StoreError>> + Send + Sync>;

/// One settings value per guild, reloaded from the store at most once per TTL.
///
/// Every guild gets its own [`SingleFlightCache`], so a burst of messages in
/// one guild triggers a single store read and never waits on another guild.
pub struct GuildSettings<T> {
    caches: CacheRegistry<u64, SingleFlightCache<T, StoreError>>,
    load: Loader<T>,
}

impl<T> GuildSettings<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create settings loaded by `load`, fresh for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::InvalidTtl`] when `ttl` is zero.
    pub fn new<F>(ttl: Duration, load: F) -> CacheResult<Self>
    where
        F: Fn(u64) -> BoxFuture<'static, Result<T, StoreError>> + Send + Sync + 'static,
    {
        if ttl.is_zero() {
            return Err(CacheError::new(CacheErrorKind::InvalidTtl));
        }
        Ok(Self {
            // ttl is non-zero, so with_ttl cannot fail here
            caches: CacheRegistry::new(move || SingleFlightCache::with_ttl(ttl).unwrap_or_default()),
            load: Arc::new(load),
        })
    }

    /// The guild's current settings, loading them if stale or missing.
    ///
    /// # Errors
    ///
    /// Returns the store error when no fresh value is cached and the load fails.
    #[instrument(skip(self))]
    pub async fn get(&self, guild_id: u64) -> Result<T, StoreError> {
        let load = Arc::clone(&self.load);
        self.caches
            .get_or_create(guild_id)
            .request(move || load(guild_id))
            .await
    }

    /// Reload the guild's settings after they were changed in the store.
    ///
    /// # Errors
    ///
    /// Returns the store error; the previous value stays cached.
    #[instrument(skip(self))]
    pub async fn refresh(&self, guild_id: u64) -> Result<T, StoreError> {
        debug!("Refreshing guild settings");
        let load = Arc::clone(&self.load);
        self.caches
            .get_or_create(guild_id)
            .force_update(move || load(guild_id))
            .await
    }

    /// The cached value without touching the store, however old.
    pub fn cached(&self, guild_id: u64) -> Option<T> {
        self.caches.get(&guild_id).and_then(|cache| cache.peek())
    }

    /// Drop the guild's cache, e.g. when the bot leaves the guild.
    pub fn forget(&self, guild_id: u64) -> bool {
        self.caches.remove(&guild_id).is_some()
    }

    /// Number of guilds with a cache.
    pub fn guild_count(&self) -> usize {
        self.caches.len()
    }
}

impl<T> std::fmt::Debug for GuildSettings<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuildSettings")
            .field("caches", &self.caches)
            .finish()
    }
}

/// Channels the spam detector watches in each guild.
#[derive(Debug)]
pub struct SpamChannels {
    settings: GuildSettings<Arc<Vec<u64>>>,
}

impl SpamChannels {
    /// Create a spam channel cache over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::InvalidTtl`] when `ttl` is zero.
    pub fn new(store: Arc<dyn SettingsStore>, ttl: Duration) -> CacheResult<Self> {
        let settings = GuildSettings::new(ttl, move |guild_id| {
            let store = Arc::clone(&store);
            Box::pin(async move { store.spam_channels(guild_id).await.map(Arc::new) })
                as BoxFuture<'static, _>
        })?;
        Ok(Self { settings })
    }

    /// Watched channels for a guild, in order.
    ///
    /// # Errors
    ///
    /// Returns the store error when the channels cannot be loaded.
    pub async fn channels(&self, guild_id: u64) -> Result<Arc<Vec<u64>>, StoreError> {
        self.settings.get(guild_id).await
    }

    /// Whether `channel_id` is watched in the guild.
    ///
    /// # Errors
    ///
    /// Returns the store error when the channels cannot be loaded.
    pub async fn is_monitored(&self, guild_id: u64, channel_id: u64) -> Result<bool, StoreError> {
        Ok(self.channels(guild_id).await?.contains(&channel_id))
    }

    /// Reload after the channel list changed.
    ///
    /// # Errors
    ///
    /// Returns the store error; the previous list stays cached.
    pub async fn channels_changed(&self, guild_id: u64) -> Result<Arc<Vec<u64>>, StoreError> {
        self.settings.refresh(guild_id).await
    }

    /// Drop the guild's cache.
    pub fn forget_guild(&self, guild_id: u64) -> bool {
        self.settings.forget(guild_id)
    }
}
