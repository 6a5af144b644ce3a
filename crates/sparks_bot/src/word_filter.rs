//! Per-guild filtered words.

use crate::{FilterWord, GuildSettings, SettingsStore};
use futures::future::BoxFuture;
use sparks_error::{CacheResult, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Filtered words for every guild, cached in front of the store.
///
/// Writes go to the store first and then force a reload, so the next
/// message is checked against the new list.
pub struct WordFilter {
    store: Arc<dyn SettingsStore>,
    words: GuildSettings<Arc<Vec<FilterWord>>>,
}

impl WordFilter {
    /// Create a word filter over `store`, with lists fresh for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`sparks_error::CacheErrorKind::InvalidTtl`] when `ttl` is zero.
    pub fn new(store: Arc<dyn SettingsStore>, ttl: Duration) -> CacheResult<Self> {
        let loader_store = Arc::clone(&store);
        let words = GuildSettings::new(ttl, move |guild_id| {
            let store = Arc::clone(&loader_store);
            Box::pin(async move { store.filter_words(guild_id).await.map(Arc::new) })
                as BoxFuture<'static, _>
        })?;
        Ok(Self { store, words })
    }

    /// The guild's filtered words.
    ///
    /// # Errors
    ///
    /// Returns the store error when the list cannot be loaded.
    pub async fn words(&self, guild_id: u64) -> Result<Arc<Vec<FilterWord>>, StoreError> {
        self.words.get(guild_id).await
    }

    /// Words from the guild's list that appear in `content`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns the store error when the list cannot be loaded.
    pub async fn find_matches(
        &self,
        guild_id: u64,
        content: &str,
    ) -> Result<Vec<FilterWord>, StoreError> {
        let content = content.to_lowercase();
        Ok(self
            .words(guild_id)
            .await?
            .iter()
            .filter(|word| content.contains(&word.name.to_lowercase()))
            .cloned()
            .collect())
    }

    /// Save a word and reload the guild's list.
    ///
    /// # Errors
    ///
    /// Returns the store error from the write or the reload.
    #[instrument(skip(self, word), fields(word = %word.name, action = %word.action))]
    pub async fn add_word(
        &self,
        guild_id: u64,
        word: FilterWord,
    ) -> Result<Arc<Vec<FilterWord>>, StoreError> {
        self.store.save_filter_word(guild_id, word).await?;
        info!("Filter word saved");
        self.words.refresh(guild_id).await
    }

    /// Delete a word and reload the guild's list.
    ///
    /// Returns whether the word existed.
    ///
    /// # Errors
    ///
    /// Returns the store error from the delete or the reload.
    #[instrument(skip(self))]
    pub async fn remove_word(&self, guild_id: u64, name: &str) -> Result<bool, StoreError> {
        let existed = self.store.delete_filter_word(guild_id, name).await?;
        if existed {
            info!("Filter word removed");
            self.words.refresh(guild_id).await?;
        }
        Ok(existed)
    }

    /// Drop the guild's cached list.
    pub fn forget_guild(&self, guild_id: u64) -> bool {
        self.words.forget(guild_id)
    }
}

impl std::fmt::Debug for WordFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordFilter")
            .field("words", &self.words)
            .finish_non_exhaustive()
    }
}
