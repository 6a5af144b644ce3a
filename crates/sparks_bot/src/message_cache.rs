//! Recent guild messages, kept so edits and deletions can be logged.

use derive_getters::Getters;
use sparks_cache::BoundedFifoCache;
use sparks_error::CacheResult;
use tracing::{debug, instrument};

/// An inbound message as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct MessageEvent {
    /// Message snowflake
    pub message_id: u64,
    /// Guild the message was posted in; `None` for direct messages
    pub guild_id: Option<u64>,
    /// Channel snowflake
    pub channel_id: u64,
    /// Author snowflake
    pub author_id: u64,
    /// Whether the author is a bot account
    pub author_is_bot: bool,
    /// Author avatar URL at send time
    pub avatar_url: String,
    /// Rendered message content
    pub content: String,
    /// URLs of attached files
    pub attachment_urls: Vec<String>,
}

/// The fields of a message the mod log needs, and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MessageLite {
    /// Message snowflake
    id: u64,
    /// Author snowflake
    author_id: u64,
    /// Channel snowflake
    channel_id: u64,
    /// Author avatar URL at send time
    avatar_url: String,
    /// Message content at the last received version
    content: String,
    /// URLs of attached files
    attachment_urls: Vec<String>,
}

impl From<&MessageEvent> for MessageLite {
    fn from(event: &MessageEvent) -> Self {
        Self {
            id: event.message_id,
            author_id: event.author_id,
            channel_id: event.channel_id,
            avatar_url: event.avatar_url.clone(),
            content: event.content.clone(),
            attachment_urls: event.attachment_urls.clone(),
        }
    }
}

/// Recent human messages from guilds, oldest evicted first.
#[derive(Debug)]
pub struct MessageCache {
    messages: BoundedFifoCache<u64, MessageLite>,
}

impl MessageCache {
    /// Create a cache holding at most `capacity` messages.
    ///
    /// # Errors
    ///
    /// Returns [`sparks_error::CacheErrorKind::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> CacheResult<Self> {
        Ok(Self {
            messages: BoundedFifoCache::new(capacity)?,
        })
    }

    /// Cache a new message. Direct messages and bot messages are ignored.
    ///
    /// Returns whether the message was cached.
    #[instrument(skip(self, event), fields(message_id = event.message_id))]
    pub fn on_message_received(&self, event: &MessageEvent) -> bool {
        if event.guild_id.is_none() || event.author_is_bot {
            return false;
        }
        if let Some((evicted, _)) = self.messages.put(event.message_id, event.into()) {
            debug!(evicted, "Message cache full, evicted oldest message");
        }
        true
    }

    /// Replace a cached message with its edited version.
    ///
    /// Messages not already cached stay uncached. Returns the version from
    /// before the edit.
    pub fn on_message_updated(&self, event: &MessageEvent) -> Option<MessageLite> {
        let before = self.messages.get(&event.message_id)?;
        self.messages.put(event.message_id, event.into());
        Some(before)
    }

    /// Forget a deleted message, returning what it said.
    pub fn on_message_deleted(&self, message_id: u64) -> Option<MessageLite> {
        self.messages.invalidate(&message_id)
    }

    /// Forget a batch of deleted messages, returning the ones that were cached.
    pub fn on_bulk_delete(&self, message_ids: &[u64]) -> Vec<MessageLite> {
        message_ids
            .iter()
            .filter_map(|id| self.messages.invalidate(id))
            .collect()
    }

    /// A cached message.
    pub fn get(&self, message_id: u64) -> Option<MessageLite> {
        self.messages.get(&message_id)
    }

    /// Up to `limit` of the author's cached messages, newest first.
    pub fn recent_by_author(&self, author_id: u64, limit: usize) -> Vec<MessageLite> {
        self.messages
            .most_recent_filtered(limit, |message| message.author_id == author_id)
    }

    /// Up to `limit` cached messages from one channel, newest first.
    pub fn recent_in_channel(&self, channel_id: u64, limit: usize) -> Vec<MessageLite> {
        self.messages
            .most_recent_filtered(limit, |message| message.channel_id == channel_id)
    }

    /// Number of cached messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message is cached.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
