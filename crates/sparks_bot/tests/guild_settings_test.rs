//! Word filter and spam channel caching against an in-memory store.

use async_trait::async_trait;
use sparks_bot::{FilterAction, FilterWord, SettingsStore, SpamChannels, WordFilter};
use sparks_error::{StoreError, StoreErrorKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct MemoryStore {
    words: Mutex<HashMap<u64, Vec<FilterWord>>>,
    channels: Mutex<HashMap<u64, Vec<u64>>>,
    word_loads: AtomicUsize,
    channel_loads: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryStore {
    fn with_words(guild_id: u64, words: &[&str]) -> Arc<Self> {
        let store = Self::default();
        store.words.lock().unwrap().insert(
            guild_id,
            words.iter().map(|w| FilterWord::ban(*w)).collect(),
        );
        Arc::new(store)
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::new(StoreErrorKind::Unavailable(
                "connection refused".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn filter_words(&self, guild_id: u64) -> Result<Vec<FilterWord>, StoreError> {
        self.word_loads.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self
            .words
            .lock()
            .unwrap()
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_filter_word(&self, guild_id: u64, word: FilterWord) -> Result<(), StoreError> {
        self.check_online()?;
        let mut words = self.words.lock().unwrap();
        let list = words.entry(guild_id).or_default();
        list.retain(|w| w.name != word.name);
        list.push(word);
        Ok(())
    }

    async fn delete_filter_word(&self, guild_id: u64, name: &str) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut words = self.words.lock().unwrap();
        let Some(list) = words.get_mut(&guild_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|w| w.name != name);
        Ok(list.len() != before)
    }

    async fn spam_channels(&self, guild_id: u64) -> Result<Vec<u64>, StoreError> {
        self.channel_loads.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self
            .channels
            .lock()
            .unwrap()
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }
}

const TTL: Duration = Duration::from_secs(30);

#[tokio::test]
async fn test_message_burst_loads_words_once() {
    let store = MemoryStore::with_words(1, &["spoiler"]);
    let filter = WordFilter::new(store.clone(), TTL).unwrap();

    let checks = (0..16).map(|_| filter.find_matches(1, "no SPOILERS please"));
    let results = futures::future::join_all(checks).await;

    for result in results {
        assert_eq!(result.unwrap(), vec![FilterWord::ban("spoiler")]);
    }
    assert_eq!(store.word_loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_guilds_load_independently() {
    let store = MemoryStore::with_words(1, &["alpha"]);
    store
        .words
        .lock()
        .unwrap()
        .insert(2, vec![FilterWord::ban("beta")]);
    let filter = WordFilter::new(store.clone(), TTL).unwrap();

    assert!(filter.find_matches(1, "beta").await.unwrap().is_empty());
    assert_eq!(filter.find_matches(2, "beta").await.unwrap().len(), 1);
    assert_eq!(store.word_loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_add_and_remove_refresh_immediately() {
    let store = MemoryStore::with_words(1, &[]);
    let filter = WordFilter::new(store.clone(), TTL).unwrap();
    assert!(filter.words(1).await.unwrap().is_empty());

    let word = FilterWord {
        name: "scam".to_string(),
        action: FilterAction::Kick,
    };
    let words = filter.add_word(1, word.clone()).await.unwrap();
    assert_eq!(*words, vec![word]);
    assert_eq!(filter.find_matches(1, "free SCAM link").await.unwrap().len(), 1);

    assert!(filter.remove_word(1, "scam").await.unwrap());
    assert!(!filter.remove_word(1, "scam").await.unwrap());
    assert!(filter.words(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_load_is_retried() {
    let store = MemoryStore::with_words(1, &["spoiler"]);
    store.offline.store(true, Ordering::SeqCst);
    let filter = WordFilter::new(store.clone(), TTL).unwrap();

    let err = filter.words(1).await.unwrap_err();
    assert!(matches!(err.kind(), StoreErrorKind::Unavailable(_)));

    store.offline.store(false, Ordering::SeqCst);
    assert_eq!(filter.words(1).await.unwrap().len(), 1);
    assert_eq!(store.word_loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_forget_guild_forces_reload() {
    let store = MemoryStore::with_words(1, &["spoiler"]);
    let filter = WordFilter::new(store.clone(), TTL).unwrap();

    filter.words(1).await.unwrap();
    assert!(filter.forget_guild(1));
    assert!(!filter.forget_guild(1));
    filter.words(1).await.unwrap();

    assert_eq!(store.word_loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_spam_channels_cached_until_changed() {
    let store = Arc::new(MemoryStore::default());
    store.channels.lock().unwrap().insert(5, vec![10, 11]);
    let channels = SpamChannels::new(store.clone(), TTL).unwrap();

    assert!(channels.is_monitored(5, 10).await.unwrap());
    assert!(!channels.is_monitored(5, 12).await.unwrap());

    store.channels.lock().unwrap().insert(5, vec![12]);
    assert!(!channels.is_monitored(5, 12).await.unwrap());

    assert_eq!(*channels.channels_changed(5).await.unwrap(), vec![12]);
    assert!(channels.is_monitored(5, 12).await.unwrap());
    assert_eq!(store.channel_loads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_zero_ttl_rejected() {
    let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::default());
    assert!(WordFilter::new(store.clone(), Duration::ZERO).is_err());
    assert!(SpamChannels::new(store, Duration::ZERO).is_err());
}
