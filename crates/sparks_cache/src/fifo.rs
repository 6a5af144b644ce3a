//! Fixed-capacity cache with first-in, first-out eviction.

use parking_lot::Mutex;
use sparks_error::{CacheError, CacheErrorKind, CacheResult};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Map and insertion queue, always mutated together.
#[derive(Debug)]
struct FifoState<K, V> {
    capacity: usize,
    /// Key to (insertion sequence, value)
    map: HashMap<K, (u64, V)>,
    /// Insertion sequence to key; first entry is the oldest survivor
    order: BTreeMap<u64, K>,
    next_seq: u64,
}

impl<K, V> FifoState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        let (seq, value) = self.map.remove(key)?;
        self.order.remove(&seq);
        Some(value)
    }

    fn evict_oldest(&mut self) -> Option<(K, V)> {
        let (_, key) = self.order.pop_first()?;
        let (_, value) = self.map.remove(&key)?;
        Some((key, value))
    }
}

/// A bounded key/value cache that evicts whatever was written longest ago.
///
/// Writing an existing key moves it to the back of the queue; reads never
/// change the order. One mutex covers both the map and the queue, so no
/// reader can see them disagree.
///
/// # Example
///
/// ```
/// use sparks_cache::BoundedFifoCache;
///
/// let cache = BoundedFifoCache::new(2).unwrap();
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.put("c", 3);
///
/// assert_eq!(cache.get(&"a"), None);
/// assert_eq!(cache.most_recent(2), vec![3, 2]);
/// ```
#[derive(Debug)]
pub struct BoundedFifoCache<K, V> {
    state: Mutex<FifoState<K, V>>,
}

impl<K, V> BoundedFifoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::InvalidCapacity`] when `capacity` is zero.
    #[track_caller]
    pub fn new(capacity: usize) -> CacheResult<Self> {
        if capacity == 0 {
            return Err(CacheError::new(CacheErrorKind::InvalidCapacity(capacity)));
        }
        tracing::debug!(capacity, "Creating new BoundedFifoCache");
        Ok(Self {
            state: Mutex::new(FifoState {
                capacity,
                map: HashMap::with_capacity(capacity.min(1024)),
                order: BTreeMap::new(),
                next_seq: 0,
            }),
        })
    }

    /// Insert or replace `key`, making it the most recent entry.
    ///
    /// Returns the entry evicted to make room, if any.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        let mut state = self.state.lock();
        state.remove(&key);

        let seq = state.next_seq;
        state.next_seq += 1;
        state.order.insert(seq, key.clone());
        state.map.insert(key, (seq, value));

        if state.map.len() > state.capacity {
            state.evict_oldest()
        } else {
            None
        }
    }

    /// Look up `key` without touching its position.
    pub fn get(&self, key: &K) -> Option<V> {
        self.state.lock().map.get(key).map(|(_, value)| value.clone())
    }

    /// Whether `key` is currently cached.
    pub fn contains(&self, key: &K) -> bool {
        self.state.lock().map.contains_key(key)
    }

    /// Drop `key` if present, returning its value.
    pub fn invalidate(&self, key: &K) -> Option<V> {
        self.state.lock().remove(key)
    }

    /// Up to `n` values, newest first.
    pub fn most_recent(&self, n: usize) -> Vec<V> {
        self.most_recent_filtered(n, |_| true)
    }

    /// Up to `n` values matching `predicate`, newest first.
    ///
    /// The walk happens under the lock, so the result is a snapshot of the
    /// cache at call time.
    pub fn most_recent_filtered<P>(&self, n: usize, mut predicate: P) -> Vec<V>
    where
        P: FnMut(&V) -> bool,
    {
        let state = self.state.lock();
        state
            .order
            .values()
            .rev()
            .filter_map(|key| state.map.get(key).map(|(_, value)| value))
            .filter(|value| predicate(value))
            .take(n)
            .cloned()
            .collect()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.state.lock().map.len()
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.state.lock().map.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let count = state.map.len();
        state.map.clear();
        state.order.clear();
        tracing::debug!(cleared = count, "Cleared BoundedFifoCache");
    }
}
