//! A collection whose entries remove themselves after a delay.

use crate::{Clock, SystemClock};
use derive_getters::Getters;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::Instant;

/// Identity of one insertion, distinct even between equal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// A live entry and its schedule.
#[derive(Debug, Clone, Getters)]
pub struct ExpiringEntry<T> {
    value: T,
    inserted_at: Instant,
    ttl: Duration,
}

#[derive(Debug)]
struct Entries<T> {
    /// Keyed by insertion id, so iteration runs oldest to newest
    live: BTreeMap<EntryId, ExpiringEntry<T>>,
    next_id: u64,
}

impl<T> Entries<T> {
    fn insert(&mut self, value: T, inserted_at: Instant, ttl: Duration) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.live.insert(
            id,
            ExpiringEntry {
                value,
                inserted_at,
                ttl,
            },
        );
        id
    }
}

/// Values that drop out on their own once their delay has passed.
///
/// Each insertion spawns a detached Tokio timer that removes that exact
/// entry. Removing an entry by hand first turns the timer into a no-op, and a
/// timer never touches a later insertion of an equal value. Equal values may
/// coexist with independent deadlines.
///
/// Must be used inside a Tokio runtime.
///
/// # Example
///
/// ```
/// use sparks_cache::ExpiringSet;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let cooldowns = ExpiringSet::new();
/// cooldowns.add_scheduled((42u64, 7u64), Duration::from_secs(30));
/// assert!(cooldowns.contains(&(42, 7)));
///
/// tokio::time::sleep(Duration::from_secs(31)).await;
/// assert!(!cooldowns.contains(&(42, 7)));
/// # }
/// ```
#[derive(Debug)]
pub struct ExpiringSet<T, C = SystemClock> {
    entries: Arc<Mutex<Entries<T>>>,
    clock: C,
}

impl<T> ExpiringSet<T, SystemClock>
where
    T: Clone + Send + 'static,
{
    /// Create an empty set on Tokio's clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<T> Default for ExpiringSet<T, SystemClock>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> ExpiringSet<T, C>
where
    T: Clone + Send + 'static,
    C: Clock,
{
    /// Create an empty set stamping insertions with `clock`.
    ///
    /// Removal timers always run on Tokio's timer; `clock` only feeds
    /// [`recent`](Self::recent) and the entry timestamps.
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries {
                live: BTreeMap::new(),
                next_id: 0,
            })),
            clock,
        }
    }

    /// Insert `value` and schedule its removal after `delay`.
    pub fn add_scheduled(&self, value: T, delay: Duration) -> EntryId {
        let id = self
            .entries
            .lock()
            .insert(value, self.clock.now(), delay);
        self.schedule_removal(id, delay);
        id
    }

    /// Insert `value` only if no equal value is live, as one atomic step.
    ///
    /// Returns `None` when an equal value was already present.
    pub fn add_scheduled_if_absent(&self, value: T, delay: Duration) -> Option<EntryId>
    where
        T: PartialEq,
    {
        let id = {
            let mut entries = self.entries.lock();
            if entries.live.values().any(|entry| entry.value == value) {
                return None;
            }
            entries.insert(value, self.clock.now(), delay)
        };
        self.schedule_removal(id, delay);
        Some(id)
    }

    fn schedule_removal(&self, id: EntryId, delay: Duration) {
        let entries: Weak<Mutex<Entries<T>>> = Arc::downgrade(&self.entries);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(entries) = entries.upgrade() {
                entries.lock().live.remove(&id);
            }
        });
    }

    /// Whether an equal value is live.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.any(|candidate| candidate == value)
    }

    /// Whether any live value matches `predicate`.
    pub fn any<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.entries
            .lock()
            .live
            .values()
            .any(|entry| predicate(&entry.value))
    }

    /// The oldest live value matching `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.entries
            .lock()
            .live
            .values()
            .find(|entry| predicate(&entry.value))
            .map(|entry| entry.value.clone())
    }

    /// Live values inserted within the trailing `window` that match
    /// `predicate`, oldest first.
    pub fn recent<P>(&self, window: Duration, mut predicate: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        let now = self.clock.now();
        self.entries
            .lock()
            .live
            .values()
            .filter(|entry| now.saturating_duration_since(entry.inserted_at) <= window)
            .filter(|entry| predicate(&entry.value))
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// Every live value, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries
            .lock()
            .live
            .values()
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// Every live entry with its schedule, oldest first.
    pub fn entries(&self) -> Vec<ExpiringEntry<T>> {
        self.entries.lock().live.values().cloned().collect()
    }

    /// Remove the oldest live value equal to `value`.
    pub fn remove(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.take_first(|candidate| candidate == value).is_some()
    }

    /// Remove one specific insertion. Returns false if it is already gone.
    pub fn remove_entry(&self, id: EntryId) -> bool {
        self.entries.lock().live.remove(&id).is_some()
    }

    /// Find and remove the oldest live value matching `predicate`.
    pub fn take_first<P>(&self, mut predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        let mut entries = self.entries.lock();
        let id = entries
            .live
            .iter()
            .find(|(_, entry)| predicate(&entry.value))
            .map(|(id, _)| *id)?;
        entries.live.remove(&id).map(|entry| entry.value)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.lock().live.len()
    }

    /// Whether nothing is live.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().live.is_empty()
    }
}
