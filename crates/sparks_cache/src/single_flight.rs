//! A single TTL-bounded value whose concurrent misses share one load.

use crate::{Clock, SystemClock};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use sparks_error::{CacheError, CacheErrorKind, CacheResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Freshness window used by [`SingleFlightCache::new`].
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

type Flight<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

/// Load currently running, tagged so a stale handle can't clear a newer one.
struct InFlight<T, E> {
    id: u64,
    flight: Flight<T, E>,
}

struct RefreshState<T, E> {
    value: Option<T>,
    last_updated: Option<Instant>,
    in_flight: Option<InFlight<T, E>>,
    next_flight_id: u64,
}

/// One cached value refreshed through a caller-supplied loader.
///
/// At most one loader runs per instance at any time. Callers arriving while
/// it runs wait for the same result, success or failure. A failed load keeps
/// the previous value and the next call tries again.
///
/// While a refresh is running, [`request`](Self::request) waits for it;
/// [`peek`](Self::peek) hands out whatever value is stored, however old.
///
/// Loaders run as spawned Tokio tasks, so this must be used inside a runtime.
///
/// # Example
///
/// ```
/// use sparks_cache::SingleFlightCache;
/// use sparks_error::CacheError;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), CacheError> {
/// let cache: SingleFlightCache<Vec<String>> = SingleFlightCache::new();
/// let words = cache
///     .request(|| async { Ok(vec!["spoiler".to_string()]) })
///     .await?;
/// assert_eq!(words.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct SingleFlightCache<T, E = CacheError, C = SystemClock> {
    state: Arc<Mutex<RefreshState<T, E>>>,
    ttl: Duration,
    clock: C,
}

impl<T, E> SingleFlightCache<T, E, SystemClock>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<CacheError> + 'static,
{
    /// Create a cache with the default 30 second TTL.
    pub fn new() -> Self {
        Self::build(DEFAULT_TTL, SystemClock)
    }

    /// Create a cache with a custom TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::InvalidTtl`] when `ttl` is zero.
    #[track_caller]
    pub fn with_ttl(ttl: Duration) -> CacheResult<Self> {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<T, E> Default for SingleFlightCache<T, E, SystemClock>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<CacheError> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E, C> SingleFlightCache<T, E, C>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<CacheError> + 'static,
    C: Clock + Clone,
{
    /// Create a cache reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::InvalidTtl`] when `ttl` is zero.
    #[track_caller]
    pub fn with_clock(ttl: Duration, clock: C) -> CacheResult<Self> {
        if ttl.is_zero() {
            return Err(CacheError::new(CacheErrorKind::InvalidTtl));
        }
        Ok(Self::build(ttl, clock))
    }

    fn build(ttl: Duration, clock: C) -> Self {
        tracing::debug!(ttl = ?ttl, "Creating new SingleFlightCache");
        Self {
            state: Arc::new(Mutex::new(RefreshState {
                value: None,
                last_updated: None,
                in_flight: None,
                next_flight_id: 0,
            })),
            ttl,
            clock,
        }
    }

    /// Return the cached value if fresh, otherwise load it.
    ///
    /// `loader` is only invoked when this call starts a new load; callers
    /// that join a running load drop theirs unused.
    ///
    /// # Errors
    ///
    /// Returns the loader's error to every caller that waited on that load.
    pub async fn request<F, Fut>(&self, loader: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let flight = {
            let mut state = self.state.lock();
            if let (Some(value), Some(updated)) = (&state.value, state.last_updated) {
                if self.clock.now().saturating_duration_since(updated) < self.ttl {
                    return Ok(value.clone());
                }
            }
            self.join_or_start(&mut state, loader)
        };
        flight.await
    }

    /// Reload regardless of freshness.
    ///
    /// A load already in progress is joined rather than replaced.
    ///
    /// # Errors
    ///
    /// Returns the loader's error; the previous value is kept.
    pub async fn force_update<F, Fut>(&self, loader: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let flight = {
            let mut state = self.state.lock();
            self.join_or_start(&mut state, loader)
        };
        flight.await
    }

    /// The stored value, fresh or not, without loading.
    pub fn peek(&self) -> Option<T> {
        self.state.lock().value.clone()
    }

    /// Whether a stored value exists and is younger than the TTL.
    pub fn is_fresh(&self) -> bool {
        let state = self.state.lock();
        match (&state.value, state.last_updated) {
            (Some(_), Some(updated)) => {
                self.clock.now().saturating_duration_since(updated) < self.ttl
            }
            _ => false,
        }
    }

    /// Whether a load is running right now.
    pub fn is_loading(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    /// Freshness window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn join_or_start<F, Fut>(&self, state: &mut RefreshState<T, E>, loader: F) -> Flight<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if let Some(running) = &state.in_flight {
            return running.flight.clone();
        }

        let id = state.next_flight_id;
        state.next_flight_id += 1;

        let task_state = Arc::clone(&self.state);
        let clock = self.clock.clone();
        let fut = loader();
        let handle = tokio::spawn(async move {
            let result = fut.await;
            let mut state = task_state.lock();
            if let Ok(value) = &result {
                state.value = Some(value.clone());
                state.last_updated = Some(clock.now());
            }
            if state.in_flight.as_ref().is_some_and(|f| f.id == id) {
                state.in_flight = None;
            }
            result
        });

        // A panicking loader never reaches the cleanup above, so the first
        // waiter to see the join error clears the marker instead.
        let abort_state = Arc::downgrade(&self.state);
        let flight = async move {
            match handle.await {
                Ok(result) => result,
                Err(join_err) => {
                    if let Some(state) = abort_state.upgrade() {
                        let mut state = state.lock();
                        if state.in_flight.as_ref().is_some_and(|f| f.id == id) {
                            state.in_flight = None;
                        }
                    }
                    Err(E::from(CacheError::new(CacheErrorKind::LoaderAborted(
                        join_err.to_string(),
                    ))))
                }
            }
        }
        .boxed()
        .shared();

        state.in_flight = Some(InFlight {
            id,
            flight: flight.clone(),
        });
        flight
    }
}

impl<T, E, C> std::fmt::Debug for SingleFlightCache<T, E, C>
where
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SingleFlightCache")
            .field("ttl", &self.ttl)
            .field("has_value", &state.value.is_some())
            .field("loading", &state.in_flight.is_some())
            .field("clock", &self.clock)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_zero_ttl_rejected() {
        let err = SingleFlightCache::<u32>::with_ttl(Duration::ZERO).unwrap_err();
        assert_eq!(err.kind(), &CacheErrorKind::InvalidTtl);
    }

    #[tokio::test]
    async fn test_fresh_value_skips_loader() {
        let clock = ManualClock::new();
        let cache: SingleFlightCache<u32, CacheError, ManualClock> =
            SingleFlightCache::with_clock(Duration::from_secs(30), clock.clone()).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let value = cache
                .request(move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
            clock.advance(Duration::from_secs(5));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_fresh());
    }

    #[tokio::test]
    async fn test_stale_value_reloads_once() {
        let clock = ManualClock::new();
        let cache: SingleFlightCache<u32, CacheError, ManualClock> =
            SingleFlightCache::with_clock(Duration::from_secs(30), clock.clone()).unwrap();

        cache.request(|| async { Ok(1) }).await.unwrap();
        clock.advance(Duration::from_secs(30));
        assert!(!cache.is_fresh());
        assert_eq!(cache.peek(), Some(1));

        let value = cache.request(|| async { Ok(2) }).await.unwrap();
        assert_eq!(value, 2);
        let value = cache.request(|| async { Ok(3) }).await.unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_value() {
        let clock = ManualClock::new();
        let cache: SingleFlightCache<u32, CacheError, ManualClock> =
            SingleFlightCache::with_clock(Duration::from_secs(1), clock.clone()).unwrap();

        cache.request(|| async { Ok(10) }).await.unwrap();
        clock.advance(Duration::from_secs(2));

        let err = cache
            .request(|| async { Err(CacheError::new(CacheErrorKind::Loader("down".into()))) })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), &CacheErrorKind::Loader("down".into()));
        assert_eq!(cache.peek(), Some(10));
        assert!(!cache.is_loading());
    }

    async fn exploding_loader() -> Result<u32, CacheError> {
        panic!("loader exploded")
    }

    #[tokio::test]
    async fn test_panicking_loader_reports_abort() {
        let cache: SingleFlightCache<u32> = SingleFlightCache::new();

        let err = cache.request(exploding_loader).await.unwrap_err();

        assert!(matches!(err.kind(), CacheErrorKind::LoaderAborted(_)));
        assert!(!cache.is_loading());
        assert_eq!(cache.request(|| async { Ok(4) }).await.unwrap(), 4);
    }
}
