//! Explicit ownership of one cache instance per key.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Per-key cache instances owned by a single component.
///
/// Each key gets its own instance, created on first use by the factory and
/// dropped by [`remove`](Self::remove) or [`clear`](Self::clear). Instances are
/// never shared across keys.
///
/// # Example
///
/// ```
/// use sparks_cache::{CacheRegistry, SingleFlightCache};
/// use std::sync::Arc;
///
/// let registry: CacheRegistry<u64, SingleFlightCache<Vec<u64>>> =
///     CacheRegistry::new(SingleFlightCache::new);
///
/// let first = registry.get_or_create(42);
/// let again = registry.get_or_create(42);
/// assert!(Arc::ptr_eq(&first, &again));
/// assert_eq!(registry.len(), 1);
/// ```
pub struct CacheRegistry<K, C> {
    instances: Mutex<HashMap<K, Arc<C>>>,
    factory: Box<dyn Fn() -> C + Send + Sync>,
}

impl<K, C> CacheRegistry<K, C>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty registry building new instances with `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self {
            instances: Mutex::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    /// The instance for `key`, creating it if this is the first request.
    pub fn get_or_create(&self, key: K) -> Arc<C> {
        let mut instances = self.instances.lock();
        Arc::clone(
            instances
                .entry(key)
                .or_insert_with(|| Arc::new((self.factory)())),
        )
    }

    /// The instance for `key`, if one exists.
    pub fn get(&self, key: &K) -> Option<Arc<C>> {
        self.instances.lock().get(key).cloned()
    }

    /// Drop the instance for `key`. Callers still holding it keep a working
    /// but detached copy.
    pub fn remove(&self, key: &K) -> Option<Arc<C>> {
        self.instances.lock().remove(key)
    }

    /// Keys with a live instance.
    pub fn keys(&self) -> Vec<K> {
        self.instances.lock().keys().cloned().collect()
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    /// Whether no instance exists.
    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }

    /// Drop every instance.
    pub fn clear(&self) {
        let mut instances = self.instances.lock();
        let count = instances.len();
        instances.clear();
        tracing::debug!(cleared = count, "Cleared cache registry");
    }
}

impl<K, C> fmt::Debug for CacheRegistry<K, C>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instances = self.instances.lock();
        f.debug_struct("CacheRegistry")
            .field("keys", &instances.keys().collect::<Vec<_>>())
            .finish()
    }
}
