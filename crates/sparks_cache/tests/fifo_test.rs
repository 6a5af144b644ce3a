//! Eviction-order tests for the bounded FIFO cache.

use sparks_cache::BoundedFifoCache;
use std::sync::Arc;

#[test]
fn test_retains_most_recent_distinct_keys() {
    for capacity in [1usize, 3, 16] {
        let cache = BoundedFifoCache::new(capacity).unwrap();
        let total = capacity * 3 + 1;
        for key in 0..total {
            cache.put(key, key);
        }

        let expected: Vec<usize> = (total - capacity..total).rev().collect();
        assert_eq!(cache.most_recent(total), expected);
        assert_eq!(cache.len(), capacity);
    }
}

#[test]
fn test_eviction_reports_oldest_entry() {
    let cache = BoundedFifoCache::new(2).unwrap();
    assert_eq!(cache.put('a', 1), None);
    assert_eq!(cache.put('b', 2), None);
    assert_eq!(cache.put('c', 3), Some(('a', 1)));
    assert_eq!(cache.put('b', 20), None);
    assert_eq!(cache.put('d', 4), Some(('c', 3)));
}

#[test]
fn test_concurrent_writers_stay_bounded() {
    let cache = Arc::new(BoundedFifoCache::new(100).unwrap());

    let handles: Vec<_> = (0..8u64)
        .map(|writer| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for i in 0..1_000u64 {
                    cache.put(writer * 10_000 + i, i);
                    if i % 7 == 0 {
                        cache.invalidate(&(writer * 10_000 + i / 2));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 100);
    assert_eq!(cache.most_recent(1_000).len(), cache.len());
}
