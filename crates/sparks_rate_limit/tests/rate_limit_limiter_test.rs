//! Sliding-window behaviour of the command rate limiter.

use sparks_cache::ManualClock;
use sparks_rate_limit::{Command, CommandRateLimit, SlidingWindowRateLimiter};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const USER: u64 = 111;
const GUILD: u64 = 999;

fn limiter_with(per_user: u32, per_guild: u32) -> (SlidingWindowRateLimiter<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let limiter = SlidingWindowRateLimiter::with_clock(clock.clone());
    limiter.set_rate_limit(
        "rank",
        CommandRateLimit::new(Duration::from_secs(60), per_user, per_guild).unwrap(),
    );
    (limiter, clock)
}

#[test]
fn test_admits_exactly_the_cap() {
    let (limiter, clock) = limiter_with(2, 100);

    assert!(!limiter.is_on_cooldown("rank", USER, GUILD));
    clock.advance(Duration::from_secs(10));
    assert!(!limiter.is_on_cooldown("rank", USER, GUILD));
    clock.advance(Duration::from_secs(10));
    assert!(limiter.is_on_cooldown("rank", USER, GUILD));

    // Both recorded requests have left the window.
    clock.advance(Duration::from_secs(61));
    assert!(!limiter.is_on_cooldown("rank", USER, GUILD));
}

#[test]
fn test_denial_is_state_neutral() {
    let (limiter, clock) = limiter_with(2, 100);

    assert!(!limiter.is_on_cooldown("rank", USER, GUILD)); // t = 0
    clock.advance(Duration::from_secs(30));
    assert!(!limiter.is_on_cooldown("rank", USER, GUILD)); // t = 30

    for _ in 0..10 {
        clock.advance(Duration::from_secs(2));
        assert!(limiter.is_on_cooldown("rank", USER, GUILD));
    }

    // t = 61: only the t = 0 request has expired, one slot opens.
    clock.advance(Duration::from_secs(11));
    assert!(!limiter.is_on_cooldown("rank", USER, GUILD));
    assert!(limiter.is_on_cooldown("rank", USER, GUILD));
}

#[test]
fn test_unknown_command_fails_open() {
    let limiter = SlidingWindowRateLimiter::new();
    for _ in 0..100 {
        assert!(!limiter.is_on_cooldown("anything", USER, GUILD));
    }
}

#[test]
fn test_leaderboard_default_limits() {
    let limiter = SlidingWindowRateLimiter::with_defaults();

    assert!(!Command::Leaderboard.is_on_cooldown(&limiter, 1, GUILD));
    assert!(Command::Leaderboard.is_on_cooldown(&limiter, 1, GUILD));
    assert!(!Command::Leaderboard.is_on_cooldown(&limiter, 2, GUILD));
    assert!(Command::Leaderboard.is_on_cooldown(&limiter, 3, GUILD));
}

#[test]
fn test_concurrent_borderline_requests_never_over_admit() {
    let clock = ManualClock::new();
    let limiter = Arc::new(SlidingWindowRateLimiter::with_clock(clock));
    limiter.set_rate_limit(
        "rank",
        CommandRateLimit::new(Duration::from_secs(60), 1_000, 5).unwrap(),
    );
    let admitted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..16u64)
        .map(|user| {
            let limiter = Arc::clone(&limiter);
            let admitted = Arc::clone(&admitted);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    if !limiter.is_on_cooldown("rank", user, GUILD) {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(admitted.load(Ordering::SeqCst), 5);
}
