//! Tests for rate limit configuration loading.

use sparks_rate_limit::{CommandLimitConfig, RateLimitConfig, SlidingWindowRateLimiter};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_load_bundled_defaults() {
    let config = RateLimitConfig::load().unwrap();

    let leaderboard = &config.commands["leaderboard"];
    assert_eq!(leaderboard.window_secs, 300);
    assert_eq!(leaderboard.per_user, 1);
    assert_eq!(leaderboard.per_guild, 2);
}

#[test]
fn test_from_file_reads_custom_commands() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[commands.avatar]\nwindow_secs = 10\nper_user = 3\nper_guild = 20"
    )
    .unwrap();

    let config = RateLimitConfig::from_file(file.path()).unwrap();
    let limiter = SlidingWindowRateLimiter::new();
    config.apply_to(&limiter).unwrap();

    let limit = limiter.rate_limit("avatar").unwrap();
    assert_eq!(limit.window(), Duration::from_secs(10));
    assert_eq!(limit.per_user(), 3);
    assert_eq!(limit.per_guild(), 20);
}

#[test]
fn test_invalid_entry_installs_nothing() {
    let mut config = RateLimitConfig::default();
    config.commands.insert(
        "good".to_string(),
        CommandLimitConfig {
            window_secs: 60,
            per_user: 1,
            per_guild: 1,
        },
    );
    config.commands.insert(
        "bad".to_string(),
        CommandLimitConfig {
            window_secs: 0,
            per_user: 1,
            per_guild: 1,
        },
    );

    let limiter = SlidingWindowRateLimiter::new();
    let err = config.apply_to(&limiter).unwrap_err();

    assert!(err.to_string().contains("[commands.bad]"));
    assert!(limiter.rate_limit("good").is_none());
}

#[test]
fn test_missing_file_is_config_error() {
    let err = RateLimitConfig::from_file("/nonexistent/sparks.toml").unwrap_err();
    assert!(err.to_string().contains("Configuration Error"));
}
