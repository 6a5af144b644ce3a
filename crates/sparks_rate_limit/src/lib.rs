//! Sliding-window rate limiting for bot commands.
//!
//! Each command carries two caps over the same window: one per user and one
//! per guild. Limits come from [`Command`] defaults, from TOML configuration
//! ([`RateLimitConfig`]), or are set at runtime.
//!
//! ```
//! use sparks_rate_limit::{Command, SlidingWindowRateLimiter};
//!
//! let limiter = SlidingWindowRateLimiter::with_defaults();
//! assert!(!Command::Leaderboard.is_on_cooldown(&limiter, 1, 100));
//! assert!(Command::Leaderboard.is_on_cooldown(&limiter, 1, 100));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod config;
mod error;
mod limiter;

pub use command::{Command, RATE_LIMIT_REPLY};
pub use config::{CommandLimitConfig, RateLimitConfig};
pub use error::{RateLimitError, RateLimitErrorKind, RateLimitResult};
pub use limiter::{CommandRateLimit, SlidingWindowRateLimiter};
