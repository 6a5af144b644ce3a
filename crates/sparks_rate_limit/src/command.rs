//! Commands with built-in throttling.

use crate::{
    CommandRateLimit, RateLimitError, RateLimitErrorKind, RateLimitResult,
    SlidingWindowRateLimiter,
};
use sparks_cache::Clock;
use std::str::FromStr;
use std::time::Duration;

/// Reply sent to a user whose command was throttled.
pub const RATE_LIMIT_REPLY: &str = "Please wait a bit before trying again.";

/// Commands that ship with a default rate limit.
///
/// The snake_case name is the key used in configuration and in the limiter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    /// Guild XP leaderboard: renders a large embed, so kept rare
    Leaderboard,
}

impl Command {
    /// Limit applied when configuration does not override it.
    pub fn default_rate_limit(self) -> CommandRateLimit {
        match self {
            Command::Leaderboard => CommandRateLimit::from_parts(Duration::from_secs(5 * 60), 1, 2),
        }
    }

    /// Parse a configured or invoked command name.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitErrorKind::UnknownCommand`] for unrecognised names.
    #[track_caller]
    pub fn parse(name: &str) -> RateLimitResult<Self> {
        Self::from_str(name).map_err(|_| {
            RateLimitError::new(RateLimitErrorKind::UnknownCommand(name.to_string()))
        })
    }

    /// Check and record one use of this command.
    pub fn is_on_cooldown<C: Clock>(
        self,
        limiter: &SlidingWindowRateLimiter<C>,
        user_id: u64,
        guild_id: u64,
    ) -> bool {
        limiter.is_on_cooldown(self.as_ref(), user_id, guild_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        assert_eq!(Command::Leaderboard.as_ref(), "leaderboard");
        assert_eq!(Command::parse("leaderboard").unwrap(), Command::Leaderboard);
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = Command::parse("akinator").unwrap_err();
        assert_eq!(
            err.kind(),
            &RateLimitErrorKind::UnknownCommand("akinator".to_string())
        );
    }

    #[test]
    fn test_leaderboard_defaults() {
        let limit = Command::Leaderboard.default_rate_limit();
        assert_eq!(limit.window(), Duration::from_secs(300));
        assert_eq!(limit.per_user(), 1);
        assert_eq!(limit.per_guild(), 2);
    }
}
