//! Per-user and per-guild sliding windows.

use crate::{Command, RateLimitError, RateLimitErrorKind, RateLimitResult};
use parking_lot::{Mutex, RwLock};
use sparks_cache::{Clock, SystemClock};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use strum::IntoEnumIterator;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Caps for one command: requests per user and per guild within `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandRateLimit {
    window: Duration,
    per_user: u32,
    per_guild: u32,
}

impl CommandRateLimit {
    /// Create a validated limit.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitErrorKind::InvalidLimit`] for a zero window or a
    /// zero cap, either of which would block the command forever.
    #[track_caller]
    pub fn new(window: Duration, per_user: u32, per_guild: u32) -> RateLimitResult<Self> {
        if window.is_zero() {
            return Err(RateLimitError::new(RateLimitErrorKind::InvalidLimit(
                "window must be greater than zero".to_string(),
            )));
        }
        if per_user == 0 || per_guild == 0 {
            return Err(RateLimitError::new(RateLimitErrorKind::InvalidLimit(format!(
                "caps must be greater than zero (per_user = {}, per_guild = {})",
                per_user, per_guild
            ))));
        }
        Ok(Self {
            window,
            per_user,
            per_guild,
        })
    }

    /// Build a limit from values already known to be valid.
    pub(crate) const fn from_parts(window: Duration, per_user: u32, per_guild: u32) -> Self {
        Self {
            window,
            per_user,
            per_guild,
        }
    }

    /// Length of the trailing window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Requests one user may make within the window.
    pub fn per_user(&self) -> u32 {
        self.per_user
    }

    /// Requests one guild may make within the window.
    pub fn per_guild(&self) -> u32 {
        self.per_guild
    }
}

/// Recent request times for one command.
#[derive(Debug, Default)]
struct CommandWindows {
    users: HashMap<u64, VecDeque<Instant>>,
    guilds: HashMap<u64, VecDeque<Instant>>,
}

/// Drop timestamps strictly older than `window` and return how many remain.
fn purge(stamps: &mut VecDeque<Instant>, now: Instant, window: Duration) -> usize {
    while let Some(oldest) = stamps.front() {
        if now.saturating_duration_since(*oldest) > window {
            stamps.pop_front();
        } else {
            break;
        }
    }
    stamps.len()
}

fn purged_len(
    windows: &mut HashMap<u64, VecDeque<Instant>>,
    key: u64,
    now: Instant,
    window: Duration,
) -> usize {
    windows
        .get_mut(&key)
        .map_or(0, |stamps| purge(stamps, now, window))
}

/// Sliding-window limiter with independent per-user and per-guild caps.
///
/// Commands without a configured limit are always allowed. A denied check
/// records nothing, so retrying while limited never extends the wait.
/// Purge, check and record happen under one lock, so two borderline
/// requests can't both take the last slot.
///
/// # Example
///
/// ```
/// use sparks_rate_limit::{CommandRateLimit, SlidingWindowRateLimiter};
/// use std::time::Duration;
///
/// let limiter = SlidingWindowRateLimiter::new();
/// limiter.set_rate_limit(
///     "rank",
///     CommandRateLimit::new(Duration::from_secs(60), 2, 10).unwrap(),
/// );
///
/// assert!(!limiter.is_on_cooldown("rank", 1, 99));
/// assert!(!limiter.is_on_cooldown("rank", 1, 99));
/// assert!(limiter.is_on_cooldown("rank", 1, 99));
/// assert!(!limiter.is_on_cooldown("avatar", 1, 99));
/// ```
#[derive(Debug)]
pub struct SlidingWindowRateLimiter<C = SystemClock> {
    limits: RwLock<HashMap<String, CommandRateLimit>>,
    windows: Mutex<HashMap<String, CommandWindows>>,
    clock: C,
}

impl SlidingWindowRateLimiter<SystemClock> {
    /// Create a limiter with no limits configured.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create a limiter preloaded with every [`Command`]'s default limit.
    pub fn with_defaults() -> Self {
        let limiter = Self::new();
        for command in Command::iter() {
            limiter.set_rate_limit(command.as_ref(), command.default_rate_limit());
        }
        limiter
    }
}

impl Default for SlidingWindowRateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SlidingWindowRateLimiter<C> {
    /// Create a limiter reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            limits: RwLock::new(HashMap::new()),
            windows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Configure or replace the limit for `command`.
    pub fn set_rate_limit(&self, command: impl AsRef<str>, limit: CommandRateLimit) {
        debug!(
            command = command.as_ref(),
            window_secs = limit.window.as_secs(),
            per_user = limit.per_user,
            per_guild = limit.per_guild,
            "Setting rate limit"
        );
        self.limits
            .write()
            .insert(command.as_ref().to_string(), limit);
    }

    /// Stop limiting `command` and forget its history.
    pub fn remove_rate_limit(&self, command: &str) -> Option<CommandRateLimit> {
        self.windows.lock().remove(command);
        self.limits.write().remove(command)
    }

    /// The limit configured for `command`, if any.
    pub fn rate_limit(&self, command: &str) -> Option<CommandRateLimit> {
        self.limits.read().get(command).copied()
    }

    /// Check and record one request.
    ///
    /// Returns `true` (denied, nothing recorded) when the user or the guild
    /// has already used its cap within the window; otherwise records the
    /// request against both and returns `false`.
    #[instrument(skip(self), level = "trace")]
    pub fn is_on_cooldown(&self, command: &str, user_id: u64, guild_id: u64) -> bool {
        let Some(limit) = self.rate_limit(command) else {
            return false;
        };

        let mut windows = self.windows.lock();
        // Read under the lock so every deque stays in time order.
        let now = self.clock.now();
        let command_windows = windows.entry(command.to_string()).or_default();

        let user_count = purged_len(&mut command_windows.users, user_id, now, limit.window);
        if user_count >= limit.per_user as usize {
            debug!(user_count, "User is on cooldown");
            return true;
        }
        let guild_count = purged_len(&mut command_windows.guilds, guild_id, now, limit.window);
        if guild_count >= limit.per_guild as usize {
            debug!(guild_count, "Guild is on cooldown");
            return true;
        }

        command_windows
            .users
            .entry(user_id)
            .or_default()
            .push_back(now);
        command_windows
            .guilds
            .entry(guild_id)
            .or_default()
            .push_back(now);
        false
    }

    /// Drop expired timestamps and empty windows everywhere.
    ///
    /// Returns the number of windows dropped.
    pub fn prune(&self) -> usize {
        let now = self.clock.now();
        let limits = self.limits.read();
        let mut windows = self.windows.lock();
        let mut dropped = 0;

        windows.retain(|command, command_windows| {
            let Some(limit) = limits.get(command) else {
                dropped += command_windows.users.len() + command_windows.guilds.len();
                return false;
            };
            for stamps in [&mut command_windows.users, &mut command_windows.guilds] {
                let before = stamps.len();
                stamps.retain(|_, times| purge(times, now, limit.window) > 0);
                dropped += before - stamps.len();
            }
            !(command_windows.users.is_empty() && command_windows.guilds.is_empty())
        });

        if dropped > 0 {
            debug!(dropped, "Pruned idle rate limit windows");
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparks_cache::ManualClock;

    fn limiter(per_user: u32, per_guild: u32) -> (SlidingWindowRateLimiter<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let limiter = SlidingWindowRateLimiter::with_clock(clock.clone());
        limiter.set_rate_limit(
            "cmd",
            CommandRateLimit::new(Duration::from_secs(60), per_user, per_guild).unwrap(),
        );
        (limiter, clock)
    }

    #[test]
    fn test_invalid_limits_rejected() {
        assert!(CommandRateLimit::new(Duration::ZERO, 1, 1).is_err());
        let err = CommandRateLimit::new(Duration::from_secs(1), 0, 1).unwrap_err();
        assert!(matches!(err.kind(), RateLimitErrorKind::InvalidLimit(_)));
    }

    #[test]
    fn test_timestamp_at_window_edge_still_counts() {
        let (limiter, clock) = limiter(1, 10);
        assert!(!limiter.is_on_cooldown("cmd", 1, 1));

        clock.advance(Duration::from_secs(60));
        assert!(limiter.is_on_cooldown("cmd", 1, 1));

        clock.advance(Duration::from_millis(1));
        assert!(!limiter.is_on_cooldown("cmd", 1, 1));
    }

    #[test]
    fn test_guild_cap_applies_across_users() {
        let (limiter, _clock) = limiter(5, 2);
        assert!(!limiter.is_on_cooldown("cmd", 1, 7));
        assert!(!limiter.is_on_cooldown("cmd", 2, 7));
        assert!(limiter.is_on_cooldown("cmd", 3, 7));
        assert!(!limiter.is_on_cooldown("cmd", 3, 8));
    }

    #[test]
    fn test_guild_denial_does_not_charge_user() {
        let (limiter, _clock) = limiter(2, 1);
        assert!(!limiter.is_on_cooldown("cmd", 1, 7));
        assert!(limiter.is_on_cooldown("cmd", 2, 7));

        // User 2 was denied by the guild cap, so both of its slots are free.
        assert!(!limiter.is_on_cooldown("cmd", 2, 8));
        assert!(!limiter.is_on_cooldown("cmd", 2, 9));
        assert!(limiter.is_on_cooldown("cmd", 2, 10));
    }

    #[test]
    fn test_prune_drops_idle_windows() {
        let (limiter, clock) = limiter(3, 3);
        limiter.is_on_cooldown("cmd", 1, 1);
        limiter.is_on_cooldown("cmd", 2, 1);

        assert_eq!(limiter.prune(), 0);
        clock.advance(Duration::from_secs(61));
        assert_eq!(limiter.prune(), 3);
    }

    #[test]
    fn test_remove_rate_limit_fails_open() {
        let (limiter, _clock) = limiter(1, 1);
        assert!(!limiter.is_on_cooldown("cmd", 1, 1));
        assert!(limiter.is_on_cooldown("cmd", 1, 1));

        assert!(limiter.remove_rate_limit("cmd").is_some());
        assert!(!limiter.is_on_cooldown("cmd", 1, 1));
        assert!(limiter.rate_limit("cmd").is_none());
    }
}
