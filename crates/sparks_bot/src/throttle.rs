//! Command throttling in front of the command handlers.

use sparks_error::SparksResult;
use sparks_rate_limit::{
    Command, CommandRateLimit, RATE_LIMIT_REPLY, RateLimitConfig, SlidingWindowRateLimiter,
};
use tracing::{debug, instrument};

/// Outcome of a throttle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    /// Run the command; the use has been recorded
    Allowed,
    /// Skip the command and send `reply`
    Limited {
        /// Text to send back to the user
        reply: &'static str,
    },
}

impl Throttle {
    /// Whether the command may run.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Rate limits for every throttled command.
#[derive(Debug)]
pub struct CommandThrottle {
    limiter: SlidingWindowRateLimiter,
}

impl CommandThrottle {
    /// Throttle with only the built-in command defaults.
    pub fn new() -> Self {
        Self {
            limiter: SlidingWindowRateLimiter::with_defaults(),
        }
    }

    /// Built-in defaults overridden by `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when any configured limit is invalid.
    pub fn from_config(config: &RateLimitConfig) -> SparksResult<Self> {
        let throttle = Self::new();
        config.apply_to(&throttle.limiter)?;
        debug!(configured = config.commands.len(), "Command throttle ready");
        Ok(throttle)
    }

    /// Check and record one use of `command`.
    #[instrument(skip(self))]
    pub fn check(&self, command: Command, user_id: u64, guild_id: u64) -> Throttle {
        self.check_named(command.as_ref(), user_id, guild_id)
    }

    /// Check and record one use of a command by name.
    ///
    /// Commands without a limit are always allowed.
    pub fn check_named(&self, command: &str, user_id: u64, guild_id: u64) -> Throttle {
        if self.limiter.is_on_cooldown(command, user_id, guild_id) {
            debug!(command, user_id, guild_id, "Command throttled");
            Throttle::Limited {
                reply: RATE_LIMIT_REPLY,
            }
        } else {
            Throttle::Allowed
        }
    }

    /// Limit in force for a command.
    pub fn rate_limit(&self, command: &str) -> Option<CommandRateLimit> {
        self.limiter.rate_limit(command)
    }

    /// Drop expired usage records. Returns how many were removed.
    pub fn prune(&self) -> usize {
        self.limiter.prune()
    }
}

impl Default for CommandThrottle {
    fn default() -> Self {
        Self::new()
    }
}
