//! Event-facing state for the Sparks community bot.
//!
//! Each component owns the cache primitive it needs and translates inbound
//! platform events into cache operations:
//! - **MessageCache**: recent messages for edit and delete logs
//! - **WordFilter** / **SpamChannels**: per-guild settings behind single-flight caches
//! - **XpCooldowns**: gates the XP award so each member earns once per interval
//! - **RecentlyLeftMembers**: departed members kept briefly for the ban log
//! - **CommandThrottle**: per-user and per-guild command limits
//!
//! [`BotState`] builds and owns all of them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod guild_settings;
mod message_cache;
mod modlog;
mod state;
mod store;
mod telemetry;
mod throttle;
mod time;
mod word_filter;
mod xp;

pub use config::{BotConfig, XpConfig};
pub use guild_settings::{GuildSettings, SpamChannels};
pub use message_cache::{MessageCache, MessageEvent, MessageLite};
pub use modlog::{LeftMember, RecentlyLeftMembers};
pub use state::BotState;
pub use store::{FilterAction, FilterWord, SettingsStore};
pub use telemetry::init_tracing;
pub use throttle::{CommandThrottle, Throttle};
pub use time::{ParsedDuration, TimeUnit, parse_duration};
pub use word_filter::WordFilter;
pub use xp::XpCooldowns;
