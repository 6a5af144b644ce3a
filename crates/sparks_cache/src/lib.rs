//! In-process caching and time-bounded state for the Sparks bot.
//!
//! Four independent primitives, each owned by exactly one consumer:
//!
//! - [`BoundedFifoCache`] - fixed capacity, evicts the oldest insertion
//! - [`SingleFlightCache`] - one TTL-bounded value, concurrent misses share one load
//! - [`ExpiringSet`] - entries remove themselves after a delay
//! - [`CacheRegistry`] - explicit per-key ownership of any of the above
//!
//! Time is read through the [`Clock`] trait so tests can drive it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod expiring;
mod fifo;
mod registry;
mod single_flight;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, CacheConfigBuilder};
pub use expiring::{EntryId, ExpiringEntry, ExpiringSet};
pub use fifo::BoundedFifoCache;
pub use registry::CacheRegistry;
pub use single_flight::{DEFAULT_TTL, SingleFlightCache};
