//! Error types for the Sparks bot.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use sparks_error::{ConfigError, SparksResult};
//!
//! fn read_interval() -> SparksResult<u64> {
//!     Err(ConfigError::new("xp interval must be positive"))?
//! }
//!
//! assert!(read_interval().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod store;

pub use cache::{CacheError, CacheErrorKind, CacheResult};
pub use config::ConfigError;
pub use error::{SparksError, SparksErrorKind, SparksResult};
pub use store::{StoreError, StoreErrorKind};
