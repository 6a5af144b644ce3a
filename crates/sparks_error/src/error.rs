//! Top-level error wrapper types.

use crate::{CacheError, ConfigError, StoreError};

/// Every error the Sparks crates can surface to the bot.
///
/// # Examples
///
/// ```
/// use sparks_error::{SparksError, StoreError, StoreErrorKind};
///
/// let store_err = StoreError::new(StoreErrorKind::NotFound("guild 42".to_string()));
/// let err: SparksError = store_err.into();
/// assert!(format!("{}", err).contains("Store Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum SparksErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Cache error
    #[from(CacheError)]
    Cache(CacheError),
    /// Settings store error
    #[from(StoreError)]
    Store(StoreError),
}

/// Sparks error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Sparks Error: {}", _0)]
pub struct SparksError(Box<SparksErrorKind>);

impl SparksError {
    /// Create a new error from a kind.
    pub fn new(kind: SparksErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SparksErrorKind {
        &self.0
    }
}

impl<T> From<T> for SparksError
where
    T: Into<SparksErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Sparks operations.
pub type SparksResult<T> = std::result::Result<T, SparksError>;
