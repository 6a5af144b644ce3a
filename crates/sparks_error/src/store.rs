//! Settings store error types.

use crate::CacheError;

/// Kinds of store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StoreErrorKind {
    /// No document matched the lookup
    #[display("Document not found: {}", _0)]
    NotFound(String),
    /// The backing store could not be reached
    #[display("Store unavailable: {}", _0)]
    Unavailable(String),
    /// A document could not be decoded
    #[display("Malformed document: {}", _0)]
    Malformed(String),
    /// The cache in front of the store failed
    #[display("Cache failure: {}", _0)]
    Cache(String),
}

/// Store error with location tracking.
///
/// Cloneable so a single failed load can be handed to every caller that
/// was waiting on it.
///
/// # Examples
///
/// ```
/// use sparks_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::Unavailable("connection reset".to_string()));
/// assert!(format!("{}", err).contains("unavailable"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoreErrorKind {
        &self.kind
    }
}

impl From<CacheError> for StoreError {
    #[track_caller]
    fn from(err: CacheError) -> Self {
        Self::new(StoreErrorKind::Cache(err.kind.to_string()))
    }
}
