//! Cache error types.

/// Kinds of cache errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CacheErrorKind {
    /// A bounded cache was built with no room for entries
    #[display("Invalid capacity {}: must be greater than zero", _0)]
    InvalidCapacity(usize),
    /// A refreshing cache was built with a zero time-to-live
    #[display("Invalid time-to-live: must be greater than zero")]
    InvalidTtl,
    /// The loader reported a failure
    #[display("Loader failed: {}", _0)]
    Loader(String),
    /// The loader task panicked or was cancelled before producing a value
    #[display("Loader aborted: {}", _0)]
    LoaderAborted(String),
}

/// Cache error with location tracking.
///
/// # Examples
///
/// ```
/// use sparks_error::{CacheError, CacheErrorKind};
///
/// let err = CacheError::new(CacheErrorKind::InvalidCapacity(0));
/// assert!(format!("{}", err).contains("greater than zero"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CacheErrorKind {
        &self.kind
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
