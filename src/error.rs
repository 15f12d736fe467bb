//! Error types for the disk cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the disk cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Underlying filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be stored in the journal or as a file name
    #[error("Invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation attempted after `close()`
    #[error("Cache is closed")]
    Closed,

    /// Asynchronous open has not finished replaying the journal
    #[error("Cache is not ready yet")]
    NotReady,

    /// Editor was already finalized or superseded
    #[error("Editor for key {0} is no longer current")]
    StaleEditor(String),

    /// Value slot outside `[0, value_count)`
    #[error("Value index {index} out of range (value count {value_count})")]
    IndexOutOfRange { index: usize, value_count: usize },

    /// First publish of an entry did not write every value slot
    #[error("Newly created entry {key} didn't create value for index {index}")]
    MissingValue { key: String, index: usize },

    /// A value stream hit a write error; the edit was aborted and the entry removed
    #[error("Edit of {0} failed while writing values")]
    EditFailed(String),

    /// Journal could not be replayed
    #[error("Corrupt journal: {0}")]
    Corrupt(String),
}

impl CacheError {
    /// Shorthand for a corruption error with a formatted reason.
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        CacheError::Corrupt(reason.into())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the disk cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CacheError = io.into();
        assert!(matches!(err, CacheError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_error_messages() {
        let err = CacheError::MissingValue {
            key: "k".to_string(),
            index: 1,
        };
        assert_eq!(
            err.to_string(),
            "Newly created entry k didn't create value for index 1"
        );
        assert_eq!(CacheError::Closed.to_string(), "Cache is closed");
    }
}
