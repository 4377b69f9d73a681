//! Error type shared by every module of the crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("index {index} out of range (maximum index {maximum:?})")]
    OutOfRange { index: usize, maximum: Option<usize> },
    #[error("series contains no samples")]
    EmptySeries,
    #[error("cannot write index {index}: next contiguous slot is {next}")]
    SequenceGap { index: usize, next: usize },
    #[error("time {time} at index {index} precedes previous time {previous}")]
    NonMonotonicTime { index: usize, time: f64, previous: f64 },
    #[error("domain error: {0}")]
    Domain(String),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ScopeError {
    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        ScopeError::Domain(msg.into())
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        ScopeError::InvariantViolation(msg.into())
    }

    /// True for errors that indicate a caller bug rather than bad data.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            ScopeError::InvariantViolation(_) | ScopeError::LengthMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScopeError>;
