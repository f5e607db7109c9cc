//! Error handling for bidi resolution
//!
//! The algorithm itself is total over any input; these errors only report
//! contract violations by the caller (bad directions, indices, ranges or
//! configuration).

/// BiDi resolution error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BidiError {
    #[error("Invalid text direction: {0}")]
    InvalidDirection(String),

    #[error("Index {index} out of range for text of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid line range: start {start}, end {end}, length {len}")]
    InvalidLineRange { start: usize, end: usize, len: usize },

    #[error("Invalid embedding level: {0}")]
    InvalidLevel(u8),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for BidiError {
    fn from(err: serde_json::Error) -> Self {
        BidiError::Config(err.to_string())
    }
}

pub type BidiResult<T> = Result<T, BidiError>;
