//! Error types for standoff operations.

use thiserror::Error;

/// Errors that can occur while converting, reconstructing, or storing JDOMs.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTML parsing error: {0}")]
    Parse(String),

    #[error("{what} offset {offset} is outside the source (length {len})")]
    OffsetOutOfBounds {
        what: &'static str,
        offset: usize,
        len: usize,
    },

    #[error("{what} range {start}..{end} is invalid: {reason}")]
    InvalidSpan {
        what: &'static str,
        start: usize,
        end: usize,
        reason: &'static str,
    },

    #[error("reading order index {found} at position {position}, expected {position}")]
    ReadingOrder { position: usize, found: usize },

    #[error("store error: {0}")]
    Store(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
