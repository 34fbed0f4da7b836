//! Error types for data parsing in airwatch-types.

use thiserror::Error;

/// Errors that can occur when parsing readings received from a source.
///
/// This error type is transport-agnostic and does not include
/// HTTP-specific errors (those belong in airwatch-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The timestamp string is not ISO-8601.
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp {
        /// The raw timestamp string.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// The record does not have the expected shape.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Result type alias using airwatch-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
