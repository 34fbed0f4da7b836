//! Error types for airwatch-core.
//!
//! Errors from the readings source never reach a renderer. The poller turns
//! every failed fetch into a poll outcome and the engine falls back to the
//! "no data / offline" snapshot.
//!
//! | Error | Category | Notes |
//! |-------|----------|-------|
//! | [`Error::NotReachable`] | Transport | Connection refused, DNS, timeout |
//! | [`Error::Request`] | Transport | Body could not be read or decoded |
//! | [`Error::Unavailable`] | Transport | Generic source failure (mock sources) |
//! | [`Error::Api`] | Source | Non-2xx status from the endpoint |
//! | [`Error::InvalidResponse`] | Source | Body is JSON but not a list of readings |
//! | [`Error::InvalidUrl`] | Setup | Rejected before any request is made |
//! | [`Error::InvalidConfig`] | Setup | Monitor settings are inconsistent |
//! | [`Error::Cancelled`] | Control | Monitor was shut down |

use thiserror::Error;

/// Errors that can occur while monitoring a readings source.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The source could not be reached.
    #[error("Source not reachable at {url}: {source}")]
    NotReachable {
        /// The URL that was requested.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed after the connection was made.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the status text.
        message: String,
    },

    /// The response body does not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid source URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The source is unavailable for a reason not tied to HTTP.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Operation was cancelled.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Whether this error means the source could not be talked to at all.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::NotReachable { .. } | Error::Request(_) | Error::Unavailable(_)
        )
    }
}

/// Result type alias using airwatch-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
