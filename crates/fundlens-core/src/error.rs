//! Error type for pipeline operations.
//!
//! This module defines [`PipelineError`] which covers every failure mode of
//! the fetch/derive/persist pipeline: network access, response parsing,
//! caching, persistence, and model training.

use thiserror::Error;

/// Errors that can occur while fetching, deriving, or persisting data.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded at a data source.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The source that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested ticker is unknown to the source.
    #[error("Ticker not found: {0}")]
    TickerNotFound(String),

    /// The source knows the ticker but has no data for the request.
    #[error("Data not available for {symbol}: {detail}")]
    DataNotAvailable {
        /// The symbol that was requested.
        symbol: String,
        /// What was missing.
        detail: String,
    },

    /// Error parsing a source response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with a cache backend.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Error writing to the per-ticker store.
    #[error("Store error: {0}")]
    Store(String),

    /// Error building or training the direction model.
    #[error("Model error: {0}")]
    Model(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The requested operation is not supported.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`PipelineError`].
pub type Result<T> = std::result::Result<T, PipelineError>;
