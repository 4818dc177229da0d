//! Error types for the routing core
//!
//! Per-attempt adapter failures are absorbed into provider state; only the
//! terminal outcome of a routing call crosses the crate boundary.

use thiserror::Error;

/// Result type alias for routing operations
pub type Result<T> = std::result::Result<T, RouterError>;

/// Error produced by a single dispatch through an execution adapter
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// The dispatch exceeded its time budget
    #[error("request timed out")]
    Timeout,

    /// The provider rejected the request due to rate limiting
    #[error("rate limited by provider")]
    RateLimit,

    /// Transport-level failure reaching the provider
    #[error("network error: {0}")]
    Network(String),

    /// The provider returned an API-level error
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP-style status code
        status: u16,
        /// Provider-supplied message
        message: String,
    },

    /// Any other adapter failure
    #[error("{0}")]
    Other(String),
}

/// Terminal outcome errors for routing operations
#[derive(Debug, Clone, Error)]
pub enum RouterError {
    /// Bad registration input (empty id, negative cost)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Bad routing options (zero retry budget, invalid thresholds)
    #[error("invalid routing options: {0}")]
    InvalidConfiguration(String),

    /// No enabled provider matches the request's required capabilities
    #[error("no enabled provider supports this request")]
    NoProviderAvailable,

    /// The retry budget was exhausted without a successful dispatch
    #[error("all providers failed after {attempts} attempts: {source}")]
    AllProvidersFailed {
        /// Number of dispatch attempts made
        attempts: u32,
        /// The last underlying adapter error
        #[source]
        source: AdapterError,
    },

    /// The caller's deadline expired before a dispatch could complete
    #[error("routing cancelled by caller deadline")]
    Cancelled,
}
