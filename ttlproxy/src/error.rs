//! Error types for proxy configuration.
//!
//! The proxy adds no runtime errors of its own: provider failures pass through
//! [`CachingProxy::get`](crate::CachingProxy::get) unchanged. Everything here is
//! raised while building a configuration, before any request is served.

use thiserror::Error;

/// Error raised when a proxy configuration is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The TTL was negative.
    #[error("ttl must not be negative, got {millis}ms")]
    NegativeTtl {
        /// The rejected TTL in milliseconds.
        millis: i64,
    },

    /// The TTL could not be represented as a duration (NaN, infinite or overflowing).
    #[error("invalid ttl: {0}")]
    InvalidTtl(String),

    /// The configuration document could not be parsed.
    #[error("failed to parse proxy configuration: {0}")]
    Parse(String),
}
