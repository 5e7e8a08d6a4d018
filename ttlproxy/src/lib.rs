#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Configuration types.
///
/// [`ProxyConfig`] holds the TTL, expiry mode and write policy, and can be
/// loaded from YAML with [`ProxyConfig::from_yaml`].
pub mod config;

/// Error types for proxy configuration.
///
/// Defines [`ConfigError`] which covers:
/// - Negative TTLs
/// - TTLs that cannot be represented as a duration
/// - Malformed configuration documents
pub mod error;

/// Background invalidation tasks for [`ExpiryMode::Scheduled`].
///
/// Provides [`ExpiryScheduler`](expiry::ExpiryScheduler), which spawns one
/// tokio task per population and tracks it by generation.
pub mod expiry;

/// Metrics collection for proxy observability.
///
/// When the `metrics` feature is enabled, this module provides counters
/// and histograms for:
/// - Cache hits and misses
/// - Provider latency and failures
/// - Invalidations and scheduled expiry tasks
pub mod metrics;

/// Expiry and write policies.
///
/// - [`ExpiryMode`]: lazy read-time expiry or scheduled background invalidation
/// - [`WritePolicy`]: which value is kept when concurrent misses complete
pub mod policy;

mod proxy;
mod slot;
mod ttl;

pub use config::{ProxyConfig, ProxyConfigBuilder};
pub use error::ConfigError;
pub use policy::{ExpiryMode, WritePolicy};
pub use proxy::{CachingProxy, CachingProxyBuilder, ProxyStats};
pub use ttl::Ttl;

pub use ttlproxy_core::{CacheStatus, DataProvider, FnProvider, Lookup, provider_fn};

/// The `ttlproxy` prelude.
///
/// ```rust
/// use ttlproxy::prelude::*;
/// ```
///
/// This imports:
/// - [`CachingProxy`]: the caching proxy
/// - [`DataProvider`] and [`provider_fn`]: the provider capability
/// - [`ProxyConfig`], [`ExpiryMode`] and [`WritePolicy`]: proxy configuration
/// - [`Ttl`]: the time-to-live type
pub mod prelude {
    pub use crate::{
        CachingProxy, DataProvider, ExpiryMode, ProxyConfig, Ttl, WritePolicy, provider_fn,
    };
}
