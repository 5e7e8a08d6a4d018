//! Proxy configuration.
//!
//! [`ProxyConfig`] bundles the TTL with the expiry and write policies. It can be
//! built in code through [`ProxyConfig::builder`] or loaded from YAML:
//!
//! ```
//! use ttlproxy::{ExpiryMode, ProxyConfig, Ttl, WritePolicy};
//!
//! let config = ProxyConfig::from_yaml(
//!     r#"
//! ttl: 10s
//! expiry: Scheduled
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.ttl, Ttl::from_secs(10));
//! assert_eq!(config.expiry, ExpiryMode::Scheduled);
//! assert_eq!(config.write, WritePolicy::LastWriteWins);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::policy::{ExpiryMode, WritePolicy};
use crate::ttl::Ttl;

const DEFAULT_TTL: Ttl = Ttl::from_secs(10);

fn default_ttl() -> Ttl {
    DEFAULT_TTL
}

/// Configuration of a [`CachingProxy`](crate::CachingProxy), fixed for its lifetime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct ProxyConfig {
    /// How long a fetched value stays valid (e.g. "10s", "500ms", "1m").
    #[serde(default = "default_ttl")]
    pub ttl: Ttl,
    /// How expired values are removed.
    #[serde(default)]
    pub expiry: ExpiryMode,
    /// Which value wins when concurrent misses complete.
    #[serde(default)]
    pub write: WritePolicy,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            expiry: ExpiryMode::default(),
            write: WritePolicy::default(),
        }
    }
}

impl ProxyConfig {
    /// Creates a configuration with the given TTL and default policies.
    pub fn new(ttl: impl Into<Ttl>) -> Self {
        Self {
            ttl: ttl.into(),
            ..Self::default()
        }
    }

    /// Create a new builder for ProxyConfig.
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder::default()
    }

    /// Parses a configuration from a YAML document.
    ///
    /// Missing fields take their defaults. Negative or malformed TTLs are
    /// rejected with [`ConfigError::Parse`].
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

/// Builder for ProxyConfig.
#[derive(Debug, Clone, Default)]
pub struct ProxyConfigBuilder {
    config: ProxyConfig,
}

impl ProxyConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL.
    pub fn ttl(mut self, ttl: impl Into<Ttl>) -> Self {
        self.config.ttl = ttl.into();
        self
    }

    /// Set the TTL from a signed duration, rejecting negative values.
    pub fn try_ttl(self, ttl: chrono::TimeDelta) -> Result<Self, ConfigError> {
        Ok(self.ttl(Ttl::try_from(ttl)?))
    }

    /// Set the TTL in seconds.
    pub fn ttl_secs(self, secs: u64) -> Self {
        self.ttl(Duration::from_secs(secs))
    }

    /// Set the expiry mode.
    pub fn expiry(mut self, expiry: ExpiryMode) -> Self {
        self.config.expiry = expiry;
        self
    }

    /// Set the write policy.
    pub fn write_policy(mut self, write: WritePolicy) -> Self {
        self.config.write = write;
        self
    }

    /// Build the ProxyConfig.
    pub fn build(self) -> ProxyConfig {
        self.config
    }
}
