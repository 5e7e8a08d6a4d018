//! Time-to-live for the cached value.

use std::fmt;
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How long a fetched value stays valid after it was stored.
///
/// A `Ttl` is never negative: it can only be built from a [`Duration`] or
/// through the checked conversions below, which reject negative input with
/// [`ConfigError::NegativeTtl`]. A zero TTL is allowed and means every request
/// goes to the provider.
///
/// Serialized in human-readable form (`"10s"`, `"500ms"`, `"1m"`).
///
/// ```
/// use std::time::Duration;
/// use ttlproxy::{ConfigError, Ttl};
///
/// let ttl = Ttl::from_secs(10);
/// assert_eq!(ttl.as_duration(), Duration::from_secs(10));
///
/// let negative = Ttl::try_from(chrono::TimeDelta::seconds(-1));
/// assert_eq!(negative, Err(ConfigError::NegativeTtl { millis: -1000 }));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ttl(#[serde(with = "humantime_serde")] Duration);

impl Ttl {
    /// A TTL of zero: values expire as soon as they are stored.
    pub const ZERO: Ttl = Ttl(Duration::ZERO);

    /// Creates a TTL from whole seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Ttl(Duration::from_secs(secs))
    }

    /// Creates a TTL from milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Ttl(Duration::from_millis(millis))
    }

    /// Creates a TTL from fractional seconds, rejecting negative and non-finite input.
    pub fn try_from_secs_f64(secs: f64) -> Result<Self, ConfigError> {
        if !secs.is_finite() {
            return Err(ConfigError::InvalidTtl(format!("{secs} is not a finite number")));
        }
        if secs < 0.0 {
            return Err(ConfigError::NegativeTtl {
                millis: (secs * 1000.0) as i64,
            });
        }
        Duration::try_from_secs_f64(secs)
            .map(Ttl)
            .map_err(|err| ConfigError::InvalidTtl(err.to_string()))
    }

    /// Returns the TTL as a [`Duration`].
    #[inline]
    pub const fn as_duration(&self) -> Duration {
        self.0
    }

    /// Returns `true` if values expire immediately.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        Ttl(duration)
    }
}

impl From<Ttl> for Duration {
    fn from(ttl: Ttl) -> Self {
        ttl.0
    }
}

impl TryFrom<TimeDelta> for Ttl {
    type Error = ConfigError;

    fn try_from(delta: TimeDelta) -> Result<Self, Self::Error> {
        if delta < TimeDelta::zero() {
            return Err(ConfigError::NegativeTtl {
                millis: delta.num_milliseconds(),
            });
        }
        delta
            .to_std()
            .map(Ttl)
            .map_err(|err| ConfigError::InvalidTtl(err.to_string()))
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
