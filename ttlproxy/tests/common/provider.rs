//! Test data providers with observable call counts.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ttlproxy::DataProvider;

/// Provider that sleeps, then returns a value numbered by call.
///
/// The call counter is shared across clones, so tests can keep a handle
/// after moving the provider into a proxy.
#[derive(Clone, Debug)]
pub struct CountingProvider {
    value: &'static str,
    delay: Duration,
    numbered: bool,
    calls: Arc<AtomicUsize>,
}

impl CountingProvider {
    /// Returns `value` unchanged on every call after `delay`.
    pub fn new(value: &'static str, delay: Duration) -> Self {
        Self {
            value,
            delay,
            numbered: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns `"{value}-{n}"` where `n` is the 1-based call number.
    pub fn numbered(value: &'static str, delay: Duration) -> Self {
        Self {
            numbered: true,
            ..Self::new(value, delay)
        }
    }

    /// The repository from the classic demo: two seconds per lookup.
    pub fn database() -> Self {
        Self::new("data from database", Duration::from_secs(2))
    }

    /// Number of times `get` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataProvider for CountingProvider {
    type Value = String;
    type Error = ProviderError;

    async fn get(&self) -> Result<Self::Value, Self::Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.numbered {
            Ok(format!("{}-{}", self.value, call))
        } else {
            Ok(self.value.to_owned())
        }
    }
}

/// Error returned by [`FlakyProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub call: usize,
}

/// Provider that fails its first `failures` calls, then succeeds.
#[derive(Clone, Debug)]
pub struct FlakyProvider {
    failures: usize,
    calls: Arc<AtomicUsize>,
}

impl FlakyProvider {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Provider that never succeeds.
    pub fn always_failing() -> Self {
        Self::new(usize::MAX)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataProvider for FlakyProvider {
    type Value = String;
    type Error = ProviderError;

    async fn get(&self) -> Result<Self::Value, Self::Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            Err(ProviderError { call })
        } else {
            Ok(format!("recovered-{call}"))
        }
    }
}

/// Provider whose n-th call sleeps for `delays[n - 1]` and returns `"{value}-{n}"`.
///
/// Calls beyond the list reuse its last delay.
#[derive(Clone, Debug)]
pub struct StaggeredProvider {
    value: &'static str,
    delays: Arc<Vec<Duration>>,
    calls: Arc<AtomicUsize>,
}

impl StaggeredProvider {
    pub fn new(value: &'static str, delays: Vec<Duration>) -> Self {
        Self {
            value,
            delays: Arc::new(delays),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataProvider for StaggeredProvider {
    type Value = String;
    type Error = ProviderError;

    async fn get(&self) -> Result<Self::Value, Self::Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self
            .delays
            .get(call - 1)
            .or(self.delays.last())
            .copied()
            .unwrap_or_default();
        tokio::time::sleep(delay).await;
        Ok(format!("{}-{}", self.value, call))
    }
}
