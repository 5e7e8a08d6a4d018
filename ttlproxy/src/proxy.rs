//! The caching proxy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::{Instrument, Span, debug, debug_span, trace, warn};
use ttlproxy_core::{CacheStatus, DataProvider, Lookup};

use crate::config::ProxyConfig;
use crate::expiry::ExpiryScheduler;
use crate::metrics;
use crate::policy::{ExpiryMode, WritePolicy};
use crate::slot::{CacheEntry, Slot};
use crate::ttl::Ttl;

/// Snapshot of the proxy's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProxyStats {
    /// Requests served from the slot.
    pub hits: u64,
    /// Requests that called the provider.
    pub misses: u64,
    /// Provider calls that returned an error.
    pub provider_errors: u64,
    /// Values removed from the slot by expiry tasks or [`CachingProxy::invalidate`].
    pub invalidations: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    provider_errors: AtomicU64,
    invalidations: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ProxyStats {
        ProxyStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            provider_errors: self.provider_errors.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

/// State reachable from expiry tasks.
///
/// Tasks only hold a [`Weak`] reference, so dropping the proxy turns any
/// outstanding invalidation into a no-op.
#[derive(Debug)]
struct Shared<V> {
    slot: RwLock<Slot<V>>,
    counters: Counters,
}

impl<V: Clone> Shared<V> {
    fn read_fresh(&self, ttl: Duration) -> Option<V> {
        self.slot.read().fresh(ttl).cloned()
    }

    fn expire(&self, generation: u64) {
        let cleared = self.slot.write().clear_generation(generation);
        if cleared {
            self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
            metrics::record_invalidation("expired");
            debug!(generation, "cached value expired");
        } else {
            trace!(generation, "slot no longer holds this generation");
        }
    }
}

/// Single-entry TTL cache in front of a [`DataProvider`].
///
/// The proxy is itself a [`DataProvider`] with the same value and error types,
/// so it can replace the provider wherever the capability is expected.
///
/// The slot lock is only held for the O(1) read or write of the slot, never
/// while the provider is being awaited. Concurrent misses therefore each call
/// the provider; the configured [`WritePolicy`] decides which result is kept.
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
/// use std::time::Duration;
/// use ttlproxy::{CachingProxy, DataProvider, provider_fn};
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let origin = provider_fn(|| async { Ok::<_, Infallible>("data from database".to_owned()) });
/// let proxy = CachingProxy::new(origin, Duration::from_secs(10));
///
/// let first = proxy.get_with_status().await.unwrap();
/// let second = proxy.get_with_status().await.unwrap();
///
/// assert!(!first.status().is_hit());
/// assert!(second.status().is_hit());
/// assert_eq!(second.value(), "data from database");
/// # }
/// ```
pub struct CachingProxy<P>
where
    P: DataProvider,
{
    provider: P,
    config: ProxyConfig,
    shared: Arc<Shared<P::Value>>,
    scheduler: ExpiryScheduler,
}

impl<P> CachingProxy<P>
where
    P: DataProvider,
{
    /// Wraps `provider` with the given TTL and default policies.
    ///
    /// A zero TTL is valid: every request then reaches the provider.
    pub fn new(provider: P, ttl: impl Into<Ttl>) -> Self {
        Self::with_config(provider, ProxyConfig::new(ttl))
    }

    /// Wraps `provider` with a full configuration.
    pub fn with_config(provider: P, config: ProxyConfig) -> Self {
        Self {
            provider,
            config,
            shared: Arc::new(Shared {
                slot: RwLock::new(Slot::default()),
                counters: Counters::default(),
            }),
            scheduler: ExpiryScheduler::new(),
        }
    }

    /// Creates a builder for a proxy around `provider`.
    pub fn builder(provider: P) -> CachingProxyBuilder<P> {
        CachingProxyBuilder {
            provider,
            config: ProxyConfig::default(),
        }
    }

    /// Returns the cached value, or fetches, stores and returns a fresh one.
    ///
    /// Provider errors are returned unchanged and leave the slot untouched.
    pub async fn get(&self) -> Result<P::Value, P::Error> {
        self.get_with_status().await.map(Lookup::into_inner)
    }

    /// Like [`get`](Self::get), also reporting whether the slot served the request.
    pub async fn get_with_status(&self) -> Result<Lookup<P::Value>, P::Error> {
        let span = debug_span!(
            "ttlproxy.get",
            cache.status = tracing::field::Empty,
            cache.ttl_ms = self.ttl().as_duration().as_millis() as u64,
        );
        self.lookup().instrument(span).await
    }

    async fn lookup(&self) -> Result<Lookup<P::Value>, P::Error> {
        let ttl = self.ttl().as_duration();

        if let Some(value) = self.shared.read_fresh(ttl) {
            Span::current().record("cache.status", CacheStatus::Hit.as_str());
            self.shared.counters.hits.fetch_add(1, Ordering::Relaxed);
            metrics::record_hit();
            debug!("cache hit");
            return Ok(Lookup::hit(value));
        }

        Span::current().record("cache.status", CacheStatus::Miss.as_str());
        self.shared.counters.misses.fetch_add(1, Ordering::Relaxed);
        metrics::record_miss();
        debug!("cache miss, calling provider");

        let started = Instant::now();
        let fetched = self.provider.get().await;
        let elapsed = started.elapsed();

        match fetched {
            Ok(value) => {
                metrics::record_provider_call(elapsed, true);
                Ok(Lookup::miss(self.store(value)))
            }
            Err(err) => {
                metrics::record_provider_call(elapsed, false);
                self.shared
                    .counters
                    .provider_errors
                    .fetch_add(1, Ordering::Relaxed);
                warn!(elapsed_ms = elapsed.as_millis() as u64, "provider call failed");
                Err(err)
            }
        }
    }

    /// Stores a fetched value according to the write policy and returns the
    /// value the caller should see.
    fn store(&self, value: P::Value) -> P::Value {
        let ttl = self.ttl().as_duration();

        let generation = {
            let mut slot = self.shared.slot.write();
            if self.config.write == WritePolicy::FirstWriteWins
                && let Some(current) = slot.fresh(ttl)
            {
                debug!("fresh value already cached, discarding fetched value");
                return current.clone();
            }
            slot.store(value.clone())
        };
        debug!(generation, "value cached");

        if self.config.expiry == ExpiryMode::Scheduled {
            self.schedule_expiry(generation, ttl);
        }
        value
    }

    fn schedule_expiry(&self, generation: u64, ttl: Duration) {
        let shared: Weak<Shared<P::Value>> = Arc::downgrade(&self.shared);
        self.scheduler.schedule(generation, ttl, move || {
            if let Some(shared) = shared.upgrade() {
                shared.expire(generation);
            }
        });
    }

    /// Empties the slot now and cancels the expiry tasks of the removed and
    /// older populations.
    ///
    /// Returns `true` if a fresh value was removed. Calling it on an empty
    /// slot changes nothing.
    pub fn invalidate(&self) -> bool {
        let (removed, through) = self.take_entry();
        self.finish_invalidate(removed, through)
    }

    /// Empties the slot, returning the removed entry and the newest generation
    /// issued so far. Stores that happen afterwards get a higher generation.
    fn take_entry(&self) -> (Option<CacheEntry<P::Value>>, u64) {
        let mut slot = self.shared.slot.write();
        (slot.take(), slot.last_generation())
    }

    fn finish_invalidate(&self, removed: Option<CacheEntry<P::Value>>, through: u64) -> bool {
        // Timers of populations stored after the take belong to live values.
        self.scheduler.cancel_through(through);

        match removed {
            Some(entry) if entry.is_fresh(self.ttl().as_duration()) => {
                self.shared
                    .counters
                    .invalidations
                    .fetch_add(1, Ordering::Relaxed);
                metrics::record_invalidation("manual");
                debug!(generation = entry.generation(), "cached value invalidated");
                true
            }
            _ => false,
        }
    }

    /// Whether a fresh value is cached right now.
    pub fn is_cached(&self) -> bool {
        self.shared
            .slot
            .read()
            .fresh(self.ttl().as_duration())
            .is_some()
    }

    /// Returns the configured TTL.
    #[inline]
    pub fn ttl(&self) -> Ttl {
        self.config.ttl
    }

    /// Returns the proxy configuration.
    #[inline]
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Returns a reference to the wrapped provider.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns a snapshot of the hit, miss, error and invalidation counters.
    pub fn stats(&self) -> ProxyStats {
        self.shared.counters.snapshot()
    }

    /// Number of scheduled expiry tasks that have not fired yet.
    ///
    /// Always zero in [`ExpiryMode::Lazy`].
    pub fn pending_expirations(&self) -> usize {
        self.scheduler.pending()
    }

    /// Returns the scheduler running this proxy's expiry tasks.
    pub fn scheduler(&self) -> &ExpiryScheduler {
        &self.scheduler
    }
}

impl<P> std::fmt::Debug for CachingProxy<P>
where
    P: DataProvider,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingProxy")
            .field("provider", &"...")
            .field("config", &self.config)
            .field("cached", &self.is_cached())
            .field("stats", &self.stats())
            .finish()
    }
}

#[async_trait]
impl<P> DataProvider for CachingProxy<P>
where
    P: DataProvider,
{
    type Value = P::Value;
    type Error = P::Error;

    async fn get(&self) -> Result<Self::Value, Self::Error> {
        CachingProxy::get(self).await
    }
}

/// Builder for [`CachingProxy`].
///
/// Use [`CachingProxy::builder`] to create a new builder.
pub struct CachingProxyBuilder<P> {
    provider: P,
    config: ProxyConfig,
}

impl<P> CachingProxyBuilder<P>
where
    P: DataProvider,
{
    /// Sets the TTL.
    pub fn ttl(mut self, ttl: impl Into<Ttl>) -> Self {
        self.config.ttl = ttl.into();
        self
    }

    /// Sets the expiry mode.
    pub fn expiry(mut self, expiry: ExpiryMode) -> Self {
        self.config.expiry = expiry;
        self
    }

    /// Sets the write policy.
    pub fn write_policy(mut self, write: WritePolicy) -> Self {
        self.config.write = write;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(self, config: ProxyConfig) -> Self {
        Self { config, ..self }
    }

    /// Builds the [`CachingProxy`].
    pub fn build(self) -> CachingProxy<P> {
        CachingProxy::with_config(self.provider, self.config)
    }
}
