//! Metrics declaration and recording helpers.
//!
//! With the `metrics` feature enabled these helpers report through the
//! [`metrics`](https://docs.rs/metrics) facade; without it they are no-ops
//! and will be eliminated by the compiler.
//!
//! ## Metrics
//!
//! - `ttlproxy_cache_hit_total` - requests served from the slot (counter)
//! - `ttlproxy_cache_miss_total` - requests that called the provider (counter)
//! - `ttlproxy_provider_errors_total` - failed provider calls (counter)
//! - `ttlproxy_provider_duration_seconds` - provider call latency (histogram)
//! - `ttlproxy_invalidations_total` - values removed from the slot (counter)
//! - `ttlproxy_expiry_tasks_scheduled_total` - background expiry tasks spawned (counter)

use std::time::Duration;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of cache hit events.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "ttlproxy_cache_hit_total",
            "Total number of cache hit events."
        );
        "ttlproxy_cache_hit_total"
    };
    /// Track number of cache miss events.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "ttlproxy_cache_miss_total",
            "Total number of cache miss events."
        );
        "ttlproxy_cache_miss_total"
    };
    /// Track number of failed provider calls.
    pub static ref PROVIDER_ERRORS: &'static str = {
        metrics::describe_counter!(
            "ttlproxy_provider_errors_total",
            "Total number of failed provider calls."
        );
        "ttlproxy_provider_errors_total"
    };
    /// Histogram of provider call duration.
    pub static ref PROVIDER_DURATION: &'static str = {
        metrics::describe_histogram!(
            "ttlproxy_provider_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of provider calls in seconds."
        );
        "ttlproxy_provider_duration_seconds"
    };
    /// Track number of values removed from the slot.
    pub static ref INVALIDATIONS: &'static str = {
        metrics::describe_counter!(
            "ttlproxy_invalidations_total",
            "Total number of cached values removed by expiry or manual invalidation."
        );
        "ttlproxy_invalidations_total"
    };
    /// Track number of expiry tasks spawned.
    pub static ref EXPIRY_TASKS_SCHEDULED: &'static str = {
        metrics::describe_counter!(
            "ttlproxy_expiry_tasks_scheduled_total",
            "Total number of background expiry tasks spawned."
        );
        "ttlproxy_expiry_tasks_scheduled_total"
    };
}

/// Record a request served from the slot.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_hit() {
    metrics::counter!(*CACHE_HIT_COUNTER).increment(1);
}

/// Record a request that had to call the provider.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_miss() {
    metrics::counter!(*CACHE_MISS_COUNTER).increment(1);
}

/// Record a completed provider call.
///
/// # Arguments
/// * `duration` - Time spent waiting for the provider
/// * `success` - Whether the provider returned a value
#[cfg(feature = "metrics")]
#[inline]
pub fn record_provider_call(duration: Duration, success: bool) {
    let outcome = if success { "ok" } else { "error" };
    metrics::histogram!(*PROVIDER_DURATION, "outcome" => outcome).record(duration.as_secs_f64());
    if !success {
        metrics::counter!(*PROVIDER_ERRORS).increment(1);
    }
}

/// Record a value removed from the slot.
///
/// `reason` is either `"expired"` or `"manual"`.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_invalidation(reason: &'static str) {
    metrics::counter!(*INVALIDATIONS, "reason" => reason).increment(1);
}

/// Record a spawned expiry task.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_expiry_scheduled() {
    metrics::counter!(*EXPIRY_TASKS_SCHEDULED).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_hit() {}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_miss() {}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_provider_call(_duration: Duration, _success: bool) {}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_invalidation(_reason: &'static str) {}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_expiry_scheduled() {}
