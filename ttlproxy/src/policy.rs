use serde::{Deserialize, Serialize};

/// How expired values leave the cache slot.
///
/// Validity is always checked against the population time on read, so a value
/// older than the TTL is never served in either mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
pub enum ExpiryMode {
    /// Expired values are detected on read and replaced by the next miss.
    #[default]
    Lazy,
    /// A background task clears the slot once the TTL elapses.
    ///
    /// Each task is tagged with the generation of the entry it was scheduled
    /// for and leaves newer entries untouched.
    Scheduled,
}

/// What happens when a provider fetch completes while a fresh value is cached.
///
/// Concurrent misses each call the provider; this decides which result stays.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
pub enum WritePolicy {
    /// Every completed fetch overwrites the slot and restarts the TTL.
    #[default]
    LastWriteWins,
    /// A completed fetch is discarded if the slot already holds a fresh value;
    /// the caller receives the cached value instead.
    FirstWriteWins,
}
