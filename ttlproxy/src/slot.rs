//! The single cache slot and its entries.

use std::time::Duration;

use tokio::time::Instant;

/// A value stored in the slot, tagged with the population that produced it.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    value: V,
    generation: u64,
    populated_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Whether the entry is younger than `ttl`.
    ///
    /// A zero TTL makes every entry stale.
    pub(crate) fn is_fresh(&self, ttl: Duration) -> bool {
        self.populated_at.elapsed() < ttl
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

/// Either empty, or holding the value of exactly one population.
#[derive(Debug)]
pub(crate) struct Slot<V> {
    entry: Option<CacheEntry<V>>,
    next_generation: u64,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            entry: None,
            next_generation: 1,
        }
    }
}

impl<V> Slot<V> {
    /// Returns the cached value if it is still fresh.
    pub(crate) fn fresh(&self, ttl: Duration) -> Option<&V> {
        self.entry
            .as_ref()
            .filter(|entry| entry.is_fresh(ttl))
            .map(|entry| &entry.value)
    }

    /// Stores a value, replacing any previous one, and returns its generation.
    pub(crate) fn store(&mut self, value: V) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.entry = Some(CacheEntry {
            value,
            generation,
            populated_at: Instant::now(),
        });
        generation
    }

    /// Clears the slot only if it holds the entry of `generation`.
    pub(crate) fn clear_generation(&mut self, generation: u64) -> bool {
        if self
            .entry
            .as_ref()
            .is_some_and(|entry| entry.generation == generation)
        {
            self.entry = None;
            true
        } else {
            false
        }
    }

    /// The generation handed out by the most recent [`store`](Self::store),
    /// or zero if nothing was ever stored.
    pub(crate) fn last_generation(&self) -> u64 {
        self.next_generation - 1
    }

    /// Empties the slot, returning whatever it held.
    pub(crate) fn take(&mut self) -> Option<CacheEntry<V>> {
        self.entry.take()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}
