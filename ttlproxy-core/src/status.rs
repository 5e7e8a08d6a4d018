//! Cache status types for tracking how a request was served.

/// Whether the request was served from the cache slot or from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStatus {
    /// Cache hit - a valid cached value was found and returned.
    Hit,
    /// Cache miss - the provider was called.
    #[default]
    Miss,
}

impl CacheStatus {
    /// Returns the status as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
        }
    }

    /// Returns `true` for [`CacheStatus::Hit`].
    #[inline]
    pub const fn is_hit(&self) -> bool {
        matches!(self, CacheStatus::Hit)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value together with the way it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup<V> {
    value: V,
    status: CacheStatus,
}

impl<V> Lookup<V> {
    /// Creates a lookup result for a value served from the cache.
    pub fn hit(value: V) -> Self {
        Self {
            value,
            status: CacheStatus::Hit,
        }
    }

    /// Creates a lookup result for a value fetched from the provider.
    pub fn miss(value: V) -> Self {
        Self {
            value,
            status: CacheStatus::Miss,
        }
    }

    /// Returns a reference to the value.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns how the value was obtained.
    #[inline]
    pub fn status(&self) -> CacheStatus {
        self.status
    }

    /// Extracts the value.
    pub fn into_inner(self) -> V {
        self.value
    }

    /// Splits the lookup into value and status.
    pub fn into_parts(self) -> (V, CacheStatus) {
        (self.value, self.status)
    }
}
