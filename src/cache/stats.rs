//! Cache Statistics Module
//!
//! Tracks cache activity: hits, misses, evictions, journal rebuilds and
//! corruption recoveries.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of cache activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of `get` calls that returned a snapshot
    pub hits: u64,
    /// Number of `get` calls that missed
    pub misses: u64,
    /// Number of entries removed by trim-to-size
    pub evictions: u64,
    /// Number of journal compactions
    pub journal_rebuilds: u64,
    /// Number of times a corrupt journal forced the cache to start empty
    pub corruption_recoveries: u64,
    /// Current number of entries in the table
    pub total_entries: usize,
    /// Bytes of committed values
    pub size: u64,
    /// Byte budget
    pub max_size: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_rebuild(&mut self) {
        self.journal_rebuilds += 1;
    }

    pub(crate) fn record_corruption_recovery(&mut self) {
        self.corruption_recoveries += 1;
    }
}
