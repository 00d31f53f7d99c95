use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters updated on every reservoir operation.
pub struct StatsCounter {
    offers: AtomicU64,
    evictions: AtomicU64,
    overwrites: AtomicU64,
    buckets: AtomicU64,
    misses: AtomicU64,
}

impl StatsCounter {
    pub fn new() -> Self {
        StatsCounter {
            offers: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            overwrites: AtomicU64::new(0),
            buckets: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_offer(&self) {
        self.offers.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Release);
    }

    #[inline]
    pub fn record_overwrite(&self) {
        self.overwrites.fetch_add(1, Ordering::Release);
    }

    /// Records a newly created bucket and returns the running total.
    #[inline]
    pub fn record_bucket(&self) -> u64 {
        self.buckets.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of the statistics.
    ///
    /// Writers bump `offers` before the discard counters (release), and the
    /// discard counters are read first (acquire), so every discard in a
    /// snapshot has its offer counted too: `discard_count() <= offers`.
    pub fn snapshot(&self) -> Metrics {
        let evictions = self.evictions.load(Ordering::Acquire);
        let overwrites = self.overwrites.load(Ordering::Acquire);
        Metrics {
            offers: self.offers.load(Ordering::Relaxed),
            evictions,
            overwrites,
            buckets: self.buckets.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for StatsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of reservoir statistics.
///
/// Counters are read independently, so a snapshot taken while writers are
/// active may be off by the operations in flight. It never shows more
/// discards than offers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metrics {
    /// Number of `add_item` calls across all keys.
    pub offers: u64,
    /// Items removed from a random position of a full bucket.
    pub evictions: u64,
    /// Items replaced in the last slot of a full bucket.
    pub overwrites: u64,
    /// Number of buckets created.
    pub buckets: u64,
    /// Lookups that failed with `KeyNotFound`.
    pub misses: u64,
}

impl Metrics {
    /// Total items dropped by sampling.
    pub fn discard_count(&self) -> u64 {
        self.evictions + self.overwrites
    }

    /// Items offered and still retained, summed over all buckets.
    pub fn retained_count(&self) -> u64 {
        self.offers.saturating_sub(self.discard_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_events() {
        let stats = StatsCounter::new();
        for _ in 0..5 {
            stats.record_offer();
        }
        stats.record_eviction();
        stats.record_overwrite();
        stats.record_overwrite();
        assert_eq!(stats.record_bucket(), 1);
        stats.record_miss();

        let m = stats.snapshot();
        assert_eq!(m.offers, 5);
        assert_eq!(m.discard_count(), 3);
        assert_eq!(m.retained_count(), 2);
        assert_eq!(m.buckets, 1);
        assert_eq!(m.misses, 1);
    }

    #[test]
    fn retained_count_never_underflows() {
        let torn = Metrics {
            offers: 1,
            evictions: 2,
            ..Metrics::default()
        };
        assert_eq!(torn.retained_count(), 0);
    }
}
