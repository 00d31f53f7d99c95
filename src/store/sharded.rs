use std::collections::hash_map::Entry;
use std::hash::Hash;
use std::sync::Arc;

use ahash::{AHashMap, RandomState};
use parking_lot::{Mutex, RwLock};

use crate::bucket::ReservoirBucket;

/// A bucket shared between the map and in-flight operations on its key.
///
/// The `Mutex` is the per-key lock: it guards the bucket's items, count and
/// RNG, and is only ever taken after the shard lock has been released.
pub(crate) type SharedBucket<V> = Arc<Mutex<ReservoirBucket<V>>>;

// ---------------------------------------------------------------------------
// Shard
// ---------------------------------------------------------------------------

/// Cache-line padding to prevent false sharing between shards.
#[repr(align(64))]
pub(crate) struct Shard<K, V> {
    pub(crate) map: RwLock<AHashMap<K, SharedBucket<V>>>,
}

// ---------------------------------------------------------------------------
// ShardedStore
// ---------------------------------------------------------------------------

/// A thread-safe key → bucket map backed by `N` independently-locked shards.
///
/// Lookups take a shared lock, bucket creation an exclusive one, both
/// per-shard and both only long enough to clone or install an `Arc`.
/// Buckets are never removed.
pub(crate) struct ShardedStore<K, V> {
    shards: Box<[Shard<K, V>]>,
    /// Always `shards.len() - 1`; shards.len() is a power of two.
    shard_mask: usize,
    /// Hasher used only to compute shard indices.
    build_hasher: RandomState,
}

impl<K: Hash + Eq + Clone, V> ShardedStore<K, V> {
    pub(crate) fn new(num_shards: usize) -> Self {
        assert!(num_shards.is_power_of_two());
        let shards = (0..num_shards)
            .map(|_| Shard {
                map: RwLock::new(AHashMap::new()),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        ShardedStore {
            shards,
            shard_mask: num_shards - 1,
            build_hasher: RandomState::new(),
        }
    }

    #[inline]
    pub(crate) fn shard_index(&self, key: &K) -> usize {
        let h = self.build_hasher.hash_one(key);
        // Use the high bits (better avalanche from ahash).
        ((h >> 32) as usize) & self.shard_mask
    }

    /// Returns the bucket for `key`, or `None` if it was never created.
    pub(crate) fn get(&self, key: &K) -> Option<SharedBucket<V>> {
        let idx = self.shard_index(key);
        self.shards[idx].map.read().get(key).map(Arc::clone)
    }

    /// Returns the bucket for `key`, creating it with `make` if absent.
    ///
    /// Concurrent callers racing on the same new key all receive the single
    /// bucket that was installed. The flag is `true` only for the caller
    /// whose `make` produced it.
    pub(crate) fn get_or_insert_with<F>(&self, key: &K, make: F) -> (SharedBucket<V>, bool)
    where
        F: FnOnce() -> ReservoirBucket<V>,
    {
        let idx = self.shard_index(key);
        let shard = &self.shards[idx];

        if let Some(bucket) = shard.map.read().get(key) {
            return (Arc::clone(bucket), false);
        }

        // Another writer may have installed it between the two locks.
        match shard.map.write().entry(key.clone()) {
            Entry::Occupied(e) => (Arc::clone(e.get()), false),
            Entry::Vacant(e) => {
                let bucket = Arc::new(Mutex::new(make()));
                e.insert(Arc::clone(&bucket));
                (bucket, true)
            }
        }
    }

    /// Snapshot of every key that has a bucket.
    ///
    /// Shards are read one at a time, so a key created concurrently may or
    /// may not appear.
    pub(crate) fn keys(&self) -> Vec<K> {
        let mut keys = Vec::new();
        for shard in self.shards.iter() {
            keys.extend(shard.map.read().keys().cloned());
        }
        keys
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        let idx = self.shard_index(key);
        self.shards[idx].map.read().contains_key(key)
    }

    /// Total number of buckets across all shards.
    pub(crate) fn len(&self) -> usize {
        self.shards.iter().map(|s| s.map.read().len()).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.map.read().is_empty())
    }
}
