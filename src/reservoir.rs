use std::hash::Hash;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::bucket::{Discarded, ReservoirBucket};
use crate::builder::ReservoirBuilder;
use crate::error::{Capacity, ReservoirError};
use crate::listener::{DiscardCause, DiscardListener};
use crate::metrics::stats::{Metrics, StatsCounter};
use crate::store::sharded::{SharedBucket, ShardedStore};

// ---------------------------------------------------------------------------
// Reservoir interior
// ---------------------------------------------------------------------------

/// Shared interior of a [`Reservoir`].
pub(crate) struct Inner<K, V> {
    pub(crate) store: ShardedStore<K, V>,
    /// Copied into every bucket on creation.
    pub(crate) capacity: Capacity,
    /// Copied into every bucket on creation.
    pub(crate) seed: u64,
    /// Optional discard listener.  `None` if the user didn't register one.
    pub(crate) listener: Option<Box<dyn DiscardListener<K, V>>>,
    pub(crate) metrics: StatsCounter,
}

// ---------------------------------------------------------------------------
// Reservoir handle
// ---------------------------------------------------------------------------

/// A concurrent map from keys to reservoir-sampled item histories.
///
/// Each key owns a [`ReservoirBucket`] created on its first
/// [`add_item`](Reservoir::add_item). Every bucket is built with the same
/// capacity and seed, so for a given `(capacity, seed)` the sample kept for
/// a key depends only on the items offered to that key, never on how
/// inserts to other keys were interleaved with it.
///
/// Locking is two-level. A sharded map lock is held just long enough to
/// find or install a bucket; the bucket's own lock is then taken for the
/// sampling step. Different keys never wait on each other's sampling, and
/// calls on one key are serialized by its bucket lock.
///
/// # Example
/// ```
/// use keyed_reservoir::Reservoir;
///
/// let reservoir: Reservoir<&str, u32> = Reservoir::new(10);
/// for i in 0..1_000 {
///     reservoir.add_item("latency", i);
/// }
/// let sample = reservoir.items(&"latency").unwrap();
/// assert_eq!(sample.len(), 10);
/// assert_eq!(sample.last(), Some(&999));
/// ```
pub struct Reservoir<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for Reservoir<K, V> {
    fn clone(&self) -> Self {
        Reservoir {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Reservoir<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a reservoir keeping `capacity` items per key (`0` keeps
    /// everything), seeded with the default seed.
    pub fn new(capacity: usize) -> Self {
        ReservoirBuilder::new(capacity).build()
    }

    /// Creates a reservoir from a capacity that may be negative or
    /// fractional, rejecting it with [`ReservoirError::InvalidArgument`].
    ///
    /// ```
    /// use keyed_reservoir::{Reservoir, ReservoirError};
    ///
    /// assert!(Reservoir::<u32, u32>::try_new(10_i64, 1).is_ok());
    /// assert!(matches!(
    ///     Reservoir::<u32, u32>::try_new(2.5_f64, 1),
    ///     Err(ReservoirError::InvalidArgument(_))
    /// ));
    /// ```
    pub fn try_new<C>(capacity: C, seed: u64) -> Result<Self, ReservoirError>
    where
        C: TryInto<Capacity>,
        ReservoirError: From<C::Error>,
    {
        Ok(ReservoirBuilder::try_new(capacity)?.seed(seed).build())
    }

    /// Returns a [`ReservoirBuilder`] for constructing a new reservoir.
    pub fn builder(capacity: usize) -> ReservoirBuilder<K, V> {
        ReservoirBuilder::new(capacity)
    }

    pub(crate) fn from_parts(
        capacity: Capacity,
        seed: u64,
        num_shards: usize,
        listener: Option<Box<dyn DiscardListener<K, V>>>,
    ) -> Self {
        debug!(
            capacity = capacity.get(),
            seed,
            num_shards,
            listener = listener.is_some(),
            "creating reservoir"
        );
        Reservoir {
            inner: Arc::new(Inner {
                store: ShardedStore::new(num_shards),
                capacity,
                seed,
                listener,
                metrics: StatsCounter::new(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Lookup helpers
    // -----------------------------------------------------------------------

    fn bucket(&self, key: &K) -> Result<SharedBucket<V>, ReservoirError> {
        self.inner.store.get(key).ok_or_else(|| {
            self.inner.metrics.record_miss();
            ReservoirError::KeyNotFound
        })
    }

    /// Returns the bucket for `key`, creating it if absent.
    ///
    /// A new bucket is installed already holding `first`, so no key is ever
    /// visible with an empty sample. `first` is left untouched when the
    /// bucket already existed.
    fn bucket_or_create(&self, key: &K, first: &mut Option<V>) -> SharedBucket<V> {
        let (capacity, seed) = (self.inner.capacity, self.inner.seed);
        let (bucket, created) = self.inner.store.get_or_insert_with(key, || {
            let mut bucket = ReservoirBucket::new(capacity, seed);
            if let Some(item) = first.take() {
                // An empty bucket never discards.
                bucket.add_item(item);
            }
            bucket
        });
        if created {
            let total = self.inner.metrics.record_bucket();
            debug!(
                shard = self.inner.store.shard_index(key),
                buckets = total,
                "created reservoir bucket"
            );
        }
        bucket
    }

    // -----------------------------------------------------------------------
    // Hot-path: add_item
    // -----------------------------------------------------------------------

    /// Offers `item` to the bucket for `key`, creating the bucket if needed.
    ///
    /// The item is always retained, as the last element of the key's
    /// sample. If the bucket was full, one older item is dropped and handed
    /// to the discard listener, if any.
    pub fn add_item(&self, key: K, item: V) {
        let mut pending = Some(item);
        let bucket = self.bucket_or_create(&key, &mut pending);
        // The shard lock is already released; only this key's lock is held.
        let discarded = match pending {
            Some(item) => bucket.lock().add_item(item),
            None => None,
        };
        self.inner.metrics.record_offer();

        if let Some(Discarded { item, cause }) = discarded {
            match cause {
                DiscardCause::Evicted => self.inner.metrics.record_eviction(),
                DiscardCause::Overwritten => self.inner.metrics.record_overwrite(),
            }
            trace!(?cause, "item discarded");
            if let Some(listener) = &self.inner.listener {
                listener.on_discard(&key, item, cause);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Returns a copy of the sample for `key`, oldest first.
    ///
    /// The last element is the most recently added item. Fails with
    /// [`ReservoirError::KeyNotFound`] if nothing was ever added for `key`.
    pub fn items(&self, key: &K) -> Result<Vec<V>, ReservoirError> {
        let bucket = self.bucket(key)?;
        let items = bucket.lock().items();
        Ok(items)
    }

    /// Returns the most recently added item for `key`.
    pub fn last_item(&self, key: &K) -> Result<V, ReservoirError> {
        let bucket = self.bucket(key)?;
        let last = bucket.lock().last().cloned();
        // Buckets are installed holding their first item.
        last.ok_or(ReservoirError::KeyNotFound)
    }

    /// Returns how many items were ever offered for `key`.
    pub fn count(&self, key: &K) -> Result<u64, ReservoirError> {
        let bucket = self.bucket(key)?;
        let count = bucket.lock().count();
        Ok(count)
    }

    /// Snapshot of every key that has received at least one item.
    ///
    /// Order is unspecified. A key being created concurrently may or may
    /// not be included; a listed key always has a non-empty sample.
    pub fn keys(&self) -> Vec<K> {
        self.inner.store.keys()
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.store.contains(key)
    }

    /// Number of keys with a bucket.
    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    pub fn capacity(&self) -> Capacity {
        self.inner.capacity
    }

    pub fn seed(&self) -> u64 {
        self.inner.seed
    }

    pub fn stats(&self) -> Metrics {
        self.inner.metrics.snapshot()
    }
}

impl<K, V> Default for Reservoir<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// An unbounded reservoir with the default seed.
    fn default() -> Self {
        Self::new(0)
    }
}
