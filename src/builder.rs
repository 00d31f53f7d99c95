use std::hash::Hash;

use crate::error::{Capacity, ReservoirError};
use crate::listener::{DiscardCause, DiscardListener, FnListener};
use crate::reservoir::Reservoir;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0;

/// Builder for configuring and constructing a [`Reservoir`].
///
/// # Example
/// ```
/// use keyed_reservoir::ReservoirBuilder;
///
/// let reservoir: keyed_reservoir::Reservoir<String, f64> = ReservoirBuilder::new(100)
///     .seed(7)
///     .num_shards(16)
///     .build();
/// assert_eq!(reservoir.capacity().get(), 100);
/// ```
pub struct ReservoirBuilder<K, V> {
    capacity: Capacity,
    seed: u64,
    num_shards: usize,
    listener: Option<Box<dyn DiscardListener<K, V>>>,
}

impl<K: 'static, V: 'static> ReservoirBuilder<K, V> {
    /// Items kept per key; `0` keeps everything.
    pub fn new(capacity: usize) -> Self {
        Self::with_capacity(Capacity::new(capacity))
    }

    /// Fallible variant of [`new`](Self::new) for signed or floating-point
    /// capacities.
    ///
    /// ```
    /// use keyed_reservoir::{ReservoirBuilder, ReservoirError};
    ///
    /// let err = ReservoirBuilder::<u32, u32>::try_new(-1_i64).err().unwrap();
    /// assert!(matches!(err, ReservoirError::InvalidArgument(_)));
    /// ```
    pub fn try_new<C>(capacity: C) -> Result<Self, ReservoirError>
    where
        C: TryInto<Capacity>,
        ReservoirError: From<C::Error>,
    {
        Ok(Self::with_capacity(capacity.try_into()?))
    }

    fn with_capacity(capacity: Capacity) -> Self {
        ReservoirBuilder {
            capacity,
            seed: DEFAULT_SEED,
            num_shards: 64,
            listener: None,
        }
    }

    /// Seed for every bucket's RNG (default: `0`).
    ///
    /// All buckets share the seed value but never an RNG instance, so the
    /// sample kept for one key does not depend on traffic to other keys.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of internal shards (must be a power of two; default: 64).
    pub fn num_shards(mut self, n: usize) -> Self {
        assert!(n > 0 && n.is_power_of_two(), "num_shards must be a power of two");
        self.num_shards = n;
        self
    }

    /// Register a discard listener closure.
    ///
    /// The closure is called synchronously on the inserting thread, outside
    /// every internal lock, each time a full bucket drops an item.
    pub fn discard_listener<F>(mut self, f: F) -> Self
    where
        F: Fn(&K, V, DiscardCause) + Send + Sync + 'static,
    {
        self.listener = Some(Box::new(FnListener(f)));
        self
    }

    /// Register a discard listener via the [`DiscardListener`] trait.
    pub fn discard_listener_impl<L: DiscardListener<K, V>>(mut self, l: L) -> Self {
        self.listener = Some(Box::new(l));
        self
    }
}

impl<K, V> ReservoirBuilder<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn build(self) -> Reservoir<K, V> {
        Reservoir::from_parts(self.capacity, self.seed, self.num_shards, self.listener)
    }
}
