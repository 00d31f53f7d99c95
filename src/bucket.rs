//! Per-key sample container running reservoir sampling.
//!
//! A [`ReservoirBucket`] keeps at most `capacity` items out of an unbounded
//! stream. On top of classic reservoir sampling it always keeps the most
//! recently offered item as its final element, so callers can read "the
//! current value" next to a sampled history.
//!
//! Pinning the newest item costs the history one slot. After `N >= C`
//! offers to a bucket of capacity `C`:
//!
//! ```text
//!   newest item            : always retained
//!   first C - 1 items      : retained with probability C / N
//!   every other item       : retained with probability (C - 1) / N
//! ```
//!
//! Within each group survival does not depend on the item, and both rates
//! approach `C / N` as `C` grows.
//!
//! When full, an offer draws `r` uniformly from `[0, count]`:
//!
//! ```text
//!   r < capacity  : items.remove(r); items.push(new)   O(capacity), p = C/(n+1)
//!   otherwise     : items[last] = new                  O(1)
//! ```
//!
//! Survivors keep their relative offer order. The expensive branch is taken
//! with probability `C/(n+1)`, which keeps `add_item` amortized O(1).
//!
//! The bucket itself is not synchronized. The reservoir wraps each bucket in
//! its own `Mutex`, which is the per-key lock.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Capacity, ReservoirError};
use crate::listener::DiscardCause;

/// An item dropped from a bucket by the sampling step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discarded<V> {
    pub item: V,
    pub cause: DiscardCause,
}

/// Bounded, randomly sampled history for one key.
///
/// # Example
/// ```
/// use keyed_reservoir::{Capacity, ReservoirBucket};
///
/// let mut bucket = ReservoirBucket::new(Capacity::new(3), 0);
/// for i in 0..100 {
///     bucket.add_item(i);
/// }
/// assert_eq!(bucket.len(), 3);
/// assert_eq!(bucket.last(), Some(&99));
/// assert_eq!(bucket.count(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct ReservoirBucket<V> {
    capacity: Capacity,
    /// Items ever offered, retained or not.
    count: u64,
    items: Vec<V>,
    rng: ChaCha8Rng,
}

impl<V> ReservoirBucket<V> {
    /// Creates an empty bucket whose RNG is seeded with `seed`.
    pub fn new(capacity: Capacity, seed: u64) -> Self {
        let items = if capacity.is_unbounded() {
            Vec::new()
        } else {
            Vec::with_capacity(capacity.get())
        };
        ReservoirBucket {
            capacity,
            count: 0,
            items,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Fallible constructor for signed or floating-point capacities.
    pub fn try_new<C>(capacity: C, seed: u64) -> Result<Self, ReservoirError>
    where
        C: TryInto<Capacity>,
        ReservoirError: From<C::Error>,
    {
        Ok(Self::new(capacity.try_into()?, seed))
    }

    /// Offers `item` to the bucket.
    ///
    /// `item` is always retained and becomes the last element. Returns the
    /// item it displaced, if the bucket was full.
    pub fn add_item(&mut self, item: V) -> Option<Discarded<V>> {
        let capacity = self.capacity.get();
        let discarded = if self.capacity.is_unbounded() || self.items.len() < capacity {
            self.items.push(item);
            None
        } else {
            // Upper bound is the pre-increment count.
            let r = self.rng.random_range(0..=self.count);
            if r < capacity as u64 {
                let evicted = self.items.remove(r as usize);
                self.items.push(item);
                Some(Discarded {
                    item: evicted,
                    cause: DiscardCause::Evicted,
                })
            } else {
                match self.items.last_mut() {
                    Some(slot) => Some(Discarded {
                        item: std::mem::replace(slot, item),
                        cause: DiscardCause::Overwritten,
                    }),
                    None => {
                        self.items.push(item);
                        None
                    }
                }
            }
        };
        self.count += 1;
        discarded
    }

    /// Number of items ever offered.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[inline]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Number of items currently retained.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The most recently offered item.
    #[inline]
    pub fn last(&self) -> Option<&V> {
        self.items.last()
    }

    /// Borrowed view of the retained items, oldest first.
    #[inline]
    pub fn as_slice(&self) -> &[V] {
        &self.items
    }
}

impl<V: Clone> ReservoirBucket<V> {
    /// Returns a copy of the retained items, oldest first.
    pub fn items(&self) -> Vec<V> {
        self.items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, seed: u64, n: u32) -> ReservoirBucket<u32> {
        let mut bucket = ReservoirBucket::new(Capacity::new(capacity), seed);
        for i in 0..n {
            bucket.add_item(i);
        }
        bucket
    }

    #[test]
    fn keeps_items_in_order_until_full() {
        let bucket = filled(5, 0, 5);
        assert_eq!(bucket.items(), vec![0, 1, 2, 3, 4]);
        assert_eq!(bucket.count(), 5);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut bucket = ReservoirBucket::new(Capacity::new(4), 1);
        for i in 0..1_000u32 {
            bucket.add_item(i);
            assert!(bucket.len() <= 4);
        }
        assert_eq!(bucket.len(), 4);
    }

    #[test]
    fn newest_item_is_always_last() {
        let mut bucket = ReservoirBucket::new(Capacity::new(3), 7);
        for i in 0..500u32 {
            bucket.add_item(i);
            assert_eq!(bucket.last(), Some(&i));
        }
    }

    #[test]
    fn unbounded_keeps_everything() {
        let bucket = filled(0, 0, 1_000);
        assert_eq!(bucket.items(), (0..1_000).collect::<Vec<_>>());
    }

    #[test]
    fn count_includes_discarded_offers() {
        let bucket = filled(2, 3, 50);
        assert_eq!(bucket.count(), 50);
        assert_eq!(bucket.len(), 2);
    }

    #[test]
    fn discards_are_reported_once_full() {
        let mut bucket = ReservoirBucket::new(Capacity::new(2), 0);
        assert!(bucket.add_item(0u32).is_none());
        assert!(bucket.add_item(1).is_none());
        let discarded = bucket.add_item(2).expect("full bucket must discard");
        assert!(discarded.item == 0 || discarded.item == 1);
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.last(), Some(&2));
    }

    #[test]
    fn same_seed_same_sample() {
        assert_eq!(filled(10, 42, 1_000).items(), filled(10, 42, 1_000).items());
    }

    #[test]
    fn returned_items_are_a_copy() {
        let mut bucket = filled(3, 0, 3);
        let snapshot = bucket.items();
        for i in 3..100 {
            bucket.add_item(i);
        }
        assert_eq!(snapshot, vec![0, 1, 2]);
    }

    #[test]
    fn first_items_outlive_later_ones() {
        // Capacity 2 leaves one sampled slot: item 0 survives with 2/N,
        // every later non-newest item with 1/N.
        const N: u32 = 10;
        const TRIALS: u64 = 20_000;
        let mut hits = [0u64; N as usize];
        for seed in 0..TRIALS {
            for &i in filled(2, seed, N).as_slice() {
                hits[i as usize] += 1;
            }
        }
        assert_eq!(hits[N as usize - 1], TRIALS);
        let first = hits[0] as f64 / TRIALS as f64;
        let later = hits[1..N as usize - 1].iter().sum::<u64>() as f64
            / (TRIALS * (N as u64 - 2)) as f64;
        assert!((first - 0.2).abs() < 0.02, "first item kept {first:.3}");
        assert!((later - 0.1).abs() < 0.02, "later items kept {later:.3}");
    }

    #[test]
    fn try_new_rejects_bad_capacity() {
        assert!(ReservoirBucket::<u8>::try_new(-1_i64, 0).is_err());
        assert!(ReservoirBucket::<u8>::try_new(2.5_f64, 0).is_err());
        assert!(ReservoirBucket::<u8>::try_new(4usize, 0).is_ok());
    }
}
