//! Discard listener — a callback invoked whenever sampling drops an item.
//!
//! # Example
//! ```
//! use keyed_reservoir::ReservoirBuilder;
//! use keyed_reservoir::listener::DiscardCause;
//! use std::sync::{Arc, Mutex};
//!
//! let log: Arc<Mutex<Vec<(u64, DiscardCause)>>> = Arc::new(Mutex::new(Vec::new()));
//! let log2 = Arc::clone(&log);
//!
//! let reservoir: keyed_reservoir::Reservoir<&str, u64> = ReservoirBuilder::new(2)
//!     .discard_listener(move |_key: &&str, item, cause| {
//!         log2.lock().unwrap().push((item, cause));
//!     })
//!     .build();
//!
//! reservoir.add_item("cpu", 1);
//! reservoir.add_item("cpu", 2);
//! reservoir.add_item("cpu", 3); // bucket full: one item is dropped
//! assert_eq!(log.lock().unwrap().len(), 1);
//! ```

// ---------------------------------------------------------------------------
// DiscardCause
// ---------------------------------------------------------------------------

/// Which branch of the sampling step dropped an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiscardCause {
    /// The draw landed inside the sample: the item at that position was
    /// removed and the new item appended.
    Evicted,
    /// The draw landed outside the sample: the previous newest item was
    /// replaced in the last slot.
    Overwritten,
}

// ---------------------------------------------------------------------------
// DiscardListener trait
// ---------------------------------------------------------------------------

/// A callback invoked each time a full bucket drops an item.
///
/// The callback receives the key, the dropped item by value, and the branch
/// that dropped it. It runs on the thread that called `add_item`, after the
/// bucket lock has been released. Discards for the same key arriving from
/// different threads may be delivered out of order.
pub trait DiscardListener<K, V>: Send + Sync + 'static {
    fn on_discard(&self, key: &K, item: V, cause: DiscardCause);
}

/// A [`DiscardListener`] backed by a closure.
///
/// Created via [`ReservoirBuilder::discard_listener`](crate::ReservoirBuilder::discard_listener).
pub struct FnListener<F>(pub F);

impl<K, V, F> DiscardListener<K, V> for FnListener<F>
where
    F: Fn(&K, V, DiscardCause) + Send + Sync + 'static,
{
    fn on_discard(&self, key: &K, item: V, cause: DiscardCause) {
        (self.0)(key, item, cause)
    }
}
