//! `keyed_reservoir`: concurrent per-key reservoir sampling.
//!
//! A [`Reservoir`] keeps, for every key it has seen, a bounded random
//! sample of the items offered under that key. Items are opaque: the
//! reservoir never inspects them. Each sample always ends with the most
//! recently offered item, so one read gives both a sampled history and the
//! current value. The exact survival probabilities are documented on
//! [`ReservoirBucket`].
//!
//! Buckets are seeded deterministically from a single configured seed, which
//! makes samples reproducible and independent of cross-key interleaving.

mod bucket;
mod builder;
mod error;
mod metrics;
mod reservoir;
mod store;
pub mod listener;

pub use bucket::{Discarded, ReservoirBucket};
pub use builder::{ReservoirBuilder, DEFAULT_SEED};
pub use error::{Capacity, ReservoirError};
pub use metrics::stats::Metrics;
pub use reservoir::Reservoir;
