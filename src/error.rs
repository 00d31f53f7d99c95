//! Error types and capacity validation.
//!
//! ## Key Components
//!
//! - [`ReservoirError`]: the two failure modes of the crate. Construction
//!   rejects invalid capacities with [`ReservoirError::InvalidArgument`];
//!   lookups of unseen keys fail with [`ReservoirError::KeyNotFound`].
//! - [`Capacity`]: a validated per-key sample size. `0` means unbounded.
//!
//! ## Example Usage
//!
//! ```
//! use keyed_reservoir::{Capacity, ReservoirError};
//!
//! assert_eq!(Capacity::try_from(10_i64).unwrap().get(), 10);
//! assert!(matches!(
//!     Capacity::try_from(2.5_f64),
//!     Err(ReservoirError::InvalidArgument(_))
//! ));
//! ```

use std::convert::Infallible;
use std::fmt;

// ---------------------------------------------------------------------------
// ReservoirError
// ---------------------------------------------------------------------------

/// Error returned by reservoir construction and key lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservoirError {
    /// A construction parameter was rejected. Carries a human-readable
    /// description of the offending value.
    ///
    /// Fatal to construction: no reservoir is produced, and retrying with
    /// the same arguments fails the same way.
    InvalidArgument(String),
    /// No bucket exists for the requested key.
    ///
    /// Recoverable: callers may treat it as "no data yet".
    KeyNotFound,
}

impl ReservoirError {
    /// Creates an [`InvalidArgument`](ReservoirError::InvalidArgument) error.
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl fmt::Display for ReservoirError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::KeyNotFound => f.write_str("key was not found in reservoir"),
        }
    }
}

impl std::error::Error for ReservoirError {}

impl From<Infallible> for ReservoirError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

/// Maximum number of items retained per key.
///
/// `Capacity(0)` means every offered item is kept. Any `usize` is valid, so
/// `From<usize>` is infallible; signed and floating-point inputs go through
/// `TryFrom` and are rejected when negative or non-integral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capacity(usize);

impl Capacity {
    /// Keep every item; never sample.
    pub const UNBOUNDED: Capacity = Capacity(0);

    #[inline]
    pub const fn new(n: usize) -> Self {
        Capacity(n)
    }

    /// Returns the raw size (`0` = unbounded).
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_unbounded(self) -> bool {
        self.0 == 0
    }
}

impl From<usize> for Capacity {
    #[inline]
    fn from(n: usize) -> Self {
        Capacity(n)
    }
}

impl TryFrom<i64> for Capacity {
    type Error = ReservoirError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value).map(Capacity).map_err(|_| {
            ReservoirError::invalid_argument(format!(
                "capacity must be a nonnegative integer, was {value}"
            ))
        })
    }
}

impl TryFrom<f64> for Capacity {
    type Error = ReservoirError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= usize::MAX as f64
        {
            return Err(ReservoirError::invalid_argument(format!(
                "capacity must be a nonnegative integer, was {value}"
            )));
        }
        Ok(Capacity(value as usize))
    }
}
