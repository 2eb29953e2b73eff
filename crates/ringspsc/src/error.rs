//! Error types for ring construction.

use std::collections::TryReserveError;
use thiserror::Error;

/// Errors that can occur while constructing a ring buffer.
///
/// A full or empty ring is not an error: `try_insert` hands the value back
/// and `try_remove` returns `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// A ring must hold at least one element.
    #[error("ring capacity must be at least 1")]
    ZeroCapacity,

    /// `capacity + 1` physical slots cannot be represented.
    #[error("ring capacity {capacity} is too large")]
    CapacityOverflow {
        /// The requested capacity.
        capacity: usize,
    },

    /// Backing storage could not be allocated.
    #[error("failed to allocate {slots} ring slots")]
    Alloc {
        /// Number of physical slots requested.
        slots: usize,
        /// The allocator's error.
        #[source]
        source: TryReserveError,
    },
}
