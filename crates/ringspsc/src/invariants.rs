//! Debug assertion macros for ring buffer invariants.
//!
//! Only active in debug builds (`debug_assert!`), so release builds pay
//! nothing for them. Shared by every ring variant through [`Slots`].
//!
//! [`Slots`]: crate::slots::Slots

// =============================================================================
// Index Bounds
// =============================================================================

/// Assert that a physical slot index is in range.
///
/// **Invariant**: `0 ≤ index < capacity + 1`
///
/// Used in: every `Slots` accessor
macro_rules! debug_assert_slot_in_bounds {
    ($index:expr, $slots:expr) => {
        debug_assert!(
            $index < $slots,
            "slot index {} out of bounds ({} physical slots)",
            $index,
            $slots
        )
    };
}

// =============================================================================
// Live Range
// =============================================================================

/// Assert that a slot lies in the live range `[read, write)`, taking
/// wraparound into account.
///
/// **Invariant**: `storage[i]` holds a value ⟺ `i` is reachable from `read`
/// before reaching `write`
///
/// Used in: `Slots::take()` and `Slots::front()` before touching the value
macro_rules! debug_assert_live_slot {
    ($index:expr, $read:expr, $write:expr) => {
        debug_assert!(
            if $read <= $write {
                $index >= $read && $index < $write
            } else {
                $index >= $read || $index < $write
            },
            "slot {} is outside the live range [{}, {})",
            $index,
            $read,
            $write
        )
    };
}

// =============================================================================
// Bounded Count
// =============================================================================

/// Assert that the live element count does not exceed capacity.
///
/// **Invariant**: `0 ≤ live ≤ capacity`, one physical slot always unused
///
/// Used in: `Slots::occupied()` and the teardown sweep
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "live count {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_live_slot;
pub(crate) use debug_assert_slot_in_bounds;
