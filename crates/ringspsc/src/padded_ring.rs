//! Lock-free ring buffer with acquire/release ordering and each index on its
//! own cache line.
//!
//! The operations and orderings are exactly those of
//! [`AcqRelRing`](crate::AcqRelRing). What changes is layout: without padding,
//! the producer's store to `write` invalidates the line that also holds
//! `read` on the consumer's core, and the consumer's store to `read` does
//! the same in reverse. Under contention that ping-pong traffic, not the
//! atomics themselves, dominates latency.
//!
//! # Memory Layout
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │ Line 0: slots (pointer + length, read-only after construction)     │
//! ├────────────────────────────────────────────────────────────────────┤
//! │ Line 1: write: AtomicUsize   ← Producer writes, Consumer reads     │
//! │         padding to CACHE_LINE_SIZE                                 │
//! ├────────────────────────────────────────────────────────────────────┤
//! │ Line 2: read: AtomicUsize    ← Consumer writes, Producer reads     │
//! │         padding to CACHE_LINE_SIZE                                 │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The struct itself is aligned to [`CACHE_LINE_SIZE`], so fields of an
//! enclosing struct never share the index lines either.
//!
//! [`CACHE_LINE_SIZE`]: crate::CACHE_LINE_SIZE

use crate::slots::Slots;
use crate::sync::atomic::{AtomicUsize, Ordering};
use crate::{Config, RingBuffer, RingError};
use crossbeam_utils::CachePadded;
use std::ptr::NonNull;

/// SPSC ring buffer with acquire/release indices isolated on separate cache
/// lines.
#[repr(C)]
pub struct PaddedRing<T> {
    slots: Slots<T>,

    // === PRODUCER HOT ===
    /// Next slot to fill (written by producer, read by consumer)
    write: CachePadded<AtomicUsize>,

    // === CONSUMER HOT ===
    /// Next slot to consume (written by consumer, read by producer)
    read: CachePadded<AtomicUsize>,
}

// Safety: same protocol as `AcqRelRing`.
unsafe impl<T: Send> Send for PaddedRing<T> {}
unsafe impl<T: Send> Sync for PaddedRing<T> {}

impl<T> PaddedRing<T> {
    /// Creates a ring with `capacity` usable slots.
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        Self::with_config(Config::new(capacity))
    }

    /// Creates a ring from `config`.
    pub fn with_config(config: Config) -> Result<Self, RingError> {
        Ok(Self {
            slots: Slots::allocate(config)?,
            write: CachePadded::new(AtomicUsize::new(0)),
            read: CachePadded::new(AtomicUsize::new(0)),
        })
    }
}

unsafe impl<T> RingBuffer for PaddedRing<T> {
    type Item = T;

    fn with_config(config: Config) -> Result<Self, RingError> {
        PaddedRing::with_config(config)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    #[inline]
    fn size_estimate(&self) -> usize {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        self.slots.occupied(read, write)
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.read.load(Ordering::Acquire) == self.write.load(Ordering::Acquire)
    }

    #[inline]
    fn is_full(&self) -> bool {
        let write = self.write.load(Ordering::Acquire);
        self.slots.is_full(self.read.load(Ordering::Acquire), write)
    }

    #[inline]
    unsafe fn try_insert(&self, value: T) -> Result<(), T> {
        let write = self.write.load(Ordering::Relaxed);
        let next = self.slots.next(write);
        if next == self.read.load(Ordering::Acquire) {
            return Err(value);
        }

        // SAFETY: not full, so `write` is dead; the Acquire load of `read`
        // ordered the consumer's last use of it before this write.
        unsafe { self.slots.write(write, value) };
        self.write.store(next, Ordering::Release);
        Ok(())
    }

    #[inline]
    unsafe fn try_remove(&self) -> Option<T> {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        if read == write {
            return None;
        }

        // SAFETY: not empty; the Acquire load of `write` synchronizes with the
        // producer's Release store after constructing this slot.
        let value = unsafe { self.slots.take(read, write) };
        self.read.store(self.slots.next(read), Ordering::Release);
        Some(value)
    }

    #[inline]
    unsafe fn peek(&self) -> Option<NonNull<T>> {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        if read == write {
            return None;
        }
        // SAFETY: as in `try_remove`.
        Some(unsafe { self.slots.front(read, write) })
    }
}

impl<T> Drop for PaddedRing<T> {
    fn drop(&mut self) {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Relaxed);
        // SAFETY: `&mut self` means both sides have stopped.
        unsafe { self.slots.drop_live(read, write) };
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use crate::CACHE_LINE_SIZE;
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    fn test_padded_index_fills_a_line() {
        assert_eq!(size_of::<CachePadded<AtomicUsize>>(), CACHE_LINE_SIZE);
        assert_eq!(align_of::<CachePadded<AtomicUsize>>(), CACHE_LINE_SIZE);
    }

    #[test]
    fn test_indices_start_distinct_lines() {
        let write = offset_of!(PaddedRing<u64>, write);
        let read = offset_of!(PaddedRing<u64>, read);

        assert_eq!(write % CACHE_LINE_SIZE, 0);
        assert_eq!(read % CACHE_LINE_SIZE, 0);
        assert!(read.abs_diff(write) >= CACHE_LINE_SIZE);
        // Nothing else shares a line with either index.
        assert!(offset_of!(PaddedRing<u64>, slots) + size_of::<Slots<u64>>() <= write.min(read));
    }

    #[test]
    fn test_ring_is_line_aligned() {
        assert_eq!(align_of::<PaddedRing<u64>>(), CACHE_LINE_SIZE);
        assert_eq!(size_of::<PaddedRing<u64>>() % CACHE_LINE_SIZE, 0);
        assert_eq!(size_of::<PaddedRing<u64>>(), 3 * CACHE_LINE_SIZE);
    }

    #[test]
    fn test_padded_ring_wraps() {
        let mut ring = PaddedRing::<u32>::new(2).unwrap();
        let (mut producer, mut consumer) = ring.split();

        for round in 0..5 {
            assert!(producer.try_insert(round * 2).is_ok());
            assert!(producer.try_insert(round * 2 + 1).is_ok());
            assert!(producer.is_full());
            assert_eq!(consumer.try_remove(), Some(round * 2));
            assert_eq!(consumer.try_remove(), Some(round * 2 + 1));
            assert!(consumer.is_empty());
        }
    }
}
