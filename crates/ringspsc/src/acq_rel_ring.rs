//! Lock-free ring buffer with per-access acquire/release ordering.
//!
//! # Memory ordering
//!
//! **Producer (`try_insert`):**
//! 1. Load `write` with Relaxed (only the producer writes it)
//! 2. Load `read` with Acquire (synchronizes with the consumer's Release, so
//!    the consumer is done with any slot it has handed back)
//! 3. Construct the value in `slots[write]` (no ordering: the slot is dead)
//! 4. Store `next(write)` with Release (publishes the constructed value)
//!
//! **Consumer (`try_remove` / `peek`):**
//! 1. Load `read` with Relaxed (only the consumer writes it)
//! 2. Load `write` with Acquire (synchronizes with step 4 above, making the
//!    slot's contents visible)
//! 3. Move the value out of `slots[read]`
//! 4. Store `next(read)` with Release (hands the slot back to the producer)
//!
//! Each Release/Acquire pair synchronizes only the writer and the reader of
//! one index. Nothing is ordered against unrelated memory elsewhere in the
//! program, unlike [`SeqCstRing`](crate::SeqCstRing). Here the only
//! cross-thread question is "did the index move", and the pair that answers
//! it also carries the slot's data.
//!
//! Both indices share a cache line here; see [`PaddedRing`](crate::PaddedRing).

use crate::slots::Slots;
use crate::sync::atomic::{AtomicUsize, Ordering};
use crate::{Config, RingBuffer, RingError};
use std::ptr::NonNull;

/// SPSC ring buffer with acquire/release indices and no padding.
#[repr(C)]
pub struct AcqRelRing<T> {
    /// Next slot to consume (written by consumer, read by producer)
    read: AtomicUsize,
    /// Next slot to fill (written by producer, read by consumer)
    write: AtomicUsize,
    slots: Slots<T>,
}

// Safety: the Release/Acquire pairs on the indices hand each slot to exactly
// one side at a time.
unsafe impl<T: Send> Send for AcqRelRing<T> {}
unsafe impl<T: Send> Sync for AcqRelRing<T> {}

impl<T> AcqRelRing<T> {
    /// Creates a ring with `capacity` usable slots.
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        Self::with_config(Config::new(capacity))
    }

    /// Creates a ring from `config`.
    pub fn with_config(config: Config) -> Result<Self, RingError> {
        Ok(Self {
            read: AtomicUsize::new(0),
            write: AtomicUsize::new(0),
            slots: Slots::allocate(config)?,
        })
    }
}

unsafe impl<T> RingBuffer for AcqRelRing<T> {
    type Item = T;

    fn with_config(config: Config) -> Result<Self, RingError> {
        AcqRelRing::with_config(config)
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

impl<T> Drop for AcqRelRing<T> {
    fn drop(&mut self) {
        // Only one thread can be here; no synchronization needed.
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Relaxed);
        // SAFETY: `&mut self` means both sides have stopped.
        unsafe { self.slots.drop_live(read, write) };
    }
}
