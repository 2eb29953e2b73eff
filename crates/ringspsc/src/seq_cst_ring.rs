//! Lock-free ring buffer using sequentially-consistent atomics throughout.
//!
//! Every index load and store joins the single global order of `SeqCst`
//! operations, so "the producer wrote the slot before advancing `write`"
//! needs no further argument. The price is a full fence on every access,
//! including loads of a thread's own index that need no synchronization.

use crate::slots::Slots;
use crate::sync::atomic::{AtomicUsize, Ordering};
use crate::{Config, RingBuffer, RingError};
use std::ptr::NonNull;

/// SPSC ring buffer with two `SeqCst` atomic indices and no padding.
#[repr(C)]
pub struct SeqCstRing<T> {
    read: AtomicUsize,
    write: AtomicUsize,
    slots: Slots<T>,
}

// Safety: the indices hand each slot to exactly one side at a time.
unsafe impl<T: Send> Send for SeqCstRing<T> {}
unsafe impl<T: Send> Sync for SeqCstRing<T> {}

impl<T> SeqCstRing<T> {
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

unsafe impl<T> RingBuffer for SeqCstRing<T> {
    type Item = T;

    fn with_config(config: Config) -> Result<Self, RingError> {
        SeqCstRing::with_config(config)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    fn size_estimate(&self) -> usize {
        let write = self.write.load(Ordering::SeqCst);
        let read = self.read.load(Ordering::SeqCst);
        self.slots.occupied(read, write)
    }

    fn is_empty(&self) -> bool {
        self.read.load(Ordering::SeqCst) == self.write.load(Ordering::SeqCst)
    }

    fn is_full(&self) -> bool {
        let write = self.write.load(Ordering::SeqCst);
        self.slots.is_full(self.read.load(Ordering::SeqCst), write)
    }

    unsafe fn try_insert(&self, value: T) -> Result<(), T> {
        let write = self.write.load(Ordering::SeqCst);
        let next = self.slots.next(write);
        if next == self.read.load(Ordering::SeqCst) {
            return Err(value);
        }

        // SAFETY: not full, so `write` is dead and owned by the producer.
        unsafe { self.slots.write(write, value) };
        self.write.store(next, Ordering::SeqCst);
        Ok(())
    }

    unsafe fn try_remove(&self) -> Option<T> {
        let read = self.read.load(Ordering::SeqCst);
        let write = self.write.load(Ordering::SeqCst);
        if read == write {
            return None;
        }

        // SAFETY: not empty, and the `SeqCst` load of `write` orders the
        // producer's slot write before this read.
        let value = unsafe { self.slots.take(read, write) };
        self.read.store(self.slots.next(read), Ordering::SeqCst);
        Some(value)
    }

    unsafe fn peek(&self) -> Option<NonNull<T>> {
        let read = self.read.load(Ordering::SeqCst);
        let write = self.write.load(Ordering::SeqCst);
        if read == write {
            return None;
        }
        // SAFETY: as in `try_remove`.
        Some(unsafe { self.slots.front(read, write) })
    }
}

impl<T> Drop for SeqCstRing<T> {
    fn drop(&mut self) {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Relaxed);
        // SAFETY: `&mut self` means both sides have stopped.
        unsafe { self.slots.drop_live(read, write) };
    }
}
