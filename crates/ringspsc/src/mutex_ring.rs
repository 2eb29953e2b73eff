//! Mutex-guarded ring buffer: the correctness-first baseline.
//!
//! A single lock serializes every operation. The producer and consumer each
//! only need the index the other one writes, but they still contend on the
//! same lock for every call. That contention is what the atomic variants
//! remove.

use crate::slots::Slots;
use crate::sync::{Mutex, MutexGuard};
use crate::{Config, RingBuffer, RingError};
use std::ptr::NonNull;
use std::sync::PoisonError;

/// Indices protected by the lock.
#[derive(Debug, Default)]
struct Cursor {
    read: usize,
    write: usize,
}

/// SPSC ring buffer with one mutex over both indices and all slots.
///
/// Slots are touched only while the lock is held, with one exception: the
/// pointer returned by `peek` is dereferenced by the consumer after the lock
/// is released. That is sound because the producer never writes a live slot.
pub struct MutexRing<T> {
    cursor: Mutex<Cursor>,
    slots: Slots<T>,
}

// Safety: every slot access happens under the lock or, for `peek`, on a slot
// only the consumer may touch.
unsafe impl<T: Send> Send for MutexRing<T> {}
unsafe impl<T: Send> Sync for MutexRing<T> {}

impl<T> MutexRing<T> {
    /// Creates a ring with `capacity` usable slots.
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        Self::with_config(Config::new(capacity))
    }

    /// Creates a ring from `config`.
    pub fn with_config(config: Config) -> Result<Self, RingError> {
        Ok(Self {
            cursor: Mutex::new(Cursor::default()),
            slots: Slots::allocate(config)?,
        })
    }

    // No user code runs while the lock is held, so a poisoned lock still
    // guards consistent indices.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

unsafe impl<T> RingBuffer for MutexRing<T> {
    type Item = T;

    fn with_config(config: Config) -> Result<Self, RingError> {
        MutexRing::with_config(config)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    fn size_estimate(&self) -> usize {
        let cursor = self.lock();
        self.slots.occupied(cursor.read, cursor.write)
    }

    fn is_empty(&self) -> bool {
        let cursor = self.lock();
        cursor.read == cursor.write
    }

    fn is_full(&self) -> bool {
        let cursor = self.lock();
        self.slots.is_full(cursor.read, cursor.write)
    }

    unsafe fn try_insert(&self, value: T) -> Result<(), T> {
        let mut cursor = self.lock();

        let next = self.slots.next(cursor.write);
        if next == cursor.read {
            return Err(value);
        }

        // SAFETY: the ring is not full, so `write` is dead, and the lock
        // excludes every other slot access.
        unsafe { self.slots.write(cursor.write, value) };
        cursor.write = next;
        Ok(())
    }

    unsafe fn try_remove(&self) -> Option<T> {
        let value = {
            let mut cursor = self.lock();
            if cursor.read == cursor.write {
                return None;
            }

            // SAFETY: the ring is not empty and the caller is the consumer.
            let value = unsafe { self.slots.take(cursor.read, cursor.write) };
            cursor.read = self.slots.next(cursor.read);
            value
        };
        Some(value)
    }

    unsafe fn peek(&self) -> Option<NonNull<T>> {
        let cursor = self.lock();
        if cursor.read == cursor.write {
            return None;
        }
        // SAFETY: the ring is not empty and the caller is the consumer.
        Some(unsafe { self.slots.front(cursor.read, cursor.write) })
    }
}

impl<T> Drop for MutexRing<T> {
    fn drop(&mut self) {
        let (read, write) = {
            let cursor = self.lock();
            (cursor.read, cursor.write)
        };
        // SAFETY: `&mut self` means both sides have stopped.
        unsafe { self.slots.drop_live(read, write) };
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_mutex_ring_basic() {
        let mut ring = MutexRing::<u64>::new(4).unwrap();
        let (mut producer, mut consumer) = ring.split();

        assert!(producer.try_insert(100).is_ok());
        assert!(producer.try_insert(200).is_ok());
        assert_eq!(consumer.size_estimate(), 2);

        assert_eq!(consumer.peek(), Some(&100));
        assert_eq!(consumer.try_remove(), Some(100));
        assert_eq!(consumer.try_remove(), Some(200));
        assert_eq!(consumer.try_remove(), None);
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_mutex_ring_recovers_from_poison() {
        let ring = Arc::new(MutexRing::<u64>::new(2).unwrap());

        let poisoner = Arc::clone(&ring);
        let result = thread::spawn(move || {
            let _guard = poisoner.cursor.lock().unwrap();
            panic!("poison the ring lock");
        })
        .join();
        assert!(result.is_err());
        assert!(ring.cursor.is_poisoned());

        // SAFETY: this thread is the only producer and consumer.
        unsafe {
            assert!(ring.try_insert(7).is_ok());
            assert_eq!(ring.try_remove(), Some(7));
        }
        assert!(ring.is_empty());
    }
}
