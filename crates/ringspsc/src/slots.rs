use crate::invariants::{
    debug_assert_bounded_count, debug_assert_live_slot, debug_assert_slot_in_bounds,
};
use crate::sync::UnsafeCell;
use crate::{Config, RingError};
use std::mem::{self, MaybeUninit};
use std::ptr::{self, NonNull};

/// Fixed block of `capacity + 1` uninitialized slots.
///
/// `Slots` never tracks which slots are live; the owning ring does that with
/// its read and write indices and tells `Slots` which slot to construct into,
/// move out of, or destroy. No slot is ever default-initialized, so `T` needs
/// no `Default` and nothing is constructed twice.
///
/// Each slot is its own `UnsafeCell` so the producer can write slot `i` while
/// the consumer holds a reference into slot `j` without either access
/// covering the whole buffer.
pub(crate) struct Slots<T> {
    buf: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

impl<T> Slots<T> {
    /// Allocates storage for `config.capacity` usable slots.
    ///
    /// Allocation failure is reported here, at construction, rather than
    /// aborting the process.
    pub(crate) fn allocate(config: Config) -> Result<Self, RingError> {
        let slots = config.validate()?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(slots)
            .map_err(|source| RingError::Alloc { slots, source })?;
        buf.extend((0..slots).map(|_| UnsafeCell::new(MaybeUninit::uninit())));

        Ok(Self {
            buf: buf.into_boxed_slice(),
        })
    }

    /// Number of physical slots.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    /// Number of usable slots.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.len() - 1
    }

    /// Index following `index`, wrapping to 0.
    #[inline]
    pub(crate) fn next(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.len() {
            0
        } else {
            next
        }
    }

    /// Live elements between `read` and `write`.
    #[inline]
    pub(crate) fn occupied(&self, read: usize, write: usize) -> usize {
        //   [---R###W---]  write >= read
        //   [###W---R###]  wrapped
        let count = if write >= read {
            write - read
        } else {
            self.len() - read + write
        };
        debug_assert_bounded_count!(count, self.capacity());
        count
    }

    #[inline]
    pub(crate) fn is_full(&self, read: usize, write: usize) -> bool {
        self.next(write) == read
    }

    /// Constructs `value` in slot `index`.
    ///
    /// # Safety
    ///
    /// The slot must be dead and owned by the calling thread: it is the
    /// producer's write slot and the ring is not full.
    #[inline]
    pub(crate) unsafe fn write(&self, index: usize, value: T) {
        debug_assert_slot_in_bounds!(index, self.len());
        // SAFETY: the caller owns the dead slot; no other reference to it exists.
        self.buf[index].with_mut(|slot| unsafe { slot.write(MaybeUninit::new(value)) });
    }

    /// Moves the value at the front of the live range `[read, write)` out,
    /// leaving the slot dead.
    ///
    /// # Safety
    ///
    /// `read != write`, both were observed with ordering that makes the slot's
    /// contents visible, and the caller is the consumer.
    #[inline]
    pub(crate) unsafe fn take(&self, read: usize, write: usize) -> T {
        debug_assert_slot_in_bounds!(read, self.len());
        debug_assert_live_slot!(read, read, write);
        // SAFETY: the slot is live and owned by the consumer; the bitwise read
        // transfers ownership and the slot is treated as dead from here on.
        self.buf[read].with(|slot| unsafe { (*slot).assume_init_read() })
    }

    /// Pointer to the value at the front of the live range `[read, write)`.
    ///
    /// # Safety
    ///
    /// Same as [`take`](Self::take). The pointer is valid until the front
    /// value is removed.
    #[inline]
    pub(crate) unsafe fn front(&self, read: usize, write: usize) -> NonNull<T> {
        debug_assert_slot_in_bounds!(read, self.len());
        debug_assert_live_slot!(read, read, write);
        // SAFETY: slice element pointers are never null; `MaybeUninit<T>` has
        // the layout of `T`.
        self.buf[read].with_mut(|slot| unsafe { NonNull::new_unchecked(slot.cast::<T>()) })
    }

    /// Destroys every live value in `[read, write)`.
    ///
    /// Skipped entirely when `T` has no drop glue.
    ///
    /// # Safety
    ///
    /// `read` and `write` must be the ring's final indices, and no producer or
    /// consumer may still be running.
    pub(crate) unsafe fn drop_live(&mut self, read: usize, write: usize) {
        if !mem::needs_drop::<T>() {
            return;
        }

        debug_assert_bounded_count!(self.occupied(read, write), self.capacity());

        let mut index = read;
        while index != write {
            debug_assert_live_slot!(index, read, write);
            // SAFETY: every slot in the live range holds a value that is
            // dropped exactly once here.
            self.buf[index].with_mut(|slot| unsafe { ptr::drop_in_place(slot.cast::<T>()) });
            index = self.next(index);
        }
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_reserves_extra_slot() {
        let slots = Slots::<u64>::allocate(Config::new(9)).unwrap();
        assert_eq!(slots.len(), 10);
        assert_eq!(slots.capacity(), 9);
    }

    #[test]
    fn test_next_wraps() {
        let slots = Slots::<u64>::allocate(Config::new(3)).unwrap();
        assert_eq!(slots.next(0), 1);
        assert_eq!(slots.next(2), 3);
        assert_eq!(slots.next(3), 0);
    }

    #[test]
    fn test_occupied_and_full() {
        let slots = Slots::<u64>::allocate(Config::new(4)).unwrap(); // 5 physical

        assert_eq!(slots.occupied(0, 0), 0);
        assert_eq!(slots.occupied(1, 4), 3);
        assert_eq!(slots.occupied(3, 1), 3);
        assert_eq!(slots.occupied(0, 4), 4);
        assert_eq!(slots.occupied(2, 1), 4);

        assert!(slots.is_full(0, 4));
        assert!(slots.is_full(2, 1));
        assert!(!slots.is_full(0, 3));
        assert!(!slots.is_full(3, 3));
    }

    #[test]
    fn test_write_take_front() {
        let slots = Slots::<String>::allocate(Config::new(2)).unwrap();

        unsafe {
            slots.write(0, String::from("front"));
            slots.write(1, String::from("back"));

            assert_eq!(slots.front(0, 2).as_ref(), "front");
            assert_eq!(slots.take(0, 2), "front");
            assert_eq!(slots.take(1, 2), "back");
        }
    }

    #[test]
    fn test_drop_live_wrapped_range() {
        use std::rc::Rc;

        let tracker = Rc::new(());
        let mut slots = Slots::<Rc<()>>::allocate(Config::new(3)).unwrap(); // 4 physical

        // Live range [3, 1): slots 3 and 0
        unsafe {
            slots.write(3, Rc::clone(&tracker));
            slots.write(0, Rc::clone(&tracker));
        }
        assert_eq!(Rc::strong_count(&tracker), 3);

        unsafe { slots.drop_live(3, 1) };
        assert_eq!(Rc::strong_count(&tracker), 1);
    }
}
