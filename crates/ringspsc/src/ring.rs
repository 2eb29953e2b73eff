use crate::{Config, RingError};
use crossbeam_utils::Backoff;
use std::marker::PhantomData;
use std::ptr::NonNull;

// =============================================================================
// SHARED CONTRACT
// =============================================================================
//
// Every variant stores `capacity + 1` slots and two wrapped indices:
//
// - `write`: next slot to fill. Written only by the producer.
// - `read`:  next slot to consume. Written only by the consumer.
//
// Empty iff `read == write`; full iff `next(write) == read`. One slot is
// always left unused so these two states are distinguishable without a
// shared counter.
//
// **Producer (try_insert):**
// 1. Load own index `write`
// 2. Load `read` to decide "full"
// 3. Construct the value in `slots[write]`
// 4. Store `next(write)` (publishes the slot to the consumer)
//
// **Consumer (try_remove / peek):**
// 1. Load own index `read`
// 2. Load `write` to decide "empty"
// 3. Move the value out of `slots[read]`
// 4. Store `next(read)` (hands the slot back to the producer)
//
// How steps 1, 2 and 4 are synchronized is what distinguishes the variants.
// A slot is owned by exactly one thread at a time: the producer between
// observing it free and publishing it, the consumer between observing it
// published and handing it back.
//
// =============================================================================

/// The contract shared by all four ring variants.
///
/// The `unsafe` methods are the raw API. Each may be called only from the
/// side it belongs to, and at most one thread may act as producer and one
/// as consumer over the ring's lifetime. Use [`split`](Self::split) to get
/// [`Producer`] and [`Consumer`] handles that enforce this at compile time.
///
/// The occupancy queries may be called from anywhere. They are snapshots:
/// exact only when neither index is changing concurrently.
///
/// # Safety
///
/// Implementors must guarantee that, under the single-producer
/// single-consumer discipline, a value constructed by `try_insert` is fully
/// visible to the consumer once `try_remove` or `peek` observes it, and that
/// a slot released by the consumer is not reused by the producer before the
/// consumer is done with it.
pub unsafe trait RingBuffer: Sized {
    /// Element type.
    type Item;

    /// Creates a ring with `config.capacity` usable slots.
    fn with_config(config: Config) -> Result<Self, RingError>;

    /// Creates a ring with `capacity` usable slots.
    fn with_capacity(capacity: usize) -> Result<Self, RingError> {
        Self::with_config(Config::new(capacity))
    }

    /// Maximum number of live elements.
    fn capacity(&self) -> usize;

    /// Approximate number of live elements.
    ///
    /// From the consumer the true count may be higher (the producer may be
    /// inserting); from the producer it may be lower.
    fn size_estimate(&self) -> usize;

    /// Approximate emptiness check.
    fn is_empty(&self) -> bool;

    /// Approximate fullness check.
    fn is_full(&self) -> bool;

    /// Inserts `value`, or hands it back untouched if the ring is full.
    ///
    /// # Safety
    ///
    /// Must only be called by the single producer.
    unsafe fn try_insert(&self, value: Self::Item) -> Result<(), Self::Item>;

    /// Removes the front value, or returns `None` if the ring is empty.
    ///
    /// # Safety
    ///
    /// Must only be called by the single consumer, and no pointer from
    /// [`peek`](Self::peek) may be used afterwards.
    unsafe fn try_remove(&self) -> Option<Self::Item>;

    /// Pointer to the front value, or `None` if the ring is empty.
    ///
    /// # Safety
    ///
    /// Must only be called by the single consumer. The pointer is valid until
    /// the consumer's next `try_remove`.
    unsafe fn peek(&self) -> Option<NonNull<Self::Item>>;

    /// Splits the ring into its producer and consumer handles.
    ///
    /// Both handles borrow the ring, which therefore outlives any thread they
    /// are moved into (use `std::thread::scope`).
    fn split(&mut self) -> (Producer<'_, Self>, Consumer<'_, Self>) {
        let ring: &Self = self;
        (
            Producer {
                ring,
                _not_sync: PhantomData,
            },
            Consumer {
                ring,
                _not_sync: PhantomData,
            },
        )
    }
}

// =============================================================================
// HANDLES
// =============================================================================

/// The producing half of a split ring.
///
/// Not `Clone`: holding the only `Producer` is what makes calls to the raw
/// `try_insert` sound.
pub struct Producer<'a, R: RingBuffer> {
    ring: &'a R,
    // `Send` but not `Sync`: the producer role moves between threads but is
    // never shared.
    _not_sync: PhantomData<std::cell::Cell<()>>,
}

impl<R: RingBuffer> Producer<'_, R> {
    /// Inserts `value`, or returns it if the ring is full.
    #[inline]
    pub fn try_insert(&mut self, value: R::Item) -> Result<(), R::Item> {
        // SAFETY: this is the only producer handle for the ring.
        unsafe { self.ring.try_insert(value) }
    }

    /// Retries `try_insert` with adaptive backoff (spin, then yield) and
    /// gives up once the backoff is exhausted, returning the value.
    pub fn insert_with_backoff(&mut self, value: R::Item) -> Result<(), R::Item> {
        let backoff = Backoff::new();
        let mut value = value;
        loop {
            match self.try_insert(value) {
                Ok(()) => return Ok(()),
                Err(rejected) => value = rejected,
            }
            if backoff.is_completed() {
                return Err(value);
            }
            backoff.snooze();
        }
    }

    /// See [`RingBuffer::capacity`].
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// See [`RingBuffer::size_estimate`]. May over-count from this side.
    #[inline]
    pub fn size_estimate(&self) -> usize {
        self.ring.size_estimate()
    }

    /// See [`RingBuffer::is_empty`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// See [`RingBuffer::is_full`]. A `false` result stays valid until this
    /// producer inserts.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}

/// The consuming half of a split ring.
///
/// Not `Clone`: holding the only `Consumer` is what makes calls to the raw
/// `try_remove` and `peek` sound.
pub struct Consumer<'a, R: RingBuffer> {
    ring: &'a R,
    _not_sync: PhantomData<std::cell::Cell<()>>,
}

impl<R: RingBuffer> Consumer<'_, R> {
    /// Removes the front value, or returns `None` if the ring is empty.
    #[inline]
    pub fn try_remove(&mut self) -> Option<R::Item> {
        // SAFETY: this is the only consumer handle; `&mut self` guarantees no
        // reference from `peek` is still alive.
        unsafe { self.ring.try_remove() }
    }

    /// Retries `try_remove` with adaptive backoff and gives up once the
    /// backoff is exhausted.
    pub fn remove_with_backoff(&mut self) -> Option<R::Item> {
        let backoff = Backoff::new();
        loop {
            if let Some(value) = self.try_remove() {
                return Some(value);
            }
            if backoff.is_completed() {
                return None;
            }
            backoff.snooze();
        }
    }

    /// Borrows the front value without removing it.
    #[inline]
    pub fn peek(&self) -> Option<&R::Item> {
        // SAFETY: only this consumer removes values, and it cannot do so
        // while the returned shared borrow of `self` is alive.
        unsafe { self.ring.peek().map(|front| front.as_ref()) }
    }

    /// Mutably borrows the front value for in-place modification.
    #[inline]
    pub fn peek_mut(&mut self) -> Option<&mut R::Item> {
        // SAFETY: as for `peek`; the producer never touches a published slot.
        unsafe { self.ring.peek().map(|mut front| front.as_mut()) }
    }

    /// Destroys the front value without returning it.
    ///
    /// Returns `false` if the ring was empty.
    #[inline]
    pub fn discard(&mut self) -> bool {
        self.try_remove().is_some()
    }

    /// See [`RingBuffer::capacity`].
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// See [`RingBuffer::size_estimate`]. May under-count from this side.
    #[inline]
    pub fn size_estimate(&self) -> usize {
        self.ring.size_estimate()
    }

    /// See [`RingBuffer::is_empty`]. A `false` result stays valid until this
    /// consumer removes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// See [`RingBuffer::is_full`].
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}
