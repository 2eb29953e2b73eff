//! RingSPSC - Bounded Single-Producer Single-Consumer Ring Buffers
//!
//! One ring buffer, built four ways. All four share the [`RingBuffer`]
//! contract and differ only in how the two indices are synchronized:
//!
//! | Type | Synchronization |
//! |---|---|
//! | [`MutexRing`] | one mutex over both indices and all slots |
//! | [`SeqCstRing`] | two atomics, every access `SeqCst` |
//! | [`AcqRelRing`] | two atomics, Relaxed own index / Acquire other / Release publish |
//! | [`PaddedRing`] | as `AcqRelRing`, each index on its own cache line |
//!
//! # Key Features
//!
//! - `capacity + 1` uninitialized slots; values are constructed and moved
//!   out in place, never default-initialized
//! - Non-blocking `try_insert` / `try_remove` / `peek`; retry policy belongs
//!   to the caller
//! - [`split`](RingBuffer::split) into [`Producer`] and [`Consumer`] handles
//!   so the single-producer single-consumer rule is checked at compile time
//! - [`CACHE_LINE_SIZE`] exposed so the padding can be tested, not assumed
//!
//! # Example
//!
//! ```
//! use ringspsc_rs::{PaddedRing, RingBuffer};
//! use std::thread;
//!
//! let mut ring = PaddedRing::<u64>::new(1024).unwrap();
//! let (mut producer, mut consumer) = ring.split();
//!
//! thread::scope(|s| {
//!     s.spawn(move || {
//!         for i in 0..10_000u64 {
//!             let mut item = i;
//!             while let Err(rejected) = producer.try_insert(item) {
//!                 item = rejected;
//!                 thread::yield_now();
//!             }
//!         }
//!     });
//!
//!     s.spawn(move || {
//!         let mut expected = 0u64;
//!         while expected < 10_000 {
//!             match consumer.try_remove() {
//!                 Some(item) => {
//!                     assert_eq!(item, expected);
//!                     expected += 1;
//!                 }
//!                 None => thread::yield_now(),
//!             }
//!         }
//!     });
//! });
//!
//! assert!(ring.is_empty());
//! ```

#![warn(unsafe_op_in_unsafe_fn)]

mod acq_rel_ring;
mod config;
mod error;
mod invariants;
mod mutex_ring;
mod padded_ring;
mod ring;
mod seq_cst_ring;
mod slots;
mod sync;

pub use acq_rel_ring::AcqRelRing;
pub use config::{Config, CACHE_LINE_SIZE, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG};
pub use error::RingError;
pub use mutex_ring::MutexRing;
pub use padded_ring::PaddedRing;
pub use ring::{Consumer, Producer, RingBuffer};
pub use seq_cst_ring::SeqCstRing;
