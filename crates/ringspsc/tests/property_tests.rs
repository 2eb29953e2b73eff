//! Property-based tests for the ring buffer invariants.
//!
//! Each ring variant is driven by random operation sequences and compared
//! against a `VecDeque` bounded to the same capacity.
//!
//! Coverage:
//! - Bounded count: `0 ≤ size ≤ capacity` after every operation
//! - FIFO order: removes return inserts in order
//! - Empty/full states agree with the model
//! - Round trip: insert then remove yields the same value

#![cfg(not(feature = "loom"))]

use proptest::prelude::*;
use ringspsc_rs::{AcqRelRing, MutexRing, PaddedRing, RingBuffer, SeqCstRing};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Insert(u32),
    Remove,
    Peek,
    Discard,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u32>().prop_map(Op::Insert),
        2 => Just(Op::Remove),
        1 => Just(Op::Peek),
        1 => Just(Op::Discard),
    ]
}

/// Applies `ops` to a fresh ring and to a `VecDeque` model, checking they
/// agree after every step.
fn check_against_model<R: RingBuffer<Item = u32>>(
    capacity: usize,
    ops: &[Op],
) -> Result<(), TestCaseError> {
    let mut ring = R::with_capacity(capacity).unwrap();
    let (mut producer, mut consumer) = ring.split();
    let mut model = VecDeque::with_capacity(capacity);

    for op in ops {
        match *op {
            Op::Insert(value) => {
                let result = producer.try_insert(value);
                if model.len() < capacity {
                    prop_assert_eq!(result, Ok(()));
                    model.push_back(value);
                } else {
                    prop_assert_eq!(result, Err(value), "insert into full ring succeeded");
                }
            }
            Op::Remove => {
                prop_assert_eq!(consumer.try_remove(), model.pop_front());
            }
            Op::Peek => {
                prop_assert_eq!(consumer.peek(), model.front());
            }
            Op::Discard => {
                prop_assert_eq!(consumer.discard(), model.pop_front().is_some());
            }
        }

        prop_assert_eq!(consumer.size_estimate(), model.len());
        prop_assert!(consumer.size_estimate() <= capacity,
            "size {} exceeds capacity {}", consumer.size_estimate(), capacity);
        prop_assert_eq!(consumer.is_empty(), model.is_empty());
        prop_assert_eq!(producer.is_full(), model.len() == capacity);
    }

    // Drain: remaining values come out in insertion order.
    for expected in model.drain(..) {
        prop_assert_eq!(consumer.try_remove(), Some(expected));
    }
    prop_assert!(consumer.is_empty());
    prop_assert_eq!(consumer.try_remove(), None);
    Ok(())
}

macro_rules! property_suite {
    ($module:ident, $ring:ident) => {
        mod $module {
            use super::*;

            proptest! {
                #[test]
                fn prop_matches_bounded_fifo_model(
                    capacity in 1usize..16,
                    ops in prop::collection::vec(op_strategy(), 0..200),
                ) {
                    check_against_model::<$ring<u32>>(capacity, &ops)?;
                }

                #[test]
                fn prop_fifo_order(values in prop::collection::vec(any::<u32>(), 1..64)) {
                    let mut ring = $ring::<u32>::new(values.len()).unwrap();
                    let (mut producer, mut consumer) = ring.split();

                    for &value in &values {
                        prop_assert!(producer.try_insert(value).is_ok());
                    }
                    prop_assert!(producer.is_full());

                    let drained: Vec<_> = std::iter::from_fn(|| consumer.try_remove()).collect();
                    prop_assert_eq!(drained, values);
                }

                #[test]
                fn prop_capacity_ceiling(capacity in 1usize..64) {
                    let mut ring = $ring::<usize>::new(capacity).unwrap();
                    let (mut producer, _consumer) = ring.split();

                    for i in 0..capacity {
                        prop_assert!(producer.try_insert(i).is_ok());
                    }
                    prop_assert_eq!(producer.try_insert(capacity), Err(capacity));
                    prop_assert!(producer.is_full());
                }

                #[test]
                fn prop_round_trip(value in any::<String>(), offset in 0usize..8) {
                    let mut ring = $ring::<String>::new(4).unwrap();
                    let (mut producer, mut consumer) = ring.split();

                    // Shift the indices so the round trip may straddle the wrap.
                    for _ in 0..offset {
                        prop_assert!(producer.try_insert(String::new()).is_ok());
                        prop_assert!(consumer.discard());
                    }

                    prop_assert!(producer.try_insert(value.clone()).is_ok());
                    prop_assert_eq!(consumer.try_remove(), Some(value));
                    prop_assert!(consumer.is_empty());
                }
            }
        }
    };
}

property_suite!(mutex_ring, MutexRing);
property_suite!(seq_cst_ring, SeqCstRing);
property_suite!(acq_rel_ring, AcqRelRing);
property_suite!(padded_ring, PaddedRing);
