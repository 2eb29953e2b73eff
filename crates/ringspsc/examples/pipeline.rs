use ringspsc_rs::{
    AcqRelRing, MutexRing, PaddedRing, RingBuffer, SeqCstRing, CACHE_LINE_SIZE, LOW_LATENCY_CONFIG,
};
use std::thread;

const ITEMS: u64 = 1_000_000;

/// Streams `ITEMS` values through `ring` and returns their sum.
///
/// The producer retries with backoff when the ring is full; the consumer
/// peeks at each value before removing it.
fn run<R: RingBuffer<Item = u64> + Sync>(mut ring: R) -> u64 {
    let (mut producer, mut consumer) = ring.split();

    thread::scope(|s| {
        s.spawn(move || {
            for i in 0..ITEMS {
                let mut item = i;
                while let Err(rejected) = producer.insert_with_backoff(item) {
                    item = rejected;
                }
            }
        });

        s.spawn(move || {
            let mut sum = 0u64;
            let mut received = 0u64;
            while received < ITEMS {
                let Some(&front) = consumer.peek() else {
                    thread::yield_now();
                    continue;
                };
                sum += front;
                received += 1;
                consumer.discard();
            }
            sum
        })
        .join()
        .unwrap()
    })
}

fn main() {
    println!("RingSPSC Pipeline Example");
    println!("=========================\n");

    println!("Configuration:");
    println!("  Ring capacity: {} slots", LOW_LATENCY_CONFIG.capacity);
    println!("  Cache line size: {} bytes", CACHE_LINE_SIZE);
    println!("  Items: {}\n", ITEMS);

    let expected = ITEMS * (ITEMS - 1) / 2;

    let sums = [
        ("MutexRing", run(MutexRing::with_config(LOW_LATENCY_CONFIG).unwrap())),
        ("SeqCstRing", run(SeqCstRing::with_config(LOW_LATENCY_CONFIG).unwrap())),
        ("AcqRelRing", run(AcqRelRing::with_config(LOW_LATENCY_CONFIG).unwrap())),
        ("PaddedRing", run(PaddedRing::with_config(LOW_LATENCY_CONFIG).unwrap())),
    ];

    for (name, sum) in sums {
        let status = if sum == expected { "ok" } else { "MISMATCH" };
        println!("  {:<12} sum = {} [{}]", name, sum, status);
    }
}
