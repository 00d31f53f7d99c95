//! Keeps a bounded history per metric and reads back both the current value
//! and a uniform sample of everything seen so far.
//!
//! Run with:
//!     cargo run --example current_and_history --release

use keyed_reservoir::listener::DiscardCause;
use keyed_reservoir::{Reservoir, ReservoirBuilder};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Samples kept per metric.
const CAP: usize = 8;
/// Points generated per metric.
const POINTS: u64 = 100_000;

struct Xorshift64(u64);

impl Xorshift64 {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

fn main() {
    let evicted = Arc::new(AtomicU64::new(0));
    let evicted2 = Arc::clone(&evicted);

    let reservoir: Reservoir<&'static str, (u64, u64)> = ReservoirBuilder::new(CAP)
        .seed(2024)
        .discard_listener(move |_metric: &&'static str, _point, cause| {
            if cause == DiscardCause::Evicted {
                evicted2.fetch_add(1, Ordering::Relaxed);
            }
        })
        .build();

    let metrics = ["loss", "accuracy", "learning_rate"];
    let handles: Vec<_> = metrics
        .iter()
        .enumerate()
        .map(|(i, &metric)| {
            let reservoir = reservoir.clone();
            std::thread::spawn(move || {
                let mut rng = Xorshift64(0x9E37_79B9_7F4A_7C15 ^ i as u64);
                for step in 0..POINTS {
                    reservoir.add_item(metric, (step, rng.next() % 1_000));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("writer thread panicked");
    }

    let mut keys = reservoir.keys();
    keys.sort_unstable();
    for metric in keys {
        let Ok(history) = reservoir.items(&metric) else {
            continue;
        };
        let Ok((step, value)) = reservoir.last_item(&metric) else {
            continue;
        };
        let steps: Vec<u64> = history.iter().map(|(s, _)| *s).collect();
        println!("{metric:<14} current step={step:>6} value={value:>4}  sampled steps={steps:?}");
    }

    let stats = reservoir.stats();
    println!(
        "\noffers={} evictions={} (listener saw {}) overwrites={} buckets={}",
        stats.offers,
        stats.evictions,
        evicted.load(Ordering::Relaxed),
        stats.overwrites,
        stats.buckets
    );
}
