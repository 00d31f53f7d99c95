use keyed_reservoir::{Capacity, Reservoir, ReservoirBucket, ReservoirBuilder};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Statistical behaviour
// ---------------------------------------------------------------------------

/// Empirical inclusion frequencies over many seeds.
///
/// The newest item is kept in every trial, which leaves `cap - 1` sampled
/// slots for the rest of the stream: the first `cap - 1` items survive with
/// probability `cap / n`, every later non-newest item with `(cap - 1) / n`.
/// Both tend to `cap / n` as `cap` grows.
#[test]
fn inclusion_frequency_converges() {
    const CAP: usize = 5;
    const N: usize = 20;
    const TRIALS: u64 = 4_000;

    let mut hits = [0u64; N];
    for seed in 0..TRIALS {
        let mut bucket = ReservoirBucket::new(Capacity::new(CAP), seed);
        for i in 0..N {
            bucket.add_item(i);
        }
        for &i in bucket.as_slice() {
            hits[i] += 1;
        }
    }

    for (i, &h) in hits.iter().enumerate() {
        let freq = h as f64 / TRIALS as f64;
        let expected = if i == N - 1 {
            1.0
        } else if i < CAP - 1 {
            CAP as f64 / N as f64
        } else {
            (CAP - 1) as f64 / N as f64
        };
        assert!(
            (freq - expected).abs() < 0.035,
            "item {i}: inclusion {freq:.3}, expected {expected:.3}"
        );
    }
}

#[test]
fn early_and_late_items_are_equally_likely() {
    const CAP: usize = 10;
    const N: usize = 1_000;
    const TRIALS: u64 = 500;

    let mut first_half = 0u64;
    let mut second_half = 0u64;
    for seed in 0..TRIALS {
        let r: Reservoir<u8, usize> = ReservoirBuilder::new(CAP).seed(seed).build();
        for i in 0..N {
            r.add_item(0, i);
        }
        // The newest item is always kept; compare the sampled slots only.
        for i in r.items(&0).unwrap().into_iter().filter(|&i| i != N - 1) {
            if i < N / 2 {
                first_half += 1;
            } else {
                second_half += 1;
            }
        }
    }

    let ratio = first_half as f64 / second_half as f64;
    assert!(
        (0.85..1.15).contains(&ratio),
        "first half {first_half} vs second half {second_half}"
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_bucket_invariants(
        cap in 0usize..20,
        n in 1usize..300,
        seed in any::<u64>()
    ) {
        let mut bucket = ReservoirBucket::new(Capacity::new(cap), seed);
        for i in 0..n {
            bucket.add_item(i);
            prop_assert_eq!(bucket.last(), Some(&i));
        }

        let expected_len = if cap == 0 { n } else { std::cmp::min(n, cap) };
        prop_assert_eq!(bucket.len(), expected_len);
        prop_assert_eq!(bucket.count(), n as u64);

        // Survivors keep their relative offer order.
        let items = bucket.items();
        prop_assert!(items.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prop_interleaving_does_not_change_samples(
        cap in 1usize..16,
        seed in any::<u64>(),
        len_a in 1u32..200,
        len_b in 1u32..200
    ) {
        let separate: Reservoir<u8, u32> = ReservoirBuilder::new(cap).seed(seed).build();
        let interleaved: Reservoir<u8, u32> = ReservoirBuilder::new(cap).seed(seed).build();

        for i in 0..len_a {
            separate.add_item(0, i);
        }
        for i in 0..len_b {
            separate.add_item(1, i);
        }
        for i in 0..len_a.max(len_b) {
            if i < len_b {
                interleaved.add_item(1, i);
            }
            if i < len_a {
                interleaved.add_item(0, i);
            }
        }

        prop_assert_eq!(separate.items(&0), interleaved.items(&0));
        prop_assert_eq!(separate.items(&1), interleaved.items(&1));
    }
}
