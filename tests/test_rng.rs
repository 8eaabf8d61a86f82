// Tests for RNG reproducibility and distribution.

use sparse_coding::utils::SimpleRng;

// ============================================================================
// Reproducibility Tests
// ============================================================================

mod reproducibility_tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_different_seeds_different_sequences() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(67890);

        let same = (0..100)
            .filter(|_| rng1.next_u32() == rng2.next_u32())
            .count();
        assert!(same < 5, "sequences should differ, {} matches", same);
    }

    #[test]
    fn test_clone_continues_identically() {
        let mut rng = SimpleRng::new(99);
        rng.next_u32();
        let mut copy = rng.clone();

        for _ in 0..50 {
            assert_eq!(rng.next_f64(), copy.next_f64());
        }
    }

    #[test]
    fn test_reseed_from_time_changes_state() {
        let mut rng = SimpleRng::new(42);
        let before = rng.clone();
        rng.reseed_from_time();
        assert_ne!(rng, before);
    }
}

// ============================================================================
// Distribution Tests
// ============================================================================

mod distribution_tests {
    use super::*;

    #[test]
    fn test_gen_range_f64_mean() {
        let mut rng = SimpleRng::new(2024);
        let n = 10_000;

        let mean = (0..n).map(|_| rng.gen_range_f64(-0.5, 0.5)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.02, "mean {} too far from 0", mean);
    }

    #[test]
    fn test_gen_usize_covers_all_values() {
        let mut rng = SimpleRng::new(31337);
        let mut counts = [0usize; 10];

        for _ in 0..10_000 {
            counts[rng.gen_usize(10)] += 1;
        }

        for (value, &count) in counts.iter().enumerate() {
            assert!(
                count > 800 && count < 1200,
                "value {} drawn {} times",
                value,
                count
            );
        }
    }

    #[test]
    fn test_gen_usize_inclusive_bounds() {
        let mut rng = SimpleRng::new(4242);
        let mut min = usize::MAX;
        let mut max = 0;

        for _ in 0..5000 {
            let v = rng.gen_usize_inclusive(12);
            min = min.min(v);
            max = max.max(v);
        }

        assert_eq!(min, 0);
        assert_eq!(max, 12);
    }

    #[test]
    fn test_gen_usize_inclusive_zero() {
        let mut rng = SimpleRng::new(8);
        for _ in 0..100 {
            assert_eq!(rng.gen_usize_inclusive(0), 0);
        }
    }
}
