use ai_core::{DeterministicRng, RandomSource, SplitMix64, TickContext};
use proptest::prelude::*;

#[test]
fn agent_streams_are_reproducible() {
    let ctx = TickContext::new(0, 0.1, 42);
    let mut a = ctx.rng_for_agent(7u64, 1);
    let mut b = ctx.rng_for_agent(7u64, 1);
    let mut c = ctx.rng_for_agent(8u64, 1);

    let xs: Vec<u32> = (0..8).map(|_| a.range_u32(0, 1000)).collect();
    let ys: Vec<u32> = (0..8).map(|_| b.range_u32(0, 1000)).collect();
    let zs: Vec<u32> = (0..8).map(|_| c.range_u32(0, 1000)).collect();

    assert_eq!(xs, ys);
    assert_ne!(xs, zs);
}

#[test]
fn empty_ranges_collapse_to_lower_bound() {
    let mut rng = SplitMix64::new(1);
    assert_eq!(rng.range_f32(2.0, 2.0), 2.0);
    assert_eq!(rng.range_f32(3.0, 1.0), 3.0);
    assert_eq!(rng.range_u32(5, 5), 5);
    assert_eq!(rng.range_u32(5, 1), 5);
}

struct Scripted(Vec<u64>);

impl DeterministicRng for Scripted {
    fn next_u64(&mut self) -> u64 {
        self.0.remove(0)
    }
}

#[test]
fn integer_draws_reject_the_biased_tail() {
    // 2^64 - 1 is a multiple of 3, so the top value would skew toward 0.
    let mut rng = Scripted(vec![u64::MAX, 7]);
    assert_eq!(rng.range_u32(0, 2), 1);
    assert!(rng.0.is_empty());
}

#[test]
fn full_width_integer_range_does_not_overflow() {
    let mut rng = SplitMix64::new(3);
    for _ in 0..64 {
        rng.range_u32(0, u32::MAX);
    }
    let mut top = Scripted(vec![(1 << 32) - 1]);
    assert_eq!(top.range_u32(0, u32::MAX), u32::MAX);
}

#[test]
fn small_integer_range_hits_every_value() {
    let mut rng = SplitMix64::new(11);
    let mut seen = [0u32; 4];
    for _ in 0..400 {
        let x = rng.range_u32(10, 13);
        assert!((10..=13).contains(&x));
        seen[(x - 10) as usize] += 1;
    }
    assert!(seen.iter().all(|&n| n > 50), "{seen:?}");
}

#[test]
fn delta_is_clamped() {
    assert_eq!(TickContext::new(0, -1.0, 0).delta(), 0.0);
    assert_eq!(TickContext::new(0, f32::NAN, 0).delta(), 0.0);
    assert_eq!(TickContext::new(0, 0.25, 0).delta(), 0.25);
}

proptest! {
    #[test]
    fn range_f32_stays_half_open(seed in any::<u64>(), lo in -100.0f32..100.0, span in 0.001f32..50.0) {
        let mut rng = SplitMix64::new(seed);
        let hi = lo + span;
        for _ in 0..32 {
            let x = rng.range_f32(lo, hi);
            prop_assert!(x >= lo && x < hi);
        }
    }

    #[test]
    fn range_u32_is_inclusive(seed in any::<u64>(), lo in 0u32..100, span in 0u32..10) {
        let mut rng = SplitMix64::new(seed);
        let hi = lo + span;
        for _ in 0..32 {
            let x = rng.range_u32(lo, hi);
            prop_assert!(x >= lo && x <= hi);
        }
    }
}
