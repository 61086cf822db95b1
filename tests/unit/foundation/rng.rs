use super::*;

#[test]
fn hash01_is_pure_and_in_unit_range() {
    for seed in [0.0, 0.123456, 1.0, 17.5, -3.25, 1.0e6] {
        let a = hash01(seed);
        let b = hash01(seed);
        assert_eq!(a.to_bits(), b.to_bits());
        assert!((0.0..1.0).contains(&a), "seed {seed} -> {a}");
    }
    assert_ne!(hash01(1.0), hash01(2.0));
}

#[test]
fn lcg_matches_integer_recurrence() {
    let mut rng = SeededRandom::new(1.0);
    let expected = (1.0 * 1_664_525.0 + 1_013_904_223.0) / 4_294_967_296.0;
    assert_eq!(rng.next_f64(), expected);
}

#[test]
fn reset_replays_sequence() {
    let mut rng = SeededRandom::new(42.0);
    let first: Vec<f64> = (0..5).map(|_| rng.next_f64()).collect();
    rng.reset(42.0);
    let again: Vec<f64> = (0..5).map(|_| rng.next_f64()).collect();
    assert_eq!(first, again);
}

#[test]
fn range_stays_within_bounds() {
    let mut rng = SeededRandom::new(7.0);
    for _ in 0..1000 {
        let v = rng.range(0.8, 1.2);
        assert!((0.8..1.2).contains(&v));
    }
}

#[test]
fn negative_seed_still_yields_unit_values() {
    let mut rng = SeededRandom::new(-12345.0);
    for _ in 0..100 {
        assert!((0.0..1.0).contains(&rng.next_f64()));
    }
}

#[test]
fn shuffle_is_a_deterministic_permutation() {
    let mut a: Vec<u32> = (0..10).collect();
    let mut b = a.clone();
    SeededRandom::new(3.0).shuffle(&mut a);
    SeededRandom::new(3.0).shuffle(&mut b);
    assert_eq!(a, b);

    let mut sorted = a.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..10).collect::<Vec<_>>());
}
