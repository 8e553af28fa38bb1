//! Randomized checks of the cleaning invariants

use edu_trajectory::algorithm::education::{
    MAX_LEVEL, NEVER_SCHOOLED, RoundingRule, clean, interpolate, max_level_at_age, validate,
};
use edu_trajectory::algorithm::education::interpolator::within_boundaries;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CASES: usize = 2_000;

/// Random yearly sequence; `never_schooled` controls whether 98 is reported
fn random_sequence(rng: &mut StdRng, never_schooled: bool) -> (Vec<i32>, Vec<Option<i32>>) {
    let len = rng.random_range(0..16);
    let first_age = rng.random_range(3..32);
    let ages: Vec<i32> = (first_age..first_age + len).collect();
    let levels = ages
        .iter()
        .map(|_| {
            if rng.random_bool(0.3) {
                None
            } else if rng.random_bool(0.05) {
                Some(-1)
            } else if never_schooled && rng.random_bool(0.1) {
                Some(NEVER_SCHOOLED)
            } else {
                Some(rng.random_range(0..=MAX_LEVEL + 2))
            }
        })
        .collect();
    (ages, levels)
}

#[test]
fn test_output_length_matches_input() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..CASES {
        let (ages, levels) = random_sequence(&mut rng, true);
        let cleaned = clean(&ages, &levels).unwrap();
        assert_eq!(cleaned.len(), levels.len());
        assert_eq!(interpolate(&cleaned, RoundingRule::HalfUp).len(), levels.len());
    }
}

#[test]
fn test_cleaned_sequences_validate() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..CASES {
        let (ages, levels) = random_sequence(&mut rng, false);
        let cleaned = clean(&ages, &levels).unwrap();
        assert!(
            validate(&ages, &cleaned),
            "ages {ages:?} levels {levels:?} cleaned {cleaned:?}"
        );
    }
}

#[test]
fn test_cleaned_levels_respect_age_bound() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..CASES {
        let (ages, levels) = random_sequence(&mut rng, true);
        let cleaned = clean(&ages, &levels).unwrap();
        for (&age, level) in ages.iter().zip(&cleaned) {
            if let Some(level) = *level {
                assert!(level == NEVER_SCHOOLED || level <= max_level_at_age(age).unwrap());
                if level == NEVER_SCHOOLED {
                    assert!(age >= 10);
                }
            }
        }
    }
}

#[test]
fn test_clean_is_idempotent_on_complete_output() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut complete = 0;
    for _ in 0..CASES {
        let (ages, levels) = random_sequence(&mut rng, true);
        let cleaned = clean(&ages, &levels).unwrap();
        if cleaned.iter().all(Option::is_some) {
            complete += 1;
            assert_eq!(clean(&ages, &cleaned).unwrap(), cleaned, "ages {ages:?}");
        }
    }
    assert!(complete > 0);
}

#[test]
fn test_interpolated_values_stay_between_boundaries() {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..CASES {
        let (ages, levels) = random_sequence(&mut rng, true);
        let cleaned = clean(&ages, &levels).unwrap();
        for rounding in [RoundingRule::HalfUp, RoundingRule::HalfEven] {
            let filled = interpolate(&cleaned, rounding);
            let known: Vec<(usize, i32)> = cleaned
                .iter()
                .enumerate()
                .filter_map(|(i, level)| level.map(|level| (i, level)))
                .collect();
            for pair in known.windows(2) {
                let ((start, from), (end, to)) = (pair[0], pair[1]);
                for value in filled[start + 1..end].iter().flatten() {
                    if from != NEVER_SCHOOLED && to != NEVER_SCHOOLED {
                        assert!(within_boundaries(*value, from, to));
                    }
                }
                if from == NEVER_SCHOOLED && to != NEVER_SCHOOLED {
                    assert!(filled[start + 1..end].iter().all(Option::is_none));
                }
            }
        }
    }
}
