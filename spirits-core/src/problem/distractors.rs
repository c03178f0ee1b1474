//! Distractor (wrong option) generation and number formatting.
//!
//! Options are built from common-mistake values first, then random offsets
//! around the answer. Any candidate within OPTION_EPSILON of the answer or of
//! an already chosen option is rejected.

use rand::Rng;

use crate::constants::{DISTRACTOR_ATTEMPTS, MAX_DECIMAL_PLACES, OPTION_COUNT, OPTION_EPSILON};

/// Count of significant decimal places (capped at MAX_DECIMAL_PLACES)
pub fn decimal_places(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let mut scaled = value.abs();
    for places in 0..MAX_DECIMAL_PLACES {
        if (scaled - scaled.round()).abs() < 1e-9 * scaled.max(1.0) {
            return places;
        }
        scaled *= 10.0;
    }
    MAX_DECIMAL_PLACES
}

pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    // + 0.0 normalizes -0.0
    (value * factor).round() / factor + 0.0
}

/// Display form with trailing zeros trimmed ("2.50" -> "2.5", "3.00" -> "3")
pub fn format_number(value: f64, precision: u32) -> String {
    let text = format!("{:.*}", precision as usize, round_to(value, precision));
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

fn is_acceptable(candidate: f64, answer: f64, chosen: &[f64]) -> bool {
    candidate.is_finite()
        && (candidate - answer).abs() > OPTION_EPSILON
        && !(answer >= 0.0 && candidate < 0.0)
        && chosen
            .iter()
            .all(|o| (o - candidate).abs() > OPTION_EPSILON)
}

/// Build the option list for an answer.
///
/// Returns the options (length OPTION_COUNT) and the index of the correct one.
/// `step` is the distance between neighbouring random distractors and
/// `spread` the maximum number of steps away from the answer.
pub fn build_options<R: Rng + ?Sized>(
    answer: f64,
    precision: u32,
    step: f64,
    spread: u32,
    mistakes: &[f64],
    rng: &mut R,
) -> (Vec<f64>, usize) {
    let wanted = OPTION_COUNT - 1;
    let spread = spread.max(1);
    let mut wrong: Vec<f64> = Vec::with_capacity(OPTION_COUNT);

    for &mistake in mistakes {
        if wrong.len() == wanted {
            break;
        }
        let candidate = round_to(mistake, precision);
        if is_acceptable(candidate, answer, &wrong) {
            wrong.push(candidate);
        }
    }

    let mut attempts = 0;
    while wrong.len() < wanted && attempts < DISTRACTOR_ATTEMPTS {
        attempts += 1;
        let steps = rng.gen_range(1..=spread) as f64;
        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let candidate = round_to(answer + sign * steps * step, precision);
        if is_acceptable(candidate, answer, &wrong) {
            wrong.push(candidate);
        }
    }

    // Deterministic fill: walk upwards until enough distinct values exist
    let fallback_step = step.max(answer.abs() * f64::EPSILON * 16.0);
    let mut k = 1.0;
    while wrong.len() < wanted {
        let candidate = round_to(answer + k * fallback_step, precision);
        if is_acceptable(candidate, answer, &wrong) {
            wrong.push(candidate);
        }
        k += 1.0;
    }

    let correct_index = rng.gen_range(0..OPTION_COUNT);
    wrong.insert(correct_index, answer);
    (wrong, correct_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn assert_valid(options: &[f64], index: usize, answer: f64) {
        assert_eq!(options.len(), OPTION_COUNT);
        assert_eq!(options[index], answer);
        for (i, a) in options.iter().enumerate() {
            for b in options.iter().skip(i + 1) {
                assert!((a - b).abs() > OPTION_EPSILON, "duplicate {a} / {b}");
            }
        }
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(3.0), 0);
        assert_eq!(decimal_places(0.5), 1);
        assert_eq!(decimal_places(0.25), 2);
        assert_eq!(decimal_places(-1.125), 3);
        assert_eq!(decimal_places(1.005), 3);
        assert_eq!(decimal_places(1.0 / 3.0), MAX_DECIMAL_PLACES);
        assert_eq!(decimal_places(f64::NAN), 0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-0.001, 2), 0.0);
        assert!(round_to(-0.001, 2).is_sign_positive());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.50, 2), "2.5");
        assert_eq!(format_number(3.0, 2), "3");
        assert_eq!(format_number(120.0, 0), "120");
        assert_eq!(format_number(-0.0001, 2), "0");
        assert_eq!(format_number(0.0625, 4), "0.0625");
    }

    #[test]
    fn test_mistakes_preferred() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let (options, index) = build_options(12.0, 0, 1.0, 5, &[10.0, 14.0, 20.0], &mut rng);
        assert_valid(&options, index, 12.0);
        for m in [10.0, 14.0, 20.0] {
            assert!(options.contains(&m));
        }
    }

    #[test]
    fn test_mistake_equal_to_answer_skipped() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let (options, index) = build_options(8.0, 0, 1.0, 5, &[8.0, 8.0004, 9.0], &mut rng);
        assert_valid(&options, index, 8.0);
        assert_eq!(options.iter().filter(|o| (**o - 8.0).abs() < 0.01).count(), 1);
    }

    #[test]
    fn test_no_negative_distractors_for_small_answers() {
        for seed in 0..50 {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let (options, index) = build_options(1.0, 0, 1.0, 9, &[], &mut rng);
            assert_valid(&options, index, 1.0);
            assert!(options.iter().all(|o| *o >= 0.0));
        }
    }

    #[test]
    fn test_zero_answer_with_tight_spread_falls_back() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let (options, index) = build_options(0.0, 0, 1.0, 1, &[], &mut rng);
        assert_valid(&options, index, 0.0);
    }

    #[test]
    fn test_decimal_step_options() {
        for seed in 0..50 {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let (options, index) = build_options(0.33, 2, 0.01, 5, &[0.5], &mut rng);
            assert_valid(&options, index, 0.33);
        }
    }

    #[test]
    fn test_negative_answer_allows_negative_options() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let (options, index) = build_options(-4.0, 0, 1.0, 3, &[4.0], &mut rng);
        assert_valid(&options, index, -4.0);
    }
}
