//! Property-based tests using proptest
//!
//! Invariants that must hold for every seed and difficulty:
//! - Generation: 4 distinct finite options, answer present exactly once
//! - Answer checking: the formatted answer is accepted when typed back
//! - Determinism: same seed → same problem sequence
//! - Drops: quantities stay inside the entry's range

use proptest::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use spirits_core::audit::check_problem;
use spirits_core::bank::ProblemBank;
use spirits_core::drops::DropTable;
use spirits_core::problem::{generators, parse_answer, ProblemKind};

fn any_kind() -> impl Strategy<Value = ProblemKind> {
    (0..ProblemKind::all().len()).prop_map(|i| ProblemKind::all()[i])
}

// ============================================================
// Generator Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_generated_problems_are_valid(seed in any::<u64>(), kind in any_kind(), difficulty in 1u8..=5) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let problem = generators::generate(kind, difficulty, &mut rng);
        let violations = check_problem(&problem);
        prop_assert!(violations.is_empty(), "{:?} for {}", violations, problem.to_json());
        prop_assert_eq!(problem.kind, kind);
        prop_assert_eq!(problem.topic, kind.topic());
    }

    #[test]
    fn prop_formatted_answer_is_accepted(seed in any::<u64>(), kind in any_kind(), difficulty in 1u8..=5) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let problem = generators::generate(kind, difficulty, &mut rng);
        let typed = problem.formatted_answer();
        prop_assert_eq!(problem.check_input(&typed), Ok(true), "typed {:?} for {}", typed, problem.question);
    }

    #[test]
    fn prop_only_correct_option_passes(seed in any::<u64>(), kind in any_kind(), difficulty in 1u8..=5) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let problem = generators::generate(kind, difficulty, &mut rng);
        for (i, option) in problem.options.iter().enumerate() {
            prop_assert_eq!(problem.check_option(i), i == problem.correct_index);
            prop_assert_eq!(problem.check_answer(*option), i == problem.correct_index);
        }
    }

    #[test]
    fn prop_bank_is_deterministic(seed in any::<u64>(), difficulty in 1u8..=5) {
        let mut a = ProblemBank::new(seed, difficulty);
        let mut b = ProblemBank::new(seed, difficulty);
        for _ in 0..5 {
            prop_assert_eq!(a.generate_random(), b.generate_random());
        }
        prop_assert_eq!(a.generated_count(), 5);
    }
}

// ============================================================
// Answer Parsing Properties
// ============================================================

proptest! {
    #[test]
    fn prop_integers_parse_exactly(n in -1_000_000i64..1_000_000) {
        prop_assert_eq!(parse_answer(&n.to_string()), Ok(n as f64));
    }

    #[test]
    fn prop_fractions_parse(num in -500i64..500, den in 1i64..500) {
        let parsed = parse_answer(&format!("{num}/{den}")).unwrap();
        prop_assert!((parsed - num as f64 / den as f64).abs() < 1e-12);
    }

    #[test]
    fn prop_mixed_numbers_parse(whole in 0i64..100, num in 0i64..9, den in 10i64..20) {
        let parsed = parse_answer(&format!("{whole} {num}/{den}")).unwrap();
        prop_assert!((parsed - (whole as f64 + num as f64 / den as f64)).abs() < 1e-12);
    }

    #[test]
    fn prop_garbage_never_panics(s in "\\PC*") {
        let _ = parse_answer(&s);
    }
}

// ============================================================
// Drop Properties
// ============================================================

proptest! {
    #[test]
    fn prop_drop_quantities_in_range(seed in any::<u64>()) {
        let table = DropTable::default_table();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let drop = table.roll(&mut rng).unwrap();
        let entry = table.entries.iter().find(|e| e.item_id == drop.item_id).unwrap();
        prop_assert!(drop.quantity >= entry.min_quantity && drop.quantity <= entry.max_quantity);
        prop_assert_eq!(drop.rarity, entry.rarity);
    }
}
