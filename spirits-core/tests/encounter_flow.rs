//! Integration tests: full encounters driven through the public API.
//!
//! Mirrors how a client plays:
//!   1. Build player + spirit from config
//!   2. Draw problem → answer (option / typed / value)
//!   3. Resolve until victory, defeat or flight
//!   4. Apply rewards back to the player

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use spirits_core::bank::ProblemBank;
use spirits_core::battle::{BattleSettings, Encounter, EncounterState};
use spirits_core::drops::DropTable;
use spirits_core::engine::GameConfig;
use spirits_core::error::{BattleError, SpiritsError};
use spirits_core::player::PlayerStats;
use spirits_core::spirit::{Spirit, SpiritKind};

// ============================================================
// Helpers
// ============================================================

fn always_drop() -> BattleSettings {
    BattleSettings {
        drop_chance: 1.0,
        ..BattleSettings::default()
    }
}

/// Play until the encounter ends; `answer_correctly(turn)` decides each turn
fn play(
    encounter: &mut Encounter,
    bank: &mut ProblemBank,
    table: &DropTable,
    rng: &mut Xoshiro256PlusPlus,
    answer_correctly: impl Fn(u32) -> bool,
) -> u32 {
    let mut turn = 0;
    while !encounter.state().is_finished() {
        let problem = encounter.next_problem(bank).unwrap().clone();
        let index = if answer_correctly(turn) {
            problem.correct_index
        } else {
            (problem.correct_index + 1) % problem.options.len()
        };
        encounter.submit_option(index, table, rng).unwrap();
        turn += 1;
        assert!(turn < 200, "encounter never ended");
    }
    turn
}

// ============================================================
// Flows
// ============================================================

#[test]
fn test_perfect_run_wins_and_levels_up() {
    let config = GameConfig::default();
    let mut player = config.new_player();
    let mut bank = ProblemBank::new(config.bank.seed, 1);
    let table = config.drop_table();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

    for _ in 0..3 {
        let spirit = Spirit::new(SpiritKind::Multiplication, 3);
        let mut encounter = Encounter::new(&player, spirit, always_drop());
        play(&mut encounter, &mut bank, &table, &mut rng, |_| true);
        assert_eq!(encounter.state(), EncounterState::Victory);
        // every correct answer drops with chance 1
        assert_eq!(encounter.drops().len() as u32, encounter.summary().correct);
        encounter.apply_to_player(&mut player).unwrap();
    }

    assert!(player.level > 1);
    assert_eq!(player.hp, player.max_hp);
    assert!(player.inventory.total_items() > 0);
}

#[test]
fn test_mixed_answers_track_accuracy_and_combo() {
    let player = PlayerStats::new("Ada");
    let mut bank = ProblemBank::new(9, 2);
    let table = DropTable::default_table();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
    let mut encounter = Encounter::new(
        &player,
        Spirit::new(SpiritKind::Fraction, 1),
        BattleSettings::default(),
    );

    // wrong on every third turn
    let turns = play(&mut encounter, &mut bank, &table, &mut rng, |t| t % 3 != 2);
    let summary = encounter.summary();
    assert_eq!(summary.turns, turns);
    assert_eq!(summary.correct + summary.wrong, turns);
    assert!(summary.best_combo <= 2);
    assert!(summary.accuracy > 0.5 && summary.accuracy < 1.0);
}

#[test]
fn test_all_wrong_is_defeat_without_rewards() {
    let mut player = PlayerStats::new("Ada");
    let mut bank = ProblemBank::new(3, 1);
    let table = DropTable::default_table();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
    let mut encounter = Encounter::new(&player, Spirit::new(SpiritKind::Chaos, 4), always_drop());

    play(&mut encounter, &mut bank, &table, &mut rng, |_| false);
    assert_eq!(encounter.state(), EncounterState::Defeat);
    assert_eq!(encounter.apply_to_player(&mut player), Ok(0));
    assert!(player.is_defeated());
    assert!(player.inventory.is_empty());
    assert_eq!((player.level, player.exp), (1, 0));
}

#[test]
fn test_typed_answer_accepted() {
    let player = PlayerStats::new("Ada");
    let mut bank = ProblemBank::new(5, 1);
    let table = DropTable::default_table();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
    let mut encounter = Encounter::new(
        &player,
        Spirit::new(SpiritKind::Decimal, 1),
        BattleSettings::default(),
    );

    let problem = encounter.next_problem(&mut bank).unwrap().clone();
    let turn = encounter
        .submit_input(&problem.formatted_answer(), &table, &mut rng)
        .unwrap();
    assert!(turn.correct);
    assert_eq!(turn.correct_answer, problem.answer);
}

#[test]
fn test_actions_after_flee_rejected() {
    let player = PlayerStats::new("Ada");
    let mut bank = ProblemBank::new(1, 1);
    let table = DropTable::default_table();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    let mut encounter = Encounter::new(
        &player,
        Spirit::new(SpiritKind::Limit, 2),
        BattleSettings::default(),
    );

    encounter.next_problem(&mut bank).unwrap();
    encounter.flee().unwrap();
    assert!(matches!(
        encounter.next_problem(&mut bank),
        Err(BattleError::Finished(_))
    ));
    assert!(matches!(
        encounter.submit_input("3", &table, &mut rng),
        Err(SpiritsError::Battle(BattleError::Finished(_)))
    ));
    assert_eq!(encounter.summary().exp_earned, 0);
}

#[test]
fn test_same_seed_same_encounter() {
    let run = || {
        let player = PlayerStats::new("Ada");
        let mut bank = ProblemBank::new(77, 2);
        let table = DropTable::default_table();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(77);
        let mut encounter = Encounter::new(
            &player,
            Spirit::new(SpiritKind::Equation, 2),
            BattleSettings::default(),
        );
        play(&mut encounter, &mut bank, &table, &mut rng, |t| t % 4 != 3);
        encounter.summary()
    };
    assert_eq!(run(), run());
}
