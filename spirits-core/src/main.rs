//! Headless demo: an auto-player fights spirits stage by stage.
//!
//! Usage: spirits-demo [config.ron] [--audit]

use anyhow::{Context, Result};
use bevy::app::AppExit;
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::info;

use spirits_core::audit::{audit_bank, AuditConfig};
use spirits_core::bank::derive_seed;
use spirits_core::engine::{
    ActiveEncounter, ActivePlayer, Answer, EncounterEndedEvent, GameConfig, QuizPlugin,
    QuizSystems, StartEncounterEvent, SubmitAnswerEvent,
};
use spirits_core::logging::{init_tracing, TimingSpan};
use spirits_core::spirit::Spirit;

const DEMO_STAGES: u32 = 10;
const DEMO_ACCURACY: f64 = 0.8;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let run_audit = args.iter().any(|a| a == "--audit");
    let config = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => GameConfig::load(path).with_context(|| format!("loading {path}"))?,
        None => GameConfig::default(),
    };
    init_tracing(&config.logging);

    if run_audit {
        let report = audit_bank(&AuditConfig {
            base_seed: config.bank.seed,
            ..AuditConfig::default()
        });
        println!("{}", report.to_json());
        anyhow::ensure!(
            report.passed,
            "{} problems violated invariants",
            report.violating_problems
        );
        return Ok(());
    }

    let _span = TimingSpan::new("demo");
    let seed = derive_seed(config.bank.seed, 0);
    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(QuizPlugin::new(config))
        .insert_resource(AutoPlayer {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            stage: 1,
        })
        .add_systems(Update, autoplay.before(QuizSystems))
        .add_systems(Update, report_encounters.after(QuizSystems))
        .run();
    Ok(())
}

#[derive(Resource)]
struct AutoPlayer {
    rng: Xoshiro256PlusPlus,
    stage: u32,
}

fn autoplay(
    mut auto: ResMut<AutoPlayer>,
    encounter: Res<ActiveEncounter>,
    player: Res<ActivePlayer>,
    mut starts: EventWriter<StartEncounterEvent>,
    mut answers: EventWriter<SubmitAnswerEvent>,
    mut exit: EventWriter<AppExit>,
) {
    let auto = &mut *auto;
    match encounter.0.as_ref().and_then(|e| e.current_problem()) {
        Some(problem) => {
            let index = if auto.rng.gen_bool(DEMO_ACCURACY) {
                problem.correct_index
            } else {
                (problem.correct_index + auto.rng.gen_range(1..problem.options.len()))
                    % problem.options.len()
            };
            info!(
                question = %problem.question,
                answer = %problem.formatted_options()[index],
                "auto-player answers"
            );
            answers.send(SubmitAnswerEvent {
                answer: Answer::Choice(index),
            });
        }
        None if encounter.0.is_none() => {
            if player.0.is_defeated() || auto.stage > DEMO_STAGES {
                info!(
                    level = player.0.level,
                    items = player.0.inventory.total_items(),
                    "demo finished"
                );
                exit.send(AppExit::Success);
                return;
            }
            let spirit = Spirit::spawn_for_stage(auto.stage, &mut auto.rng);
            info!(stage = auto.stage, spirit = spirit.name(), "next stage");
            auto.stage += 1;
            starts.send(StartEncounterEvent { spirit });
        }
        None => {}
    }
}

fn report_encounters(mut ended: EventReader<EncounterEndedEvent>) {
    for event in ended.read() {
        let summary = &event.summary;
        info!(
            spirit = %summary.spirit,
            outcome = summary.state.as_str(),
            turns = summary.turns,
            best_combo = summary.best_combo,
            drops = summary.drops.len(),
            levels_gained = event.levels_gained,
            "stage report"
        );
    }
}
