use bevy::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{info, warn};

use crate::bank::{derive_seed, ProblemBank};
use crate::battle::{BattleSettings, Encounter, EncounterSummary, TurnResult};
use crate::drops::DropTable;
use crate::engine::config::GameConfig;
use crate::error::SpiritsError;
use crate::player::PlayerStats;
use crate::spirit::Spirit;

/// Stream index reserved for the battle RNG (drop rolls)
const BATTLE_RNG_STREAM: u64 = u64::MAX;

/// Headless quiz-combat plugin
#[derive(Default)]
pub struct QuizPlugin {
    pub config: GameConfig,
}

impl QuizPlugin {
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }
}

impl Plugin for QuizPlugin {
    fn build(&self, app: &mut App) {
        let config = &self.config;
        app.insert_resource(QuizBank(ProblemBank::new(
            config.bank.seed,
            config.bank.difficulty,
        )))
        .insert_resource(ActivePlayer(config.new_player()))
        .insert_resource(ActiveEncounter::default())
        .insert_resource(ActiveDropTable(config.drop_table()))
        .insert_resource(BattleRng(Xoshiro256PlusPlus::seed_from_u64(derive_seed(
            config.bank.seed,
            BATTLE_RNG_STREAM,
        ))))
        .insert_resource(QuizSettings {
            battle: config.battle_settings(),
            base_difficulty: config.bank.difficulty,
        })
        .add_event::<StartEncounterEvent>()
        .add_event::<SubmitAnswerEvent>()
        .add_event::<TurnResolvedEvent>()
        .add_event::<EncounterEndedEvent>()
        .add_systems(
            Update,
            (start_encounters, resolve_answers, finish_encounters)
                .chain()
                .in_set(QuizSystems),
        );
    }
}

/// Ordering handle for systems that feed the quiz (input, autoplay)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuizSystems;

// =====================================================
// Resources
// =====================================================

#[derive(Resource)]
pub struct QuizBank(pub ProblemBank);

#[derive(Resource)]
pub struct ActivePlayer(pub PlayerStats);

#[derive(Resource, Default)]
pub struct ActiveEncounter(pub Option<Encounter>);

impl ActiveEncounter {
    pub fn is_active(&self) -> bool {
        self.0.as_ref().is_some_and(|e| !e.state().is_finished())
    }
}

#[derive(Resource)]
pub struct ActiveDropTable(pub DropTable);

#[derive(Resource)]
pub struct BattleRng(pub Xoshiro256PlusPlus);

#[derive(Resource)]
pub struct QuizSettings {
    pub battle: BattleSettings,
    /// Floor for the bank difficulty; stronger spirits raise it per encounter
    pub base_difficulty: u8,
}

// =====================================================
// Events
// =====================================================

#[derive(Event, Debug, Clone)]
pub struct StartEncounterEvent {
    pub spirit: Spirit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Value(f64),
    Choice(usize),
    Input(String),
    Flee,
}

#[derive(Event, Debug, Clone)]
pub struct SubmitAnswerEvent {
    pub answer: Answer,
}

#[derive(Event, Debug, Clone)]
pub struct TurnResolvedEvent {
    pub turn: TurnResult,
}

#[derive(Event, Debug, Clone)]
pub struct EncounterEndedEvent {
    pub summary: EncounterSummary,
    pub levels_gained: u32,
}

// =====================================================
// Systems
// =====================================================

fn start_encounters(
    mut events: EventReader<StartEncounterEvent>,
    mut encounter: ResMut<ActiveEncounter>,
    mut bank: ResMut<QuizBank>,
    player: Res<ActivePlayer>,
    settings: Res<QuizSettings>,
) {
    for event in events.read() {
        if encounter.is_active() {
            warn!(spirit = event.spirit.name(), "encounter already in progress; ignoring");
            continue;
        }
        if player.0.is_defeated() {
            warn!(spirit = event.spirit.name(), "player is defeated; ignoring encounter");
            continue;
        }
        bank.0.set_difficulty(settings.base_difficulty.max(event.spirit.difficulty()));
        let mut next = Encounter::new(&player.0, event.spirit.clone(), settings.battle.clone());
        if let Err(e) = next.next_problem(&mut bank.0) {
            warn!(error = %e, "could not draw first problem");
            continue;
        }
        encounter.0 = Some(next);
    }
}

fn resolve_answers(
    mut events: EventReader<SubmitAnswerEvent>,
    mut encounter: ResMut<ActiveEncounter>,
    mut bank: ResMut<QuizBank>,
    table: Res<ActiveDropTable>,
    mut rng: ResMut<BattleRng>,
    mut turns: EventWriter<TurnResolvedEvent>,
) {
    for event in events.read() {
        let Some(active) = encounter.0.as_mut() else {
            warn!("answer submitted without an encounter");
            continue;
        };
        let rng = &mut rng.0;
        let result: Result<Option<TurnResult>, SpiritsError> = match &event.answer {
            Answer::Value(v) => active
                .submit_answer(*v, &table.0, rng)
                .map(Some)
                .map_err(Into::into),
            Answer::Choice(i) => active
                .submit_option(*i, &table.0, rng)
                .map(Some)
                .map_err(Into::into),
            Answer::Input(s) => active.submit_input(s, &table.0, rng).map(Some),
            Answer::Flee => active.flee().map(|_| None).map_err(Into::into),
        };
        match result {
            Ok(Some(turn)) => {
                let finished = turn.state.is_finished();
                turns.send(TurnResolvedEvent { turn });
                if !finished {
                    if let Err(e) = active.next_problem(&mut bank.0) {
                        warn!(error = %e, "could not draw next problem");
                    }
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "answer rejected"),
        }
    }
}

fn finish_encounters(
    mut encounter: ResMut<ActiveEncounter>,
    mut player: ResMut<ActivePlayer>,
    mut ended: EventWriter<EncounterEndedEvent>,
) {
    let finished = encounter
        .0
        .as_ref()
        .is_some_and(|e| e.state().is_finished());
    if !finished {
        return;
    }
    if let Some(mut done) = encounter.0.take() {
        let levels_gained = match done.apply_to_player(&mut player.0) {
            Ok(levels) => levels,
            Err(e) => {
                warn!(error = %e, "rewards not applied");
                0
            }
        };
        let summary = done.summary();
        info!(
            spirit = %summary.spirit,
            outcome = summary.state.as_str(),
            accuracy = summary.accuracy,
            exp = summary.exp_earned,
            "encounter ended"
        );
        ended.send(EncounterEndedEvent {
            summary,
            levels_gained,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::EncounterState;
    use crate::spirit::SpiritKind;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(QuizPlugin::default());
        app
    }

    fn start(app: &mut App, kind: SpiritKind) {
        app.world_mut().send_event(StartEncounterEvent {
            spirit: Spirit::new(kind, 1),
        });
        app.update();
    }

    fn pending_answer(app: &App) -> f64 {
        app.world()
            .resource::<ActiveEncounter>()
            .0
            .as_ref()
            .and_then(|e| e.current_problem())
            .map(|p| p.answer)
            .unwrap()
    }

    #[test]
    fn test_start_encounter_draws_problem() {
        let mut app = test_app();
        start(&mut app, SpiritKind::Addition);
        let encounter = app.world().resource::<ActiveEncounter>();
        assert!(encounter.is_active());
        let enc = encounter.0.as_ref().unwrap();
        assert_eq!(enc.state(), EncounterState::AwaitingAnswer);
        assert!(enc.current_problem().is_some());
    }

    #[test]
    fn test_second_start_ignored_while_active() {
        let mut app = test_app();
        start(&mut app, SpiritKind::Addition);
        start(&mut app, SpiritKind::Limit);
        let enc = app.world().resource::<ActiveEncounter>().0.as_ref().unwrap();
        assert_eq!(enc.spirit.kind, SpiritKind::Addition);
    }

    #[test]
    fn test_correct_answer_resolves_and_draws_next() {
        let mut app = test_app();
        start(&mut app, SpiritKind::Multiplication);
        let answer = pending_answer(&app);
        app.world_mut().send_event(SubmitAnswerEvent {
            answer: Answer::Value(answer),
        });
        app.update();

        let turns = app.world().resource::<Events<TurnResolvedEvent>>();
        assert_eq!(turns.len(), 1);
        let enc = app.world().resource::<ActiveEncounter>().0.as_ref().unwrap();
        assert_eq!(enc.combo(), 1);
        assert!(enc.spirit_hp < enc.spirit.max_hp);
        assert_eq!(enc.state(), EncounterState::AwaitingAnswer);
    }

    #[test]
    fn test_victory_applies_rewards() {
        let mut app = test_app();
        start(&mut app, SpiritKind::Addition);
        let mut guard = 0;
        while app.world().resource::<ActiveEncounter>().is_active() {
            let answer = pending_answer(&app);
            app.world_mut().send_event(SubmitAnswerEvent {
                answer: Answer::Input(format!("{answer}")),
            });
            app.update();
            guard += 1;
            assert!(guard < 50);
        }
        assert!(app.world().resource::<ActiveEncounter>().0.is_none());
        let ended = app.world().resource::<Events<EncounterEndedEvent>>();
        assert_eq!(ended.len(), 1);
        let player = &app.world().resource::<ActivePlayer>().0;
        let reward = Spirit::new(SpiritKind::Addition, 1).exp_reward;
        assert!(player.level > 1 || player.exp == reward);
    }

    #[test]
    fn test_spirit_raises_bank_difficulty() {
        let mut app = test_app();
        start(&mut app, SpiritKind::Induction);
        let expected = Spirit::new(SpiritKind::Induction, 1).difficulty();
        assert_eq!(app.world().resource::<QuizBank>().0.difficulty(), expected.max(1));
        let enc = app.world().resource::<ActiveEncounter>().0.as_ref().unwrap();
        assert_eq!(enc.current_problem().unwrap().difficulty, expected.max(1));
    }

    #[test]
    fn test_flee_ends_without_reward() {
        let mut app = test_app();
        start(&mut app, SpiritKind::Division);
        app.world_mut().send_event(SubmitAnswerEvent {
            answer: Answer::Flee,
        });
        app.update();
        assert!(app.world().resource::<ActiveEncounter>().0.is_none());
        let player = &app.world().resource::<ActivePlayer>().0;
        assert_eq!((player.level, player.exp), (1, 0));
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn test_bad_input_keeps_problem() {
        let mut app = test_app();
        start(&mut app, SpiritKind::Addition);
        let before = pending_answer(&app);
        app.world_mut().send_event(SubmitAnswerEvent {
            answer: Answer::Input("twelve".into()),
        });
        app.update();
        assert_eq!(pending_answer(&app), before);
        assert_eq!(app.world().resource::<Events<TurnResolvedEvent>>().len(), 0);
    }
}
