//! Bevy integration layer.
//!
//! `QuizPlugin` owns the game state as resources and drives encounters
//! through events:
//!   StartEncounterEvent → (SubmitAnswerEvent → TurnResolvedEvent)* → EncounterEndedEvent
//!
//! Headless: only schedules and events, no rendering.

pub mod config;
pub mod plugin;

pub use config::{BankConfig, BattleConfig, DropConfig, GameConfig, PlayerConfig};
pub use plugin::{
    ActiveDropTable, ActiveEncounter, ActivePlayer, Answer, BattleRng, EncounterEndedEvent,
    QuizBank, QuizPlugin, QuizSettings, QuizSystems, StartEncounterEvent, SubmitAnswerEvent,
    TurnResolvedEvent,
};
