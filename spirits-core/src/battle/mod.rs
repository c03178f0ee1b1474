//! Quiz combat encounter.
//!
//! AwaitingProblem → AwaitingAnswer → (AwaitingProblem | Victory | Defeat)
//! Fled can be entered from any non-terminal state.
//!
//! Correct answers hit the spirit (combo-scaled) and may roll a drop.
//! Wrong answers reset the combo and let the spirit hit back.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bank::ProblemBank;
use crate::constants::{BASE_DROP_CHANCE, COMBO_STEP_MULT, MAX_COMBO};
use crate::drops::{Drop, DropTable};
use crate::error::{BattleError, SpiritsError};
use crate::player::PlayerStats;
use crate::problem::{parse_answer, MathProblem};
use crate::spirit::Spirit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterState {
    AwaitingProblem,
    AwaitingAnswer,
    Victory,
    Defeat,
    Fled,
}

impl EncounterState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Victory | Self::Defeat | Self::Fled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingProblem => "awaiting_problem",
            Self::AwaitingAnswer => "awaiting_answer",
            Self::Victory => "victory",
            Self::Defeat => "defeat",
            Self::Fled => "fled",
        }
    }
}

/// Tunables for combat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSettings {
    pub combo_step_mult: f32,
    pub max_combo: u32,
    /// Base chance of a drop per correct answer (the spirit adds its bonus)
    pub drop_chance: f64,
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            combo_step_mult: COMBO_STEP_MULT,
            max_combo: MAX_COMBO,
            drop_chance: BASE_DROP_CHANCE,
        }
    }
}

/// Outcome of one answered problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub correct: bool,
    pub correct_answer: f64,
    pub explanation: String,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    /// Combo after this turn
    pub combo: u32,
    pub drop: Option<Drop>,
    pub state: EncounterState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterSummary {
    pub spirit: String,
    pub state: EncounterState,
    pub turns: u32,
    pub correct: u32,
    pub wrong: u32,
    pub accuracy: f32,
    pub best_combo: u32,
    pub drops: Vec<Drop>,
    pub exp_earned: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encounter {
    pub spirit: Spirit,
    pub spirit_hp: u32,
    pub player_hp: u32,
    pub player_max_hp: u32,
    pub player_attack: u32,
    pub settings: BattleSettings,
    state: EncounterState,
    combo: u32,
    best_combo: u32,
    turns: u32,
    correct: u32,
    wrong: u32,
    drops: Vec<Drop>,
    current: Option<MathProblem>,
    rewards_applied: bool,
}

impl Encounter {
    pub fn new(player: &PlayerStats, spirit: Spirit, settings: BattleSettings) -> Self {
        info!(
            spirit = spirit.name(),
            level = spirit.level,
            player = %player.name,
            "encounter started"
        );
        Self {
            spirit_hp: spirit.max_hp,
            player_hp: player.hp,
            player_max_hp: player.max_hp,
            player_attack: player.attack,
            spirit,
            settings,
            state: EncounterState::AwaitingProblem,
            combo: 0,
            best_combo: 0,
            turns: 0,
            correct: 0,
            wrong: 0,
            drops: Vec::new(),
            current: None,
            rewards_applied: false,
        }
    }

    pub fn state(&self) -> EncounterState {
        self.state
    }

    /// Final state once the encounter is over
    pub fn outcome(&self) -> Option<EncounterState> {
        self.state.is_finished().then_some(self.state)
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn current_problem(&self) -> Option<&MathProblem> {
        self.current.as_ref()
    }

    pub fn drops(&self) -> &[Drop] {
        &self.drops
    }

    fn ensure_active(&self) -> Result<(), BattleError> {
        if self.state.is_finished() {
            return Err(BattleError::Finished(self.state.as_str().to_string()));
        }
        Ok(())
    }

    /// Draw the next problem from the bank using the spirit's operation
    pub fn next_problem(&mut self, bank: &mut ProblemBank) -> Result<&MathProblem, BattleError> {
        self.ensure_active()?;
        if self.state == EncounterState::AwaitingAnswer {
            return Err(BattleError::ProblemPending);
        }
        let problem = bank.generate_for_spirit(&self.spirit);
        self.state = EncounterState::AwaitingAnswer;
        Ok(self.current.insert(problem))
    }

    /// Damage for a correct answer at the current combo
    pub fn attack_damage(&self) -> u32 {
        let combo = self.combo.min(self.settings.max_combo) as f32;
        let mult = 1.0 + combo * self.settings.combo_step_mult;
        (self.player_attack as f32 * mult).round() as u32
    }

    pub fn submit_answer<R: Rng + ?Sized>(
        &mut self,
        value: f64,
        table: &DropTable,
        rng: &mut R,
    ) -> Result<TurnResult, BattleError> {
        self.ensure_active()?;
        let problem = self.current.take().ok_or(BattleError::NoActiveProblem)?;
        let correct = problem.check_answer(value);
        Ok(self.resolve(problem, correct, table, rng))
    }

    pub fn submit_option<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        table: &DropTable,
        rng: &mut R,
    ) -> Result<TurnResult, BattleError> {
        let count = self.pending_problem()?.options.len();
        if index >= count {
            return Err(BattleError::OptionOutOfRange { index, count });
        }
        let problem = self.current.take().ok_or(BattleError::NoActiveProblem)?;
        let correct = problem.check_option(index);
        Ok(self.resolve(problem, correct, table, rng))
    }

    /// Typed answer; unparsable input does not use up the turn
    pub fn submit_input<R: Rng + ?Sized>(
        &mut self,
        input: &str,
        table: &DropTable,
        rng: &mut R,
    ) -> Result<TurnResult, SpiritsError> {
        self.pending_problem()?;
        let value = parse_answer(input)?;
        Ok(self.submit_answer(value, table, rng)?)
    }

    fn pending_problem(&self) -> Result<&MathProblem, BattleError> {
        self.ensure_active()?;
        self.current.as_ref().ok_or(BattleError::NoActiveProblem)
    }

    fn resolve<R: Rng + ?Sized>(
        &mut self,
        problem: MathProblem,
        correct: bool,
        table: &DropTable,
        rng: &mut R,
    ) -> TurnResult {
        self.turns += 1;

        let mut damage_dealt = 0;
        let mut damage_taken = 0;
        let mut drop = None;

        if correct {
            damage_dealt = self.attack_damage();
            self.spirit_hp = self.spirit_hp.saturating_sub(damage_dealt);
            self.correct += 1;
            self.combo += 1;
            self.best_combo = self.best_combo.max(self.combo);
            let chance = self.settings.drop_chance + self.spirit.drop_bonus;
            drop = table.roll_on_correct(chance, rng);
            if let Some(d) = &drop {
                self.drops.push(d.clone());
            }
        } else {
            damage_taken = self.spirit.attack;
            self.player_hp = self.player_hp.saturating_sub(damage_taken);
            self.wrong += 1;
            self.combo = 0;
        }

        self.state = if self.spirit_hp == 0 {
            info!(spirit = self.spirit.name(), turns = self.turns, "spirit defeated");
            EncounterState::Victory
        } else if self.player_hp == 0 {
            info!(spirit = self.spirit.name(), turns = self.turns, "player defeated");
            EncounterState::Defeat
        } else {
            EncounterState::AwaitingProblem
        };

        debug!(
            correct,
            damage_dealt,
            damage_taken,
            combo = self.combo,
            spirit_hp = self.spirit_hp,
            player_hp = self.player_hp,
            "turn resolved"
        );

        TurnResult {
            correct,
            correct_answer: problem.answer,
            explanation: problem.explanation,
            damage_dealt,
            damage_taken,
            combo: self.combo,
            drop,
            state: self.state,
        }
    }

    pub fn flee(&mut self) -> Result<(), BattleError> {
        self.ensure_active()?;
        self.current = None;
        self.state = EncounterState::Fled;
        info!(spirit = self.spirit.name(), "player fled");
        Ok(())
    }

    pub fn exp_earned(&self) -> u32 {
        if self.state == EncounterState::Victory {
            self.spirit.exp_reward
        } else {
            0
        }
    }

    pub fn summary(&self) -> EncounterSummary {
        let accuracy = if self.turns == 0 {
            0.0
        } else {
            self.correct as f32 / self.turns as f32
        };
        EncounterSummary {
            spirit: self.spirit.name().to_string(),
            state: self.state,
            turns: self.turns,
            correct: self.correct,
            wrong: self.wrong,
            accuracy,
            best_combo: self.best_combo,
            drops: self.drops.clone(),
            exp_earned: self.exp_earned(),
        }
    }

    /// Write HP, drops and experience back to the player once the encounter is over.
    /// Only the first call after the end has effect. Returns the number of levels gained.
    pub fn apply_to_player(&mut self, player: &mut PlayerStats) -> Result<u32, BattleError> {
        if !self.state.is_finished() {
            return Err(BattleError::NotFinished);
        }
        if self.rewards_applied {
            return Ok(0);
        }
        self.rewards_applied = true;
        player.hp = self.player_hp.min(player.max_hp);
        player.inventory.add_all(&self.drops);
        Ok(player.gain_exp(self.exp_earned()))
    }
}
