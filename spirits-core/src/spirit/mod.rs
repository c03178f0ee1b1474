//! Math spirits (数学之灵): the enemies of quiz combat.
//!
//! Each archetype's name maps to the operation its problems use:
//! 加法之灵 asks additions, 面积之灵 asks areas, 极限之灵 asks limits.
//! Stats scale with level; higher-concept spirits hit harder.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::problem::{ProblemKind, ProblemSelector, Topic};

/// Spirit archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpiritKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Equation,
    Area,
    Perimeter,
    Circle,
    Fraction,
    Decimal,
    Limit,
    Measure,
    Induction,
    /// Asks anything; used for stage bosses
    Chaos,
}

impl SpiritKind {
    pub fn all() -> [SpiritKind; 14] {
        use SpiritKind::*;
        [
            Addition,
            Subtraction,
            Multiplication,
            Division,
            Equation,
            Area,
            Perimeter,
            Circle,
            Fraction,
            Decimal,
            Limit,
            Measure,
            Induction,
            Chaos,
        ]
    }

    pub fn chinese_name(&self) -> &'static str {
        match self {
            Self::Addition => "加法之灵",
            Self::Subtraction => "减法之灵",
            Self::Multiplication => "乘法之灵",
            Self::Division => "除法之灵",
            Self::Equation => "方程之灵",
            Self::Area => "面积之灵",
            Self::Perimeter => "周长之灵",
            Self::Circle => "圆之灵",
            Self::Fraction => "分数之灵",
            Self::Decimal => "小数之灵",
            Self::Limit => "极限之灵",
            Self::Measure => "测度之灵",
            Self::Induction => "归纳之灵",
            Self::Chaos => "混沌之灵",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Addition => "Addition Spirit",
            Self::Subtraction => "Subtraction Spirit",
            Self::Multiplication => "Multiplication Spirit",
            Self::Division => "Division Spirit",
            Self::Equation => "Equation Spirit",
            Self::Area => "Area Spirit",
            Self::Perimeter => "Perimeter Spirit",
            Self::Circle => "Circle Spirit",
            Self::Fraction => "Fraction Spirit",
            Self::Decimal => "Decimal Spirit",
            Self::Limit => "Limit Spirit",
            Self::Measure => "Measure Spirit",
            Self::Induction => "Induction Spirit",
            Self::Chaos => "Chaos Spirit",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
            Self::Division => "division",
            Self::Equation => "equation",
            Self::Area => "area",
            Self::Perimeter => "perimeter",
            Self::Circle => "circle",
            Self::Fraction => "fraction",
            Self::Decimal => "decimal",
            Self::Limit => "limit",
            Self::Measure => "measure",
            Self::Induction => "induction",
            Self::Chaos => "chaos",
        }
    }

    /// Lookup by Chinese name, English display name or id (case-insensitive)
    pub fn from_name(name: &str) -> Option<SpiritKind> {
        let needle = name.trim();
        let lowered = needle.to_lowercase();
        Self::all().into_iter().find(|kind| {
            kind.chinese_name() == needle
                || kind.display_name().to_lowercase() == lowered
                || kind.id() == lowered
        })
    }

    pub fn selector(&self) -> ProblemSelector {
        match self {
            Self::Addition => ProblemSelector::Kind(ProblemKind::Addition),
            Self::Subtraction => ProblemSelector::Kind(ProblemKind::Subtraction),
            Self::Multiplication => ProblemSelector::Kind(ProblemKind::Multiplication),
            Self::Division => ProblemSelector::Kind(ProblemKind::Division),
            Self::Equation => ProblemSelector::Topic(Topic::Algebra),
            Self::Area => ProblemSelector::Kind(ProblemKind::RectangleArea),
            Self::Perimeter => ProblemSelector::Kind(ProblemKind::RectanglePerimeter),
            Self::Circle => ProblemSelector::Kind(ProblemKind::CircleArea),
            Self::Fraction => ProblemSelector::Topic(Topic::Fractions),
            Self::Decimal => ProblemSelector::Topic(Topic::Decimals),
            Self::Limit => ProblemSelector::Kind(ProblemKind::Limit),
            Self::Measure => ProblemSelector::Kind(ProblemKind::IntervalMeasure),
            Self::Induction => ProblemSelector::Kind(ProblemKind::InductionSum),
            Self::Chaos => ProblemSelector::Any,
        }
    }

    /// Tier 1: arithmetic, 2: algebra/geometry/fractions, 3: higher concepts
    pub fn tier(&self) -> u32 {
        match self {
            Self::Addition | Self::Subtraction | Self::Multiplication | Self::Division => 1,
            Self::Equation
            | Self::Area
            | Self::Perimeter
            | Self::Circle
            | Self::Fraction
            | Self::Decimal => 2,
            Self::Limit | Self::Measure | Self::Induction | Self::Chaos => 3,
        }
    }
}

/// A spirit instance with level-scaled stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spirit {
    pub kind: SpiritKind,
    pub level: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub exp_reward: u32,
    /// Added to the base drop chance on every correct answer
    pub drop_bonus: f64,
}

impl Spirit {
    pub fn new(kind: SpiritKind, level: u32) -> Self {
        let level = level.max(1);
        let tier = kind.tier();
        let max_hp = 40 + 20 * tier + 15 * level;
        let attack = 6 + 3 * tier + 2 * level;
        let exp_reward = 15 * tier + 10 * level;
        let drop_bonus = (0.02 * (tier - 1) as f64 + 0.01 * level as f64).min(0.25);
        Self {
            kind,
            level,
            max_hp,
            attack,
            exp_reward,
            drop_bonus,
        }
    }

    /// Spirit by name; unknown names become the arithmetic (Addition) spirit
    pub fn from_name(name: &str, level: u32) -> Self {
        let kind = SpiritKind::from_name(name).unwrap_or_else(|| {
            warn!(spirit = name, "unknown spirit, using arithmetic spirit");
            SpiritKind::Addition
        });
        Self::new(kind, level)
    }

    pub fn name(&self) -> &'static str {
        self.kind.chinese_name()
    }

    /// Pick a spirit suited to a stage: tiers unlock every 3 stages, every 5th stage is Chaos
    pub fn spawn_for_stage<R: Rng + ?Sized>(stage: u32, rng: &mut R) -> Self {
        let stage = stage.max(1);
        let level = 1 + (stage - 1) / 2;
        if stage % 5 == 0 {
            return Self::new(SpiritKind::Chaos, level + 1);
        }
        let max_tier = 1 + (stage - 1) / 3;
        let pool: Vec<SpiritKind> = SpiritKind::all()
            .into_iter()
            .filter(|k| *k != SpiritKind::Chaos && k.tier() <= max_tier)
            .collect();
        let kind = pool.choose(rng).copied().unwrap_or(SpiritKind::Addition);
        Self::new(kind, level)
    }

    /// Difficulty the bank should use against this spirit
    pub fn difficulty(&self) -> u8 {
        (self.kind.tier() + self.level / 3).min(5) as u8
    }
}
