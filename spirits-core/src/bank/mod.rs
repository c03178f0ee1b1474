//! Problem bank: selects a topic/operation and produces problems.
//!
//! The bank owns a seeded Xoshiro256++ RNG so a (seed, difficulty) pair
//! always yields the same sequence of problems.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::{debug, warn};

use crate::constants::CONCEPT_MIN_DIFFICULTY;
use crate::problem::{
    clamp_difficulty, generators, MathProblem, ProblemKind, ProblemSelector, Topic,
};
use crate::spirit::Spirit;

/// Relative weight of each topic in random draws
const TOPIC_WEIGHTS: [(Topic, u32); 6] = [
    (Topic::Arithmetic, 30),
    (Topic::Algebra, 20),
    (Topic::Geometry, 20),
    (Topic::Fractions, 12),
    (Topic::Decimals, 12),
    (Topic::Concepts, 6),
];

/// Derive a child seed (per encounter, per audit sample) from a base seed
pub fn derive_seed(base: u64, index: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}

/// Map a lesson/concept identifier to what the bank should produce
pub fn concept_selector(concept_id: &str) -> Option<ProblemSelector> {
    let id = concept_id.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    if let Some(kind) = ProblemKind::from_id(&id) {
        return Some(ProblemSelector::Kind(kind));
    }
    let selector = match id.as_str() {
        "arithmetic" => ProblemSelector::Topic(Topic::Arithmetic),
        "algebra" | "equations" => ProblemSelector::Topic(Topic::Algebra),
        "geometry" => ProblemSelector::Topic(Topic::Geometry),
        "fractions" => ProblemSelector::Topic(Topic::Fractions),
        "decimals" => ProblemSelector::Topic(Topic::Decimals),
        "concepts" => ProblemSelector::Topic(Topic::Concepts),
        "limits" => ProblemSelector::Kind(ProblemKind::Limit),
        "measure_theory" | "measure" | "lebesgue" => {
            ProblemSelector::Kind(ProblemKind::IntervalMeasure)
        }
        "induction" | "mathematical_induction" => {
            ProblemSelector::Kind(ProblemKind::InductionSum)
        }
        "series" => ProblemSelector::Kind(ProblemKind::GeometricSeries),
        "derivatives" | "calculus" => ProblemSelector::Kind(ProblemKind::Derivative),
        "combinatorics" => ProblemSelector::Kind(ProblemKind::Combinations),
        "logarithms" | "log" => ProblemSelector::Kind(ProblemKind::Logarithm),
        "pythagoras" | "pythagorean_theorem" => ProblemSelector::Kind(ProblemKind::Hypotenuse),
        "area" => ProblemSelector::Kind(ProblemKind::RectangleArea),
        "perimeter" => ProblemSelector::Kind(ProblemKind::RectanglePerimeter),
        "circle" | "circles" => ProblemSelector::Kind(ProblemKind::CircleArea),
        "rounding" => ProblemSelector::Kind(ProblemKind::DecimalRounding),
        "random" | "any" | "mixed" => ProblemSelector::Any,
        _ => return None,
    };
    Some(selector)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSnapshot {
    pub seed: u64,
    pub difficulty: u8,
    pub generated: u64,
}

/// Deterministic problem generator
#[derive(Debug, Clone)]
pub struct ProblemBank {
    seed: u64,
    difficulty: u8,
    generated: u64,
    rng: Xoshiro256PlusPlus,
}

impl ProblemBank {
    pub fn new(seed: u64, difficulty: u8) -> Self {
        Self {
            seed,
            difficulty: clamp_difficulty(difficulty),
            generated: 0,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: u8) {
        self.difficulty = clamp_difficulty(difficulty);
    }

    pub fn generated_count(&self) -> u64 {
        self.generated
    }

    pub fn snapshot(&self) -> BankSnapshot {
        BankSnapshot {
            seed: self.seed,
            difficulty: self.difficulty,
            generated: self.generated,
        }
    }

    pub fn generate(&mut self, kind: ProblemKind) -> MathProblem {
        let problem = generators::generate(kind, self.difficulty, &mut self.rng);
        self.generated += 1;
        debug!(
            kind = kind.id(),
            difficulty = self.difficulty,
            answer = problem.answer,
            "generated problem"
        );
        problem
    }

    /// Uniform over the kinds of a topic
    pub fn generate_topic(&mut self, topic: Topic) -> MathProblem {
        let kinds = topic.kinds();
        let kind = kinds
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(ProblemKind::Addition);
        self.generate(kind)
    }

    /// Weighted over topics; concepts only from CONCEPT_MIN_DIFFICULTY
    pub fn generate_random(&mut self) -> MathProblem {
        let topic = self.pick_topic();
        self.generate_topic(topic)
    }

    pub fn generate_selected(&mut self, selector: ProblemSelector) -> MathProblem {
        match selector {
            ProblemSelector::Kind(kind) => self.generate(kind),
            ProblemSelector::Topic(topic) => self.generate_topic(topic),
            ProblemSelector::Any => self.generate_random(),
        }
    }

    /// Problem for a lesson concept; unknown ids fall back to arithmetic
    pub fn generate_for_concept(&mut self, concept_id: &str) -> MathProblem {
        match concept_selector(concept_id) {
            Some(selector) => self.generate_selected(selector),
            None => {
                warn!(concept = concept_id, "unknown concept, using arithmetic");
                self.generate_topic(Topic::Arithmetic)
            }
        }
    }

    pub fn generate_for_spirit(&mut self, spirit: &Spirit) -> MathProblem {
        self.generate_selected(spirit.kind.selector())
    }

    fn pick_topic(&mut self) -> Topic {
        let allowed: Vec<(Topic, u32)> = TOPIC_WEIGHTS
            .iter()
            .copied()
            .filter(|(topic, _)| {
                *topic != Topic::Concepts || self.difficulty >= CONCEPT_MIN_DIFFICULTY
            })
            .collect();
        let total: u32 = allowed.iter().map(|(_, w)| w).sum();
        let mut roll = self.rng.gen_range(0..total);
        for (topic, weight) in &allowed {
            if roll < *weight {
                return *topic;
            }
            roll -= weight;
        }
        Topic::Arithmetic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spirit::SpiritKind;

    #[test]
    fn test_same_seed_same_problems() {
        let mut a = ProblemBank::new(99, 3);
        let mut b = ProblemBank::new(99, 3);
        for _ in 0..20 {
            assert_eq!(a.generate_random(), b.generate_random());
        }
        assert_eq!(a.generated_count(), 20);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = ProblemBank::new(1, 3);
        let mut b = ProblemBank::new(2, 3);
        let pa: Vec<_> = (0..10).map(|_| a.generate_random().question).collect();
        let pb: Vec<_> = (0..10).map(|_| b.generate_random().question).collect();
        assert_ne!(pa, pb);
    }

    #[test]
    fn test_difficulty_clamped() {
        let mut bank = ProblemBank::new(5, 0);
        assert_eq!(bank.difficulty(), 1);
        bank.set_difficulty(42);
        assert_eq!(bank.difficulty(), 5);
        assert_eq!(bank.generate(ProblemKind::Addition).difficulty, 5);
    }

    #[test]
    fn test_no_concepts_at_low_difficulty() {
        let mut bank = ProblemBank::new(7, 2);
        for _ in 0..300 {
            assert_ne!(bank.generate_random().topic, Topic::Concepts);
        }
    }

    #[test]
    fn test_concepts_appear_at_high_difficulty() {
        let mut bank = ProblemBank::new(7, 5);
        let concepts = (0..500)
            .filter(|_| bank.generate_random().topic == Topic::Concepts)
            .count();
        assert!(concepts > 0);
    }

    #[test]
    fn test_generate_topic_stays_in_topic() {
        let mut bank = ProblemBank::new(3, 4);
        for topic in Topic::all() {
            for _ in 0..20 {
                assert_eq!(bank.generate_topic(topic).topic, topic);
            }
        }
    }

    #[test]
    fn test_concept_ids() {
        let mut bank = ProblemBank::new(11, 4);
        assert_eq!(bank.generate_for_concept("limits").kind, ProblemKind::Limit);
        assert_eq!(
            bank.generate_for_concept("Measure Theory").kind,
            ProblemKind::IntervalMeasure
        );
        assert_eq!(
            bank.generate_for_concept("induction").kind,
            ProblemKind::InductionSum
        );
        assert_eq!(
            bank.generate_for_concept("circle_area").kind,
            ProblemKind::CircleArea
        );
        assert_eq!(bank.generate_for_concept("fractions").topic, Topic::Fractions);
    }

    #[test]
    fn test_unknown_concept_falls_back_to_arithmetic() {
        let mut bank = ProblemBank::new(11, 4);
        assert_eq!(concept_selector("topology"), None);
        let p = bank.generate_for_concept("topology");
        assert_eq!(p.topic, Topic::Arithmetic);
    }

    #[test]
    fn test_spirit_problems_follow_spirit_kind() {
        let mut bank = ProblemBank::new(13, 2);
        let spirit = Spirit::new(SpiritKind::Multiplication, 1);
        for _ in 0..10 {
            assert_eq!(
                bank.generate_for_spirit(&spirit).kind,
                ProblemKind::Multiplication
            );
        }
        let fractions = Spirit::new(SpiritKind::Fraction, 1);
        assert_eq!(bank.generate_for_spirit(&fractions).topic, Topic::Fractions);
    }

    #[test]
    fn test_derive_seed() {
        assert_eq!(derive_seed(42, 1), derive_seed(42, 1));
        assert_ne!(derive_seed(42, 1), derive_seed(42, 2));
        assert_ne!(derive_seed(42, 1), derive_seed(43, 1));
    }
}
