//! Math problem value objects.
//!
//! A problem is generated, displayed, answered and discarded:
//! - Statement + correct answer + 4 numeric options + explanation
//! - Answers are checked with a tolerance derived from the answer's decimal places
//! - Typed answers accept integers, decimals, fractions and mixed numbers

pub mod distractors;
pub mod generators;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{INTEGER_TOLERANCE, MAX_DIFFICULTY, MIN_DIFFICULTY, OPTION_EPSILON};
use crate::error::AnswerParseError;

pub use distractors::{build_options, decimal_places, format_number, round_to};

/// Broad subject a problem belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    Arithmetic,
    Algebra,
    Geometry,
    Fractions,
    Decimals,
    Concepts,
}

impl Topic {
    pub fn all() -> [Topic; 6] {
        [
            Topic::Arithmetic,
            Topic::Algebra,
            Topic::Geometry,
            Topic::Fractions,
            Topic::Decimals,
            Topic::Concepts,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Topic::Arithmetic => "Arithmetic",
            Topic::Algebra => "Algebra",
            Topic::Geometry => "Geometry",
            Topic::Fractions => "Fractions",
            Topic::Decimals => "Decimals",
            Topic::Concepts => "Concepts",
        }
    }

    /// Every problem kind of this topic
    pub fn kinds(&self) -> Vec<ProblemKind> {
        ProblemKind::all()
            .into_iter()
            .filter(|k| k.topic() == *self)
            .collect()
    }
}

/// Concrete operation a generator produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProblemKind {
    // Arithmetic
    Addition,
    Subtraction,
    Multiplication,
    Division,
    // Algebra
    LinearEquation,
    TwoStepEquation,
    Substitution,
    // Geometry
    RectangleArea,
    RectanglePerimeter,
    TriangleArea,
    CircleArea,
    CircleCircumference,
    Hypotenuse,
    // Fractions
    FractionAddition,
    FractionMultiplication,
    FractionOfQuantity,
    // Decimals
    DecimalAddition,
    DecimalMultiplication,
    DecimalRounding,
    // Higher concepts
    Limit,
    IntervalMeasure,
    InductionSum,
    GeometricSeries,
    Derivative,
    Combinations,
    Probability,
    Logarithm,
}

impl ProblemKind {
    pub fn all() -> Vec<ProblemKind> {
        use ProblemKind::*;
        vec![
            Addition,
            Subtraction,
            Multiplication,
            Division,
            LinearEquation,
            TwoStepEquation,
            Substitution,
            RectangleArea,
            RectanglePerimeter,
            TriangleArea,
            CircleArea,
            CircleCircumference,
            Hypotenuse,
            FractionAddition,
            FractionMultiplication,
            FractionOfQuantity,
            DecimalAddition,
            DecimalMultiplication,
            DecimalRounding,
            Limit,
            IntervalMeasure,
            InductionSum,
            GeometricSeries,
            Derivative,
            Combinations,
            Probability,
            Logarithm,
        ]
    }

    pub fn topic(&self) -> Topic {
        use ProblemKind::*;
        match self {
            Addition | Subtraction | Multiplication | Division => Topic::Arithmetic,
            LinearEquation | TwoStepEquation | Substitution => Topic::Algebra,
            RectangleArea | RectanglePerimeter | TriangleArea | CircleArea
            | CircleCircumference | Hypotenuse => Topic::Geometry,
            FractionAddition | FractionMultiplication | FractionOfQuantity => Topic::Fractions,
            DecimalAddition | DecimalMultiplication | DecimalRounding => Topic::Decimals,
            Limit | IntervalMeasure | InductionSum | GeometricSeries | Derivative
            | Combinations | Probability | Logarithm => Topic::Concepts,
        }
    }

    /// Stable snake_case identifier (used by concept lookups and logs)
    pub fn id(&self) -> &'static str {
        use ProblemKind::*;
        match self {
            Addition => "addition",
            Subtraction => "subtraction",
            Multiplication => "multiplication",
            Division => "division",
            LinearEquation => "linear_equation",
            TwoStepEquation => "two_step_equation",
            Substitution => "substitution",
            RectangleArea => "rectangle_area",
            RectanglePerimeter => "rectangle_perimeter",
            TriangleArea => "triangle_area",
            CircleArea => "circle_area",
            CircleCircumference => "circle_circumference",
            Hypotenuse => "hypotenuse",
            FractionAddition => "fraction_addition",
            FractionMultiplication => "fraction_multiplication",
            FractionOfQuantity => "fraction_of_quantity",
            DecimalAddition => "decimal_addition",
            DecimalMultiplication => "decimal_multiplication",
            DecimalRounding => "decimal_rounding",
            Limit => "limit",
            IntervalMeasure => "interval_measure",
            InductionSum => "induction_sum",
            GeometricSeries => "geometric_series",
            Derivative => "derivative",
            Combinations => "combinations",
            Probability => "probability",
            Logarithm => "logarithm",
        }
    }

    pub fn from_id(id: &str) -> Option<ProblemKind> {
        ProblemKind::all().into_iter().find(|k| k.id() == id)
    }
}

/// What a caller (spirit, concept, lesson) asks the bank for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemSelector {
    Kind(ProblemKind),
    Topic(Topic),
    Any,
}

/// Clamp a requested difficulty into the supported range
pub fn clamp_difficulty(difficulty: u8) -> u8 {
    difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// A generated problem with its option set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathProblem {
    pub kind: ProblemKind,
    pub topic: Topic,
    pub difficulty: u8,
    pub question: String,
    pub answer: f64,
    pub options: Vec<f64>,
    pub correct_index: usize,
    pub explanation: String,
    /// Decimal places the answer was rounded to
    pub precision: u32,
}

impl MathProblem {
    /// Round the answer to `precision` and build the option set around it
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: Rng + ?Sized>(
        kind: ProblemKind,
        difficulty: u8,
        question: impl Into<String>,
        answer: f64,
        precision: u32,
        explanation: impl Into<String>,
        mistakes: impl IntoIterator<Item = f64>,
        rng: &mut R,
    ) -> Self {
        ProblemDraft::new(kind, question, answer)
            .precision(precision)
            .explain(explanation)
            .mistakes(mistakes)
            .finish(difficulty, rng)
    }

    /// Allowed distance between a submitted value and the correct answer
    pub fn tolerance(&self) -> f64 {
        let answer_places = decimal_places(self.answer);
        if answer_places == 0 {
            return INTEGER_TOLERANCE;
        }
        let places = answer_places.max(self.precision);
        0.5 * 10f64.powi(-(places as i32))
    }

    pub fn check_answer(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        // Small slack so values printed at full precision still round-trip
        (value - self.answer).abs() <= self.tolerance() + 1e-9
    }

    pub fn check_option(&self, index: usize) -> bool {
        index == self.correct_index
    }

    /// Check a typed answer ("12", "-0.75", "3/4", "2 1/2")
    pub fn check_input(&self, input: &str) -> Result<bool, AnswerParseError> {
        let value = parse_answer(input)?;
        Ok(self.check_answer(value))
    }

    pub fn correct_option(&self) -> Option<f64> {
        self.options.get(self.correct_index).copied()
    }

    pub fn formatted_answer(&self) -> String {
        format_number(self.answer, self.precision)
    }

    pub fn formatted_options(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|o| format_number(*o, self.precision))
            .collect()
    }

    /// Number of options within OPTION_EPSILON of the answer (always 1 for valid problems)
    pub fn matching_option_count(&self) -> usize {
        self.options
            .iter()
            .filter(|o| (**o - self.answer).abs() < OPTION_EPSILON)
            .count()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Parse a typed answer into a number.
///
/// Accepts plain numbers, `a/b` fractions and `w a/b` mixed numbers.
pub fn parse_answer(input: &str) -> Result<f64, AnswerParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AnswerParseError::Empty);
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    match parts.as_slice() {
        [single] => parse_simple(single, trimmed),
        [whole, frac] if frac.contains('/') => {
            let w = parse_plain(whole, trimmed)?;
            let f = parse_fraction(frac, trimmed)?;
            if w.fract() != 0.0 || f < 0.0 {
                return Err(AnswerParseError::NotANumber(trimmed.to_string()));
            }
            if whole.starts_with('-') {
                Ok(w - f)
            } else {
                Ok(w + f)
            }
        }
        _ => Err(AnswerParseError::NotANumber(trimmed.to_string())),
    }
}

fn parse_simple(token: &str, original: &str) -> Result<f64, AnswerParseError> {
    if token.contains('/') {
        parse_fraction(token, original)
    } else {
        parse_plain(token, original)
    }
}

fn parse_plain(token: &str, original: &str) -> Result<f64, AnswerParseError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AnswerParseError::NotANumber(original.to_string()))
}

fn parse_fraction(token: &str, original: &str) -> Result<f64, AnswerParseError> {
    let (num, den) = token
        .split_once('/')
        .ok_or_else(|| AnswerParseError::NotANumber(original.to_string()))?;
    let num = parse_plain(num.trim(), original)?;
    let den = parse_plain(den.trim(), original)?;
    if den == 0.0 {
        return Err(AnswerParseError::ZeroDenominator(original.to_string()));
    }
    Ok(num / den)
}

/// Problem under construction: generators describe the math, `finish` builds the options
#[derive(Debug, Clone)]
pub struct ProblemDraft {
    pub kind: ProblemKind,
    pub question: String,
    pub answer: f64,
    pub precision: u32,
    pub explanation: String,
    /// Values a student commonly arrives at by mistake (preferred distractors)
    pub mistakes: Vec<f64>,
    /// Distance between neighbouring random distractors
    pub step: Option<f64>,
}

impl ProblemDraft {
    pub fn new(kind: ProblemKind, question: impl Into<String>, answer: f64) -> Self {
        Self {
            kind,
            question: question.into(),
            answer,
            precision: 0,
            explanation: String::new(),
            mistakes: Vec::new(),
            step: None,
        }
    }

    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn explain(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn mistakes(mut self, mistakes: impl IntoIterator<Item = f64>) -> Self {
        self.mistakes.extend(mistakes);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn finish<R: Rng + ?Sized>(self, difficulty: u8, rng: &mut R) -> MathProblem {
        let difficulty = clamp_difficulty(difficulty);
        let answer = round_to(self.answer, self.precision);
        let min_step = 10f64.powi(-(self.precision as i32));
        let step = self.step.unwrap_or(min_step).max(min_step);
        let spread = 3 + 2 * difficulty as u32;

        let (options, correct_index) =
            build_options(answer, self.precision, step, spread, &self.mistakes, rng);

        MathProblem {
            kind: self.kind,
            topic: self.kind.topic(),
            difficulty,
            question: self.question,
            answer,
            options,
            correct_index,
            explanation: self.explanation,
            precision: self.precision,
        }
    }
}
