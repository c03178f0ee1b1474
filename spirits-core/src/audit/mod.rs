//! Monte-Carlo audit of the problem generators.
//!
//! Generates thousands of problems per kind and difficulty (rayon, one task
//! per kind) and checks every option/answer invariant:
//! - exactly 4 finite options, pairwise distinct by more than OPTION_EPSILON
//! - the correct answer appears exactly once, at `correct_index`
//! - `check_answer` accepts the answer and rejects values 2 tolerances away

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bank::derive_seed;
use crate::constants::{MAX_DIFFICULTY, MIN_DIFFICULTY, OPTION_COUNT, OPTION_EPSILON};
use crate::logging::TimingSpan;
use crate::problem::{generators, MathProblem, ProblemKind};

/// A broken invariant on a single problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation {
    OptionCount(usize),
    NonFiniteOption,
    DuplicateOptions,
    AnswerNotAtIndex,
    AnswerRepeated(usize),
    RejectsOwnAnswer,
    AcceptsOutsideTolerance,
    EmptyText,
}

/// Check one problem against every invariant
pub fn check_problem(problem: &MathProblem) -> Vec<Violation> {
    let mut violations = Vec::new();
    let options = &problem.options;

    if options.len() != OPTION_COUNT {
        violations.push(Violation::OptionCount(options.len()));
    }
    if options.iter().any(|o| !o.is_finite()) {
        violations.push(Violation::NonFiniteOption);
    }
    let duplicate = options.iter().enumerate().any(|(i, a)| {
        options
            .iter()
            .skip(i + 1)
            .any(|b| (a - b).abs() <= OPTION_EPSILON)
    });
    if duplicate {
        violations.push(Violation::DuplicateOptions);
    }
    match options.get(problem.correct_index) {
        Some(o) if (o - problem.answer).abs() < OPTION_EPSILON => {}
        _ => violations.push(Violation::AnswerNotAtIndex),
    }
    let matches = problem.matching_option_count();
    if matches > 1 {
        violations.push(Violation::AnswerRepeated(matches));
    }
    if !problem.check_answer(problem.answer) {
        violations.push(Violation::RejectsOwnAnswer);
    }
    let outside = 2.0 * problem.tolerance();
    if problem.check_answer(problem.answer + outside) || problem.check_answer(problem.answer - outside)
    {
        violations.push(Violation::AcceptsOutsideTolerance);
    }
    if problem.question.trim().is_empty() || problem.explanation.trim().is_empty() {
        violations.push(Violation::EmptyText);
    }
    violations
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Problems generated per (kind, difficulty) pair
    pub samples_per_kind: u64,
    pub base_seed: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            samples_per_kind: 1_000,
            base_seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindReport {
    pub kind: ProblemKind,
    pub checked: u64,
    pub violating_problems: u64,
    /// First few failures for diagnosis
    pub examples: Vec<(String, Vec<Violation>)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub total_problems: u64,
    pub violating_problems: u64,
    pub per_kind: Vec<KindReport>,
    pub passed: bool,
}

impl AuditReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

const MAX_EXAMPLES: usize = 3;

fn audit_kind(kind_index: usize, kind: ProblemKind, config: &AuditConfig) -> KindReport {
    let mut report = KindReport {
        kind,
        checked: 0,
        violating_problems: 0,
        examples: Vec::new(),
    };
    for difficulty in MIN_DIFFICULTY..=MAX_DIFFICULTY {
        let index = ((kind_index as u64) << 8) | difficulty as u64;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(derive_seed(config.base_seed, index));
        for _ in 0..config.samples_per_kind {
            let problem = generators::generate(kind, difficulty, &mut rng);
            report.checked += 1;
            let violations = check_problem(&problem);
            if !violations.is_empty() {
                report.violating_problems += 1;
                if report.examples.len() < MAX_EXAMPLES {
                    report.examples.push((problem.question.clone(), violations));
                }
            }
        }
    }
    report
}

/// Run the audit across every kind in parallel
pub fn audit_bank(config: &AuditConfig) -> AuditReport {
    let _span = TimingSpan::new("audit_bank");
    let kinds = ProblemKind::all();

    let per_kind: Vec<KindReport> = kinds
        .par_iter()
        .enumerate()
        .map(|(i, kind)| audit_kind(i, *kind, config))
        .collect();

    let total_problems: u64 = per_kind.iter().map(|k| k.checked).sum();
    let violating_problems: u64 = per_kind.iter().map(|k| k.violating_problems).sum();

    for k in per_kind.iter().filter(|k| k.violating_problems > 0) {
        warn!(
            kind = k.kind.id(),
            violating = k.violating_problems,
            "generator invariant violated"
        );
    }
    info!(total_problems, violating_problems, "problem bank audit finished");

    AuditReport {
        total_problems,
        violating_problems,
        per_kind,
        passed: violating_problems == 0,
    }
}
