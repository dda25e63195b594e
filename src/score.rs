//! Scoring and grading for code reviews.
//!
//! Scores run from 0 to 10, higher is better, rounded to one decimal.
//! The `complexity` and `testability` sub-scores are always derived from
//! measured metrics rather than taken from the generation service.

use serde::{Deserialize, Serialize};

use crate::metrics::CodeMetrics;

/// Grade lower bounds.
pub mod grades {
    pub const A_MIN: f64 = 9.0;
    pub const B_MIN: f64 = 8.0;
    pub const C_MIN: f64 = 7.0;
    pub const D_MIN: f64 = 6.0;
}

/// Penalties applied when deriving sub-scores from metrics.
pub mod penalties {
    /// Per decision point above the base path.
    pub const PER_DECISION: f64 = 0.2;
    /// Per nesting level beyond `COMFORTABLE_DEPTH`.
    pub const PER_EXTRA_DEPTH: f64 = 0.5;
    pub const COMFORTABLE_DEPTH: usize = 3;
    /// Average code lines per function above which testability drops.
    pub const LONG_FUNCTION_LINES: usize = 50;
    pub const LONG_FUNCTIONS: f64 = 1.5;
    /// Substantial code with no function boundaries at all.
    pub const NO_FUNCTIONS: f64 = 1.0;
}

pub const MAX_SCORE: f64 = 10.0;

/// Letter grade derived from an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Determine the grade band for a score.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= grades::A_MIN => Grade::A,
            s if s >= grades::B_MIN => Grade::B,
            s if s >= grades::C_MIN => Grade::C,
            s if s >= grades::D_MIN => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Clamp to [0, 10] and round to one decimal.
pub fn normalize(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    round1(score.clamp(0.0, MAX_SCORE))
}

/// Complexity sub-score: fewer decision points and shallower nesting score higher.
pub fn complexity_score(metrics: &CodeMetrics) -> f64 {
    let decisions = metrics.cyclomatic_complexity.saturating_sub(1) as f64;
    let extra_depth = metrics
        .max_nesting_depth
        .saturating_sub(penalties::COMFORTABLE_DEPTH) as f64;

    normalize(
        MAX_SCORE - decisions * penalties::PER_DECISION - extra_depth * penalties::PER_EXTRA_DEPTH,
    )
}

/// Testability sub-score, based on the maintainability index and on
/// whether logic is split into reasonably sized functions.
pub fn testability_score(metrics: &CodeMetrics) -> f64 {
    if metrics.code_lines == 0 {
        return 0.0;
    }

    let mut score = metrics.maintainability_index / 10.0;
    if metrics.function_count == 0 {
        if metrics.code_lines > 20 {
            score -= penalties::NO_FUNCTIONS;
        }
    } else if metrics.code_lines / metrics.function_count > penalties::LONG_FUNCTION_LINES {
        score -= penalties::LONG_FUNCTIONS;
    }

    normalize(score)
}
