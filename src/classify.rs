//! Multi-signal language classification.
//!
//! Every registered pattern set is scored against the full text. A matching
//! signature contributes its weight once, regardless of how often it occurs.
//! When more than one distinct signature matches, a breadth bonus of
//! `0.2 * match_count` is added so that several independent signals beat a
//! single strong one.
//!
//! Ties are broken alphabetically by language id.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::language::LanguageId;
use crate::patterns::{PatternLibrary, PatternSet};

/// Minimum raw score a language needs before it is reported.
pub const SCORE_FLOOR: f64 = 0.5;

/// Confidence reported when nothing scored above the floor.
pub const PLAINTEXT_CONFIDENCE: f64 = 0.1;

/// Upper bound on reported confidence.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Raw score needed for full confidence before capping.
const CONFIDENCE_SCALE: f64 = 3.0;

/// Bonus per matching signature when more than one matched.
const BREADTH_BONUS: f64 = 0.2;

/// Number of candidates kept in the scoreboard.
const SCOREBOARD_SIZE: usize = 3;

/// Raw score for one candidate language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub language: LanguageId,
    pub score: f64,
    pub matched: usize,
}

/// Outcome of classifying one piece of code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub best_language: LanguageId,
    pub confidence: f64,
    /// Top nonzero scorers, best first.
    pub scoreboard: Vec<Candidate>,
}

impl ClassificationResult {
    /// Result used when no language produced enough evidence.
    pub fn plaintext(scoreboard: Vec<Candidate>) -> Self {
        Self {
            best_language: LanguageId::Plaintext,
            confidence: PLAINTEXT_CONFIDENCE,
            scoreboard,
        }
    }
}

/// Scores code against a pattern library.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    library: &'a PatternLibrary,
}

impl<'a> Classifier<'a> {
    pub fn new(library: &'a PatternLibrary) -> Self {
        Self { library }
    }

    /// Classify code. Never fails; unknown input yields `plaintext`.
    pub fn classify(&self, code: &str) -> ClassificationResult {
        if code.trim().is_empty() {
            return ClassificationResult::plaintext(Vec::new());
        }

        let mut candidates: Vec<Candidate> = self
            .library
            .iter()
            .map(|set| score_language(set, code))
            .filter(|c| c.score > 0.0)
            .collect();
        candidates.sort_by(rank);

        let best = candidates.first().cloned();
        candidates.truncate(SCOREBOARD_SIZE);

        let result = match best {
            Some(best) if best.score > SCORE_FLOOR => ClassificationResult {
                best_language: best.language,
                confidence: (best.score / CONFIDENCE_SCALE).min(MAX_CONFIDENCE),
                scoreboard: candidates,
            },
            _ => ClassificationResult::plaintext(candidates),
        };

        debug!(
            language = %result.best_language,
            confidence = result.confidence,
            "classified code"
        );
        result
    }
}

/// Score one language's signatures against the code.
fn score_language(set: &PatternSet, code: &str) -> Candidate {
    let mut score = 0.0;
    let mut matched = 0;

    for signature in set.signatures() {
        if signature.regex.is_match(code) {
            score += signature.weight;
            matched += 1;
        }
    }

    if matched > 1 {
        score += BREADTH_BONUS * matched as f64;
    }

    Candidate {
        language: set.language(),
        score,
        matched,
    }
}

/// Higher score first; equal scores ordered alphabetically by language id.
fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.language.as_str().cmp(b.language.as_str()))
}
