//! Result envelope assembly.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::classify::{Candidate, ClassificationResult};
use crate::language::LanguageId;
use crate::orchestrator::AnalysisResult;
use crate::reconcile::{ReconcileAction, ReconciliationDecision};

/// How the effective language was chosen, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageReport {
    pub effective: LanguageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared: Option<LanguageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected: Option<LanguageId>,
    pub confidence: f64,
    pub action: ReconcileAction,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Everything the pipeline returns for one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEnvelope {
    pub analysis: AnalysisResult,
    pub language: LanguageReport,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Inputs gathered by the pipeline before assembly.
pub struct Parts<'a> {
    pub analysis: AnalysisResult,
    pub effective: LanguageId,
    pub declared: Option<LanguageId>,
    pub classification: Option<&'a ClassificationResult>,
    pub decision: &'a ReconciliationDecision,
    /// Line count above which a performance warning is attached.
    pub large_file_lines: usize,
    /// Wall time of the whole review.
    pub elapsed: Duration,
}

/// Merge classifier, reconciliation and analysis output into one envelope.
pub fn assemble(parts: Parts<'_>) -> ReviewEnvelope {
    let mut analysis = parts.analysis;
    analysis.metadata.processing_time_ms = parts.elapsed.as_millis() as u64;

    let mut warnings = Vec::new();
    if let Some(warning) = &parts.decision.warning {
        warnings.push(warning.clone());
    }
    let total_lines = analysis.statistics.total_lines;
    if total_lines > parts.large_file_lines {
        warnings.push(format!(
            "large input ({} lines): analysis may be slower and less precise",
            total_lines
        ));
    }

    ReviewEnvelope {
        language: LanguageReport {
            effective: parts.effective,
            declared: parts.declared,
            detected: parts.classification.map(|c| c.best_language),
            confidence: parts.decision.confidence,
            action: parts.decision.action,
            candidates: parts
                .classification
                .map(|c| c.scoreboard.clone())
                .unwrap_or_default(),
        },
        analysis,
        warnings,
    }
}
