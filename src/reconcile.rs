//! Reconciliation of a user-declared language with the classifier's pick.
//!
//! The decision is the single source of truth for which language the rest
//! of the pipeline uses. A confident disagreement blocks the review before
//! the generation service is called; a shaky one defers to the user.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::classify::ClassificationResult;
use crate::language::LanguageId;

/// Confidence above which a disagreement blocks the review.
pub const DEFAULT_BLOCK_THRESHOLD: f64 = 0.7;

/// Minimum confidence reported when the declaration matches detection.
const CONFIRMED_CONFIDENCE: f64 = 0.9;

/// Confidence reported when the user overrides weak detection.
const OVERRIDE_CONFIDENCE: f64 = 0.5;

/// Confidence reported when detection was not performed.
const PREFERENCE_CONFIDENCE: f64 = 0.6;

/// How the effective language was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    AutoDetected,
    ConfirmedMatch,
    BlockedMismatch,
    UserOverride,
    UserPreference,
}

impl ReconcileAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileAction::AutoDetected => "auto_detected",
            ReconcileAction::ConfirmedMatch => "confirmed_match",
            ReconcileAction::BlockedMismatch => "blocked_mismatch",
            ReconcileAction::UserOverride => "user_override",
            ReconcileAction::UserPreference => "user_preference",
        }
    }
}

impl std::fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The classifier is confident the user declared the wrong language.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error(
    "code appears to be {} ({:.0}% confidence) but {} was selected",
    .detected.display_name(),
    .confidence * 100.0,
    .declared.display_name()
)]
pub struct LanguageMismatch {
    pub declared: LanguageId,
    pub detected: LanguageId,
    pub confidence: f64,
}

/// Outcome of reconciling declared and detected languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationDecision {
    /// `None` only when the review is blocked.
    pub effective_language: Option<LanguageId>,
    pub confidence: f64,
    pub action: ReconcileAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<LanguageMismatch>,
}

impl ReconciliationDecision {
    pub fn is_blocked(&self) -> bool {
        self.action == ReconcileAction::BlockedMismatch
    }
}

/// Stateless reconciliation policy.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    block_threshold: f64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_THRESHOLD)
    }
}

impl Reconciler {
    pub fn new(block_threshold: f64) -> Self {
        Self { block_threshold }
    }

    /// Decide the effective language.
    ///
    /// `classification` is `None` when detection was skipped; in that case a
    /// declared language is taken as a plain preference.
    pub fn reconcile(
        &self,
        declared: Option<LanguageId>,
        classification: Option<&ClassificationResult>,
    ) -> ReconciliationDecision {
        let decision = match (declared, classification) {
            (None, Some(detected)) => ReconciliationDecision {
                effective_language: Some(detected.best_language),
                confidence: detected.confidence,
                action: ReconcileAction::AutoDetected,
                warning: None,
                error: None,
            },
            (None, None) => ReconciliationDecision {
                effective_language: Some(LanguageId::Plaintext),
                confidence: 0.0,
                action: ReconcileAction::AutoDetected,
                warning: None,
                error: None,
            },
            (Some(declared), None) => ReconciliationDecision {
                effective_language: Some(declared),
                confidence: PREFERENCE_CONFIDENCE,
                action: ReconcileAction::UserPreference,
                warning: None,
                error: None,
            },
            (Some(declared), Some(detected)) => self.compare(declared, detected),
        };

        debug!(
            action = %decision.action,
            confidence = decision.confidence,
            "reconciled language"
        );
        decision
    }

    fn compare(
        &self,
        declared: LanguageId,
        detected: &ClassificationResult,
    ) -> ReconciliationDecision {
        let best = detected.best_language;

        if declared == best {
            return ReconciliationDecision {
                effective_language: Some(declared),
                confidence: detected.confidence.max(CONFIRMED_CONFIDENCE),
                action: ReconcileAction::ConfirmedMatch,
                warning: None,
                error: None,
            };
        }

        if detected.confidence > self.block_threshold && !best.is_plaintext() {
            let mismatch = LanguageMismatch {
                declared,
                detected: best,
                confidence: detected.confidence,
            };
            warn!(%declared, detected = %best, "blocking review on language mismatch");
            return ReconciliationDecision {
                effective_language: None,
                confidence: detected.confidence,
                action: ReconcileAction::BlockedMismatch,
                warning: None,
                error: Some(mismatch),
            };
        }

        ReconciliationDecision {
            effective_language: Some(declared),
            confidence: OVERRIDE_CONFIDENCE,
            action: ReconcileAction::UserOverride,
            warning: Some(format!(
                "language detection confidence is low; analyzing as {} as selected",
                declared.display_name()
            )),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detected(language: LanguageId, confidence: f64) -> ClassificationResult {
        ClassificationResult {
            best_language: language,
            confidence,
            scoreboard: Vec::new(),
        }
    }

    #[test]
    fn test_auto_detected_without_declaration() {
        let d = Reconciler::default().reconcile(None, Some(&detected(LanguageId::Go, 0.8)));
        assert_eq!(d.action, ReconcileAction::AutoDetected);
        assert_eq!(d.effective_language, Some(LanguageId::Go));
        assert_eq!(d.confidence, 0.8);
        assert!(d.warning.is_none());
    }

    #[test]
    fn test_confirmed_match_raises_confidence() {
        let d = Reconciler::default().reconcile(
            Some(LanguageId::Rust),
            Some(&detected(LanguageId::Rust, 0.6)),
        );
        assert_eq!(d.action, ReconcileAction::ConfirmedMatch);
        assert_eq!(d.confidence, 0.9);

        let d = Reconciler::default().reconcile(
            Some(LanguageId::Rust),
            Some(&detected(LanguageId::Rust, 0.95)),
        );
        assert_eq!(d.confidence, 0.95);
    }

    #[test]
    fn test_confident_mismatch_blocks() {
        let d = Reconciler::default().reconcile(
            Some(LanguageId::Python),
            Some(&detected(LanguageId::JavaScript, 0.85)),
        );
        assert_eq!(d.action, ReconcileAction::BlockedMismatch);
        assert!(d.is_blocked());
        assert_eq!(d.effective_language, None);
        let err = d.error.expect("mismatch error");
        assert_eq!(err.declared, LanguageId::Python);
        assert_eq!(err.detected, LanguageId::JavaScript);
        let msg = err.to_string();
        assert!(msg.contains("JavaScript"), "{}", msg);
        assert!(msg.contains("Python"), "{}", msg);
        assert!(msg.contains("85%"), "{}", msg);
    }

    #[test]
    fn test_weak_mismatch_is_user_override() {
        let d = Reconciler::default().reconcile(
            Some(LanguageId::Python),
            Some(&detected(LanguageId::JavaScript, 0.4)),
        );
        assert_eq!(d.action, ReconcileAction::UserOverride);
        assert_eq!(d.effective_language, Some(LanguageId::Python));
        assert_eq!(d.confidence, 0.5);
        assert!(d.warning.is_some());
        assert!(d.error.is_none());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let d = Reconciler::default().reconcile(
            Some(LanguageId::Python),
            Some(&detected(LanguageId::Ruby, 0.7)),
        );
        assert_eq!(d.action, ReconcileAction::UserOverride);
    }

    #[test]
    fn test_plaintext_detection_never_blocks() {
        let d = Reconciler::new(0.05).reconcile(
            Some(LanguageId::Kotlin),
            Some(&detected(LanguageId::Plaintext, 0.1)),
        );
        assert_eq!(d.action, ReconcileAction::UserOverride);
        assert_eq!(d.effective_language, Some(LanguageId::Kotlin));
    }

    #[test]
    fn test_declaration_without_detection_is_preference() {
        let d = Reconciler::default().reconcile(Some(LanguageId::Java), None);
        assert_eq!(d.action, ReconcileAction::UserPreference);
        assert_eq!(d.effective_language, Some(LanguageId::Java));
        assert_eq!(d.confidence, 0.6);
        assert!(d.warning.is_none());
    }

    #[test]
    fn test_decision_serializes_snake_case_action() {
        let d = Reconciler::default().reconcile(Some(LanguageId::Java), None);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["action"], "user_preference");
        assert_eq!(json["effectiveLanguage"], "java");
        assert!(json.get("error").is_none());
    }
}
