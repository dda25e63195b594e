//! Analysis result types and request context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_LARGE_FILE_LINES;
use crate::metrics::CodeMetrics;
use crate::score::Grade;

/// Version stamped into every analysis result.
pub const SCHEMA_VERSION: &str = "1.0";

/// Issue severity, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// Lenient parse of a severity label; unknown labels become `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" | "blocker" => Severity::Critical,
            "high" | "error" | "major" => Severity::High,
            "low" | "minor" => Severity::Low,
            "info" | "information" | "note" | "hint" => Severity::Info,
            _ => Severity::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Bug,
    Security,
    Performance,
    Maintainability,
    Readability,
    Style,
    BestPractice,
    Other,
}

impl IssueKind {
    /// Lenient parse of an issue category; unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "bug" | "error" | "correctness" | "logic" => IssueKind::Bug,
            "security" | "vulnerability" => IssueKind::Security,
            "performance" | "perf" => IssueKind::Performance,
            "maintainability" | "complexity" => IssueKind::Maintainability,
            "readability" | "documentation" => IssueKind::Readability,
            "style" | "formatting" => IssueKind::Style,
            "best_practice" | "best_practices" => IssueKind::BestPractice,
            _ => IssueKind::Other,
        }
    }
}

/// One finding in an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    pub suggestion: String,
}

/// Sub-scores, each 0-10.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub security: f64,
    pub performance: f64,
    pub maintainability: f64,
    pub readability: f64,
    pub complexity: f64,
    pub testability: f64,
}

/// Why the fallback analysis was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoCredentials,
    Auth,
    Request,
    RetriesExhausted,
    Parse,
    Timeout,
    Cancelled,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::NoCredentials => "no_credentials",
            FallbackReason::Auth => "auth",
            FallbackReason::Request => "request",
            FallbackReason::RetriesExhausted => "retries_exhausted",
            FallbackReason::Parse => "parse",
            FallbackReason::Timeout => "timeout",
            FallbackReason::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provenance and timing of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub timestamp: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub version: String,
    pub success: bool,
    /// The generation service was configured but its output was unusable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback_mode: bool,
    /// No credentials were configured, so the service was never called.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub mock_analysis: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

impl AnalysisMetadata {
    /// Whether the result was synthesized locally.
    pub fn is_synthesized(&self) -> bool {
        self.fallback_mode || self.mock_analysis
    }
}

/// The complete analysis of one piece of code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: f64,
    pub grade: Grade,
    pub summary: String,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<String>,
    pub strengths: Vec<String>,
    pub metrics: QualityScores,
    pub statistics: CodeMetrics,
    pub metadata: AnalysisMetadata,
}

/// The judgement part of an analysis, before metrics and metadata are merged in.
///
/// Produced either by parsing generated text or by the fallback generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub overall_score: f64,
    pub summary: String,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<String>,
    pub strengths: Vec<String>,
    pub security: f64,
    pub performance: f64,
    pub maintainability: f64,
    pub readability: f64,
}

/// How harsh the review should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Strict,
    #[default]
    Balanced,
    Lenient,
}

/// How much detail the review should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Brief,
    #[default]
    Detailed,
    Comprehensive,
}

/// Free-form reviewer preferences supplied by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub strictness: Strictness,
    pub focus_areas: Vec<String>,
    pub verbosity: Verbosity,
}

/// Full or quick review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMode {
    #[default]
    Full,
    /// Smaller input ceiling, brief output, half the token budget.
    Quick,
}

/// Per-request context for the orchestrator.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub preferences: Preferences,
    pub mode: ReviewMode,
    /// Overall time allowed for the generation call, retries included.
    pub deadline: Option<Duration>,
    pub cancel: CancellationToken,
    /// Line count above which fallback analyses flag the input as large.
    pub large_file_lines: usize,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self {
            preferences: Preferences::default(),
            mode: ReviewMode::default(),
            deadline: None,
            cancel: CancellationToken::new(),
            large_file_lines: DEFAULT_LARGE_FILE_LINES,
        }
    }
}

impl AnalysisContext {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: ReviewMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_large_file_lines(mut self, lines: usize) -> Self {
        self.large_file_lines = lines;
        self
    }

    /// Verbosity after the review mode is applied.
    pub fn effective_verbosity(&self) -> Verbosity {
        match self.mode {
            ReviewMode::Quick => Verbosity::Brief,
            ReviewMode::Full => self.preferences.verbosity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_labels() {
        assert_eq!(Severity::from_label("HIGH"), Severity::High);
        assert_eq!(Severity::from_label("error"), Severity::High);
        assert_eq!(Severity::from_label(" info "), Severity::Info);
        assert_eq!(Severity::from_label("whatever"), Severity::Medium);
        assert!(Severity::Critical < Severity::Low);
    }

    #[test]
    fn test_issue_kind_labels() {
        assert_eq!(IssueKind::from_label("Best Practice"), IssueKind::BestPractice);
        assert_eq!(IssueKind::from_label("best-practices"), IssueKind::BestPractice);
        assert_eq!(IssueKind::from_label("vulnerability"), IssueKind::Security);
        assert_eq!(IssueKind::from_label("naming"), IssueKind::Other);
    }

    #[test]
    fn test_issue_serializes_type_field() {
        let issue = Issue {
            kind: IssueKind::BestPractice,
            severity: Severity::Low,
            title: "t".into(),
            description: "d".into(),
            line_number: None,
            suggestion: "s".into(),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["type"], "best_practice");
        assert_eq!(json["severity"], "low");
        assert!(json.get("lineNumber").is_none());
    }

    #[test]
    fn test_metadata_flags_omitted_when_false() {
        let metadata = AnalysisMetadata {
            timestamp: Utc::now(),
            processing_time_ms: 3,
            version: SCHEMA_VERSION.into(),
            success: true,
            fallback_mode: false,
            mock_analysis: false,
            fallback_reason: None,
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json.get("fallbackMode").is_none());
        assert!(json.get("mockAnalysis").is_none());
        assert_eq!(json["processingTimeMs"], 3);
        assert!(!metadata.is_synthesized());
    }

    #[test]
    fn test_preferences_defaults_from_partial_json() {
        let prefs: Preferences =
            serde_json::from_str(r#"{"strictness":"strict","focusAreas":["security"]}"#).unwrap();
        assert_eq!(prefs.strictness, Strictness::Strict);
        assert_eq!(prefs.focus_areas, vec!["security".to_string()]);
        assert_eq!(prefs.verbosity, Verbosity::Detailed);
    }

    #[test]
    fn test_quick_mode_forces_brief() {
        let ctx = AnalysisContext::new(Preferences {
            verbosity: Verbosity::Comprehensive,
            ..Default::default()
        });
        assert_eq!(ctx.effective_verbosity(), Verbosity::Comprehensive);
        assert_eq!(ctx.with_mode(ReviewMode::Quick).effective_verbosity(), Verbosity::Brief);
    }
}
