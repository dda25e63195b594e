//! The review pipeline: validation, classification, reconciliation,
//! metrics, analysis and assembly.
//!
//! Only validation and language-mismatch failures surface as errors.
//! Everything after that point produces an envelope.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::assemble::{assemble, Parts, ReviewEnvelope};
use crate::classify::{ClassificationResult, Classifier};
use crate::config::Config;
use crate::language::LanguageId;
use crate::metrics::{CodeMetrics, MetricsEngine};
use crate::orchestrator::{AnalysisContext, Orchestrator, Preferences, ReviewMode};
use crate::patterns::PatternLibrary;
use crate::reconcile::{LanguageMismatch, Reconciler, ReconciliationDecision};

/// User-visible review failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    #[error("code is empty")]
    CodeEmpty,
    #[error("code is {size} characters; the limit is {limit}")]
    CodeTooLarge { size: usize, limit: usize },
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error(transparent)]
    LanguageMismatch(#[from] LanguageMismatch),
}

impl ReviewError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ReviewError::CodeEmpty => "CODE_EMPTY",
            ReviewError::CodeTooLarge { .. } => "CODE_TOO_LARGE",
            ReviewError::UnsupportedLanguage(_) => "UNSUPPORTED_LANGUAGE",
            ReviewError::LanguageMismatch(_) => "LANGUAGE_MISMATCH",
        }
    }
}

/// One inbound review request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub code: String,
    /// Declared language name or alias; empty or "auto" means undeclared.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub mode: ReviewMode,
    /// Overall time allowed for the generation call.
    #[serde(skip)]
    pub deadline: Option<Duration>,
}

impl ReviewRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_mode(mut self, mode: ReviewMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Local, synchronous part of a review.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub declared: Option<LanguageId>,
    pub classification: Option<ClassificationResult>,
    pub decision: ReconciliationDecision,
    pub effective: LanguageId,
    pub metrics: CodeMetrics,
    /// Time spent in local analysis.
    pub elapsed: Duration,
}

/// Review pipeline over an injected pattern library.
pub struct Pipeline<'a> {
    config: Config,
    library: &'a PatternLibrary,
    orchestrator: Orchestrator,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: Config, library: &'a PatternLibrary, orchestrator: Orchestrator) -> Self {
        Self {
            config,
            library,
            orchestrator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Check emptiness and size limits for the given mode.
    pub fn validate(&self, code: &str, mode: ReviewMode) -> Result<(), ReviewError> {
        if code.trim().is_empty() {
            return Err(ReviewError::CodeEmpty);
        }

        let limits = &self.config.limits;
        let mode_limit = match mode {
            ReviewMode::Full => limits.max_analysis_chars,
            ReviewMode::Quick => limits.max_quick_chars,
        };
        let limit = mode_limit.min(limits.max_input_chars);
        let size = code.chars().count();
        if size > limit {
            return Err(ReviewError::CodeTooLarge { size, limit });
        }
        Ok(())
    }

    /// Validate, classify, reconcile and measure. Pure CPU work.
    pub fn prepare(&self, request: &ReviewRequest) -> Result<Prepared, ReviewError> {
        let started = Instant::now();
        self.validate(&request.code, request.mode)?;
        let declared = parse_declared(request.language.as_deref())?;

        let classifier = Classifier::new(self.library);
        let engine = MetricsEngine::new(self.library);
        let detect = self.config.detection.enabled || declared.is_none();
        let code = request.code.as_str();

        // A declared language fixes the metrics language up front, so
        // measuring can overlap with classification.
        let (classification, early_metrics) = match declared {
            Some(language) if detect => {
                let (c, m) = rayon::join(
                    || classifier.classify(code),
                    || engine.compute(code, language),
                );
                (Some(c), Some(m))
            }
            Some(language) => (None, Some(engine.compute(code, language))),
            None => (Some(classifier.classify(code)), None),
        };

        let decision = Reconciler::new(self.config.detection.block_threshold)
            .reconcile(declared, classification.as_ref());
        if let Some(mismatch) = decision.error.clone() {
            return Err(ReviewError::LanguageMismatch(mismatch));
        }
        let effective = decision
            .effective_language
            .unwrap_or(LanguageId::Plaintext);

        let metrics = match early_metrics {
            Some(m) => m,
            None => engine.compute(code, effective),
        };
        debug!(%effective, lines = metrics.total_lines, "prepared review");

        Ok(Prepared {
            declared,
            classification,
            decision,
            effective,
            metrics,
            elapsed: started.elapsed(),
        })
    }

    /// Run the remote analysis and assemble the envelope.
    ///
    /// The reported processing time covers local analysis plus this call.
    pub async fn complete(
        &self,
        request: &ReviewRequest,
        prepared: Prepared,
        cancel: CancellationToken,
    ) -> ReviewEnvelope {
        let started = Instant::now();
        let mut ctx = AnalysisContext::new(request.preferences.clone())
            .with_mode(request.mode)
            .with_cancellation(cancel)
            .with_large_file_lines(self.config.limits.large_file_lines);
        ctx.deadline = request.deadline;

        let analysis = self
            .orchestrator
            .analyze(&request.code, prepared.effective, &prepared.metrics, &ctx)
            .await;

        assemble(Parts {
            analysis,
            effective: prepared.effective,
            declared: prepared.declared,
            classification: prepared.classification.as_ref(),
            decision: &prepared.decision,
            large_file_lines: self.config.limits.large_file_lines,
            elapsed: prepared.elapsed + started.elapsed(),
        })
    }

    /// Review one piece of code.
    pub async fn review(&self, request: &ReviewRequest) -> Result<ReviewEnvelope, ReviewError> {
        self.review_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Review one piece of code; cancelling `cancel` short-circuits the
    /// remote call to the fallback analysis.
    pub async fn review_with_cancel(
        &self,
        request: &ReviewRequest,
        cancel: CancellationToken,
    ) -> Result<ReviewEnvelope, ReviewError> {
        let prepared = self.prepare(request)?;
        Ok(self.complete(request, prepared, cancel).await)
    }
}

/// Resolve a declared language string. Empty and "auto" mean undeclared.
pub fn parse_declared(language: Option<&str>) -> Result<Option<LanguageId>, ReviewError> {
    match language.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("auto") => Ok(None),
        Some(s) => LanguageId::parse(s)
            .map(Some)
            .ok_or_else(|| ReviewError::UnsupportedLanguage(s.to_string())),
    }
}
