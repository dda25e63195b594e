//! Analysis orchestration.
//!
//! Drives the generation service with bounded retries and turns whatever
//! comes back into an [`AnalysisResult`]. Every failure past input
//! validation is absorbed into a locally synthesized analysis, so
//! [`Orchestrator::analyze`] always returns a usable result.

pub mod fallback;
pub mod parse;
pub mod prompt;
pub mod types;

pub use parse::ParseError;
pub use types::{
    AnalysisContext, AnalysisMetadata, AnalysisResult, Assessment, FallbackReason, Issue,
    IssueKind, Preferences, QualityScores, ReviewMode, Severity, Strictness, Verbosity,
    SCHEMA_VERSION,
};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::{GenerationConfig, MAX_GENERATION_ATTEMPTS};
use crate::generation::{
    AttemptOutcome, GenerationClient, GenerationError, GenerationRequest, HttpGenerationClient,
};
use crate::language::LanguageId;
use crate::metrics::CodeMetrics;
use crate::score::{complexity_score, testability_score, Grade};

impl From<&GenerationError> for FallbackReason {
    fn from(error: &GenerationError) -> Self {
        match error {
            GenerationError::Auth(_) => FallbackReason::Auth,
            GenerationError::InvalidBody(_) => FallbackReason::Parse,
            GenerationError::Timeout => FallbackReason::Timeout,
            _ => FallbackReason::Request,
        }
    }
}

/// Runs analyses against an optional generation client.
pub struct Orchestrator {
    config: GenerationConfig,
    client: Option<Arc<dyn GenerationClient>>,
    seed: Option<u64>,
}

impl Orchestrator {
    /// Create an orchestrator. Without a client every analysis is a mock analysis.
    pub fn new(config: GenerationConfig, client: Option<Arc<dyn GenerationClient>>) -> Self {
        Self {
            config,
            client,
            seed: None,
        }
    }

    /// Build an HTTP-backed orchestrator, or a mock-only one when no API key
    /// is configured.
    pub fn from_config(config: &GenerationConfig) -> anyhow::Result<Self> {
        let client: Option<Arc<dyn GenerationClient>> = match config.resolve_api_key() {
            Some(key) => Some(Arc::new(HttpGenerationClient::new(config, key)?)),
            None => {
                info!("no generation API key configured; analyses will be mocked");
                None
            }
        };
        Ok(Self::new(config.clone(), client))
    }

    /// Fix the seed used for fallback jitter.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether a generation client is configured.
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Analyze validated code. Never fails.
    pub async fn analyze(
        &self,
        code: &str,
        language: LanguageId,
        metrics: &CodeMetrics,
        ctx: &AnalysisContext,
    ) -> AnalysisResult {
        let started = Instant::now();

        let (assessment, reason) = match &self.client {
            None => (
                self.synthesize(metrics, language, ctx),
                Some(FallbackReason::NoCredentials),
            ),
            Some(client) => {
                let request = self.request(code, language, metrics, ctx);
                match self.generate(client.as_ref(), &request, ctx).await {
                    Ok(text) => match parse::parse_analysis(&text) {
                        Ok(assessment) => (assessment, None),
                        Err(e) => {
                            warn!(error = %e, "could not parse generated analysis");
                            (
                                self.synthesize(metrics, language, ctx),
                                Some(FallbackReason::Parse),
                            )
                        }
                    },
                    Err(reason) => (self.synthesize(metrics, language, ctx), Some(reason)),
                }
            }
        };

        if let Some(reason) = reason {
            info!(%reason, "using fallback analysis");
        }

        assemble_result(assessment, metrics, reason, started.elapsed())
    }

    fn request(
        &self,
        code: &str,
        language: LanguageId,
        metrics: &CodeMetrics,
        ctx: &AnalysisContext,
    ) -> GenerationRequest {
        let max_tokens = match ctx.mode {
            ReviewMode::Full => self.config.max_tokens,
            ReviewMode::Quick => (self.config.max_tokens / 2).max(1),
        };

        GenerationRequest {
            prompt: prompt::build_prompt(
                code,
                language,
                metrics,
                &ctx.preferences,
                ctx.effective_verbosity(),
                self.config.prompt_char_budget,
            ),
            temperature: self.config.temperature,
            max_tokens,
        }
    }

    /// Run the retry loop under the caller's deadline and cancellation token.
    async fn generate(
        &self,
        client: &dyn GenerationClient,
        request: &GenerationRequest,
        ctx: &AnalysisContext,
    ) -> Result<String, FallbackReason> {
        let bounded = async {
            match ctx.deadline {
                Some(deadline) => tokio::time::timeout(deadline, self.attempts(client, request))
                    .await
                    .unwrap_or(Err(FallbackReason::Timeout)),
                None => self.attempts(client, request).await,
            }
        };

        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                warn!("analysis cancelled");
                Err(FallbackReason::Cancelled)
            }
            result = bounded => result,
        }
    }

    async fn attempts(
        &self,
        client: &dyn GenerationClient,
        request: &GenerationRequest,
    ) -> Result<String, FallbackReason> {
        let max_attempts = self.config.max_attempts.clamp(1, MAX_GENERATION_ATTEMPTS);

        for attempt in 1..=max_attempts {
            debug!(attempt, client = client.name(), "generation attempt");

            match client.generate(request).await {
                AttemptOutcome::Success(text) => return Ok(text),
                AttemptOutcome::Fatal(e) => {
                    error!(attempt, error = %e, "generation failed; not retrying");
                    return Err(FallbackReason::from(&e));
                }
                AttemptOutcome::Retriable(e) => {
                    warn!(attempt, max_attempts, error = %e, "generation attempt failed");
                    if attempt < max_attempts {
                        let backoff = self.config.backoff_ms.saturating_mul(attempt as u64);
                        tokio::time::sleep(Duration::from_millis(backoff)).await;
                    }
                }
            }
        }

        Err(FallbackReason::RetriesExhausted)
    }

    fn synthesize(
        &self,
        metrics: &CodeMetrics,
        language: LanguageId,
        ctx: &AnalysisContext,
    ) -> Assessment {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        fallback::synthesize(
            metrics,
            language,
            &ctx.preferences,
            ctx.large_file_lines,
            &mut rng,
        )
    }
}

/// Merge an assessment with measured metrics and stamp metadata.
fn assemble_result(
    assessment: Assessment,
    metrics: &CodeMetrics,
    reason: Option<FallbackReason>,
    elapsed: Duration,
) -> AnalysisResult {
    let mock_analysis = reason == Some(FallbackReason::NoCredentials);
    let fallback_mode = reason.is_some() && !mock_analysis;

    AnalysisResult {
        overall_score: assessment.overall_score,
        grade: Grade::from_score(assessment.overall_score),
        summary: assessment.summary,
        issues: assessment.issues,
        suggestions: assessment.suggestions,
        strengths: assessment.strengths,
        metrics: QualityScores {
            security: assessment.security,
            performance: assessment.performance,
            maintainability: assessment.maintainability,
            readability: assessment.readability,
            complexity: complexity_score(metrics),
            testability: testability_score(metrics),
        },
        statistics: metrics.clone(),
        metadata: AnalysisMetadata {
            timestamp: Utc::now(),
            processing_time_ms: elapsed.as_millis() as u64,
            version: SCHEMA_VERSION.to_string(),
            success: true,
            fallback_mode,
            mock_analysis,
            fallback_reason: reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    /// Replays scripted outcomes and records the requests it saw.
    struct Scripted {
        outcomes: Mutex<VecDeque<AttemptOutcome>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl Scripted {
        fn new(outcomes: Vec<AttemptOutcome>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerationClient for Scripted {
        async fn generate(&self, request: &GenerationRequest) -> AttemptOutcome {
            self.requests.lock().unwrap().push(request.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(AttemptOutcome::Retriable(GenerationError::Server(500)))
        }
    }

    /// Never answers.
    struct Hanging;

    #[async_trait]
    impl GenerationClient for Hanging {
        async fn generate(&self, _request: &GenerationRequest) -> AttemptOutcome {
            std::future::pending::<()>().await;
            AttemptOutcome::Retriable(GenerationError::Timeout)
        }
    }

    const GOOD_RESPONSE: &str = r#"```json
{"overallScore": 8.2, "summary": "Tidy.", "strengths": ["Small"], "issues": [],
 "suggestions": ["Add docs"],
 "metrics": {"security": 9, "performance": 8, "maintainability": 8, "readability": 7}}
```"#;

    fn fast_config() -> GenerationConfig {
        GenerationConfig {
            backoff_ms: 5,
            ..Default::default()
        }
    }

    fn orchestrator(client: Arc<dyn GenerationClient>) -> Orchestrator {
        Orchestrator::new(fast_config(), Some(client)).with_seed(11)
    }

    fn sample_metrics() -> CodeMetrics {
        CodeMetrics {
            total_lines: 12,
            code_lines: 10,
            comment_lines: 1,
            empty_lines: 1,
            cyclomatic_complexity: 4,
            maintainability_index: 75.0,
            function_count: 2,
            ..Default::default()
        }
    }

    async fn run(orch: &Orchestrator, ctx: &AnalysisContext) -> AnalysisResult {
        orch.analyze("fn main() {}", LanguageId::Rust, &sample_metrics(), ctx)
            .await
    }

    #[tokio::test]
    async fn test_no_client_is_mock_analysis() {
        let orch = Orchestrator::new(fast_config(), None).with_seed(1);
        let result = run(&orch, &AnalysisContext::default()).await;
        assert!(result.metadata.mock_analysis);
        assert!(!result.metadata.fallback_mode);
        assert_eq!(
            result.metadata.fallback_reason,
            Some(FallbackReason::NoCredentials)
        );
        assert!((5.0..=9.0).contains(&result.overall_score));
        assert!(result.metadata.success);
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let client = Scripted::new(vec![AttemptOutcome::Success(GOOD_RESPONSE.into())]);
        let result = run(&orchestrator(client.clone()), &AnalysisContext::default()).await;
        assert_eq!(client.calls(), 1);
        assert_eq!(result.overall_score, 8.2);
        assert_eq!(result.grade, Grade::B);
        assert_eq!(result.metrics.security, 9.0);
        assert_eq!(result.metrics.complexity, complexity_score(&sample_metrics()));
        assert!(!result.metadata.is_synthesized());
        assert_eq!(result.metadata.fallback_reason, None);
        assert_eq!(result.metadata.version, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let client = Scripted::new(vec![
            AttemptOutcome::Retriable(GenerationError::RateLimited),
            AttemptOutcome::Success(GOOD_RESPONSE.into()),
        ]);
        let result = run(&orchestrator(client.clone()), &AnalysisContext::default()).await;
        assert_eq!(client.calls(), 2);
        assert!(!result.metadata.fallback_mode);
    }

    #[tokio::test]
    async fn test_two_server_errors_fall_back() {
        let client = Scripted::new(vec![
            AttemptOutcome::Retriable(GenerationError::Server(500)),
            AttemptOutcome::Retriable(GenerationError::Server(500)),
        ]);
        let result = run(&orchestrator(client.clone()), &AnalysisContext::default()).await;
        assert_eq!(client.calls(), 2);
        assert!(result.metadata.fallback_mode);
        assert!(!result.metadata.mock_analysis);
        assert_eq!(
            result.metadata.fallback_reason,
            Some(FallbackReason::RetriesExhausted)
        );
        assert!((5.0..=9.0).contains(&result.overall_score));
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let client = Scripted::new(vec![AttemptOutcome::Fatal(GenerationError::Auth(401))]);
        let result = run(&orchestrator(client.clone()), &AnalysisContext::default()).await;
        assert_eq!(client.calls(), 1);
        assert_eq!(result.metadata.fallback_reason, Some(FallbackReason::Auth));
    }

    #[tokio::test]
    async fn test_unparseable_output_falls_back() {
        let client = Scripted::new(vec![AttemptOutcome::Success("no json here".into())]);
        let result = run(&orchestrator(client.clone()), &AnalysisContext::default()).await;
        assert_eq!(client.calls(), 1);
        assert!(result.metadata.fallback_mode);
        assert_eq!(result.metadata.fallback_reason, Some(FallbackReason::Parse));
    }

    #[tokio::test]
    async fn test_deadline_falls_back() {
        let orch = orchestrator(Arc::new(Hanging));
        let ctx = AnalysisContext::default().with_deadline(Duration::from_millis(20));
        let result = run(&orch, &ctx).await;
        assert_eq!(result.metadata.fallback_reason, Some(FallbackReason::Timeout));
    }

    #[tokio::test]
    async fn test_cancellation_falls_back() {
        let orch = orchestrator(Arc::new(Hanging));
        let token = CancellationToken::new();
        let ctx = AnalysisContext::default().with_cancellation(token.clone());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        let result = run(&orch, &ctx).await;
        assert_eq!(
            result.metadata.fallback_reason,
            Some(FallbackReason::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_quick_mode_halves_tokens() {
        let client = Scripted::new(vec![AttemptOutcome::Success(GOOD_RESPONSE.into())]);
        let ctx = AnalysisContext::default().with_mode(ReviewMode::Quick);
        run(&orchestrator(client.clone()), &ctx).await;
        let requests = client.requests.lock().unwrap();
        assert_eq!(requests[0].max_tokens, fast_config().max_tokens / 2);
        assert!(requests[0].prompt.contains("Keep it brief"));
    }

    #[tokio::test]
    async fn test_seeded_fallback_is_reproducible() {
        let orch = Orchestrator::new(fast_config(), None).with_seed(99);
        let a = run(&orch, &AnalysisContext::default()).await;
        let b = run(&orch, &AnalysisContext::default()).await;
        assert_eq!(a.overall_score, b.overall_score);
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.suggestions, b.suggestions);
    }
}
