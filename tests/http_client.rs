//! HTTP generation client tests against a local mock server.

use codecritic::config::GenerationConfig;
use codecritic::generation::HttpGenerationClient;
use codecritic::metrics::MetricsEngine;
use codecritic::orchestrator::{AnalysisContext, FallbackReason};
use codecritic::{
    AttemptOutcome, GenerationClient, GenerationError, GenerationRequest, LanguageId, Orchestrator,
    PatternLibrary,
};
use std::sync::Arc;

fn config(url: &str) -> GenerationConfig {
    GenerationConfig {
        endpoint: format!("{}/v1/generate", url),
        model: "review-test".to_string(),
        backoff_ms: 5,
        timeout_ms: 5_000,
        ..Default::default()
    }
}

fn client(url: &str) -> HttpGenerationClient {
    HttpGenerationClient::new(&config(url), "test-key".to_string()).unwrap()
}

fn request() -> GenerationRequest {
    GenerationRequest {
        prompt: "Review this".to_string(),
        temperature: 0.3,
        max_tokens: 256,
    }
}

#[tokio::test]
async fn test_success_returns_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/generate")
        .match_header("authorization", "Bearer test-key")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text": "{\"overallScore\": 8}"}"#)
        .create_async()
        .await;

    let outcome = client(&server.url()).generate(&request()).await;
    assert_eq!(
        outcome,
        AttemptOutcome::Success(r#"{"overallScore": 8}"#.to_string())
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_shaped_response() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/generate")
        .with_status(200)
        .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "done"}}]}"#)
        .create_async()
        .await;

    let outcome = client(&server.url()).generate(&request()).await;
    assert_eq!(outcome, AttemptOutcome::Success("done".to_string()));
}

#[tokio::test]
async fn test_status_mapping() {
    let cases: Vec<(usize, AttemptOutcome)> = vec![
        (
            400,
            AttemptOutcome::Fatal(GenerationError::BadRequest("bad prompt".to_string())),
        ),
        (401, AttemptOutcome::Fatal(GenerationError::Auth(401))),
        (403, AttemptOutcome::Fatal(GenerationError::Auth(403))),
        (429, AttemptOutcome::Retriable(GenerationError::RateLimited)),
        (500, AttemptOutcome::Retriable(GenerationError::Server(500))),
        (503, AttemptOutcome::Retriable(GenerationError::Server(503))),
    ];

    for (status, expected) in cases {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/generate")
            .with_status(status)
            .with_body("bad prompt")
            .create_async()
            .await;

        let outcome = client(&server.url()).generate(&request()).await;
        assert_eq!(outcome, expected, "HTTP {}", status);
    }
}

#[tokio::test]
async fn test_unusable_body_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/generate")
        .with_status(200)
        .with_body(r#"{"unexpected": true}"#)
        .create_async()
        .await;

    let outcome = client(&server.url()).generate(&request()).await;
    assert!(matches!(
        outcome,
        AttemptOutcome::Fatal(GenerationError::InvalidBody(_))
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_retriable() {
    let outcome = client("http://127.0.0.1:1").generate(&request()).await;
    assert!(matches!(
        outcome,
        AttemptOutcome::Retriable(GenerationError::Network(_))
    ));
}

#[test]
fn test_empty_endpoint_rejected() {
    let config = GenerationConfig {
        endpoint: "  ".to_string(),
        ..Default::default()
    };
    assert!(HttpGenerationClient::new(&config, "k".to_string()).is_err());
}

#[tokio::test]
async fn test_orchestrator_retries_then_falls_back() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/generate")
        .with_status(500)
        .with_body("upstream exploded")
        .expect(2)
        .create_async()
        .await;

    let config = config(&server.url());
    let client = Arc::new(HttpGenerationClient::new(&config, "test-key".to_string()).unwrap());
    let orchestrator = Orchestrator::new(config, Some(client)).with_seed(3);

    let code = "def add(a, b):\n    return a + b\n";
    let metrics = MetricsEngine::new(PatternLibrary::global()).compute(code, LanguageId::Python);
    let result = orchestrator
        .analyze(code, LanguageId::Python, &metrics, &AnalysisContext::default())
        .await;

    mock.assert_async().await;
    assert!(result.metadata.fallback_mode);
    assert_eq!(
        result.metadata.fallback_reason,
        Some(FallbackReason::RetriesExhausted)
    );
    assert_eq!(result.statistics, metrics);
}

#[tokio::test]
async fn test_orchestrator_stops_on_auth_failure() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/generate")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let config = config(&server.url());
    let client = Arc::new(HttpGenerationClient::new(&config, "wrong".to_string()).unwrap());
    let orchestrator = Orchestrator::new(config, Some(client)).with_seed(3);

    let code = "fn main() {}\n";
    let metrics = MetricsEngine::new(PatternLibrary::global()).compute(code, LanguageId::Rust);
    let result = orchestrator
        .analyze(code, LanguageId::Rust, &metrics, &AnalysisContext::default())
        .await;

    mock.assert_async().await;
    assert_eq!(result.metadata.fallback_reason, Some(FallbackReason::Auth));
}
