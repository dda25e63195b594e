//! Client seam for the external text-generation service.
//!
//! The orchestrator only sees [`GenerationClient`]; each attempt resolves
//! to an [`AttemptOutcome`] that already says whether a retry makes sense.

mod http;

pub use http::{extract_text, HttpGenerationClient};

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a single generation attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("request rejected by generation service: {0}")]
    BadRequest(String),
    #[error("authentication failed (HTTP {0})")]
    Auth(u16),
    #[error("rate limited by generation service")]
    RateLimited,
    #[error("generation service error: HTTP {0}")]
    Server(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

impl GenerationError {
    /// Map a non-success HTTP status to an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            400 => GenerationError::BadRequest(truncate_body(body)),
            401 | 403 => GenerationError::Auth(status),
            429 => GenerationError::RateLimited,
            other => GenerationError::Server(other),
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited
                | GenerationError::Server(_)
                | GenerationError::Network(_)
                | GenerationError::Timeout
        )
    }
}

/// Result of one generation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// Raw generated text.
    Success(String),
    /// Failed, but a later attempt may succeed.
    Retriable(GenerationError),
    /// Failed for good; stop retrying.
    Fatal(GenerationError),
}

impl AttemptOutcome {
    /// Classify an error as retriable or fatal.
    pub fn from_error(error: GenerationError) -> Self {
        if error.is_retriable() {
            AttemptOutcome::Retriable(error)
        } else {
            AttemptOutcome::Fatal(error)
        }
    }
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Anything that can turn a prompt into text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Perform one attempt. Retries are the caller's business.
    async fn generate(&self, request: &GenerationRequest) -> AttemptOutcome;

    /// Name used in logs.
    fn name(&self) -> &str {
        "generation"
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body.trim().to_string()
    } else {
        let cut: String = body.chars().take(MAX).collect();
        format!("{}...", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            GenerationError::from_status(400, "bad"),
            GenerationError::BadRequest(_)
        ));
        assert_eq!(GenerationError::from_status(401, ""), GenerationError::Auth(401));
        assert_eq!(GenerationError::from_status(403, ""), GenerationError::Auth(403));
        assert_eq!(GenerationError::from_status(429, ""), GenerationError::RateLimited);
        assert_eq!(GenerationError::from_status(503, ""), GenerationError::Server(503));
        assert_eq!(GenerationError::from_status(418, ""), GenerationError::Server(418));
    }

    #[test]
    fn test_retriable_classification() {
        assert!(GenerationError::RateLimited.is_retriable());
        assert!(GenerationError::Server(500).is_retriable());
        assert!(GenerationError::Timeout.is_retriable());
        assert!(GenerationError::Network("reset".into()).is_retriable());
        assert!(!GenerationError::Auth(401).is_retriable());
        assert!(!GenerationError::BadRequest("x".into()).is_retriable());
        assert!(!GenerationError::InvalidBody("x".into()).is_retriable());
    }

    #[test]
    fn test_outcome_from_error() {
        assert_eq!(
            AttemptOutcome::from_error(GenerationError::Server(502)),
            AttemptOutcome::Retriable(GenerationError::Server(502))
        );
        assert_eq!(
            AttemptOutcome::from_error(GenerationError::Auth(401)),
            AttemptOutcome::Fatal(GenerationError::Auth(401))
        );
    }

    #[test]
    fn test_bad_request_body_is_truncated() {
        let body = "x".repeat(500);
        match GenerationError::from_status(400, &body) {
            GenerationError::BadRequest(msg) => {
                assert!(msg.ends_with("..."));
                assert_eq!(msg.chars().count(), 203);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
