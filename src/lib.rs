//! Codecritic - heuristic code review pipeline.
//!
//! Codecritic reviews a piece of code in four stages:
//! detect its language, reconcile that with what the caller declared,
//! measure it, and ask an external text-generation service for a
//! structured review. When the service is unavailable or its answer is
//! unusable, a review is synthesized locally from the measurements.
//!
//! # Architecture
//!
//! - `language`: Supported language identifiers and aliases
//! - `patterns`: Per-language signature and structure tables
//! - `classify`: Multi-signal language classifier
//! - `metrics`: Static code metrics
//! - `reconcile`: Declared vs. detected language policy
//! - `generation`: Client seam for the generation service
//! - `orchestrator`: Retry, parsing and fallback around generation
//! - `pipeline`: Validation and request flow
//! - `assemble`: Result envelope
//! - `config`: YAML configuration
//! - `report`: Output formatting (pretty, JSON)
//! - `score`: Grades and derived sub-scores
//!
//! # Adding a New Language
//!
//! Add a `LanguageId` variant and a `LanguageTable` in `src/patterns/tables.rs`,
//! or register a custom `PatternTable` with `PatternLibrary::builder()`.

pub mod assemble;
pub mod classify;
pub mod cli;
pub mod config;
pub mod generation;
pub mod language;
pub mod metrics;
pub mod orchestrator;
pub mod patterns;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod score;

pub use assemble::{LanguageReport, ReviewEnvelope};
pub use classify::{ClassificationResult, Classifier};
pub use config::Config;
pub use generation::{AttemptOutcome, GenerationClient, GenerationError, GenerationRequest};
pub use language::LanguageId;
pub use metrics::{CodeMetrics, MetricsEngine};
pub use orchestrator::{AnalysisContext, AnalysisResult, Orchestrator, Preferences, ReviewMode};
pub use patterns::{PatternLibrary, PatternTable};
pub use pipeline::{Pipeline, ReviewError, ReviewRequest};
pub use reconcile::{ReconcileAction, Reconciler, ReconciliationDecision};
pub use score::Grade;
