//! Output formatting for codecritic results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::assemble::ReviewEnvelope;
use crate::classify::ClassificationResult;
use crate::metrics::CodeMetrics;
use crate::orchestrator::{Issue, Severity};
use crate::pipeline::ReviewError;

/// Outcome of reviewing one input.
#[derive(Debug, Clone)]
pub struct FileReview {
    /// File path, or "-" for stdin.
    pub path: String,
    pub outcome: Result<ReviewEnvelope, ReviewError>,
}

/// Aggregate pass/fail for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gate {
    pub min_score: Option<f64>,
}

impl Gate {
    /// A review passes when it was not rejected and meets the minimum score.
    pub fn passes(&self, review: &FileReview) -> bool {
        match &review.outcome {
            Ok(envelope) => self
                .min_score
                .map_or(true, |min| envelope.analysis.overall_score >= min),
            Err(_) => false,
        }
    }

    pub fn all_pass(&self, reviews: &[FileReview]) -> bool {
        reviews.iter().all(|r| self.passes(r))
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report for a review run.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    pub passed: bool,
    pub files_reviewed: usize,
    pub results: Vec<JsonFileResult>,
}

/// One file in the JSON report.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonFileResult {
    pub path: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewEnvelope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

/// A rejected review.
#[derive(Serialize, Deserialize)]
pub struct JsonError {
    pub code: String,
    pub message: String,
}

/// Build the JSON report structure.
pub fn build_json(path: &str, reviews: &[FileReview], gate: Gate) -> JsonReport {
    let results = reviews
        .iter()
        .map(|r| {
            let (review, error) = match &r.outcome {
                Ok(envelope) => (Some(envelope.clone()), None),
                Err(e) => (
                    None,
                    Some(JsonError {
                        code: e.code().to_string(),
                        message: e.to_string(),
                    }),
                ),
            };
            JsonFileResult {
                path: r.path.clone(),
                passed: gate.passes(r),
                review,
                error,
            }
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        min_score: gate.min_score,
        passed: gate.all_pass(reviews),
        files_reviewed: reviews.len(),
        results,
    }
}

/// Write review results in JSON format.
pub fn write_json(path: &str, reviews: &[FileReview], gate: Gate) -> anyhow::Result<()> {
    let report = build_json(path, reviews, gate);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

/// Write any serializable value as pretty JSON.
pub fn write_value_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write review results in pretty format.
pub fn write_pretty(path: &str, reviews: &[FileReview], gate: Gate, verbose: bool) {
    write_header();
    print!("  {}", "Reviewing: ".dimmed());
    println!("{}", path);
    println!();

    for review in reviews {
        match &review.outcome {
            Ok(envelope) => write_envelope(&review.path, envelope, verbose),
            Err(e) => write_rejection(&review.path, e),
        }
        println!();
    }

    write_final_status(reviews, gate);
    println!();
}

fn write_header() {
    println!();
    print!("  ");
    print!("{}", "codecritic".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
}

fn write_envelope(path: &str, envelope: &ReviewEnvelope, verbose: bool) {
    let analysis = &envelope.analysis;
    let language = &envelope.language;

    print!("  {}", path.blue().bold());
    print!("  Score: ");
    write_colored_score(analysis.overall_score);
    print!("  Grade: ");
    write_colored_grade(analysis.grade.as_str());
    if analysis.metadata.mock_analysis {
        print!("  {}", "(mock analysis)".dimmed());
    } else if analysis.metadata.fallback_mode {
        let reason = analysis
            .metadata
            .fallback_reason
            .map(|r| r.to_string())
            .unwrap_or_default();
        print!("  {}", format!("(fallback: {})", reason).yellow());
    }
    println!();

    println!(
        "    {} {} ({}, {:.0}% confidence)",
        "Language:".dimmed(),
        language.effective.display_name(),
        language.action,
        language.confidence * 100.0
    );
    println!("    {}", analysis.summary);

    for warning in &envelope.warnings {
        println!("    {} {}", "WARN ".yellow(), warning);
    }

    let m = &analysis.metrics;
    println!(
        "    {}",
        format!(
            "security {:.1}  performance {:.1}  maintainability {:.1}  readability {:.1}  complexity {:.1}  testability {:.1}",
            m.security, m.performance, m.maintainability, m.readability, m.complexity, m.testability
        )
        .dimmed()
    );

    if !analysis.issues.is_empty() {
        println!();
        println!("    {} ({}):", "Issues".bold(), analysis.issues.len());
        write_issues(&analysis.issues, verbose);
    }

    if verbose && !analysis.strengths.is_empty() {
        println!();
        println!("    {}", "Strengths:".bold());
        for s in &analysis.strengths {
            println!("      {} {}", "+".green(), s);
        }
    }

    if !analysis.suggestions.is_empty() {
        println!();
        println!("    {}", "Suggestions:".bold());
        for s in &analysis.suggestions {
            println!("      - {}", s);
        }
    }

    if verbose {
        println!();
        write_statistics(&analysis.statistics);
    }
}

fn write_issues(issues: &[Issue], verbose: bool) {
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by_key(|i| i.severity);

    for issue in sorted {
        write_severity_tag(issue.severity);
        print!("{}", issue.title);
        if let Some(line) = issue.line_number {
            print!("{}", format!(" :{}", line).dimmed());
        }
        println!();
        if verbose && !issue.description.is_empty() {
            println!("               {}", issue.description);
        }
        if !issue.suggestion.is_empty() {
            println!("               {}", format!("fix: {}", issue.suggestion).dimmed());
        }
    }
}

fn write_rejection(path: &str, error: &ReviewError) {
    print!("  {}", path.blue().bold());
    println!("  {}", "✗ REJECTED".red());
    println!("    {} {}", error.code().red(), error);
}

fn write_colored_score(s: f64) {
    let text = format!("{:.1}", s);
    match s {
        s if s >= 9.0 => print!("{}", text.green().bold()),
        s if s >= 8.0 => print!("{}", text.green()),
        s if s >= 7.0 => print!("{}", text.yellow()),
        s if s >= 6.0 => print!("{}", text.yellow().bold()),
        _ => print!("{}", text.red()),
    }
}

fn write_colored_grade(grade: &str) {
    match grade {
        "A" => print!("{}", grade.green().bold()),
        "B" => print!("{}", grade.green()),
        "C" => print!("{}", grade.yellow()),
        "D" => print!("{}", grade.yellow().bold()),
        _ => print!("{}", grade.red()),
    }
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::Critical => print!("      {} ", "CRIT ".red().bold()),
        Severity::High => print!("      {} ", "HIGH ".red()),
        Severity::Medium => print!("      {} ", "MED  ".yellow()),
        Severity::Low => print!("      {} ", "LOW  ".blue()),
        Severity::Info => print!("      {} ", "INFO ".dimmed()),
    }
}

fn write_final_status(reviews: &[FileReview], gate: Gate) {
    let reviewed = reviews.iter().filter(|r| r.outcome.is_ok()).count();
    let rejected = reviews.len() - reviewed;

    print!(
        "  {}",
        format!("Reviewed: {}  Rejected: {}", reviewed, rejected).dimmed()
    );
    if let Some(min) = gate.min_score {
        print!("  {}", format!("Min score: {:.1}", min).dimmed());
    }
    print!("  ");
    if gate.all_pass(reviews) {
        print!("{}", "PASSED".green());
    } else {
        print!("{}", "FAILED".red());
    }
    println!();
}

/// Write a language detection result in pretty format.
pub fn write_detection_pretty(path: &str, result: &ClassificationResult) {
    print!("  {}", path.blue());
    println!(
        "  {} ({:.0}% confidence)",
        result.best_language.display_name().bold(),
        result.confidence * 100.0
    );
    for candidate in &result.scoreboard {
        println!(
            "    {:<12} {:>5.2}  {}",
            candidate.language.as_str(),
            candidate.score,
            format!("({} signals)", candidate.matched).dimmed()
        );
    }
}

/// Write code metrics in pretty format.
pub fn write_metrics_pretty(path: &str, metrics: &CodeMetrics) {
    println!("  {}", path.blue());
    write_statistics(metrics);
}

fn write_statistics(m: &CodeMetrics) {
    println!("    {}", "Statistics:".bold());
    println!(
        "      lines {} (code {}, comment {}, empty {})",
        m.total_lines, m.code_lines, m.comment_lines, m.empty_lines
    );
    println!(
        "      functions {}  classes {}  max nesting {}",
        m.function_count, m.class_count, m.max_nesting_depth
    );
    println!(
        "      cyclomatic complexity {}  maintainability index {:.1}",
        m.cyclomatic_complexity, m.maintainability_index
    );
    println!(
        "      line length avg {:.1} max {}  indentation {} (unit {}, {:.0}% consistent)",
        m.avg_line_length,
        m.longest_line,
        m.indentation.style,
        m.indentation.unit,
        m.indentation.consistency * 100.0
    );
}
