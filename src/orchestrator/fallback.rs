//! Locally synthesized analysis.
//!
//! Used when the generation service is not configured or its output is
//! unusable. Scores come from measured complexity; the small jitter only
//! varies presentation and is driven by an injected RNG.

use rand::Rng;

use super::types::{Assessment, Issue, IssueKind, Preferences, Severity, Strictness};
use crate::language::LanguageId;
use crate::metrics::{CodeMetrics, IndentStyle};
use crate::score::{normalize, round1};

pub const MIN_FALLBACK_SCORE: f64 = 5.0;
pub const MAX_FALLBACK_SCORE: f64 = 9.0;

/// Score lost per decision point.
const COMPLEXITY_WEIGHT: f64 = 0.2;
/// Bound on the overall-score jitter.
const SCORE_JITTER: f64 = 0.3;
/// Bound on the per-category jitter.
const CATEGORY_JITTER: f64 = 0.5;
const STRICTNESS_SHIFT: f64 = 0.5;
const MAX_SUGGESTIONS: usize = 5;

const LONG_LINE: usize = 120;
const DEEP_NESTING: usize = 4;
const HIGH_COMPLEXITY: u32 = 15;

/// Generic advice keyed by focus area.
const AREA_SUGGESTIONS: &[(&str, &str)] = &[
    ("security", "Validate and sanitize all external input before use"),
    ("security", "Keep secrets out of source code and load them from configuration"),
    ("performance", "Avoid repeated work inside loops and cache expensive results"),
    ("maintainability", "Keep functions small and focused on a single responsibility"),
    ("readability", "Use descriptive names for variables and functions"),
    ("testing", "Add unit tests covering edge cases and error paths"),
];

/// Base score before jitter: `clamp(10 - complexity * 0.2, 5, 9)`.
pub fn base_score(metrics: &CodeMetrics) -> f64 {
    (10.0 - metrics.cyclomatic_complexity as f64 * COMPLEXITY_WEIGHT)
        .clamp(MIN_FALLBACK_SCORE, MAX_FALLBACK_SCORE)
}

/// Synthesize a plausible assessment from metrics alone.
///
/// Inputs longer than `large_file_lines` get a large-file issue.
pub fn synthesize<R: Rng>(
    metrics: &CodeMetrics,
    language: LanguageId,
    preferences: &Preferences,
    large_file_lines: usize,
    rng: &mut R,
) -> Assessment {
    let shift = match preferences.strictness {
        Strictness::Strict => -STRICTNESS_SHIFT,
        Strictness::Balanced => 0.0,
        Strictness::Lenient => STRICTNESS_SHIFT,
    };
    let jitter = rng.gen_range(-SCORE_JITTER..=SCORE_JITTER);
    let overall = round1(
        (base_score(metrics) + jitter + shift).clamp(MIN_FALLBACK_SCORE, MAX_FALLBACK_SCORE),
    );

    let mut category =
        |anchor: f64| normalize(anchor + rng.gen_range(-CATEGORY_JITTER..=CATEGORY_JITTER));
    let security = category(overall);
    let performance = category(overall);
    let maintainability = category((overall + metrics.maintainability_index / 10.0) / 2.0);
    let readability = category(overall);

    Assessment {
        overall_score: overall,
        summary: summary(metrics, language, overall),
        issues: issues(metrics, large_file_lines),
        suggestions: suggestions(metrics, preferences),
        strengths: strengths(metrics, language),
        security,
        performance,
        maintainability,
        readability,
    }
}

fn summary(metrics: &CodeMetrics, language: LanguageId, overall: f64) -> String {
    let quality = match overall {
        s if s >= 8.0 => "good",
        s if s >= 6.5 => "reasonable",
        _ => "mixed",
    };
    format!(
        "Heuristic review of {} lines of {}: {} overall quality with cyclomatic complexity {}. \
         Findings are derived from static metrics only.",
        metrics.total_lines,
        language.display_name(),
        quality,
        metrics.cyclomatic_complexity
    )
}

fn strengths(metrics: &CodeMetrics, language: LanguageId) -> Vec<String> {
    let mut strengths = Vec::new();

    if metrics.cyclomatic_complexity <= 10 {
        strengths.push("Control flow is straightforward and easy to follow".to_string());
    }
    if metrics.comment_density() >= 0.15 {
        strengths.push("Code is well documented with comments".to_string());
    }
    if metrics.function_count > 1 {
        strengths.push(format!(
            "Logic is organized into {} functions",
            metrics.function_count
        ));
    }
    if metrics.indentation.style != IndentStyle::Mixed && metrics.indentation.consistency >= 0.9 {
        strengths.push("Indentation is consistent".to_string());
    }
    if strengths.is_empty() {
        strengths.push(format!(
            "Code follows recognizable {} conventions",
            language.display_name()
        ));
    }

    strengths
}

fn suggestions(metrics: &CodeMetrics, preferences: &Preferences) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |text: &str| {
        if !out.iter().any(|s| s == text) {
            out.push(text.to_string());
        }
    };

    for area in &preferences.focus_areas {
        let area = area.trim().to_ascii_lowercase();
        if area.is_empty() {
            continue;
        }
        AREA_SUGGESTIONS
            .iter()
            .filter(|(key, _)| area.starts_with(key) || key.starts_with(area.as_str()))
            .for_each(|(_, text)| push(*text));
    }

    if metrics.cyclomatic_complexity > 10 {
        push("Break complex functions into smaller, well-named helpers");
    }
    if metrics.max_nesting_depth > DEEP_NESTING {
        push("Reduce nesting with early returns or guard clauses");
    }
    if metrics.comment_density() < 0.05 && metrics.code_lines > 10 {
        push("Add comments explaining non-obvious logic");
    }
    if metrics.longest_line > LONG_LINE {
        push("Wrap lines longer than 120 characters");
    }

    AREA_SUGGESTIONS.iter().for_each(|(_, text)| push(*text));
    out.truncate(MAX_SUGGESTIONS);
    out
}

fn issues(metrics: &CodeMetrics, large_file_lines: usize) -> Vec<Issue> {
    let mut issues = Vec::new();

    if metrics.cyclomatic_complexity > HIGH_COMPLEXITY {
        issues.push(Issue {
            kind: IssueKind::Maintainability,
            severity: Severity::Medium,
            title: "High cyclomatic complexity".to_string(),
            description: format!(
                "Estimated cyclomatic complexity is {}, which makes the code hard to test",
                metrics.cyclomatic_complexity
            ),
            line_number: None,
            suggestion: "Split branching logic into smaller functions".to_string(),
        });
    }
    if metrics.max_nesting_depth > DEEP_NESTING {
        issues.push(Issue {
            kind: IssueKind::Readability,
            severity: Severity::Low,
            title: "Deep nesting".to_string(),
            description: format!(
                "Blocks are nested {} levels deep",
                metrics.max_nesting_depth
            ),
            line_number: None,
            suggestion: "Flatten control flow with early returns".to_string(),
        });
    }
    if metrics.longest_line > LONG_LINE {
        issues.push(Issue {
            kind: IssueKind::Style,
            severity: Severity::Low,
            title: "Long lines".to_string(),
            description: format!(
                "The longest line is {} characters",
                metrics.longest_line
            ),
            line_number: None,
            suggestion: "Keep lines under 120 characters".to_string(),
        });
    }
    if metrics.indentation.style == IndentStyle::Mixed || metrics.indentation.consistency < 0.8 {
        issues.push(Issue {
            kind: IssueKind::Style,
            severity: Severity::Low,
            title: "Inconsistent indentation".to_string(),
            description: format!(
                "Indentation is {} with {:.0}% consistency",
                metrics.indentation.style,
                metrics.indentation.consistency * 100.0
            ),
            line_number: None,
            suggestion: "Pick one indentation style and apply a formatter".to_string(),
        });
    }
    if metrics.total_lines > large_file_lines {
        issues.push(Issue {
            kind: IssueKind::Maintainability,
            severity: Severity::Low,
            title: "Large file".to_string(),
            description: format!(
                "The file has {} lines ({} of code)",
                metrics.total_lines, metrics.code_lines
            ),
            line_number: None,
            suggestion: "Split the file into cohesive modules".to_string(),
        });
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{IndentationReport, MetricsEngine};
    use crate::patterns::PatternLibrary;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const LARGE: usize = 500;

    fn metrics_with(complexity: u32) -> CodeMetrics {
        CodeMetrics {
            total_lines: 40,
            code_lines: 30,
            comment_lines: 5,
            empty_lines: 5,
            cyclomatic_complexity: complexity,
            maintainability_index: 70.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_base_score_band() {
        assert_eq!(base_score(&metrics_with(1)), 9.0);
        assert_eq!(base_score(&metrics_with(10)), 8.0);
        assert_eq!(base_score(&metrics_with(50)), 5.0);
    }

    #[test]
    fn test_score_always_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for complexity in [1, 5, 12, 25, 50] {
            for strictness in [Strictness::Strict, Strictness::Balanced, Strictness::Lenient] {
                let prefs = Preferences {
                    strictness,
                    ..Default::default()
                };
                let a = synthesize(&metrics_with(complexity), LanguageId::Go, &prefs, LARGE, &mut rng);
                assert!(
                    (MIN_FALLBACK_SCORE..=MAX_FALLBACK_SCORE).contains(&a.overall_score),
                    "score {}",
                    a.overall_score
                );
                for sub in [a.security, a.performance, a.maintainability, a.readability] {
                    assert!((0.0..=10.0).contains(&sub));
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let m = metrics_with(8);
        let prefs = Preferences::default();
        let a = synthesize(&m, LanguageId::Rust, &prefs, LARGE, &mut StdRng::seed_from_u64(42));
        let b = synthesize(&m, LanguageId::Rust, &prefs, LARGE, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_strictness_shifts_score() {
        let m = metrics_with(15);
        let strict = Preferences {
            strictness: Strictness::Strict,
            ..Default::default()
        };
        let lenient = Preferences {
            strictness: Strictness::Lenient,
            ..Default::default()
        };
        let s = synthesize(&m, LanguageId::Java, &strict, LARGE, &mut StdRng::seed_from_u64(1));
        let l = synthesize(&m, LanguageId::Java, &lenient, LARGE, &mut StdRng::seed_from_u64(1));
        assert!((l.overall_score - s.overall_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_focus_areas_lead_suggestions() {
        let prefs = Preferences {
            focus_areas: vec!["Performance".into(), "security".into()],
            ..Default::default()
        };
        let a = synthesize(
            &metrics_with(3),
            LanguageId::Python,
            &prefs,
            LARGE,
            &mut StdRng::seed_from_u64(3),
        );
        assert_eq!(a.suggestions[0], AREA_SUGGESTIONS[2].1);
        assert_eq!(a.suggestions[1], AREA_SUGGESTIONS[0].1);
        assert_eq!(a.suggestions[2], AREA_SUGGESTIONS[1].1);
        assert!(a.suggestions.len() <= MAX_SUGGESTIONS);
    }

    #[test]
    fn test_issues_follow_metrics() {
        let calm = metrics_with(3);
        assert!(issues(&calm, LARGE).is_empty());

        let rough = CodeMetrics {
            cyclomatic_complexity: 30,
            max_nesting_depth: 6,
            longest_line: 200,
            indentation: IndentationReport {
                style: IndentStyle::Mixed,
                unit: 0,
                consistency: 0.0,
            },
            ..metrics_with(30)
        };
        let titles: Vec<String> = issues(&rough, LARGE).into_iter().map(|i| i.title).collect();
        assert_eq!(
            titles,
            vec![
                "High cyclomatic complexity",
                "Deep nesting",
                "Long lines",
                "Inconsistent indentation"
            ]
        );
    }

    #[test]
    fn test_large_file_threshold_is_configurable() {
        let m = metrics_with(3);
        let titles = |limit: usize| -> Vec<String> {
            issues(&m, limit).into_iter().map(|i| i.title).collect()
        };
        assert!(titles(LARGE).is_empty());
        assert_eq!(titles(39), vec!["Large file"]);
        assert!(titles(40).is_empty());
    }

    #[test]
    fn test_strengths_never_empty() {
        let rough = CodeMetrics {
            cyclomatic_complexity: 40,
            indentation: IndentationReport {
                style: IndentStyle::Mixed,
                unit: 0,
                consistency: 0.0,
            },
            ..Default::default()
        };
        assert_eq!(strengths(&rough, LanguageId::Ruby).len(), 1);

        let code = include_str!("../../testdata/samples/sample.rs");
        let m = MetricsEngine::new(PatternLibrary::global()).compute(code, LanguageId::Rust);
        assert!(!strengths(&m, LanguageId::Rust).is_empty());
    }
}
