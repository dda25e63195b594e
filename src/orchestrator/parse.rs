//! Parsing of generated review text.
//!
//! Generated text is untrusted: it may be wrapped in code fences, preceded
//! by chatter, or carry fields with the wrong shape. Parsing locates the
//! first balanced JSON object and reads it leniently.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::types::{Assessment, Issue, IssueKind, Severity};
use crate::score::normalize;

/// Why generated text could not be turned into an assessment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("no JSON object found in generated text")]
    NoJsonObject,
    #[error("malformed JSON object: {0}")]
    Malformed(String),
    #[error("generated analysis has no usable score")]
    MissingScore,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAnalysis {
    #[serde(alias = "overall_score", alias = "score")]
    overall_score: Option<Value>,
    summary: Option<String>,
    strengths: Vec<Value>,
    issues: Vec<RawIssue>,
    suggestions: Vec<Value>,
    #[serde(alias = "scores")]
    metrics: RawScores,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawIssue {
    #[serde(rename = "type", alias = "category")]
    kind: Option<String>,
    severity: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(alias = "line", alias = "line_number")]
    line_number: Option<Value>,
    suggestion: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawScores {
    security: Option<Value>,
    performance: Option<Value>,
    maintainability: Option<Value>,
    readability: Option<Value>,
}

/// Remove surrounding Markdown code fences, if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Locate the first balanced `{...}` span, ignoring braces inside strings.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse generated text into an assessment.
pub fn parse_analysis(text: &str) -> Result<Assessment, ParseError> {
    let body = strip_code_fences(text);
    let object = find_json_object(body).ok_or(ParseError::NoJsonObject)?;
    let raw: RawAnalysis =
        serde_json::from_str(object).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let sub_scores = [
        raw.metrics.security.as_ref().and_then(number),
        raw.metrics.performance.as_ref().and_then(number),
        raw.metrics.maintainability.as_ref().and_then(number),
        raw.metrics.readability.as_ref().and_then(number),
    ];

    let overall = match raw.overall_score.as_ref().and_then(number) {
        Some(score) => score,
        None => {
            let present: Vec<f64> = sub_scores.iter().flatten().copied().collect();
            if present.is_empty() {
                return Err(ParseError::MissingScore);
            }
            present.iter().sum::<f64>() / present.len() as f64
        }
    };
    let overall = normalize(overall);
    let sub = |i: usize| normalize(sub_scores[i].unwrap_or(overall));

    Ok(Assessment {
        overall_score: overall,
        summary: raw
            .summary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "No summary provided.".to_string()),
        issues: raw.issues.into_iter().filter_map(into_issue).collect(),
        suggestions: strings(raw.suggestions),
        strengths: strings(raw.strengths),
        security: sub(0),
        performance: sub(1),
        maintainability: sub(2),
        readability: sub(3),
    })
}

fn into_issue(raw: RawIssue) -> Option<Issue> {
    let title = raw.title.map(|t| t.trim().to_string()).unwrap_or_default();
    let description = raw
        .description
        .map(|d| d.trim().to_string())
        .unwrap_or_default();
    if title.is_empty() && description.is_empty() {
        return None;
    }

    Some(Issue {
        kind: raw
            .kind
            .as_deref()
            .map(IssueKind::from_label)
            .unwrap_or(IssueKind::Other),
        severity: raw
            .severity
            .as_deref()
            .map(Severity::from_label)
            .unwrap_or(Severity::Medium),
        title: if title.is_empty() {
            description.clone()
        } else {
            title
        },
        description,
        line_number: raw.line_number.as_ref().and_then(line_number),
        suggestion: raw.suggestion.unwrap_or_default(),
    })
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn number(value: &Value) -> Option<f64> {
    let n: Option<f64> = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn line_number(value: &Value) -> Option<u32> {
    number(value)
        .filter(|n| *n >= 1.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
}

fn strings(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(map) => map
                .get("text")
                .or_else(|| map.get("description"))
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "overallScore": 7.46,
        "summary": "Solid code.",
        "strengths": ["Clear names"],
        "issues": [
            {"type": "security", "severity": "high", "title": "SQL injection",
             "description": "Query built by concatenation", "lineNumber": 12,
             "suggestion": "Use parameters"}
        ],
        "suggestions": ["Add tests"],
        "metrics": {"security": 5, "performance": 8, "maintainability": 7.5, "readability": 9}
    }"#;

    #[test]
    fn test_parse_well_formed() {
        let a = parse_analysis(WELL_FORMED).unwrap();
        assert_eq!(a.overall_score, 7.5);
        assert_eq!(a.summary, "Solid code.");
        assert_eq!(a.strengths, vec!["Clear names".to_string()]);
        assert_eq!(a.issues.len(), 1);
        assert_eq!(a.issues[0].kind, IssueKind::Security);
        assert_eq!(a.issues[0].severity, Severity::High);
        assert_eq!(a.issues[0].line_number, Some(12));
        assert_eq!(a.security, 5.0);
        assert_eq!(a.readability, 9.0);
    }

    #[test]
    fn test_parse_fenced_with_chatter() {
        let text = format!("```json\n{}\n```", WELL_FORMED);
        assert!(parse_analysis(&text).is_ok());

        let text = format!("Sure! Here is the review:\n{}\nHope this helps {{:", WELL_FORMED);
        assert_eq!(parse_analysis(&text).unwrap().overall_score, 7.5);
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"{"overallScore": 6, "summary": "uses { and } in \"strings\""} trailing }"#;
        let object = find_json_object(text).unwrap();
        assert!(object.ends_with("\"}"));
        let a = parse_analysis(text).unwrap();
        assert_eq!(a.summary, r#"uses { and } in "strings""#);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_no_object() {
        assert_eq!(parse_analysis("I cannot review this."), Err(ParseError::NoJsonObject));
        assert_eq!(parse_analysis("{ unbalanced"), Err(ParseError::NoJsonObject));
    }

    #[test]
    fn test_malformed_object() {
        assert!(matches!(
            parse_analysis("{overallScore: seven}"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_score() {
        assert_eq!(
            parse_analysis(r#"{"summary": "no numbers"}"#),
            Err(ParseError::MissingScore)
        );
    }

    #[test]
    fn test_score_from_sub_scores_and_strings() {
        let text = r#"{"score": "x", "metrics": {"security": "6", "performance": 8}}"#;
        let a = parse_analysis(text).unwrap();
        assert_eq!(a.overall_score, 7.0);
        assert_eq!(a.security, 6.0);
        // Missing sub-scores fall back to the overall score.
        assert_eq!(a.readability, 7.0);
    }

    #[test]
    fn test_scores_are_clamped() {
        let a = parse_analysis(r#"{"overall_score": 42, "metrics": {"security": -3}}"#).unwrap();
        assert_eq!(a.overall_score, 10.0);
        assert_eq!(a.security, 0.0);
    }

    #[test]
    fn test_lenient_issues() {
        let text = r#"{"overallScore": 8, "issues": [
            {"category": "Best Practice", "title": "Magic number", "line": "7"},
            {"severity": "low"},
            {"description": "Only a description", "line": 0}
        ]}"#;
        let a = parse_analysis(text).unwrap();
        assert_eq!(a.issues.len(), 2);
        assert_eq!(a.issues[0].kind, IssueKind::BestPractice);
        assert_eq!(a.issues[0].severity, Severity::Medium);
        assert_eq!(a.issues[0].line_number, Some(7));
        assert_eq!(a.issues[1].title, "Only a description");
        assert_eq!(a.issues[1].line_number, None);
    }
}
