//! Prompt construction for the generation service.

use std::borrow::Cow;

use super::types::{Preferences, Strictness, Verbosity};
use crate::language::LanguageId;
use crate::metrics::CodeMetrics;

/// Appended when code is cut to fit the prompt budget.
pub const TRUNCATION_MARKER: &str = "\n... [code truncated]";

const RESPONSE_SCHEMA: &str = r#"{
  "overallScore": <number 0-10>,
  "summary": "<two or three sentences>",
  "strengths": ["<strength>"],
  "issues": [
    {
      "type": "bug|security|performance|maintainability|readability|style|best_practice",
      "severity": "critical|high|medium|low|info",
      "title": "<short title>",
      "description": "<what is wrong>",
      "lineNumber": <line number or null>,
      "suggestion": "<how to fix it>"
    }
  ],
  "suggestions": ["<general improvement>"],
  "metrics": {
    "security": <number 0-10>,
    "performance": <number 0-10>,
    "maintainability": <number 0-10>,
    "readability": <number 0-10>
  }
}"#;

/// Cut `code` to at most `budget` characters, marking the cut.
pub fn truncate_code(code: &str, budget: usize) -> Cow<'_, str> {
    match code.char_indices().nth(budget) {
        None => Cow::Borrowed(code),
        Some((byte_end, _)) => {
            let mut cut = String::with_capacity(byte_end + TRUNCATION_MARKER.len());
            cut.push_str(&code[..byte_end]);
            cut.push_str(TRUNCATION_MARKER);
            Cow::Owned(cut)
        }
    }
}

/// Build the review prompt.
pub fn build_prompt(
    code: &str,
    language: LanguageId,
    metrics: &CodeMetrics,
    preferences: &Preferences,
    verbosity: Verbosity,
    budget: usize,
) -> String {
    let mut lines = vec![
        format!(
            "You are an experienced {} reviewer. Review the code below.",
            language.display_name()
        ),
        strictness_instruction(preferences.strictness).to_string(),
        verbosity_instruction(verbosity).to_string(),
    ];

    if !preferences.focus_areas.is_empty() {
        lines.push(format!(
            "Pay particular attention to: {}.",
            preferences.focus_areas.join(", ")
        ));
    }

    lines.push(format!(
        "\nMeasured statistics: {} lines ({} code, {} comment), {} functions, \
         cyclomatic complexity {}, max nesting depth {}, maintainability index {:.1}.",
        metrics.total_lines,
        metrics.code_lines,
        metrics.comment_lines,
        metrics.function_count,
        metrics.cyclomatic_complexity,
        metrics.max_nesting_depth,
        metrics.maintainability_index,
    ));
    lines.push(format!(
        "\nRespond with a single JSON object and nothing else, using this schema:\n{}",
        RESPONSE_SCHEMA
    ));

    let fence = if language.is_plaintext() {
        ""
    } else {
        language.as_str()
    };
    let code = truncate_code(code, budget);

    let mut prompt = lines.join("\n");
    prompt.push('\n');
    prompt.push_str(&format!("\nCode:\n```{}\n{}\n```\n", fence, code));
    prompt
}

fn strictness_instruction(strictness: Strictness) -> &'static str {
    match strictness {
        Strictness::Strict => {
            "Be strict: flag every deviation from best practice and score conservatively."
        }
        Strictness::Balanced => "Be balanced: focus on issues that matter in practice.",
        Strictness::Lenient => {
            "Be lenient: report only significant problems and credit what works."
        }
    }
}

fn verbosity_instruction(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Brief => "Keep it brief: at most three issues and three suggestions.",
        Verbosity::Detailed => "Give a detailed review with concrete suggestions.",
        Verbosity::Comprehensive => {
            "Give a comprehensive review covering every issue you find, with line numbers."
        }
    }
}
