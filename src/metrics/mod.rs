//! Static code metrics.
//!
//! All metrics are derived from the raw text and the language's pattern set;
//! no parsing is involved. Every function here is pure and total.
//!
//! Cyclomatic complexity is approximated as:
//! - Start at 1
//! - Add 1 for each branching keyword and short-circuit operator
//!   (`if`, `for`, `while`, `case`, `catch`, `&&`, `||`, `?`, ...)
//! - Cap at 50

mod indent;

pub use indent::{detect_indentation, IndentStyle, IndentationReport};

use serde::{Deserialize, Serialize};

use crate::language::LanguageId;
use crate::patterns::{PatternLibrary, PatternSet};

/// Upper bound for the complexity approximation.
pub const COMPLEXITY_CAP: u32 = 50;

/// Spaces per level when estimating depth from indentation.
const INDENT_WIDTH: usize = 4;

/// Maximum bonus added to the maintainability index for comment density.
const COMMENT_BONUS: f64 = 10.0;

/// Structural statistics for a piece of code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeMetrics {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub empty_lines: usize,
    pub avg_line_length: f64,
    pub longest_line: usize,
    pub function_count: usize,
    pub class_count: usize,
    pub max_nesting_depth: usize,
    pub cyclomatic_complexity: u32,
    /// 0-100, higher is easier to maintain.
    pub maintainability_index: f64,
    pub indentation: IndentationReport,
}

impl Default for CodeMetrics {
    fn default() -> Self {
        Self {
            total_lines: 0,
            code_lines: 0,
            comment_lines: 0,
            empty_lines: 0,
            avg_line_length: 0.0,
            longest_line: 0,
            function_count: 0,
            class_count: 0,
            max_nesting_depth: 0,
            cyclomatic_complexity: 1,
            maintainability_index: 0.0,
            indentation: IndentationReport::default(),
        }
    }
}

impl CodeMetrics {
    /// Comment lines as a fraction of non-empty lines.
    pub fn comment_density(&self) -> f64 {
        comment_density(self.code_lines, self.comment_lines)
    }
}

/// Computes [`CodeMetrics`] using a pattern library.
#[derive(Debug, Clone, Copy)]
pub struct MetricsEngine<'a> {
    library: &'a PatternLibrary,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(library: &'a PatternLibrary) -> Self {
        Self { library }
    }

    /// Compute metrics for `code` interpreted as `language`.
    pub fn compute(&self, code: &str, language: LanguageId) -> CodeMetrics {
        compute_with(self.library.get_or_plaintext(language), code)
    }
}

/// Compute metrics with an explicit pattern set.
pub fn compute_with(set: &PatternSet, code: &str) -> CodeMetrics {
    if code.is_empty() {
        return CodeMetrics::default();
    }

    let mut total_lines = 0;
    let mut comment_lines = 0;
    let mut empty_lines = 0;
    let mut total_length = 0;
    let mut longest_line = 0;
    let mut code_text = String::with_capacity(code.len());
    let mut brace_depth = 0usize;
    let mut max_brace_depth = 0usize;
    let mut max_indent_depth = 0usize;

    for line in code.lines() {
        total_lines += 1;
        let length = line.chars().count();
        total_length += length;
        longest_line = longest_line.max(length);

        let trimmed = line.trim();
        if trimmed.is_empty() {
            empty_lines += 1;
            continue;
        }
        if set.is_comment_line(trimmed) {
            comment_lines += 1;
            continue;
        }

        code_text.push_str(line);
        code_text.push('\n');

        for c in line.chars() {
            match c {
                '{' | '[' => {
                    brace_depth += 1;
                    max_brace_depth = max_brace_depth.max(brace_depth);
                }
                '}' | ']' => brace_depth = brace_depth.saturating_sub(1),
                _ => {}
            }
        }

        if set.indentation_significant() {
            max_indent_depth = max_indent_depth.max(leading_columns(line) / INDENT_WIDTH);
        }
    }

    let code_lines = total_lines - empty_lines - comment_lines;
    let cyclomatic_complexity = cyclomatic_complexity(set, &code_text);

    CodeMetrics {
        total_lines,
        code_lines,
        comment_lines,
        empty_lines,
        avg_line_length: round1(total_length as f64 / total_lines.max(1) as f64),
        longest_line,
        function_count: count_matches(set.function_patterns(), code),
        class_count: count_matches(set.class_patterns(), code),
        max_nesting_depth: max_brace_depth.max(max_indent_depth),
        cyclomatic_complexity,
        maintainability_index: maintainability_index(
            code_lines,
            cyclomatic_complexity,
            comment_density(code_lines, comment_lines),
        ),
        indentation: detect_indentation(code),
    }
}

/// Approximate cyclomatic complexity: 1 plus every decision point, capped.
pub fn cyclomatic_complexity(set: &PatternSet, code: &str) -> u32 {
    let decisions: usize = set
        .complexity_patterns()
        .iter()
        .map(|re| re.find_iter(code).count())
        .sum();
    let total = 1usize.saturating_add(decisions);
    total.min(COMPLEXITY_CAP as usize) as u32
}

/// Bounded approximation of the maintainability index.
///
/// `171 - 5.2 ln(V) - 0.23 CC - 16.2 ln(LOC)` with `V = LOC log2(LOC)`,
/// plus up to 10 points for comment density, clamped to [0, 100].
pub fn maintainability_index(code_lines: usize, complexity: u32, comment_density: f64) -> f64 {
    if code_lines == 0 {
        return 0.0;
    }

    let loc = code_lines as f64;
    let volume = (loc * loc.log2()).max(1.0);
    let raw = 171.0 - 5.2 * volume.ln() - 0.23 * complexity as f64 - 16.2 * loc.ln();
    let bonus = COMMENT_BONUS * comment_density.clamp(0.0, 1.0);

    round1((raw + bonus).clamp(0.0, 100.0))
}

fn comment_density(code_lines: usize, comment_lines: usize) -> f64 {
    let non_empty = code_lines + comment_lines;
    if non_empty == 0 {
        return 0.0;
    }
    comment_lines as f64 / non_empty as f64
}

fn count_matches(patterns: &[regex::Regex], code: &str) -> usize {
    patterns.iter().map(|re| re.find_iter(code).count()).sum()
}

/// Width of leading whitespace, counting a tab as one indent level.
fn leading_columns(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { INDENT_WIDTH } else { 1 })
        .sum()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
