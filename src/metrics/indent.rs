//! Indentation style detection.

use serde::{Deserialize, Serialize};

/// Dominant leading-whitespace kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    Tabs,
    Spaces,
    Mixed,
    None,
}

impl std::fmt::Display for IndentStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndentStyle::Tabs => write!(f, "tabs"),
            IndentStyle::Spaces => write!(f, "spaces"),
            IndentStyle::Mixed => write!(f, "mixed"),
            IndentStyle::None => write!(f, "none"),
        }
    }
}

/// Narrowest and widest indent units considered for space indentation.
const MIN_UNIT: usize = 2;
const MAX_UNIT: usize = 8;

/// Detected indentation style of a piece of code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndentationReport {
    pub style: IndentStyle,
    /// Spaces per indent level (1 for tabs, 0 when nothing is indented).
    pub unit: usize,
    /// Fraction of indented lines that match the detected style and unit.
    pub consistency: f64,
}

impl Default for IndentationReport {
    fn default() -> Self {
        Self {
            style: IndentStyle::None,
            unit: 0,
            consistency: 1.0,
        }
    }
}

/// Detect the indentation style of `code`.
///
/// Block-comment continuation lines (`* ...`) are ignored because their
/// single-space alignment says nothing about the indent unit.
pub fn detect_indentation(code: &str) -> IndentationReport {
    let mut tab_lines = 0usize;
    let mut space_counts: Vec<usize> = Vec::new();

    for line in code.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('*') {
            continue;
        }
        if line.starts_with('\t') {
            tab_lines += 1;
        } else if line.starts_with(' ') {
            space_counts.push(line.len() - line.trim_start_matches(' ').len());
        }
    }

    let space_lines = space_counts.len();
    let indented = tab_lines + space_lines;
    if indented == 0 {
        return IndentationReport::default();
    }

    let (style, unit, matching) = if tab_lines > space_lines {
        (IndentStyle::Tabs, 1, tab_lines)
    } else if space_lines > tab_lines {
        let (unit, matching) = space_unit(&space_counts);
        (IndentStyle::Spaces, unit, matching)
    } else {
        (IndentStyle::Mixed, 0, 0)
    };

    IndentationReport {
        style,
        unit,
        consistency: round2(matching as f64 / indented as f64),
    }
}

/// Pick the space indent unit and count the lines that follow it.
///
/// The unit is the widest candidate that divides as many indents as any
/// other candidate, so stray odd widths count against consistency instead
/// of shrinking the unit. When no candidate covers a majority, the code is
/// taken as single-space aligned.
fn space_unit(widths: &[usize]) -> (usize, usize) {
    let fits = |unit: usize| widths.iter().filter(|&&w| w % unit == 0).count();

    let (unit, matching) = (MIN_UNIT..=MAX_UNIT)
        .map(|unit| (unit, fits(unit)))
        .max_by_key(|&(unit, matching)| (matching, unit))
        .unwrap_or((1, widths.len()));

    if matching * 2 <= widths.len() {
        return (1, widths.len());
    }
    (unit, matching)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
