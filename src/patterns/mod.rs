//! Pattern library: per-language lexical signatures and structure tables.
//!
//! Each language contributes a [`PatternTable`]: weighted signature regexes
//! used by the classifier, plus comment markers, declaration patterns and
//! complexity-inducing patterns used by the metrics engine. Tables are
//! compiled once into a [`PatternLibrary`] which is read-only afterwards and
//! shared by reference.
//!
//! # Adding a Language Table
//!
//! Implement [`PatternTable`] (or declare a static [`LanguageTable`]) and
//! register it through [`PatternLibrary::builder`]. A table registered for a
//! language that already has one replaces it.

mod tables;

pub use tables::{builtin_tables, DEFAULT_COMPLEXITY_PATTERNS};

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::language::LanguageId;

/// A raw signature: a regex and the score it contributes when it matches.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub pattern: &'static str,
    pub weight: f64,
}

impl Signature {
    pub const fn new(pattern: &'static str, weight: f64) -> Self {
        Self { pattern, weight }
    }
}

/// Source of pattern data for one language.
pub trait PatternTable: Send + Sync {
    /// The language this table describes.
    fn language(&self) -> LanguageId;

    /// Weighted signatures used for classification.
    fn signatures(&self) -> &[Signature];

    /// Line prefixes that mark a comment line.
    fn comment_markers(&self) -> &[&'static str];

    /// Patterns matching one function or method declaration each.
    fn function_patterns(&self) -> &[&'static str];

    /// Patterns matching one class-like declaration each.
    fn class_patterns(&self) -> &[&'static str];

    /// Patterns whose every match adds one decision path.
    fn complexity_patterns(&self) -> &[&'static str] {
        DEFAULT_COMPLEXITY_PATTERNS
    }

    /// Whether block structure is expressed through indentation.
    fn indentation_significant(&self) -> bool {
        false
    }
}

/// Static, data-only table definition.
#[derive(Debug)]
pub struct LanguageTable {
    pub language: LanguageId,
    pub signatures: &'static [Signature],
    pub comment_markers: &'static [&'static str],
    pub function_patterns: &'static [&'static str],
    pub class_patterns: &'static [&'static str],
    pub indentation_significant: bool,
}

impl PatternTable for LanguageTable {
    fn language(&self) -> LanguageId {
        self.language
    }

    fn signatures(&self) -> &[Signature] {
        self.signatures
    }

    fn comment_markers(&self) -> &[&'static str] {
        self.comment_markers
    }

    fn function_patterns(&self) -> &[&'static str] {
        self.function_patterns
    }

    fn class_patterns(&self) -> &[&'static str] {
        self.class_patterns
    }

    fn indentation_significant(&self) -> bool {
        self.indentation_significant
    }
}

/// Pre-compiled signature with its weight.
#[derive(Debug, Clone)]
pub struct WeightedPattern {
    pub regex: Regex,
    pub weight: f64,
}

/// Compiled, read-only pattern data for one language.
#[derive(Debug, Clone)]
pub struct PatternSet {
    language: LanguageId,
    signatures: Vec<WeightedPattern>,
    complexity: Vec<Regex>,
    functions: Vec<Regex>,
    classes: Vec<Regex>,
    comment_markers: Vec<&'static str>,
    indentation_significant: bool,
}

impl PatternSet {
    /// Compile a table. Fails on the first invalid regex.
    pub fn compile(table: &dyn PatternTable) -> anyhow::Result<Self> {
        let language = table.language();
        let signatures = table
            .signatures()
            .iter()
            .map(|s| {
                Ok(WeightedPattern {
                    regex: compile_pattern(language, s.pattern)?,
                    weight: s.weight,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            language,
            signatures,
            complexity: compile_all(language, table.complexity_patterns())?,
            functions: compile_all(language, table.function_patterns())?,
            classes: compile_all(language, table.class_patterns())?,
            comment_markers: table.comment_markers().to_vec(),
            indentation_significant: table.indentation_significant(),
        })
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    pub fn signatures(&self) -> &[WeightedPattern] {
        &self.signatures
    }

    pub fn complexity_patterns(&self) -> &[Regex] {
        &self.complexity
    }

    pub fn function_patterns(&self) -> &[Regex] {
        &self.functions
    }

    pub fn class_patterns(&self) -> &[Regex] {
        &self.classes
    }

    pub fn comment_markers(&self) -> &[&'static str] {
        &self.comment_markers
    }

    pub fn indentation_significant(&self) -> bool {
        self.indentation_significant
    }

    /// Whether a trimmed line starts with one of this language's comment markers.
    pub fn is_comment_line(&self, trimmed: &str) -> bool {
        self.comment_markers.iter().any(|m| trimmed.starts_with(m))
    }
}

fn compile_pattern(language: LanguageId, pattern: &str) -> anyhow::Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| anyhow::anyhow!("compiling {} pattern {:?}: {}", language, pattern, e))
}

fn compile_all(language: LanguageId, patterns: &[&str]) -> anyhow::Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| compile_pattern(language, p))
        .collect()
}

/// The fallback table used for `plaintext` and for any language without a table.
struct PlaintextTable;

impl PatternTable for PlaintextTable {
    fn language(&self) -> LanguageId {
        LanguageId::Plaintext
    }

    fn signatures(&self) -> &[Signature] {
        &[]
    }

    fn comment_markers(&self) -> &[&'static str] {
        &["//", "#", "/*", "*", "\"\"\"", "'''"]
    }

    fn function_patterns(&self) -> &[&'static str] {
        &[]
    }

    fn class_patterns(&self) -> &[&'static str] {
        &[]
    }
}

/// Immutable collection of compiled pattern sets, one per language.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    sets: BTreeMap<LanguageId, PatternSet>,
    plaintext: PatternSet,
}

static GLOBAL: Lazy<PatternLibrary> = Lazy::new(|| {
    PatternLibrary::builtin().expect("built-in pattern tables must compile")
});

impl PatternLibrary {
    /// Start an empty library builder.
    pub fn builder() -> PatternLibraryBuilder {
        PatternLibraryBuilder { tables: Vec::new() }
    }

    /// Compile the built-in tables for every supported language.
    pub fn builtin() -> anyhow::Result<Self> {
        let mut builder = Self::builder();
        for table in builtin_tables() {
            builder = builder.register(table);
        }
        builder.build()
    }

    /// Process-wide built-in library, compiled on first use.
    pub fn global() -> &'static PatternLibrary {
        &GLOBAL
    }

    /// Pattern set for a language, if one is registered.
    pub fn get(&self, language: LanguageId) -> Option<&PatternSet> {
        if language.is_plaintext() {
            return Some(&self.plaintext);
        }
        self.sets.get(&language)
    }

    /// Pattern set for a language, falling back to the plaintext set.
    pub fn get_or_plaintext(&self, language: LanguageId) -> &PatternSet {
        self.sets.get(&language).unwrap_or(&self.plaintext)
    }

    /// Registered pattern sets in language order.
    pub fn iter(&self) -> impl Iterator<Item = &PatternSet> {
        self.sets.values()
    }

    /// Registered languages in language order (plaintext excluded).
    pub fn languages(&self) -> Vec<LanguageId> {
        self.sets.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Collects tables and compiles them into a [`PatternLibrary`].
pub struct PatternLibraryBuilder {
    tables: Vec<&'static dyn PatternTable>,
}

impl PatternLibraryBuilder {
    /// Register a table. Later registrations for the same language win.
    pub fn register(mut self, table: &'static dyn PatternTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn build(self) -> anyhow::Result<PatternLibrary> {
        let mut sets = BTreeMap::new();
        for table in self.tables {
            if table.language().is_plaintext() {
                anyhow::bail!("plaintext is a sentinel and cannot have a pattern table");
            }
            let set = PatternSet::compile(table)?;
            sets.insert(set.language(), set);
        }

        Ok(PatternLibrary {
            sets,
            plaintext: PatternSet::compile(&PlaintextTable)?,
        })
    }
}
