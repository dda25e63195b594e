//! Language identifiers understood by the review pipeline.
//!
//! `LanguageId` is a closed set: every supported language has a pattern
//! table in `crate::patterns`, plus the `Plaintext` sentinel used when no
//! language could be recognised.

use phf::phf_map;
use serde::{Deserialize, Serialize};

/// A supported programming language, or the `plaintext` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    C,
    Cpp,
    CSharp,
    Go,
    Java,
    JavaScript,
    Kotlin,
    Php,
    Python,
    Ruby,
    Rust,
    TypeScript,
    Plaintext,
}

/// Aliases accepted for user-declared languages (lowercased before lookup).
static LANGUAGE_ALIASES: phf::Map<&'static str, LanguageId> = phf_map! {
    "c" => LanguageId::C,
    "h" => LanguageId::C,
    "cpp" => LanguageId::Cpp,
    "c++" => LanguageId::Cpp,
    "cxx" => LanguageId::Cpp,
    "cc" => LanguageId::Cpp,
    "csharp" => LanguageId::CSharp,
    "c#" => LanguageId::CSharp,
    "cs" => LanguageId::CSharp,
    "go" => LanguageId::Go,
    "golang" => LanguageId::Go,
    "java" => LanguageId::Java,
    "javascript" => LanguageId::JavaScript,
    "js" => LanguageId::JavaScript,
    "node" => LanguageId::JavaScript,
    "kotlin" => LanguageId::Kotlin,
    "kt" => LanguageId::Kotlin,
    "php" => LanguageId::Php,
    "python" => LanguageId::Python,
    "py" => LanguageId::Python,
    "python3" => LanguageId::Python,
    "ruby" => LanguageId::Ruby,
    "rb" => LanguageId::Ruby,
    "rust" => LanguageId::Rust,
    "rs" => LanguageId::Rust,
    "typescript" => LanguageId::TypeScript,
    "ts" => LanguageId::TypeScript,
    "plaintext" => LanguageId::Plaintext,
    "text" => LanguageId::Plaintext,
    "txt" => LanguageId::Plaintext,
};

impl LanguageId {
    /// Every supported language, excluding the `Plaintext` sentinel.
    pub const ALL: [LanguageId; 12] = [
        LanguageId::C,
        LanguageId::Cpp,
        LanguageId::CSharp,
        LanguageId::Go,
        LanguageId::Java,
        LanguageId::JavaScript,
        LanguageId::Kotlin,
        LanguageId::Php,
        LanguageId::Python,
        LanguageId::Ruby,
        LanguageId::Rust,
        LanguageId::TypeScript,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageId::C => "c",
            LanguageId::Cpp => "cpp",
            LanguageId::CSharp => "csharp",
            LanguageId::Go => "go",
            LanguageId::Java => "java",
            LanguageId::JavaScript => "javascript",
            LanguageId::Kotlin => "kotlin",
            LanguageId::Php => "php",
            LanguageId::Python => "python",
            LanguageId::Ruby => "ruby",
            LanguageId::Rust => "rust",
            LanguageId::TypeScript => "typescript",
            LanguageId::Plaintext => "plaintext",
        }
    }

    /// Human-readable name used in prompts and messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageId::C => "C",
            LanguageId::Cpp => "C++",
            LanguageId::CSharp => "C#",
            LanguageId::Go => "Go",
            LanguageId::Java => "Java",
            LanguageId::JavaScript => "JavaScript",
            LanguageId::Kotlin => "Kotlin",
            LanguageId::Php => "PHP",
            LanguageId::Python => "Python",
            LanguageId::Ruby => "Ruby",
            LanguageId::Rust => "Rust",
            LanguageId::TypeScript => "TypeScript",
            LanguageId::Plaintext => "plain text",
        }
    }

    /// Parse a user-declared language name or alias (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        LANGUAGE_ALIASES.get(key.as_str()).copied()
    }

    /// Determine the language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "c" | "h" => Some(LanguageId::C),
            "cpp" | "cc" | "cxx" | "hpp" | "hh" => Some(LanguageId::Cpp),
            "cs" => Some(LanguageId::CSharp),
            "go" => Some(LanguageId::Go),
            "java" => Some(LanguageId::Java),
            "js" | "jsx" | "mjs" | "cjs" => Some(LanguageId::JavaScript),
            "kt" | "kts" => Some(LanguageId::Kotlin),
            "php" => Some(LanguageId::Php),
            "py" | "pyw" => Some(LanguageId::Python),
            "rb" => Some(LanguageId::Ruby),
            "rs" => Some(LanguageId::Rust),
            "ts" | "tsx" => Some(LanguageId::TypeScript),
            _ => None,
        }
    }

    pub fn is_plaintext(&self) -> bool {
        matches!(self, LanguageId::Plaintext)
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LanguageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageId::parse(s).ok_or_else(|| format!("unsupported language: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(LanguageId::parse("Python"), Some(LanguageId::Python));
        assert_eq!(LanguageId::parse("py"), Some(LanguageId::Python));
        assert_eq!(LanguageId::parse("C#"), Some(LanguageId::CSharp));
        assert_eq!(LanguageId::parse(" c++ "), Some(LanguageId::Cpp));
        assert_eq!(LanguageId::parse("golang"), Some(LanguageId::Go));
        assert_eq!(LanguageId::parse("cobol"), None);
    }

    #[test]
    fn test_as_str_round_trips_through_parse() {
        for lang in LanguageId::ALL {
            assert_eq!(LanguageId::parse(lang.as_str()), Some(lang));
        }
        assert_eq!(LanguageId::parse("plaintext"), Some(LanguageId::Plaintext));
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(LanguageId::from_extension("rs"), Some(LanguageId::Rust));
        assert_eq!(LanguageId::from_extension("tsx"), Some(LanguageId::TypeScript));
        assert_eq!(LanguageId::from_extension("hpp"), Some(LanguageId::Cpp));
        assert_eq!(LanguageId::from_extension("md"), None);
    }

    #[test]
    fn test_serde_uses_lowercase_ids() {
        let json = serde_json::to_string(&LanguageId::CSharp).unwrap();
        assert_eq!(json, "\"csharp\"");
        let parsed: LanguageId = serde_json::from_str("\"typescript\"").unwrap();
        assert_eq!(parsed, LanguageId::TypeScript);
    }
}
