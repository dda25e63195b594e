//! Built-in pattern tables.
//!
//! Signature weights roughly follow specificity: constructs found in only
//! one language weigh 1.0 or more, shared-but-suggestive constructs weigh
//! 0.3-0.6.

use super::{LanguageTable, PatternTable, Signature};
use crate::language::LanguageId;

/// Decision points shared by every language: branching keywords and
/// short-circuit operators.
pub static DEFAULT_COMPLEXITY_PATTERNS: &[&str] = &[
    r"\bif\b",
    r"\belse\b",
    r"\belif\b",
    r"\bwhile\b",
    r"\bfor\b",
    r"\bforeach\b",
    r"\bdo\b",
    r"\bswitch\b",
    r"\bcase\b",
    r"\bcatch\b",
    r"\bexcept\b",
    r"\bfinally\b",
    r"\bwhen\b",
    r"\bmatch\b",
    r"&&",
    r"\|\|",
    r"\?",
    r"\band\b",
    r"\bor\b",
];

const C_STYLE_COMMENTS: &[&str] = &["//", "/*", "*"];

pub static C: LanguageTable = LanguageTable {
    language: LanguageId::C,
    signatures: &[
        Signature::new(r"#include\s*<(stdio|stdlib|string|math|unistd|stdint|stdbool|errno)\.h>", 1.2),
        Signature::new(r"\bprintf\s*\(", 0.5),
        Signature::new(r"\b(malloc|calloc|realloc|free)\s*\(", 0.8),
        Signature::new(r"\bint\s+main\s*\(\s*(void|int\s+argc)", 0.6),
        Signature::new(r"\bstruct\s+\w+\s*[{*]", 0.4),
        Signature::new(r"\btypedef\s+", 0.8),
        Signature::new(r"(?m)^\s*#define\s+\w+", 0.6),
        Signature::new(r"\bchar\s*\*\s*\w+", 0.6),
        Signature::new(r"\bsizeof\s*\(", 0.5),
        Signature::new(r"\bNULL\b", 0.5),
        Signature::new(r"->\w+", 0.2),
    ],
    comment_markers: C_STYLE_COMMENTS,
    function_patterns: &[r"(?m)^[\w*]+[\w\s*]*?\s+\**\w+\s*\([^;{)]*\)\s*\{"],
    class_patterns: &[r"(?m)^\s*(typedef\s+)?struct\s+\w*\s*\{"],
    indentation_significant: false,
};

pub static CPP: LanguageTable = LanguageTable {
    language: LanguageId::Cpp,
    signatures: &[
        Signature::new(r"#include\s*<(iostream|vector|string|map|memory|algorithm|unordered_map)>", 1.2),
        Signature::new(r"\bstd::\w+", 1.0),
        Signature::new(r"\bcout\s*<<|\bcin\s*>>", 0.8),
        Signature::new(r"\btemplate\s*<", 1.0),
        Signature::new(r"\busing\s+namespace\s+std\s*;", 1.0),
        Signature::new(r"\bnullptr\b", 0.8),
        Signature::new(r"\bvirtual\b|\boverride\s*[;{]", 0.6),
        Signature::new(r"\bclass\s+\w+\s*:\s*(public|private|protected)\s+\w+", 0.8),
        Signature::new(r"\w+::\w+\s*\(", 0.3),
        Signature::new(r"\bauto\s+\w+\s*=", 0.6),
        Signature::new(r"\bconst\s+[\w:<>]+\s*&", 0.4),
    ],
    comment_markers: C_STYLE_COMMENTS,
    function_patterns: &[r"(?m)^[\w:<>*&]+[\w\s:<>*&]*?\s+[*&]?[\w:~]+\s*\([^;{)]*\)\s*(const\s*)?(override\s*)?\{"],
    class_patterns: &[r"(?m)^\s*(class|struct)\s+\w+[^;]*$"],
    indentation_significant: false,
};

pub static CSHARP: LanguageTable = LanguageTable {
    language: LanguageId::CSharp,
    signatures: &[
        Signature::new(r"(?m)^\s*using\s+System(\.[\w.]+)?;", 1.2),
        Signature::new(r"\bnamespace\s+[\w.]+", 0.5),
        Signature::new(r"\bConsole\.(Write|WriteLine|ReadLine)\(", 1.0),
        Signature::new(r"\{\s*get;\s*(private\s+)?(set;|init;)?\s*\}", 1.0),
        Signature::new(r"\basync\s+Task(<[\w<>]+>)?\s", 1.0),
        Signature::new(r"\bvar\s+\w+\s*=\s*new\b", 0.5),
        Signature::new(r"\b(public|private|internal|protected)\s+(static\s+)?(readonly\s+)?(string|int|bool|void|decimal|double)\s+\w+", 0.6),
        Signature::new(r"\bstring\s+\w+\s*[=;,)]", 0.5),
        Signature::new(r"\.(Where|Select|FirstOrDefault|ToList)\(", 0.8),
        Signature::new(r"\binternal\s+|\bsealed\s+class\b", 0.6),
    ],
    comment_markers: C_STYLE_COMMENTS,
    function_patterns: &[r"(?m)^\s*(public|private|protected|internal|static)[\w\s<>\[\],?]*\s+\w+\s*\([^)]*\)\s*(\{|=>|$)"],
    class_patterns: &[r"(?m)^\s*((public|private|protected|internal|abstract|sealed|static|partial)\s+)*(class|interface|struct|record|enum)\s+\w+"],
    indentation_significant: false,
};

pub static GO: LanguageTable = LanguageTable {
    language: LanguageId::Go,
    signatures: &[
        Signature::new(r"(?m)^package\s+\w+\s*$", 1.0),
        Signature::new(r"(?m)^func\s+(\([^)]*\)\s*)?\w+\s*\(", 1.2),
        Signature::new(r":=", 0.6),
        Signature::new(r"\bfmt\.\w+\(", 1.0),
        Signature::new(r#"(?m)^import\s+(\(|")"#, 0.8),
        Signature::new(r"\berr\s*!=\s*nil\b", 1.0),
        Signature::new(r"\btype\s+\w+\s+(struct|interface)\s*\{", 1.0),
        Signature::new(r"\bdefer\s+", 0.6),
        Signature::new(r"\bgo\s+func\b|\bchan\s+\w+|<-\s*\w+", 0.6),
        Signature::new(r"\bnil\b", 0.3),
    ],
    comment_markers: C_STYLE_COMMENTS,
    function_patterns: &[r"(?m)^func\s+(\([^)]*\)\s*)?\w+\s*\("],
    class_patterns: &[r"(?m)^\s*type\s+\w+\s+struct\b"],
    indentation_significant: false,
};

pub static JAVA: LanguageTable = LanguageTable {
    language: LanguageId::Java,
    signatures: &[
        Signature::new(r"\bpublic\s+static\s+void\s+main\s*\(\s*String", 1.2),
        Signature::new(r"\bSystem\.(out|err)\.print(ln|f)?\(", 1.0),
        Signature::new(r"(?m)^\s*import\s+javax?\.[\w.*]+;", 1.0),
        Signature::new(r"(?m)^\s*package\s+[\w.]+;", 0.8),
        Signature::new(r"\b(public|private|protected)\s+(static\s+)?(final\s+)?[\w<>\[\]]+\s+\w+\s*\(", 0.5),
        Signature::new(r"@Override\b|@Autowired\b|@Test\b", 0.8),
        Signature::new(r"\bthrows\s+\w+", 0.8),
        Signature::new(r"\bString\[\]", 0.6),
        Signature::new(r"\b(ArrayList|HashMap|List|Map)<", 0.5),
        Signature::new(r"\bfinal\s+\w+\s+\w+\s*=", 0.5),
        Signature::new(r"\bextends\s+\w+", 0.3),
        Signature::new(r"\bnew\s+\w+(<[^>]*>)?\(", 0.2),
    ],
    comment_markers: C_STYLE_COMMENTS,
    function_patterns: &[r"(?m)^\s*(public|private|protected|static)[\w\s<>\[\],]*\s+\w+\s*\([^)]*\)\s*(throws\s+[\w.,\s]+)?\{"],
    class_patterns: &[r"(?m)^\s*((public|private|protected|abstract|final|static)\s+)*(class|interface|enum|record)\s+\w+"],
    indentation_significant: false,
};

pub static JAVASCRIPT: LanguageTable = LanguageTable {
    language: LanguageId::JavaScript,
    signatures: &[
        Signature::new(r"\b(const|let|var)\s+\w+\s*=\s*require\(", 1.0),
        Signature::new(r"\bmodule\.exports\b|\bexports\.\w+\s*=", 1.0),
        Signature::new(r"\bconsole\.(log|error|warn|info)\(", 0.6),
        Signature::new(r"\bfunction\s+\w+\s*\(", 0.5),
        Signature::new(r"=>\s*[{(]", 0.3),
        Signature::new(r"\b(let|const)\s+\w+\s*=", 0.4),
        Signature::new(r"===|!==", 0.5),
        Signature::new(r"\bdocument\.\w+|\bwindow\.\w+", 0.8),
        Signature::new(r"\basync\s+function\b|\bawait\s+\w+", 0.3),
        Signature::new(r"\bexport\s+(default|const|function)\b", 0.4),
        Signature::new(r"\bnew\s+Promise\(", 0.6),
        Signature::new(r"\.then\(", 0.4),
    ],
    comment_markers: C_STYLE_COMMENTS,
    function_patterns: &[
        r"\bfunction\b\s*\*?\s*\w*\s*\(",
        r"\b(const|let|var)\s+\w+\s*=\s*(async\s+)?(\([^)]*\)|\w+)\s*=>",
    ],
    class_patterns: &[r"(?m)^\s*(export\s+)?(default\s+)?class\s+\w+"],
    indentation_significant: false,
};

pub static KOTLIN: LanguageTable = LanguageTable {
    language: LanguageId::Kotlin,
    signatures: &[
        Signature::new(r"\bfun\s+(<[^>]*>\s*)?[\w.]+\s*\(", 1.2),
        Signature::new(r"\bval\s+\w+\s*(:\s*[\w<>?]+)?\s*=", 0.8),
        Signature::new(r"\bvar\s+\w+\s*:\s*[\w<>?]+", 0.5),
        Signature::new(r"\bprintln\(", 0.6),
        Signature::new(r"\bdata\s+class\b", 1.2),
        Signature::new(r"\bwhen\s*(\([^)]*\))?\s*\{", 0.8),
        Signature::new(r"(?m)^\s*package\s+[\w.]+\s*$", 0.4),
        Signature::new(r"\?\.|!!\.|\?:", 0.4),
        Signature::new(r"\bcompanion\s+object\b|\bobject\s+\w+\s*[:{]", 1.0),
        Signature::new(r"\b(listOf|mutableListOf|mapOf|setOf)\(", 1.0),
        Signature::new(r"\b(String|Int|Long|Boolean)\?", 0.6),
    ],
    comment_markers: C_STYLE_COMMENTS,
    function_patterns: &[r"\bfun\s+(<[^>]*>\s*)?[\w.]+\s*\("],
    class_patterns: &[r"(?m)^\s*((data|sealed|abstract|open|enum|private|internal)\s+)*(class|object|interface)\s+\w+"],
    indentation_significant: false,
};

pub static PHP: LanguageTable = LanguageTable {
    language: LanguageId::Php,
    signatures: &[
        Signature::new(r"<\?php", 1.5),
        Signature::new(r"\$\w+\s*=[^=]", 0.8),
        Signature::new(r"\$this->\w+", 1.0),
        Signature::new(r"\bfunction\s+\w+\s*\([^)]*\$\w+", 0.8),
        Signature::new(r"\becho\s+", 0.6),
        Signature::new(r"(?m)^\s*namespace\s+[\w\\]+;", 0.8),
        Signature::new(r"(?m)^\s*use\s+[\w\\]+\\\w+;", 0.8),
        Signature::new(r"\barray\s*\(", 0.5),
        Signature::new(r"\b(public|private|protected)\s+function\b", 1.0),
        Signature::new(r"\bforeach\s*\(\s*\$\w+\s+as\b", 1.0),
        Signature::new(r"->\w+\(", 0.2),
    ],
    comment_markers: &["//", "#", "/*", "*"],
    function_patterns: &[r"\bfunction\s+\w+\s*\("],
    class_patterns: &[r"(?m)^\s*((abstract|final)\s+)?(class|interface|trait)\s+\w+"],
    indentation_significant: false,
};

pub static PYTHON: LanguageTable = LanguageTable {
    language: LanguageId::Python,
    signatures: &[
        Signature::new(r"(?m)^\s*(async\s+)?def\s+\w+\s*\([^)]*\)\s*(->\s*[^:]+)?:", 1.0),
        Signature::new(r"(?m)^\s*from\s+[\w.]+\s+import\s+", 0.8),
        Signature::new(r"(?m)^\s*import\s+[\w.]+(\s+as\s+\w+)?\s*$", 0.4),
        Signature::new(r"\bself\.\w+", 0.5),
        Signature::new(r"(?m)^\s*class\s+\w+(\([^)]*\))?\s*:", 0.8),
        Signature::new(r#"\bif\s+__name__\s*==\s*['"]__main__['"]"#, 1.2),
        Signature::new(r"\belif\b", 0.8),
        Signature::new(r"\b(None|True|False)\b", 0.4),
        Signature::new(r"\bdef\s+__\w+__\(self", 1.0),
        Signature::new(r"\bprint\(", 0.3),
        Signature::new(r"(?m)^\s*(for|while|if)\s+[^({]*:\s*$", 0.6),
        Signature::new(r"\b(len|range|enumerate|isinstance)\(", 0.4),
    ],
    comment_markers: &["#", "\"\"\"", "'''"],
    function_patterns: &[r"(?m)^\s*(async\s+)?def\s+\w+\s*\("],
    class_patterns: &[r"(?m)^\s*class\s+\w+"],
    indentation_significant: true,
};

pub static RUBY: LanguageTable = LanguageTable {
    language: LanguageId::Ruby,
    signatures: &[
        Signature::new(r"(?m)^\s*def\s+[\w.]+[?!=]?(\([^)]*\))?\s*$", 0.8),
        Signature::new(r"(?m)^\s*end\s*$", 1.0),
        Signature::new(r"\bputs\s+", 0.8),
        Signature::new(r"\battr_(accessor|reader|writer)\b", 1.0),
        Signature::new(r#"(?m)^\s*require(_relative)?\s+['"]"#, 0.8),
        Signature::new(r"\bdo\s*\|[\w, ]+\|", 1.0),
        Signature::new(r"(?m)^\s*@\w+\s*=", 0.6),
        Signature::new(r"(?m)^\s*(class\s+\w+(\s*<\s*[\w:]+)?|module\s+\w+)\s*$", 0.6),
        Signature::new(r"\bnil\b", 0.3),
        Signature::new(r"#\{[^}]+\}", 0.8),
        Signature::new(r"\bunless\b|\belsif\b", 0.8),
    ],
    comment_markers: &["#", "=begin"],
    function_patterns: &[r"(?m)^\s*def\s+[\w.]+[?!=]?"],
    class_patterns: &[r"(?m)^\s*(class|module)\s+[A-Z]\w*"],
    indentation_significant: false,
};

pub static RUST: LanguageTable = LanguageTable {
    language: LanguageId::Rust,
    signatures: &[
        Signature::new(r"\bfn\s+\w+\s*(<[^>]*>)?\s*\(", 1.0),
        Signature::new(r"\blet\s+mut\s+", 1.0),
        Signature::new(r"\bimpl\b(\s*<[^>]*>)?\s+\w+", 0.8),
        Signature::new(r"\bpub\s+(fn|struct|enum|trait|mod|use|const)\b", 0.8),
        Signature::new(r"\buse\s+(std|crate|super|self)::", 1.0),
        Signature::new(r"\b(println|format|vec|panic|assert|assert_eq|eprintln|write|writeln)!\s*[(\[]", 1.0),
        Signature::new(r"->\s*(Result|Option|Self|Vec|String|bool|usize|i32|u32|&)", 0.8),
        Signature::new(r"&self\b|&mut\s+self\b", 0.8),
        Signature::new(r"#\[\w+", 0.8),
        Signature::new(r"\.unwrap\(\)|\.expect\(|\?;", 0.5),
        Signature::new(r"\bmatch\s+[\w.&*()]+\s*\{", 0.4),
        Signature::new(r"\b(Some|None|Ok|Err)\(", 0.5),
    ],
    comment_markers: C_STYLE_COMMENTS,
    function_patterns: &[r"(?m)^\s*(pub(\([^)]*\))?\s+)?(const\s+)?(async\s+)?(unsafe\s+)?fn\s+\w+"],
    class_patterns: &[r"(?m)^\s*(pub(\([^)]*\))?\s+)?(struct|enum|trait)\s+\w+"],
    indentation_significant: false,
};

pub static TYPESCRIPT: LanguageTable = LanguageTable {
    language: LanguageId::TypeScript,
    signatures: &[
        Signature::new(r":\s*(string|number|boolean|any|void|unknown|never)\b", 1.2),
        Signature::new(r"\binterface\s+\w+\s*(extends\s+[\w, ]+)?\{", 0.6),
        Signature::new(r"\btype\s+\w+\s*=\s*", 0.8),
        Signature::new(r"\b(let|const|var)\s+\w+\s*:\s*[\w\[\]<>|]+\s*=", 1.0),
        Signature::new(r"\b(public|private|protected|readonly)\s+\w+\s*\??:\s*\w+", 0.8),
        Signature::new(r#"\bimport\s+(type\s+)?\{[^}]*\}\s+from\s+['"]"#, 0.5),
        Signature::new(r"\bas\s+(string|number|any|unknown|const)\b", 0.8),
        Signature::new(r"\bPromise<\w+", 0.6),
        Signature::new(r"\benum\s+\w+\s*\{", 0.3),
        Signature::new(r"\bimplements\s+\w+", 0.3),
    ],
    comment_markers: C_STYLE_COMMENTS,
    function_patterns: &[
        r"\bfunction\b\s*\*?\s*\w*\s*[<(]",
        r"\b(const|let|var)\s+\w+\s*(:\s*[^=]+)?=\s*(async\s+)?(\([^)]*\)|\w+)\s*(:\s*[\w<>\[\]]+\s*)?=>",
    ],
    class_patterns: &[r"(?m)^\s*(export\s+)?(default\s+)?(abstract\s+)?class\s+\w+"],
    indentation_significant: false,
};

/// All built-in tables in language order.
pub fn builtin_tables() -> [&'static dyn PatternTable; 12] {
    [
        &C,
        &CPP,
        &CSHARP,
        &GO,
        &JAVA,
        &JAVASCRIPT,
        &KOTLIN,
        &PHP,
        &PYTHON,
        &RUBY,
        &RUST,
        &TYPESCRIPT,
    ]
}
