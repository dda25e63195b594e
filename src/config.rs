//! Configuration schema for codecritic.
//!
//! Configuration is read from YAML. Every field is optional; missing
//! sections fall back to defaults, so an empty file is a valid config.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names searched for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["codecritic.yaml", ".codecritic.yaml"];

/// Environment variable holding the generation API key by default.
pub const DEFAULT_API_KEY_ENV: &str = "CODECRITIC_API_KEY";

/// Upper bound on generation attempts per analysis.
pub const MAX_GENERATION_ATTEMPTS: u32 = 2;

/// Line count above which an input is treated as large.
pub const DEFAULT_LARGE_FILE_LINES: usize = 500;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a config from YAML text. Empty text yields the defaults.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load an explicit config file, or discover one, or use defaults.
    ///
    /// Discovery order: the working directory, then the user config dir.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover(),
        };

        let config = match &path {
            Some(p) => Self::parse_file(p)
                .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))?,
            None => Self::default(),
        };
        validate(&config)?;
        Ok((config, path))
    }

    /// Whether a path should be skipped by directory reviews.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.review.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();
        self.review.excluded_paths.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|g| g.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }
}

/// External generation service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub model: String,
    /// Inline API key. Prefer `api_key_env`.
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-attempt timeout.
    pub timeout_ms: u64,
    pub max_attempts: u32,
    /// Linear backoff step: attempt `n` waits `n * backoff_ms`.
    pub backoff_ms: u64,
    /// Characters of code included in the prompt.
    pub prompt_char_budget: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.codecritic.dev/v1/generate".to_string(),
            model: "review-standard".to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            temperature: 0.3,
            max_tokens: 2048,
            timeout_ms: 30_000,
            max_attempts: 2,
            backoff_ms: 1_000,
            prompt_char_budget: 4_000,
        }
    }
}

impl GenerationConfig {
    /// Resolve the API key: inline value first, then the environment.
    /// Empty values count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }
}

/// Input size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Limits {
    /// Hard ceiling on accepted input.
    pub max_input_chars: usize,
    /// Ceiling for full reviews.
    pub max_analysis_chars: usize,
    /// Ceiling for quick reviews.
    pub max_quick_chars: usize,
    /// Line count above which a performance warning is attached.
    pub large_file_lines: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_chars: 100_000,
            max_analysis_chars: 50_000,
            max_quick_chars: 10_000,
            large_file_lines: DEFAULT_LARGE_FILE_LINES,
        }
    }
}

/// Language detection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// When false, a declared language is used without classification.
    pub enabled: bool,
    /// Confidence above which a declared/detected mismatch blocks the review.
    pub block_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            block_threshold: crate::reconcile::DEFAULT_BLOCK_THRESHOLD,
        }
    }
}

/// Directory review settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Glob patterns for paths to skip (e.g., "**/vendor/**").
    pub excluded_paths: Vec<String>,
    /// Maximum concurrent generation requests.
    pub concurrency: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            excluded_paths: Vec::new(),
            concurrency: 4,
        }
    }
}

/// Find a config file in the working directory or the user config dir.
pub fn discover() -> Option<PathBuf> {
    for name in DEFAULT_CONFIG_NAMES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Some(path);
        }
    }

    ProjectDirs::from("", "", "codecritic")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
        .filter(|p| p.exists())
}

/// Validate a config and return an error if it's invalid.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    let generation = &config.generation;
    if !(1..=MAX_GENERATION_ATTEMPTS).contains(&generation.max_attempts) {
        anyhow::bail!(
            "generation.max_attempts must be between 1 and {}, got {}",
            MAX_GENERATION_ATTEMPTS,
            generation.max_attempts
        );
    }
    if !(0.0..=2.0).contains(&generation.temperature) {
        anyhow::bail!(
            "generation.temperature must be between 0 and 2, got {}",
            generation.temperature
        );
    }
    if generation.max_tokens == 0 {
        anyhow::bail!("generation.max_tokens must be positive");
    }
    if generation.prompt_char_budget == 0 {
        anyhow::bail!("generation.prompt_char_budget must be positive");
    }
    if generation.endpoint.trim().is_empty() {
        anyhow::bail!("generation.endpoint must not be empty");
    }

    let limits = &config.limits;
    if limits.max_input_chars == 0 || limits.max_analysis_chars == 0 || limits.max_quick_chars == 0
    {
        anyhow::bail!("limits must be positive");
    }

    if !(0.0..=1.0).contains(&config.detection.block_threshold) {
        anyhow::bail!(
            "detection.block_threshold must be between 0 and 1, got {}",
            config.detection.block_threshold
        );
    }

    for pattern in &config.review.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded path {:?}: {}", pattern, e))?;
    }

    if config.review.concurrency == 0 {
        anyhow::bail!("review.concurrency must be at least 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse_str("").unwrap();
        assert_eq!(config.generation.max_attempts, 2);
        assert_eq!(config.generation.backoff_ms, 1_000);
        assert_eq!(config.generation.prompt_char_budget, 4_000);
        assert_eq!(config.limits.max_analysis_chars, 50_000);
        assert!(config.detection.enabled);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let yaml = r#"
generation:
  model: fast-review
  max_attempts: 1
limits:
  max_quick_chars: 2000
"#;
        let config = Config::parse_str(yaml).unwrap();
        assert_eq!(config.generation.model, "fast-review");
        assert_eq!(config.generation.max_attempts, 1);
        assert_eq!(config.generation.temperature, 0.3);
        assert_eq!(config.limits.max_quick_chars, 2000);
        assert_eq!(config.limits.max_input_chars, 100_000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.generation.max_attempts = 0;
        assert!(validate(&config).is_err());

        let config = Config::parse_str("generation:\n  max_attempts: 6\n").unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("between 1 and 2"));

        let mut config = Config::default();
        config.generation.temperature = 3.5;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.detection.block_threshold = 1.5;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.review.excluded_paths = vec!["[".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_inline_api_key_wins() {
        let config = GenerationConfig {
            api_key: Some("inline-key".to_string()),
            api_key_env: "CODECRITIC_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key(), Some("inline-key".to_string()));
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = GenerationConfig {
            api_key: Some("   ".to_string()),
            api_key_env: "CODECRITIC_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key(), None);
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("codecritic.yaml");
        std::fs::write(&path, "detection:\n  enabled: false\n").unwrap();

        let (config, found) = Config::load(Some(&path)).unwrap();
        assert!(!config.detection.enabled);
        assert_eq!(found, Some(path));
    }

    #[test]
    fn test_load_invalid_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.yaml");
        std::fs::write(&path, "generation: [unclosed").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_excluded_paths() {
        let mut config = Config::default();
        config.review.excluded_paths = vec!["**/vendor/**".to_string()];
        assert!(config.is_path_excluded(Path::new("src/vendor/lib.rs")));
        assert!(!config.is_path_excluded(Path::new("src/main.rs")));
    }
}
