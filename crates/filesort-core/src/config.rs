//! Configuration module for filesort.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{expand_tilde, Category};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for filesort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub watch: WatchConfig,
    pub placement: PlacementConfig,
    pub classifier: ClassifierConfig,
    pub privacy: PrivacyConfig,
    pub archive: ArchiveConfig,
    pub audit: AuditConfig,
    pub reminders: RemindersConfig,
    pub logging: LoggingConfig,
}

/// Drop-directory watching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory whose new files are organized.
    pub directory: PathBuf,
    /// Auto-organize toggle. When false, arrivals are observed and ignored.
    pub enabled: bool,
    /// Also watch subdirectories of `directory`.
    pub recursive: bool,
    /// Milliseconds an arrival must stay quiet before it is processed.
    pub debounce_ms: u64,
    /// Milliseconds between the two size samples of the stability check.
    pub settle_ms: u64,
    /// Maximum number of files placed concurrently.
    pub max_concurrent: usize,
    /// Glob patterns matched against file names that are never touched.
    pub ignore_patterns: Vec<String>,
}

/// Confidence gating and destination base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Directory that suggested relative paths are joined to.
    pub base_dir: PathBuf,
    /// Files are moved only when confidence is strictly greater than this.
    pub confidence_threshold: f64,
    /// Per-category overrides of `confidence_threshold`.
    pub category_thresholds: HashMap<Category, f64>,
    /// Maximum number of existing folders offered to the classifier.
    pub folder_hint_limit: usize,
    /// How deep below `base_dir` existing folders are collected.
    pub folder_hint_depth: usize,
}

/// Classification provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// API key. Usually left unset in favour of the environment or keyring.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Seconds before a classification attempt is abandoned.
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Log prompt sizes and file names of provider requests at debug level.
    pub log_requests: bool,
}

/// How much file content may leave the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyMode {
    /// Metadata only, never read file content.
    Strict,
    /// Short previews.
    Balanced,
    /// Previews up to `max_preview_chars`.
    #[default]
    Standard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    pub mode: PrivacyMode,
    pub max_preview_chars: usize,
}

/// Where archived folders go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub root: PathBuf,
}

/// Audit database location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub database: PathBuf,
}

/// File reminders fired by the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemindersConfig {
    /// Run the reminder checker alongside the watch loop.
    pub enabled: bool,
    /// Seconds between checks for due reminders.
    pub check_interval_secs: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/filesort/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("filesort")
            .join("config.yaml")
    }

    /// Writes the configuration as YAML, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

impl WatchConfig {
    pub fn directory(&self) -> PathBuf {
        expand_tilde(&self.directory)
    }
}

impl PlacementConfig {
    pub fn base_dir(&self) -> PathBuf {
        expand_tilde(&self.base_dir)
    }

    /// Threshold for `category`, falling back to the global one.
    pub fn threshold_for(&self, category: Category) -> f64 {
        self.category_thresholds
            .get(&category)
            .copied()
            .unwrap_or(self.confidence_threshold)
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PrivacyConfig {
    /// Character budget for content previews; `None` forbids reading content.
    pub fn preview_limit(&self) -> Option<usize> {
        match self.mode {
            PrivacyMode::Strict => None,
            PrivacyMode::Balanced => Some(self.max_preview_chars.min(200)),
            PrivacyMode::Standard => Some(self.max_preview_chars),
        }
    }
}

impl ArchiveConfig {
    pub fn root(&self) -> PathBuf {
        expand_tilde(&self.root)
    }
}

impl AuditConfig {
    pub fn database(&self) -> PathBuf {
        expand_tilde(&self.database)
    }
}

impl RemindersConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

// ---------------------------------------------------------------------------
// Config::default()
// ---------------------------------------------------------------------------

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directory: dirs::download_dir().unwrap_or_else(|| home().join("Downloads")),
            enabled: true,
            recursive: false,
            debounce_ms: 1000,
            settle_ms: 500,
            max_concurrent: 4,
            ignore_patterns: vec![
                ".*".to_string(),
                "~*".to_string(),
                "*.crdownload".to_string(),
                "*.part".to_string(),
                "*.tmp".to_string(),
                "*.download".to_string(),
            ],
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            base_dir: home(),
            confidence_threshold: 0.25,
            category_thresholds: HashMap::new(),
            folder_hint_limit: crate::ports::classifier::DEFAULT_HINT_LIMIT,
            folder_hint_depth: 2,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "claude-3-5-sonnet-20241022".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout_secs: 30,
            max_tokens: 1024,
            temperature: 0.3,
            log_requests: false,
        }
    }
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            mode: PrivacyMode::Standard,
            max_preview_chars: 500,
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            root: dirs::document_dir()
                .unwrap_or_else(|| home().join("Documents"))
                .join("Filesort")
                .join("_archived"),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            database: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("filesort")
                .join("filesort.db"),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"watch.debounce_ms"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn unit_interval(errors: &mut Vec<ValidationError>, field: String, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ValidationError {
            field,
            message: format!("must be between 0.0 and 1.0, got {value}"),
        });
    }
}

fn non_zero(errors: &mut Vec<ValidationError>, field: &str, value: u64) {
    if value == 0 {
        errors.push(ValidationError {
            field: field.into(),
            message: "must be greater than 0".into(),
        });
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- watch ---
        non_zero(&mut errors, "watch.debounce_ms", self.watch.debounce_ms);
        non_zero(
            &mut errors,
            "watch.max_concurrent",
            self.watch.max_concurrent as u64,
        );
        for pattern in &self.watch.ignore_patterns {
            if let Err(e) = glob::Pattern::new(pattern) {
                errors.push(ValidationError {
                    field: "watch.ignore_patterns".into(),
                    message: format!("invalid glob '{pattern}': {e}"),
                });
            }
        }

        // --- placement ---
        unit_interval(
            &mut errors,
            "placement.confidence_threshold".into(),
            self.placement.confidence_threshold,
        );
        for (category, threshold) in &self.placement.category_thresholds {
            unit_interval(
                &mut errors,
                format!("placement.category_thresholds.{category}"),
                *threshold,
            );
        }

        // --- classifier ---
        non_zero(
            &mut errors,
            "classifier.timeout_secs",
            self.classifier.timeout_secs,
        );
        non_zero(
            &mut errors,
            "classifier.max_tokens",
            u64::from(self.classifier.max_tokens),
        );
        if !(0.0..=1.0).contains(&self.classifier.temperature) {
            errors.push(ValidationError {
                field: "classifier.temperature".into(),
                message: "must be between 0.0 and 1.0".into(),
            });
        }
        if self.classifier.model.trim().is_empty() {
            errors.push(ValidationError {
                field: "classifier.model".into(),
                message: "must not be empty".into(),
            });
        }

        // --- archive ---
        let watch_dir = self.watch.directory();
        if self.archive.root().starts_with(&watch_dir) {
            errors.push(ValidationError {
                field: "archive.root".into(),
                message: format!(
                    "must not be inside the watched directory {}",
                    watch_dir.display()
                ),
            });
        }

        // --- reminders ---
        non_zero(
            &mut errors,
            "reminders.check_interval_secs",
            self.reminders.check_interval_secs,
        );

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use filesort_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .watch_directory(PathBuf::from("/home/user/Downloads"))
///     .confidence_threshold(0.4)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- watch ---

    pub fn watch_directory(mut self, dir: PathBuf) -> Self {
        self.config.watch.directory = dir;
        self
    }

    pub fn watch_enabled(mut self, enabled: bool) -> Self {
        self.config.watch.enabled = enabled;
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.watch.debounce_ms = ms;
        self
    }

    pub fn ignore_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.watch.ignore_patterns.push(pattern.into());
        self
    }

    // --- placement ---

    pub fn base_dir(mut self, dir: PathBuf) -> Self {
        self.config.placement.base_dir = dir;
        self
    }

    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.config.placement.confidence_threshold = threshold;
        self
    }

    pub fn category_threshold(mut self, category: Category, threshold: f64) -> Self {
        self.config
            .placement
            .category_thresholds
            .insert(category, threshold);
        self
    }

    // --- classifier ---

    pub fn classifier_model(mut self, model: impl Into<String>) -> Self {
        self.config.classifier.model = model.into();
        self
    }

    pub fn classifier_timeout_secs(mut self, secs: u64) -> Self {
        self.config.classifier.timeout_secs = secs;
        self
    }

    // --- privacy / archive / audit ---

    pub fn privacy_mode(mut self, mode: PrivacyMode) -> Self {
        self.config.privacy.mode = mode;
        self
    }

    pub fn archive_root(mut self, root: PathBuf) -> Self {
        self.config.archive.root = root;
        self
    }

    pub fn audit_database(mut self, path: PathBuf) -> Self {
        self.config.audit.database = path;
        self
    }

    // --- reminders ---

    pub fn reminders_enabled(mut self, enabled: bool) -> Self {
        self.config.reminders.enabled = enabled;
        self
    }

    pub fn reminder_check_interval_secs(mut self, secs: u64) -> Self {
        self.config.reminders.check_interval_secs = secs;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert!(cfg.watch.enabled);
        assert!(!cfg.watch.recursive);
        assert_eq!(cfg.watch.debounce_ms, 1000);
        assert_eq!(cfg.watch.max_concurrent, 4);
        assert!(cfg.watch.ignore_patterns.contains(&"*.crdownload".to_string()));
        assert_eq!(cfg.placement.confidence_threshold, 0.25);
        assert_eq!(cfg.placement.folder_hint_limit, 50);
        assert_eq!(cfg.classifier.timeout_secs, 30);
        assert_eq!(cfg.classifier.temperature, 0.3);
        assert!(cfg.classifier.api_key.is_none());
        assert_eq!(cfg.privacy.mode, PrivacyMode::Standard);
        assert_eq!(cfg.privacy.max_preview_chars, 500);
        assert!(cfg.archive.root.ends_with("Filesort/_archived"));
        assert!(cfg.audit.database.ends_with("filesort/filesort.db"));
        assert!(cfg.reminders.enabled);
        assert_eq!(cfg.reminders.check_interval(), Duration::from_secs(30));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn default_config_passes_validation() {
        let errors = Config::default().validate();
        assert!(errors.is_empty(), "unexpected validation errors: {errors:?}");
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
watch:
  directory: /tmp/drop
  enabled: false
  debounce_ms: 250
  ignore_patterns: ["*.part"]
placement:
  base_dir: /tmp/sorted
  confidence_threshold: 0.5
  category_thresholds:
    receipt: 0.9
classifier:
  model: test-model
  timeout_secs: 5
privacy:
  mode: strict
archive:
  root: /tmp/archive
audit:
  database: /tmp/filesort.db
logging:
  level: debug
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.watch.directory, PathBuf::from("/tmp/drop"));
        assert!(!cfg.watch.enabled);
        assert_eq!(cfg.watch.debounce_ms, 250);
        assert_eq!(cfg.watch.ignore_patterns, vec!["*.part".to_string()]);
        // Omitted fields keep their defaults.
        assert_eq!(cfg.watch.max_concurrent, 4);
        assert_eq!(cfg.placement.confidence_threshold, 0.5);
        assert_eq!(cfg.placement.threshold_for(Category::Receipt), 0.9);
        assert_eq!(cfg.placement.threshold_for(Category::Media), 0.5);
        assert_eq!(cfg.classifier.model, "test-model");
        assert_eq!(cfg.classifier.timeout(), Duration::from_secs(5));
        assert_eq!(cfg.privacy.preview_limit(), None);
        assert_eq!(cfg.archive.root(), PathBuf::from("/tmp/archive"));
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn load_partial_yaml_uses_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"logging:\n  level: warn\n").unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).unwrap();
        assert_eq!(cfg.logging.level, "warn");
        assert_eq!(cfg.placement.confidence_threshold, 0.25);
    }

    #[test]
    fn load_nonexistent_file_fails() {
        assert!(Config::load(Path::new("/nonexistent/filesort.yaml")).is_err());
    }

    #[test]
    fn load_or_default_falls_back() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/filesort.yaml"));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let cfg = ConfigBuilder::new()
            .confidence_threshold(0.4)
            .category_threshold(Category::Work, 0.6)
            .build();
        cfg.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.placement.confidence_threshold, 0.4);
        assert_eq!(loaded.placement.threshold_for(Category::Work), 0.6);
    }

    #[test]
    fn default_path_ends_with_filesort() {
        let path = Config::default_path();
        assert!(path.ends_with("filesort/config.yaml"));
    }

    // -- Privacy --

    #[test]
    fn preview_limit_per_mode() {
        let mut p = PrivacyConfig::default();
        assert_eq!(p.preview_limit(), Some(500));
        p.mode = PrivacyMode::Balanced;
        assert_eq!(p.preview_limit(), Some(200));
        p.max_preview_chars = 50;
        assert_eq!(p.preview_limit(), Some(50));
        p.mode = PrivacyMode::Strict;
        assert_eq!(p.preview_limit(), None);
    }

    // -- Validation --

    #[test]
    fn validate_threshold_out_of_range() {
        let cfg = ConfigBuilder::new()
            .confidence_threshold(1.5)
            .category_threshold(Category::Code, -0.1)
            .build();
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "placement.confidence_threshold"));
        assert!(errors
            .iter()
            .any(|e| e.field == "placement.category_thresholds.code"));
    }

    #[test]
    fn validate_zero_values() {
        let mut cfg = ConfigBuilder::new()
            .debounce_ms(0)
            .classifier_timeout_secs(0)
            .reminder_check_interval_secs(0)
            .build();
        cfg.watch.max_concurrent = 0;
        let fields: Vec<_> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"watch.debounce_ms".to_string()));
        assert!(fields.contains(&"watch.max_concurrent".to_string()));
        assert!(fields.contains(&"classifier.timeout_secs".to_string()));
        assert!(fields.contains(&"reminders.check_interval_secs".to_string()));
    }

    #[test]
    fn validate_bad_glob() {
        let cfg = ConfigBuilder::new().ignore_pattern("[unclosed").build();
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "watch.ignore_patterns");
    }

    #[test]
    fn validate_archive_inside_watch_dir() {
        let cfg = ConfigBuilder::new()
            .watch_directory(PathBuf::from("/tmp/drop"))
            .archive_root(PathBuf::from("/tmp/drop/_archived"))
            .build();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "archive.root"));
    }

    #[test]
    fn validate_log_level() {
        let cfg = ConfigBuilder::new().logging_level("verbose").build();
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("verbose"));
    }

    #[test]
    fn build_validated_reports_errors() {
        let result = ConfigBuilder::new().confidence_threshold(2.0).build_validated();
        assert!(result.is_err());
        assert!(ConfigBuilder::new().build_validated().is_ok());
    }

    #[test]
    fn validation_error_display() {
        let e = ValidationError {
            field: "watch.debounce_ms".into(),
            message: "must be greater than 0".into(),
        };
        assert_eq!(e.to_string(), "watch.debounce_ms: must be greater than 0");
    }
}
