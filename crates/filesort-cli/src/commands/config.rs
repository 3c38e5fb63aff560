//! Config command - View and manage the filesort configuration
//!
//! Provides the `filesort config` subcommands:
//! 1. `show`     - Prints the effective configuration (YAML or JSON)
//! 2. `path`     - Prints where the configuration file lives
//! 3. `init`     - Writes a default configuration file
//! 4. `set`      - Changes one value using a dotted key
//! 5. `validate` - Checks the file and lists every error

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use filesort_core::config::{Config, PrivacyMode};
use tracing::info;

use crate::context::CliContext;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "watch.enabled")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx),
            ConfigCommand::Path => self.execute_path(ctx),
            ConfigCommand::Init { force } => self.execute_init(ctx, *force),
            ConfigCommand::Set { key, value } => self.execute_set(ctx, key, value),
            ConfigCommand::Validate => self.execute_validate(ctx),
        }
    }

    fn execute_show(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;

        info!(config_path = %ctx.config_path().display(), "Showing configuration");

        if ctx.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", ctx.config_path().display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }
        Ok(())
    }

    fn execute_path(&self, ctx: &CliContext) -> Result<()> {
        let path = ctx.config_path();
        if ctx.is_json() {
            ctx.formatter().print_json(&serde_json::json!({
                "config_path": path.display().to_string(),
                "exists": path.exists(),
            }));
        } else {
            println!("{}", path.display());
        }
        Ok(())
    }

    fn execute_init(&self, ctx: &CliContext, force: bool) -> Result<()> {
        let formatter = ctx.formatter();
        let path = ctx.config_path();

        if path.exists() && !force {
            anyhow::bail!(
                "Configuration already exists at {}; use --force to overwrite",
                path.display()
            );
        }

        Config::default()
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(config_path = %path.display(), "Wrote default configuration");

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "config_path": path.display().to_string(),
            }));
        } else {
            formatter.success(&format!("Wrote default configuration to {}", path.display()));
        }
        Ok(())
    }

    fn execute_set(&self, ctx: &CliContext, key: &str, value: &str) -> Result<()> {
        let formatter = ctx.formatter();
        let mut config = ctx.load_config()?;

        info!(key = %key, value = %value, "Setting configuration value");

        apply_config_value(&mut config, key, value)?;

        let errors = config.validate();
        if !errors.is_empty() {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::bail!("Invalid value for '{}': {}", key, msgs.join("; "));
        }

        config
            .save(ctx.config_path())
            .context("Failed to write configuration file")?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "key": key,
                "value": value,
                "config_path": ctx.config_path().display().to_string(),
            }));
        } else {
            formatter.success(&format!("Set {} = {}", key, value));
            formatter.info(&format!("Saved to {}", ctx.config_path().display()));
        }
        Ok(())
    }

    fn execute_validate(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let path = ctx.config_path();

        if !path.exists() {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "valid": true,
                    "config_path": path.display().to_string(),
                    "errors": [],
                    "defaults": true,
                }));
            } else {
                formatter.info(&format!("No configuration file at {}", path.display()));
                formatter.info("Defaults are in use. Run 'filesort config init' to create one.");
            }
            return Ok(());
        }

        let config = Config::load(path)
            .with_context(|| format!("Failed to parse configuration {}", path.display()))?;
        let errors = config.validate();

        if ctx.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("configuration is invalid")
        }
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("Expected true or false, got '{}'", value),
    }
}

/// Applies a dotted key/value pair to a `Config`
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- watch ---
        "watch.directory" => config.watch.directory = PathBuf::from(value),
        "watch.enabled" => config.watch.enabled = parse_bool(value)?,
        "watch.recursive" => config.watch.recursive = parse_bool(value)?,
        "watch.debounce_ms" => {
            config.watch.debounce_ms = value
                .parse()
                .context("Expected a positive integer for watch.debounce_ms")?;
        }
        "watch.settle_ms" => {
            config.watch.settle_ms = value
                .parse()
                .context("Expected a positive integer for watch.settle_ms")?;
        }
        "watch.max_concurrent" => {
            config.watch.max_concurrent = value
                .parse()
                .context("Expected a positive integer for watch.max_concurrent")?;
        }

        // --- placement ---
        "placement.base_dir" => config.placement.base_dir = PathBuf::from(value),
        "placement.confidence_threshold" => {
            config.placement.confidence_threshold = value
                .parse()
                .context("Expected a number between 0 and 1")?;
        }

        // --- classifier ---
        "classifier.model" => config.classifier.model = value.to_string(),
        "classifier.base_url" => config.classifier.base_url = value.to_string(),
        "classifier.timeout_secs" => {
            config.classifier.timeout_secs = value
                .parse()
                .context("Expected a positive integer")?;
        }
        "classifier.log_requests" => config.classifier.log_requests = parse_bool(value)?,

        // --- privacy ---
        "privacy.mode" => {
            config.privacy.mode = serde_yaml::from_str::<PrivacyMode>(value)
                .context("Expected strict, balanced or standard")?;
        }
        "privacy.max_preview_chars" => {
            config.privacy.max_preview_chars = value
                .parse()
                .context("Expected a positive integer")?;
        }

        // --- reminders ---
        "reminders.enabled" => config.reminders.enabled = parse_bool(value)?,
        "reminders.check_interval_secs" => {
            config.reminders.check_interval_secs = value
                .parse()
                .context("Expected a positive integer")?;
        }

        // --- archive / audit / logging ---
        "archive.root" => config.archive.root = PathBuf::from(value),
        "audit.database" => config.audit.database = PathBuf::from(value),
        "logging.level" => config.logging.level = value.to_string(),

        _ => anyhow::bail!("Unknown configuration key: '{}'", key),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    #[test]
    fn test_apply_watch_enabled() {
        let mut config = Config::default();
        apply_config_value(&mut config, "watch.enabled", "off").unwrap();
        assert!(!config.watch.enabled);
    }

    #[test]
    fn test_apply_threshold() {
        let mut config = Config::default();
        apply_config_value(&mut config, "placement.confidence_threshold", "0.6").unwrap();
        assert!((config.placement.confidence_threshold - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_apply_privacy_mode() {
        let mut config = Config::default();
        apply_config_value(&mut config, "privacy.mode", "strict").unwrap();
        assert_eq!(config.privacy.mode, PrivacyMode::Strict);
        assert!(apply_config_value(&mut config, "privacy.mode", "paranoid").is_err());
    }

    #[test]
    fn test_apply_reminder_settings() {
        let mut config = Config::default();
        apply_config_value(&mut config, "reminders.enabled", "no").unwrap();
        apply_config_value(&mut config, "reminders.check_interval_secs", "60").unwrap();
        assert!(!config.reminders.enabled);
        assert_eq!(config.reminders.check_interval_secs, 60);
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply_config_value(&mut config, "watch.debounce_ms", "soon").is_err());
        assert!(apply_config_value(&mut config, "watch.enabled", "maybe").is_err());
        assert!(apply_config_value(&mut config, "nope.key", "1").is_err());
    }

    #[tokio::test]
    async fn test_init_then_set_then_validate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("filesort").join("config.yaml");
        let ctx = CliContext::new(OutputFormat::Json, true, Some(path.clone()));

        ConfigCommand::Init { force: false }
            .execute(&ctx)
            .await
            .unwrap();
        assert!(path.exists());
        assert!(ConfigCommand::Init { force: false }
            .execute(&ctx)
            .await
            .is_err());

        ConfigCommand::Set {
            key: "logging.level".into(),
            value: "debug".into(),
        }
        .execute(&ctx)
        .await
        .unwrap();
        assert_eq!(Config::load(&path).unwrap().logging.level, "debug");

        ConfigCommand::Validate.execute(&ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_rejects_invalid_result() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let ctx = CliContext::new(OutputFormat::Json, true, Some(path.clone()));

        let err = ConfigCommand::Set {
            key: "placement.confidence_threshold".into(),
            value: "1.5".into(),
        }
        .execute(&ctx)
        .await
        .unwrap_err();
        assert!(err.to_string().contains("placement.confidence_threshold"));
        assert!(!path.exists());
    }
}
