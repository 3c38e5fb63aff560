//! State shared by every subcommand: output mode, config location, database

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use filesort_cache::{DatabasePool, SqliteAuditStore, SqliteReminderStore};
use filesort_core::config::Config;
use tracing::debug;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

pub struct CliContext {
    pub format: OutputFormat,
    pub quiet: bool,
    config_path: PathBuf,
}

impl CliContext {
    /// `config_override` replaces the platform default config path
    pub fn new(format: OutputFormat, quiet: bool, config_override: Option<PathBuf>) -> Self {
        Self {
            format,
            quiet,
            config_path: config_override.unwrap_or_else(Config::default_path),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }

    /// Reads the config file; a missing file yields the defaults
    pub fn load_config(&self) -> Result<Config> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }
        Config::load(&self.config_path)
            .with_context(|| format!("Failed to load config from {}", self.config_path.display()))
    }

    /// Opens (creating if needed) the database named in the config
    async fn open_database(&self, config: &Config) -> Result<DatabasePool> {
        let db_path = config.audit.database();
        DatabasePool::new(&db_path)
            .await
            .with_context(|| format!("Failed to open audit database {}", db_path.display()))
    }

    pub async fn open_audit_store(&self, config: &Config) -> Result<Arc<SqliteAuditStore>> {
        let pool = self.open_database(config).await?;
        Ok(Arc::new(SqliteAuditStore::new(pool.pool().clone())))
    }

    /// Reminders live in the audit database
    pub async fn open_reminder_store(&self, config: &Config) -> Result<Arc<SqliteReminderStore>> {
        let pool = self.open_database(config).await?;
        Ok(Arc::new(SqliteReminderStore::new(pool.pool().clone())))
    }

    /// Opens the audit database only if it already exists
    pub async fn existing_audit_store(
        &self,
        config: &Config,
    ) -> Result<Option<Arc<SqliteAuditStore>>> {
        if !config.audit.database().exists() {
            return Ok(None);
        }
        self.open_audit_store(config).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_path_used() {
        let ctx = CliContext::new(
            OutputFormat::Json,
            false,
            Some(PathBuf::from("/tmp/custom.yaml")),
        );
        assert_eq!(ctx.config_path(), Path::new("/tmp/custom.yaml"));
        assert!(ctx.is_json());
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let ctx = CliContext::new(
            OutputFormat::Human,
            false,
            Some(dir.path().join("none.yaml")),
        );
        let config = ctx.load_config().unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[tokio::test]
    async fn test_existing_store_absent_then_present() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.audit.database = dir.path().join("audit.db");
        let ctx = CliContext::new(OutputFormat::Human, false, None);

        assert!(ctx.existing_audit_store(&config).await.unwrap().is_none());
        ctx.open_audit_store(&config).await.unwrap();
        assert!(ctx.existing_audit_store(&config).await.unwrap().is_some());
    }
}
