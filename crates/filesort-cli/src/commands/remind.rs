//! Remind command - Ask to be reminded about a file later

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use filesort_core::config::Config;
use filesort_core::domain::{Reminder, ReminderDelay};
use filesort_core::ports::IReminderStore;
use filesort_organize::notifier::TracingNotifier;
use filesort_organize::ReminderService;
use tracing::info;

use crate::context::CliContext;

#[derive(Debug, Args)]
pub struct RemindCommand {
    /// File to be reminded about
    #[arg(required_unless_present = "list")]
    pub file: Option<PathBuf>,

    /// Delay before the reminder fires (30m, 1h, 3h, or minutes)
    #[arg(long = "in", value_name = "DELAY", default_value = "30m")]
    pub delay: ReminderDelay,

    /// Text shown instead of the default "Check file" message
    #[arg(short, long)]
    pub message: Option<String>,

    /// List reminders that have not fired yet
    #[arg(long, conflicts_with = "file")]
    pub list: bool,
}

impl RemindCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let config = ctx.load_config()?;
        match &self.file {
            Some(file) if !self.list => self.schedule(ctx, &config, file).await,
            _ => list(ctx, &config).await,
        }
    }

    async fn schedule(&self, ctx: &CliContext, config: &Config, file: &Path) -> Result<()> {
        let fmt = ctx.formatter();
        let path = file
            .canonicalize()
            .with_context(|| format!("File not found: {}", file.display()))?;

        let store = ctx.open_reminder_store(config).await?;
        let service = ReminderService::new(store, Arc::new(TracingNotifier::new()));
        let reminder = service
            .schedule(&path, self.delay, self.message.as_deref())
            .await
            .context("Failed to save reminder")?;
        info!(file = %path.display(), delay = %self.delay, "Reminder created");

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "reminder_id": reminder.id(),
                "file": path,
                "due_at": reminder.due_at(),
                "status": "created",
            }));
        } else {
            fmt.success(&format!(
                "Reminder set for {} in {} ({})",
                reminder.filename(),
                self.delay,
                local_time(&reminder)
            ));
        }

        if !config.reminders.enabled {
            fmt.warn(
                "Reminders are disabled; the daemon will not fire this one \
                 until reminders.enabled is true",
            );
        }
        Ok(())
    }
}

async fn list(ctx: &CliContext, config: &Config) -> Result<()> {
    let fmt = ctx.formatter();
    let store = ctx.open_reminder_store(config).await?;
    let reminders = store
        .active_reminders()
        .await
        .context("Failed to query reminders")?;

    if ctx.is_json() {
        fmt.print_json(&serde_json::json!({
            "count": reminders.len(),
            "reminders": reminders,
        }));
        return Ok(());
    }

    if reminders.is_empty() {
        fmt.info("No pending reminders.");
        return Ok(());
    }

    fmt.success(&format!("{} pending reminders", reminders.len()));
    for reminder in &reminders {
        fmt.info(&format!("{}  {}", local_time(reminder), reminder.text()));
    }
    Ok(())
}

fn local_time(reminder: &Reminder) -> String {
    reminder
        .due_at()
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
