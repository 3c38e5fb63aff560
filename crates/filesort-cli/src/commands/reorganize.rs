//! Reorganize command - Execute a migration plan
//!
//! Reads a JSON plan (an array of `move`, `create` and `archive` entries),
//! runs it in order and prints the run summary. `--dry-run` validates the
//! plan and lists the operations without touching the filesystem.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use filesort_audit::AuditLogger;
use filesort_core::domain::{MigrationPlan, Operation, RunSummary};
use filesort_organize::notifier::TracingNotifier;
use filesort_organize::PlanExecutor;
use tracing::info;

use crate::context::CliContext;
use crate::output::OutputFormatter;

#[derive(Debug, Args)]
pub struct ReorganizeCommand {
    /// Path to the migration plan JSON file
    pub plan: PathBuf,

    /// Validate and list the operations without executing them
    #[arg(long)]
    pub dry_run: bool,
}

impl ReorganizeCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let fmt = ctx.formatter();

        let json = tokio::fs::read_to_string(&self.plan)
            .await
            .with_context(|| format!("Failed to read plan {}", self.plan.display()))?;
        let plan = MigrationPlan::from_json(&json)
            .with_context(|| format!("Invalid migration plan {}", self.plan.display()))?;

        info!(plan = %self.plan.display(), operations = plan.len(), dry_run = self.dry_run, "Loaded plan");

        if self.dry_run {
            print_plan(&plan, ctx, &*fmt);
            return Ok(());
        }

        let config = ctx.load_config()?;
        let store = ctx.open_audit_store(&config).await?;
        let executor = PlanExecutor::new(
            Arc::new(AuditLogger::new(store)),
            Arc::new(TracingNotifier::new()),
            config.archive.root(),
        );

        let summary = executor.execute(&plan).await;
        print_summary(&summary, ctx, &*fmt)?;

        if summary.has_errors() {
            anyhow::bail!(
                "{} of {} operations failed",
                summary.errors.len(),
                summary.total_operations
            );
        }
        Ok(())
    }
}

/// One-line description of an operation
pub fn describe(op: &Operation) -> String {
    match op {
        Operation::Move {
            source,
            destination,
            ..
        } => format!("move    {} -> {}", source.display(), destination.display()),
        Operation::Create { destination } => format!("create  {}", destination.display()),
        Operation::Archive { source } => format!("archive {}", source.display()),
    }
}

fn print_plan(plan: &MigrationPlan, ctx: &CliContext, fmt: &dyn OutputFormatter) {
    if ctx.is_json() {
        fmt.print_json(&serde_json::json!({
            "dry_run": true,
            "total_operations": plan.len(),
            "operations": plan.operations(),
        }));
        return;
    }

    fmt.success(&format!("Plan is valid: {} operations", plan.len()));
    for (i, op) in plan.iter().enumerate() {
        fmt.info(&format!("{:>3}. {}", i + 1, describe(op)));
    }
}

fn print_summary(summary: &RunSummary, ctx: &CliContext, fmt: &dyn OutputFormatter) -> Result<()> {
    if ctx.is_json() {
        let value = serde_json::to_value(summary).context("Failed to serialize run summary")?;
        fmt.print_json(&value);
        return Ok(());
    }

    fmt.success(&format!(
        "Reorganization finished: {}/{} operations succeeded",
        summary.succeeded(),
        summary.total_operations
    ));
    fmt.info(&format!("Files moved:      {}", summary.files_moved));
    fmt.info(&format!("Folders created:  {}", summary.folders_created));
    fmt.info(&format!("Folders archived: {}", summary.folders_archived));
    fmt.info(&format!("Duration:         {} ms", summary.duration_ms));
    for error in &summary.errors {
        fmt.error(error);
    }
    Ok(())
}
