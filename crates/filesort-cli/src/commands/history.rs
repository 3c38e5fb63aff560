//! History command - List recent operations from the audit trail

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use filesort_core::domain::OperationRecord;
use filesort_core::ports::IAuditStore;
use tracing::info;

use crate::context::CliContext;

#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Maximum number of operations to show
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: u32,
}

impl HistoryCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let fmt = ctx.formatter();
        let config = ctx.load_config()?;

        let records = match ctx.existing_audit_store(&config).await? {
            Some(store) => store
                .recent(self.limit)
                .await
                .context("Failed to query recent operations")?,
            None => Vec::new(),
        };
        info!(count = records.len(), "Retrieved operations");

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "limit": self.limit,
                "count": records.len(),
                "operations": records,
            }));
            return Ok(());
        }

        if records.is_empty() {
            fmt.info("No operations recorded yet.");
            return Ok(());
        }

        fmt.success(&format!("Last {} operations", records.len()));
        fmt.info(&format!(
            "{:<16}  {:<7}  {:<9}  {:<5}  {}",
            "TIME", "TYPE", "STATUS", "CONF", "FILE"
        ));
        for record in &records {
            fmt.info(&history_row(record));
        }
        Ok(())
    }
}

fn history_row(record: &OperationRecord) -> String {
    let time = record
        .timestamp()
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string();
    let confidence = record
        .confidence()
        .map(|c| format!("{c:.2}"))
        .unwrap_or_else(|| "-".to_string());
    let target = match (record.new_path(), record.failure_reason()) {
        (Some(to), _) => format!("{} -> {}", record.filename(), to.display()),
        (None, Some(reason)) => format!("{} ({reason})", record.filename()),
        (None, None) => record.filename().to_string(),
    };
    format!(
        "{:<16}  {:<7}  {:<9}  {:<5}  {}",
        time,
        record.operation_type().as_str(),
        record.status().as_str(),
        confidence,
        target
    )
}
