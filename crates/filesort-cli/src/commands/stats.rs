//! Stats command - Usage statistics over the audit trail

use anyhow::{Context, Result};
use clap::Args;
use filesort_core::ports::{AuditStatistics, IAuditStore};

use crate::context::CliContext;

#[derive(Debug, Args)]
pub struct StatsCommand {}

impl StatsCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let fmt = ctx.formatter();
        let config = ctx.load_config()?;

        let stats = match ctx.existing_audit_store(&config).await? {
            Some(store) => store
                .statistics()
                .await
                .context("Failed to compute statistics")?,
            None => AuditStatistics::default(),
        };

        if ctx.is_json() {
            let value = serde_json::to_value(&stats).context("Failed to serialize statistics")?;
            fmt.print_json(&value);
            return Ok(());
        }

        fmt.success(&format!("{} operations recorded", stats.total_operations));
        fmt.info(&format!("Today: {}", stats.today));
        for (kind, count) in &stats.by_type {
            fmt.info(&format!("{kind:<8} {count}"));
        }
        Ok(())
    }
}
