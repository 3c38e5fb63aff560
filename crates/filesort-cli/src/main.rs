//! filesort CLI - Command-line interface for the file organizer
//!
//! Provides commands for:
//! - Executing migration plans
//! - Classifying (and optionally placing) a single file
//! - Browsing the audit history and usage statistics
//! - Scheduling reminders about files
//! - Managing configuration and the stored API key

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod output;

use commands::{
    auth::AuthCommand, classify::ClassifyCommand, completions::CompletionsCommand,
    config::ConfigCommand, history::HistoryCommand, remind::RemindCommand,
    reorganize::ReorganizeCommand, stats::StatsCommand,
};
use context::CliContext;
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "filesort", version, about = "AI-assisted file organizer")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Execute a migration plan
    Reorganize(ReorganizeCommand),
    /// Classify a file and optionally move it
    Classify(ClassifyCommand),
    /// Show recent operations
    History(HistoryCommand),
    /// Show usage statistics
    Stats(StatsCommand),
    /// Set a reminder about a file
    Remind(RemindCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Manage the classifier API key
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose, cli.quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CliContext::new(format, cli.quiet, cli.config);

    match cli.command {
        Commands::Reorganize(cmd) => cmd.execute(&ctx).await,
        Commands::Classify(cmd) => cmd.execute(&ctx).await,
        Commands::History(cmd) => cmd.execute(&ctx).await,
        Commands::Stats(cmd) => cmd.execute(&ctx).await,
        Commands::Remind(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
        Commands::Auth(cmd) => cmd.execute(&ctx).await,
        Commands::Completions(cmd) => cmd.execute(&ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use filesort_core::domain::ReminderDelay;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "filesort",
            "history",
            "--limit",
            "5",
            "--json",
            "--config",
            "/tmp/c.yaml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert!(matches!(cli.command, Commands::History(HistoryCommand { limit: 5 })));
    }

    #[test]
    fn test_reorganize_dry_run_flag() {
        let cli = Cli::try_parse_from(["filesort", "reorganize", "plan.json", "--dry-run"]).unwrap();
        match cli.command {
            Commands::Reorganize(cmd) => {
                assert!(cmd.dry_run);
                assert_eq!(cmd.plan, PathBuf::from("plan.json"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_remind_delay_flag() {
        let cli = Cli::try_parse_from(["filesort", "remind", "lease.pdf", "--in", "3h"]).unwrap();
        match cli.command {
            Commands::Remind(cmd) => {
                assert_eq!(cmd.file, Some(PathBuf::from("lease.pdf")));
                assert_eq!(cmd.delay, ReminderDelay::THREE_HOURS);
                assert!(!cmd.list);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["filesort", "remind", "lease.pdf"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Remind(RemindCommand { delay: ReminderDelay::THIRTY_MINUTES, .. })
        ));
    }

    #[test]
    fn test_remind_rejects_bad_delay_and_missing_file() {
        assert!(Cli::try_parse_from(["filesort", "remind", "a.pdf", "--in", "soon"]).is_err());
        assert!(Cli::try_parse_from(["filesort", "remind"]).is_err());
        assert!(Cli::try_parse_from(["filesort", "remind", "--list"]).is_ok());
        assert!(Cli::try_parse_from(["filesort", "remind", "a.pdf", "--list"]).is_err());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0, false), "info");
        assert_eq!(log_filter(1, false), "debug");
        assert_eq!(log_filter(3, false), "trace");
        assert_eq!(log_filter(2, true), "error");
    }
}
