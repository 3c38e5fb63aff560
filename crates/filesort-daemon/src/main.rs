//! filesort daemon - Background drop-directory organizer
//!
//! This binary runs as a user service and:
//! - Watches the configured drop directory for new files
//! - Classifies each arrival and moves it, or leaves it for review
//! - Records every decision in the audit database
//! - Fires file reminders when they come due
//! - Shuts down gracefully on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! `DaemonService::new` wires the adapters (SQLite audit store, LLM
//! classifier, tracing notifier) into a `PlacementEngine`. `run` starts the
//! OS watcher and hands its channel to a `WatchLoop`. A `ReminderService`
//! runs beside it. Both stop when the shared `CancellationToken` is
//! cancelled.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use filesort_audit::AuditLogger;
use filesort_cache::{DatabasePool, SqliteAuditStore, SqliteReminderStore};
use filesort_classifier::{resolve_api_key, LlmClassifier};
use filesort_core::config::Config;
use filesort_core::ports::{INotificationSink, IReminderStore};
use filesort_organize::notifier::TracingNotifier;
use filesort_organize::watcher::FileWatcher;
use filesort_organize::{
    ConfidencePolicy, DestinationResolver, MetadataExtractor, PlacementEngine, ReminderService,
    WatchLoop,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Configuration
// ============================================================================

/// Loads the config file, falling back to defaults when it does not exist
///
/// A file that exists but cannot be parsed is an error rather than a silent
/// fallback.
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    Config::load(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Rejects a configuration with any validation error
fn check_config(config: &Config) -> Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    let list = errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n");
    anyhow::bail!("Invalid configuration:\n{list}")
}

/// `RUST_LOG` wins over `logging.level`
fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
}

// ============================================================================
// DaemonService
// ============================================================================

/// Owns the configuration and the placement engine for the daemon's lifetime
struct DaemonService {
    config: Config,
    engine: Arc<PlacementEngine>,
    reminders: Arc<dyn IReminderStore>,
    notifier: Arc<dyn INotificationSink>,
    shutdown: CancellationToken,
}

impl DaemonService {
    /// Opens the audit database, resolves credentials and builds the engine
    ///
    /// A missing API key is fatal: without it every file would go through
    /// the fallback rules.
    async fn new(config: Config, shutdown: CancellationToken) -> Result<Self> {
        let db_path = config.audit.database();
        let db_pool = DatabasePool::new(&db_path)
            .await
            .with_context(|| format!("Failed to open audit database {}", db_path.display()))?;
        info!(database = %db_path.display(), "Audit database ready");

        let store = Arc::new(SqliteAuditStore::new(db_pool.pool().clone()));
        let audit = Arc::new(AuditLogger::new(store));
        let reminders = Arc::new(SqliteReminderStore::new(db_pool.pool().clone()));
        let notifier: Arc<dyn INotificationSink> = Arc::new(TracingNotifier::new());

        let (api_key, source) = resolve_api_key(&config.classifier)
            .context("Classifier credentials are not configured")?;
        info!(%source, model = %config.classifier.model, "Classifier credentials resolved");

        let classifier = Arc::new(LlmClassifier::from_config(&config.classifier, api_key));
        let engine = build_engine(&config, classifier, audit, Arc::clone(&notifier));

        Ok(Self {
            config,
            engine: Arc::new(engine),
            reminders,
            notifier,
            shutdown,
        })
    }

    /// Watches the drop directory until shutdown
    async fn run(&self) -> Result<()> {
        let directory = self.config.watch.directory();
        if !directory.is_dir() {
            anyhow::bail!("Watch directory does not exist: {}", directory.display());
        }

        let (mut watcher, change_rx) = FileWatcher::new()?;
        let handle = watcher.watch(&directory, self.config.watch.recursive)?;

        if !self.config.watch.enabled {
            warn!("Auto-organize is disabled; arrivals will be observed but not moved");
        }

        let reminder_task = self.spawn_reminders();

        let watch_loop = WatchLoop::new(change_rx, Arc::clone(&self.engine), self.shutdown.clone())
            .configure(&self.config.watch);

        info!(
            directory = %handle.path().display(),
            base_dir = %self.config.placement.base_dir().display(),
            "Organizer running"
        );
        watch_loop.run().await;

        if let Err(e) = watcher.unwatch(handle.path()) {
            warn!(error = %e, "Failed to remove watch during shutdown");
        }

        if let Some(task) = reminder_task {
            // The watch loop can also end because its channel closed.
            self.shutdown.cancel();
            if let Err(e) = task.await {
                error!(error = %e, "Reminder service task failed");
            }
        }
        Ok(())
    }

    /// Starts the reminder checker unless reminders are disabled
    fn spawn_reminders(&self) -> Option<JoinHandle<()>> {
        if !self.config.reminders.enabled {
            info!("Reminders are disabled");
            return None;
        }
        let service =
            ReminderService::new(Arc::clone(&self.reminders), Arc::clone(&self.notifier))
                .configure(&self.config.reminders);
        Some(tokio::spawn(service.run(self.shutdown.clone())))
    }
}

/// Wires a placement engine from the config sections
fn build_engine(
    config: &Config,
    classifier: Arc<LlmClassifier>,
    audit: Arc<AuditLogger>,
    notifier: Arc<dyn INotificationSink>,
) -> PlacementEngine {
    let resolver = DestinationResolver::new(config.placement.base_dir());
    PlacementEngine::new(classifier, audit, notifier, resolver)
        .with_extractor(MetadataExtractor::from_privacy(&config.privacy))
        .with_policy(ConfidencePolicy::from_config(&config.placement))
        .with_classify_timeout(config.classifier.timeout())
        .with_folder_hints(
            config.placement.folder_hint_depth,
            config.placement.folder_hint_limit,
        )
        .exclude_from_hints(config.watch.directory())
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config_path: PathBuf = Config::default_path();
    let config = load_config(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config))
        .with_target(true)
        .init();

    info!(config_path = %config_path.display(), "filesort daemon starting (filesortd)");
    check_config(&config)?;

    let shutdown_token = CancellationToken::new();

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let result = match DaemonService::new(config, shutdown_token.clone()).await {
        Ok(service) => service.run().await,
        Err(e) => Err(e),
    };

    match &result {
        Ok(()) => info!("filesort daemon shut down gracefully"),
        Err(e) => error!(error = %format!("{e:#}"), "filesort daemon exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
