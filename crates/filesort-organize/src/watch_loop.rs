//! Watch loop - turns debounced arrivals into placements
//!
//! The [`WatchLoop`] sits between the [`FileWatcher`](crate::watcher::FileWatcher)
//! and the [`PlacementEngine`]. It receives raw change events, feeds them
//! through a [`DebouncedChangeQueue`], and spawns one placement task per
//! settled arrival.
//!
//! ## Flow
//!
//! ```text
//! FileWatcher ──→ mpsc::Receiver ──→ WatchLoop ──→ JoinSet<place(path)>
//!                                       │
//!                          DebouncedChangeQueue + InFlightSet
//! ```
//!
//! Placements of unrelated files run concurrently up to a semaphore limit.
//! The same path is never placed twice at once.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use filesort_core::config::WatchConfig;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::filter::ArrivalFilter;
use crate::inflight::{InFlightGuard, InFlightSet};
use crate::placement::PlacementEngine;
use crate::watcher::{is_file_stable, ChangeEvent, DebouncedChangeQueue};

/// Stability checks before a still-growing file is given up on
const MAX_SETTLE_ATTEMPTS: u32 = 20;

// ============================================================================
// WatchControl
// ============================================================================

/// Auto-organize switch shared with the loop
///
/// While disabled, arrivals are still received and debounced, then dropped.
#[derive(Debug, Clone)]
pub struct WatchControl {
    enabled: Arc<AtomicBool>,
}

impl WatchControl {
    fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        info!(enabled, "Auto-organize toggled");
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

// ============================================================================
// WatchLoop
// ============================================================================

/// Drives placement from watcher events until cancelled
pub struct WatchLoop {
    change_rx: mpsc::Receiver<ChangeEvent>,
    queue: DebouncedChangeQueue,
    engine: Arc<PlacementEngine>,
    inflight: InFlightSet,
    filter: ArrivalFilter,
    control: WatchControl,
    permits: Arc<Semaphore>,
    tasks: JoinSet<()>,
    poll_interval: Duration,
    settle: Duration,
    shutdown: CancellationToken,
}

impl WatchLoop {
    /// Creates a loop with default timing (1s debounce, 500ms settle, 4 workers)
    pub fn new(
        change_rx: mpsc::Receiver<ChangeEvent>,
        engine: Arc<PlacementEngine>,
        shutdown: CancellationToken,
    ) -> Self {
        let defaults = WatchConfig::default();
        Self {
            change_rx,
            queue: DebouncedChangeQueue::new(Duration::from_millis(defaults.debounce_ms)),
            engine,
            inflight: InFlightSet::new(),
            filter: ArrivalFilter::new(&defaults.ignore_patterns),
            control: WatchControl::new(true),
            permits: Arc::new(Semaphore::new(defaults.max_concurrent)),
            tasks: JoinSet::new(),
            poll_interval: poll_interval_for(Duration::from_millis(defaults.debounce_ms)),
            settle: Duration::from_millis(defaults.settle_ms),
            shutdown,
        }
    }

    /// Applies timing, concurrency, ignore rules and the enabled flag
    pub fn configure(mut self, config: &WatchConfig) -> Self {
        let debounce = Duration::from_millis(config.debounce_ms);
        self.queue = DebouncedChangeQueue::new(debounce);
        self.poll_interval = poll_interval_for(debounce);
        self.settle = Duration::from_millis(config.settle_ms);
        self.permits = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        self.filter = ArrivalFilter::new(&config.ignore_patterns);
        self.control.set_enabled(config.enabled);
        self
    }

    pub fn control(&self) -> WatchControl {
        self.control.clone()
    }

    pub fn inflight(&self) -> &InFlightSet {
        &self.inflight
    }

    /// Main event loop
    ///
    /// Runs until the shutdown token is cancelled or the change channel
    /// closes, then waits for outstanding placements to finish.
    pub async fn run(mut self) {
        info!(poll_ms = self.poll_interval.as_millis() as u64, "Watch loop starting");

        let mut poll_timer = tokio::time::interval(self.poll_interval);
        poll_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    info!(pending = self.queue.pending_count(), "Shutdown requested, watch loop stopping");
                    break;
                }

                event = self.change_rx.recv() => {
                    match event {
                        Some(change) => self.queue.push(change),
                        None => {
                            info!("Change channel closed, flushing pending arrivals");
                            for change in self.queue.drain() {
                                self.dispatch(change);
                            }
                            break;
                        }
                    }
                }

                _ = poll_timer.tick() => {
                    for change in self.queue.poll() {
                        self.dispatch(change);
                    }
                }

                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    log_join(joined);
                }
            }
        }

        if !self.tasks.is_empty() {
            info!(tasks = self.tasks.len(), "Waiting for in-flight placements");
        }
        while let Some(joined) = self.tasks.join_next().await {
            log_join(joined);
        }

        info!("Watch loop stopped");
    }

    /// Spawns a placement for `change` if it is an arrival worth handling
    fn dispatch(&mut self, change: ChangeEvent) {
        let Some(path) = change.arrival() else {
            return;
        };

        if !self.control.is_enabled() {
            debug!(path = %path.display(), "Auto-organize disabled, ignoring arrival");
            return;
        }
        if self.filter.is_ignored(path) {
            debug!(path = %path.display(), "Ignoring arrival");
            return;
        }
        let Some(guard) = self.inflight.try_acquire(path) else {
            debug!(path = %path.display(), "Already in flight");
            return;
        };

        let engine = Arc::clone(&self.engine);
        let permits = Arc::clone(&self.permits);
        let settle = self.settle;
        self.tasks
            .spawn(process_arrival(engine, permits, settle, guard));
    }
}

async fn process_arrival(
    engine: Arc<PlacementEngine>,
    permits: Arc<Semaphore>,
    settle: Duration,
    guard: InFlightGuard,
) {
    let Ok(_permit) = permits.acquire_owned().await else {
        return;
    };
    let path: PathBuf = guard.path().to_path_buf();

    if !wait_until_stable(&path, settle).await {
        return;
    }

    match tokio::fs::metadata(&path).await {
        Ok(m) if m.is_file() => {}
        _ => {
            debug!(path = %path.display(), "Arrival is not a regular file, skipping");
            return;
        }
    }

    let outcome = engine.place(&path).await;
    debug!(path = %path.display(), ?outcome, "Placement finished");
    drop(guard);
}

/// Waits for `path` to stop growing; `false` if it vanished or never settled
async fn wait_until_stable(path: &Path, settle: Duration) -> bool {
    let ms = settle.as_millis() as u64;
    for _ in 0..MAX_SETTLE_ATTEMPTS {
        if is_file_stable(path, ms).await {
            return true;
        }
        if tokio::fs::symlink_metadata(path).await.is_err() {
            debug!(path = %path.display(), "Arrival vanished before it settled");
            return false;
        }
    }
    info!(path = %path.display(), "File still changing, skipping for now");
    false
}

fn poll_interval_for(debounce: Duration) -> Duration {
    (debounce / 2).clamp(Duration::from_millis(10), Duration::from_millis(250))
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            error!(error = %e, "Placement task panicked");
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================
