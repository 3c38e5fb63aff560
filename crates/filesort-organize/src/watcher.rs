//! Drop-directory watching and the debounced arrival queue
//!
//! [`FileWatcher`] wraps `notify` and turns raw OS events into
//! [`ChangeEvent`] values. [`DebouncedChangeQueue`] holds them until a path
//! has been quiet for the debounce window, so a download that is still being
//! written is only seen once it stops changing.
//!
//! ```text
//! inotify / FSEvents
//!       │
//!       ▼
//!  FileWatcher ──→ mpsc::channel ──→ DebouncedChangeQueue ──→ WatchLoop
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Capacity of the watcher → loop channel
const EVENT_CHANNEL_CAPACITY: usize = 1024;

// ============================================================================
// ChangeEvent
// ============================================================================

/// A filesystem change seen in the watched directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A file appeared at the path
    Created(PathBuf),
    /// An existing file's content or metadata changed
    Modified(PathBuf),
    /// The path went away
    Deleted(PathBuf),
    /// A file was renamed within the watched tree
    Renamed { old: PathBuf, new: PathBuf },
}

impl ChangeEvent {
    /// The path the event refers to; the new name for renames
    pub fn path(&self) -> &Path {
        match self {
            ChangeEvent::Created(p) => p,
            ChangeEvent::Modified(p) => p,
            ChangeEvent::Deleted(p) => p,
            ChangeEvent::Renamed { new, .. } => new,
        }
    }

    /// Path of a newly arrived file, if this event is an arrival
    ///
    /// Creations and renames count as arrivals. A browser that finishes
    /// `report.pdf.crdownload` by renaming it to `report.pdf` produces one.
    pub fn arrival(&self) -> Option<&Path> {
        match self {
            ChangeEvent::Created(p) => Some(p),
            ChangeEvent::Renamed { new, .. } => Some(new),
            ChangeEvent::Modified(_) | ChangeEvent::Deleted(_) => None,
        }
    }
}

// ============================================================================
// FileWatcher
// ============================================================================

/// Watches a directory using the OS-native mechanism
///
/// ```ignore
/// let (mut watcher, rx) = FileWatcher::new()?;
/// let _handle = watcher.watch(Path::new("/home/user/Downloads"), false)?;
/// // rx.recv().await yields ChangeEvents
/// ```
pub struct FileWatcher {
    watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Creates a watcher and the receiver its events are delivered on
    ///
    /// # Errors
    /// Returns an error if the underlying OS watcher cannot be created
    pub fn new() -> Result<(Self, mpsc::Receiver<ChangeEvent>)> {
        let (event_tx, event_rx) = mpsc::channel::<ChangeEvent>(EVENT_CHANNEL_CAPACITY);

        let watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if let Some(change) = map_notify_event(&event) {
                        if let Err(e) = event_tx.blocking_send(change) {
                            warn!(error = %e, "Dropping change event, receiver closed");
                        }
                    }
                }
                Err(err) => {
                    error!(error = %err, "File watcher error");
                }
            },
            notify::Config::default(),
        )
        .context("Failed to create file watcher")?;

        Ok((Self { watcher }, event_rx))
    }

    /// Starts watching `path`
    ///
    /// # Errors
    /// Returns an error if the path cannot be watched (missing directory,
    /// insufficient permissions, or the inotify watch limit was reached)
    pub fn watch(&mut self, path: &Path, recursive: bool) -> Result<WatchHandle> {
        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        info!(path = %path.display(), recursive, "Watching drop directory");

        self.watcher
            .watch(path, mode)
            .with_context(|| format!("Failed to watch path: {}", path.display()))?;

        Ok(WatchHandle {
            path: path.to_path_buf(),
        })
    }

    /// Stops watching `path`
    pub fn unwatch(&mut self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "Stopping watch");

        self.watcher
            .unwatch(path)
            .with_context(|| format!("Failed to unwatch path: {}", path.display()))?;

        Ok(())
    }
}

/// Identifies an active watch
#[derive(Debug)]
pub struct WatchHandle {
    path: PathBuf,
}

impl WatchHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ============================================================================
// notify::Event → ChangeEvent
// ============================================================================

/// Converts a `notify::Event` into a `ChangeEvent`
///
/// - `Create(*)` and `Modify(Name(To))` become `Created`
/// - `Modify(Name(Both))` with two paths becomes `Renamed`
/// - `Remove(*)` and `Modify(Name(From))` become `Deleted`
/// - any other `Modify(*)` becomes `Modified`
///
/// Access events and events without paths are dropped.
fn map_notify_event(event: &notify::Event) -> Option<ChangeEvent> {
    let paths = &event.paths;

    let change = match &event.kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            ChangeEvent::Created(paths.first()?.clone())
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() >= 2 => {
            ChangeEvent::Renamed {
                old: paths[0].clone(),
                new: paths[1].clone(),
            }
        }
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            ChangeEvent::Deleted(paths.first()?.clone())
        }
        EventKind::Modify(_) => ChangeEvent::Modified(paths.first()?.clone()),
        _ => {
            debug!(kind = ?event.kind, "Ignoring event kind");
            return None;
        }
    };

    debug!(event = ?change, "Mapped notify event");
    Some(change)
}

// ============================================================================
// File stability check
// ============================================================================

/// Checks whether a file has stopped growing
///
/// Reads the size twice, `check_interval_ms` apart. Returns `false` if the
/// size changed or the file could not be read.
pub async fn is_file_stable(path: &Path, check_interval_ms: u64) -> bool {
    let size_first = match tokio::fs::metadata(path).await {
        Ok(m) => m.len(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Cannot stat file for stability check");
            return false;
        }
    };

    tokio::time::sleep(Duration::from_millis(check_interval_ms)).await;

    let size_second = match tokio::fs::metadata(path).await {
        Ok(m) => m.len(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "File vanished during stability check");
            return false;
        }
    };

    let stable = size_first == size_second;
    debug!(path = %path.display(), size_first, size_second, stable, "File stability check");
    stable
}

// ============================================================================
// DebouncedChangeQueue
// ============================================================================

/// Coalesces bursts of events per path until the path goes quiet
///
/// The latest event for a path replaces the earlier one and restarts its
/// timer, except that a `Modified` never downgrades a pending arrival: a
/// download reported as `Created` followed by many writes still settles as
/// `Created`.
pub struct DebouncedChangeQueue {
    pending: HashMap<PathBuf, (ChangeEvent, Instant)>,
    debounce_delay: Duration,
}

impl DebouncedChangeQueue {
    pub fn new(debounce_delay: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            debounce_delay,
        }
    }

    /// Records `event`, restarting the quiet period for its path
    pub fn push(&mut self, event: ChangeEvent) {
        let path = event.path().to_path_buf();
        let now = Instant::now();

        match self.pending.get_mut(&path) {
            Some((existing, stamp))
                if existing.arrival().is_some() && matches!(event, ChangeEvent::Modified(_)) =>
            {
                *stamp = now;
            }
            _ => {
                self.pending.insert(path, (event, now));
            }
        }
    }

    /// Removes and returns every event that has been quiet long enough
    pub fn poll(&mut self) -> Vec<ChangeEvent> {
        let now = Instant::now();
        let delay = self.debounce_delay;
        let settled_paths: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, (_, stamp))| now.duration_since(*stamp) >= delay)
            .map(|(path, _)| path.clone())
            .collect();

        let settled: Vec<ChangeEvent> = settled_paths
            .iter()
            .filter_map(|p| self.pending.remove(p))
            .map(|(event, _)| event)
            .collect();

        if !settled.is_empty() {
            debug!(count = settled.len(), "Polled settled change events");
        }
        settled
    }

    /// Removes and returns everything, settled or not
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        self.pending.drain().map(|(_, (event, _))| event).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
