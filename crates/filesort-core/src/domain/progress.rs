//! Progress checkpoints for batch runs
//!
//! `percentage` is pure; `ProgressTracker` remembers which thresholds have
//! already fired so each one is reported exactly once per run.

use std::collections::BTreeSet;

/// Thresholds reported by a migration run
pub const DEFAULT_THRESHOLDS: [u8; 3] = [50, 90, 100];

/// Integer percentage of `completed` over `total`, rounded down
///
/// An empty batch is treated as finished.
pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total);
    // u128 keeps `completed * 100` from overflowing on 32-bit targets.
    ((completed as u128 * 100) / total as u128) as u8
}

/// Fires each threshold once as a run advances
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    thresholds: Vec<u8>,
    fired: BTreeSet<u8>,
}

impl ProgressTracker {
    pub fn new(thresholds: &[u8]) -> Self {
        let mut thresholds = thresholds.to_vec();
        thresholds.sort_unstable();
        thresholds.dedup();
        Self {
            thresholds,
            fired: BTreeSet::new(),
        }
    }

    /// Returns the thresholds newly reached at `completed` of `total`
    ///
    /// Several may be returned at once when one step crosses more than one
    /// threshold, e.g. the single operation of a one-item batch.
    pub fn observe(&mut self, completed: usize, total: usize) -> Vec<u8> {
        if total == 0 {
            return Vec::new();
        }
        let pct = percentage(completed, total);
        let newly: Vec<u8> = self
            .thresholds
            .iter()
            .copied()
            .filter(|t| *t <= pct && !self.fired.contains(t))
            .collect();
        self.fired.extend(newly.iter().copied());
        newly
    }

    pub fn fired(&self) -> impl Iterator<Item = u8> + '_ {
        self.fired.iter().copied()
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(&DEFAULT_THRESHOLDS)
    }
}
