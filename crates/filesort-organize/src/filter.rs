//! Arrival filtering
//!
//! Hidden and temporary files are never placed. Configured glob patterns
//! (partial downloads by default) are matched against the file name.

use std::path::Path;

use glob::Pattern;
use tracing::warn;

/// Decides which arrivals the watch loop ignores
#[derive(Debug, Clone, Default)]
pub struct ArrivalFilter {
    patterns: Vec<Pattern>,
}

impl ArrivalFilter {
    /// Compiles `patterns`, skipping (and logging) invalid ones
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match Pattern::new(p.as_ref()) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(pattern = p.as_ref(), error = %e, "Ignoring invalid ignore pattern");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    /// Whether `path` should be left alone
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return true;
        };
        if name.starts_with('.') || name.starts_with('~') {
            return true;
        }
        self.patterns.iter().any(|p| p.matches(name))
    }
}
