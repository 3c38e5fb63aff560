//! Existing-folder hints for the classifier
//!
//! Collects folders below the placement base so the provider can reuse
//! structure the user already has instead of inventing a parallel tree.
//! Excluded folders, such as the drop directory, are never offered, and
//! neither is anything below them.

use std::path::{Path, PathBuf};

use filesort_core::ports::FolderHints;
use tracing::debug;

/// Collects relative folder paths under `base` down to `depth` levels
///
/// Hidden directories, symlinks and `exclude`d folders are skipped. Results
/// are sorted so the truncation to `limit` is stable across runs.
pub async fn collect_folder_hints(
    base: &Path,
    depth: usize,
    limit: usize,
    exclude: &[PathBuf],
) -> FolderHints {
    if depth == 0 || limit == 0 {
        return FolderHints::none();
    }

    let base = base.to_path_buf();
    let exclude = exclude.to_vec();
    let folders = tokio::task::spawn_blocking(move || {
        let mut out = Vec::new();
        walk(&base, &base, depth, &exclude, &mut out);
        out
    })
    .await
    .unwrap_or_default();

    debug!(count = folders.len(), "Collected folder hints");
    FolderHints::new(folders, limit)
}

fn walk(base: &Path, dir: &Path, depth: usize, exclude: &[PathBuf], out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    let mut children: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.path())
        .collect();
    children.sort();

    for child in children {
        if exclude.iter().any(|x| *x == child) {
            continue;
        }
        if let Ok(rel) = child.strip_prefix(base) {
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
        if depth > 1 {
            walk(base, &child, depth - 1, exclude, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_collects_to_depth() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("school/cs170/homework")).unwrap();
        std::fs::create_dir_all(dir.path().join("work")).unwrap();
        std::fs::create_dir_all(dir.path().join(".cache/x")).unwrap();
        std::fs::write(dir.path().join("file.txt"), b"").unwrap();

        let hints = collect_folder_hints(dir.path(), 2, 50, &[]).await;
        assert_eq!(hints.folders(), &["school", "school/cs170", "work"]);
    }

    #[tokio::test]
    async fn test_limit_and_disabled() {
        let dir = TempDir::new().unwrap();
        for name in ["a", "b", "c"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }

        let hints = collect_folder_hints(dir.path(), 1, 2, &[]).await;
        assert_eq!(hints.folders(), &["a", "b"]);

        assert!(collect_folder_hints(dir.path(), 0, 50, &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_excluded_folder_and_its_children_are_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Downloads/unsorted")).unwrap();
        std::fs::create_dir_all(dir.path().join("work")).unwrap();

        let hints =
            collect_folder_hints(dir.path(), 2, 50, &[dir.path().join("Downloads")]).await;
        assert_eq!(hints.folders(), &["work"]);
    }

    #[tokio::test]
    async fn test_missing_base_is_empty() {
        let hints = collect_folder_hints(Path::new("/no/such/base"), 2, 50, &[]).await;
        assert!(hints.is_empty());
    }
}
