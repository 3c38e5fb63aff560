//! Filesystem mutations used by placement and plan execution
//!
//! Moves are a plain `rename` when source and destination share a device.
//! Across devices (`EXDEV`) the tree is copied and the source removed.

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, instrument};

/// Timestamp suffix format for archived folders
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Creates the parent directory of `path` if it has one
pub async fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}

/// Moves a file or directory tree from `from` to `to`
///
/// `to` must not exist. The parent of `to` must exist.
#[instrument(skip_all, fields(from = %from.display(), to = %to.display()))]
pub async fn move_path(from: &Path, to: &Path) -> io::Result<()> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            debug!("Rename crossed devices, copying instead");
            let (from, to) = (from.to_path_buf(), to.to_path_buf());
            tokio::task::spawn_blocking(move || copy_then_remove(&from, &to))
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
        }
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(not(unix))]
fn is_cross_device(_err: &io::Error) -> bool {
    false
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    if std::fs::symlink_metadata(from)?.is_dir() {
        copy_tree(from, to)?;
        std::fs::remove_dir_all(from)
    } else {
        std::fs::copy(from, to)?;
        std::fs::remove_file(from)
    }
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    std::fs::create_dir(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Name an archived folder gets: `<name>_<YYYYmmdd_HHMMSS>`
pub fn archive_name(name: &str, at: NaiveDateTime) -> String {
    format!("{}_{}", name, at.format(ARCHIVE_TIMESTAMP_FORMAT))
}

/// Final path component of `path` as a string, or empty
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Name of the directory containing `path`, or empty
pub fn parent_name_of(path: &Path) -> String {
    path.parent().map(file_name_of).unwrap_or_default()
}

/// Joins `root` and an archive name
pub fn archive_destination(root: &Path, name: &str, at: NaiveDateTime) -> PathBuf {
    root.join(archive_name(name, at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_file() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("a.txt");
        let to = dir.path().join("sub").join("a.txt");
        std::fs::write(&from, b"hello").unwrap();

        ensure_parent(&to).await.unwrap();
        move_path(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(std::fs::read(&to).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_move_missing_source_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = move_path(&dir.path().join("nope"), &dir.path().join("x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_copy_then_remove_tree() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("notes");
        std::fs::create_dir_all(from.join("week1")).unwrap();
        std::fs::write(from.join("week1").join("a.md"), b"# a").unwrap();
        std::fs::write(from.join("b.md"), b"# b").unwrap();

        let to = dir.path().join("moved");
        copy_then_remove(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(std::fs::read(to.join("week1").join("a.md")).unwrap(), b"# a");
        assert_eq!(std::fs::read(to.join("b.md")).unwrap(), b"# b");
    }

    #[test]
    fn test_archive_name_format() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();
        assert_eq!(archive_name("old_notes", at), "old_notes_20240309_140507");
        assert_eq!(
            archive_destination(Path::new("/arch"), "old_notes", at),
            PathBuf::from("/arch/old_notes_20240309_140507")
        );
    }

    #[test]
    fn test_names_of() {
        let p = Path::new("/home/u/Downloads/CS170_HW7.pdf");
        assert_eq!(file_name_of(p), "CS170_HW7.pdf");
        assert_eq!(parent_name_of(p), "Downloads");
        assert_eq!(parent_name_of(Path::new("/")), "");
    }
}
