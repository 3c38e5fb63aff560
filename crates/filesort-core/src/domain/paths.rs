//! Path helpers shared by config, plans and the resolver

use std::path::{Component, Path, PathBuf};

/// Folder used when a suggested path sanitizes to nothing
pub const DEFAULT_FOLDER: &str = "misc";

/// Expands a leading `~` to the user's home directory
///
/// Paths without a leading tilde, or hosts without a home directory,
/// are returned unchanged.
pub fn expand_tilde(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Reduces a provider-suggested folder to a safe relative path
///
/// Root, prefix, `.` and `..` components are dropped so the result can
/// never escape the base directory it is joined to.
///
/// ```
/// use std::path::PathBuf;
/// use filesort_core::domain::sanitize_relative;
///
/// assert_eq!(sanitize_relative("/school/../cs170/"), PathBuf::from("school/cs170"));
/// assert_eq!(sanitize_relative(".."), PathBuf::from("misc"));
/// ```
pub fn sanitize_relative(suggested: &str) -> PathBuf {
    let cleaned: PathBuf = Path::new(suggested.trim())
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    if cleaned.as_os_str().is_empty() {
        PathBuf::from(DEFAULT_FOLDER)
    } else {
        cleaned
    }
}
