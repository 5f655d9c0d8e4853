//! Path helpers shared by the writer and the binary.

use std::path::{Path, PathBuf};

/// Resolve `path` against `base` unless it is already absolute.
///
/// # Example
/// ```ignore
/// let log = resolve_against("/work", "terminal_log.log");
/// assert_eq!(log, PathBuf::from("/work/terminal_log.log"));
/// ```
pub fn resolve_against(base: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.as_ref().join(path)
    }
}

/// Directory that must exist before `path` can be created.
///
/// Returns `None` for a bare filename (or the filesystem root), where there
/// is nothing to create.
pub fn parent_to_create(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}
