//! Shared helpers reused across modules (e.g., path validation).

use std::path::{Component, Path, PathBuf};

/// Returns true if the path is non-empty and absolute.
pub fn is_nonempty_absolute(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_absolute()
}

/// Returns true if `path` is under any of the allowed base paths.
///
/// `starts_with` compares components literally, so a `..` or `.` component
/// would defeat the prefix check; such paths are rejected outright.
pub fn is_allowed_path(path: &Path, allowed: &[PathBuf]) -> bool {
    if path
        .components()
        .any(|component| matches!(component, Component::ParentDir | Component::CurDir))
    {
        return false;
    }
    allowed.iter().any(|base| path.starts_with(base))
}
