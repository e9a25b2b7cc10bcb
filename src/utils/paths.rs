//! Path helpers

use std::io;
use std::path::{Path, PathBuf};
use path_clean::PathClean;

/// Resolve `path` against the current directory and normalise it
///
/// Absolute paths are only normalised. The file does not have to exist.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(resolve_against(&cwd, path))
}

/// Resolve `path` against `base` and normalise it
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.clean()
    } else {
        base.join(path).clean()
    }
}

/// Final component of `path` for display, or the whole path if it has none
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
