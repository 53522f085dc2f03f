// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Falls back to comparing canonical forms when the plain prefix test fails
/// (symlinked roots, `/private/var` on macOS). Returns `None` when the path
/// is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) else {
        return None;
    };
    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

/// `<path>.map`, the source map written next to an output file.
pub fn map_path(output: &Path) -> std::path::PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".map");
    name.into()
}
