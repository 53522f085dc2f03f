// src/watch/content.rs

//! Content resolution: content patterns to files, files to content items.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::RawContent;
use crate::context::ChangedContentItem;
use crate::fs::{normalize, FileSystem};
use crate::watch::patterns::{collect_matching_files, ContentPatterns};

/// Resolve content patterns to files.
///
/// The result is a set; callers must not rely on glob traversal order.
pub fn expand_content_paths(
    fs: &dyn FileSystem,
    root: &Path,
    patterns: &ContentPatterns,
) -> Result<BTreeSet<PathBuf>> {
    if patterns.is_empty() {
        return Ok(BTreeSet::new());
    }
    let files: BTreeSet<PathBuf> = collect_matching_files(fs, root, patterns)?
        .into_iter()
        .map(|p| normalize(fs, &p))
        .collect();
    debug!(patterns = ?patterns.sources(), files = files.len(), "expanded content patterns");
    Ok(files)
}

/// File suffix without the dot; empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn read_item(fs: &dyn FileSystem, path: &Path) -> Result<ChangedContentItem> {
    let text = fs
        .read_to_string(path)
        .with_context(|| format!("reading content file {:?}", path))?;
    Ok(ChangedContentItem::new(text, extension_of(path)))
}

/// Read every resolved file, then every raw entry.
///
/// Any unreadable file fails the whole read.
pub fn read_all<'a, I>(fs: &dyn FileSystem, files: I, raw: &[RawContent]) -> Result<Vec<ChangedContentItem>>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    let mut items = Vec::new();
    for path in files {
        items.push(read_item(fs, path)?);
    }
    items.extend(
        raw.iter()
            .map(|r| ChangedContentItem::new(r.text.clone(), r.extension.clone())),
    );
    Ok(items)
}
