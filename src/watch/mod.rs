// src/watch/mod.rs

//! Dependency tracking, content resolution and file watching.
//!
//! - [`tracker`] classifies changed files and owns the three dependency sets.
//! - [`content`] expands content patterns and reads content items.
//! - [`patterns`] compiles content globs (`globset`).
//! - [`watcher`] is the `notify`-backed [`FileWatcher`].
//!
//! Nothing in here knows about the pipeline; it only turns filesystem state
//! into paths, classes and content items.

pub mod content;
pub mod path_utils;
pub mod patterns;
pub mod tracker;
pub mod watcher;

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::fs::FileSystem;

pub use content::{expand_content_paths, extension_of, read_all, read_item};
pub use patterns::{collect_matching_files, ContentPatterns};
pub use tracker::DependencyTracker;
pub use watcher::{spawn_watcher, wanted_dirs, NotifyWatcher};

/// What the watcher should be looking at.
#[derive(Debug, Clone, Default)]
pub struct WatchSet {
    pub root: PathBuf,
    /// Individually tracked files (config, context and content files).
    pub files: BTreeSet<PathBuf>,
    /// Content patterns; new files matching them are reported too.
    pub patterns: ContentPatterns,
    /// Never reported, even when matched (the build's own output).
    pub ignored: BTreeSet<PathBuf>,
}

impl WatchSet {
    /// Whether a change to `path` should be forwarded.
    pub fn wants(&self, path: &Path) -> bool {
        if self.ignored.contains(path) {
            return false;
        }
        self.files.contains(path) || self.patterns.matches(&self.root, path)
    }
}

/// Filesystem watcher collaborator.
pub trait FileWatcher: Send + Debug {
    /// Replace the watched-file set.
    fn refresh_watched_files(&mut self, set: &WatchSet) -> Result<()>;
}

/// One changed file in a batch delivered by the watcher.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChangedFile {
    pub path: PathBuf,
}

impl ChangedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn extension(&self) -> String {
        extension_of(&self.path)
    }

    /// Current text of the file.
    pub fn content(&self, fs: &dyn FileSystem) -> Result<String> {
        fs.read_to_string(&self.path)
    }
}
