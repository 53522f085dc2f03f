// src/watch/tracker.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::ModuleCache;
use crate::fs::{normalize, FileSystem};
use crate::types::ChangeClass;
use crate::watch::patterns::ContentPatterns;
use crate::watch::WatchSet;

/// Classifies changed files and owns the three dependency sets.
///
/// All stored paths are normalized through the filesystem so that watcher
/// events (which report canonical paths) compare equal.
#[derive(Debug)]
pub struct DependencyTracker {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    config_deps: BTreeSet<PathBuf>,
    context_deps: BTreeSet<PathBuf>,
    content_patterns: ContentPatterns,
    content_files: BTreeSet<PathBuf>,
    modules: ModuleCache,
    /// Extra files to watch that are not dependencies (the input stylesheet).
    pinned: BTreeSet<PathBuf>,
    ignored: BTreeSet<PathBuf>,
}

impl DependencyTracker {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = normalize(fs.as_ref(), &root);
        Self {
            fs,
            root,
            config_deps: BTreeSet::new(),
            context_deps: BTreeSet::new(),
            content_patterns: ContentPatterns::default(),
            content_files: BTreeSet::new(),
            modules: ModuleCache::new(),
            pinned: BTreeSet::new(),
            ignored: BTreeSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key(&self, path: &Path) -> PathBuf {
        normalize(self.fs.as_ref(), path)
    }

    /// Membership test against the dependency sets. Unknown paths are
    /// content.
    pub fn classify(&self, path: &Path) -> ChangeClass {
        let key = self.key(path);
        let is = |set: &BTreeSet<PathBuf>| set.contains(&key) || set.contains(path);

        if is(&self.config_deps) {
            ChangeClass::ConfigDependency
        } else if is(&self.context_deps) {
            ChangeClass::ContextDependency
        } else {
            ChangeClass::ContentFile
        }
    }

    /// Replace the config dependency set with a fresh module-graph walk.
    pub fn record_config_dependencies<I>(&mut self, deps: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let deps: BTreeSet<PathBuf> = deps.into_iter().map(|p| self.key(&p)).collect();
        debug!(count = deps.len(), "recorded config dependencies");
        self.config_deps = deps;
    }

    /// Returns true when the path was not tracked yet.
    pub fn record_context_dependency(&mut self, path: &Path) -> bool {
        let key = self.key(path);
        let added = self.context_deps.insert(key);
        if added {
            debug!(file = ?path, "recorded context dependency");
        }
        added
    }

    pub fn reset_context_dependencies(&mut self) {
        self.context_deps.clear();
    }

    /// Drop cached parses of every tracked config module so that the next
    /// config load reads from disk. Returns how many entries were evicted.
    pub fn evict_config_cache(&mut self) -> usize {
        let mut evicted = 0;
        for dep in &self.config_deps {
            if self.modules.evict(dep) {
                evicted += 1;
            }
        }
        evicted
    }

    pub fn module_cache_mut(&mut self) -> &mut ModuleCache {
        &mut self.modules
    }

    pub fn module_cache(&self) -> &ModuleCache {
        &self.modules
    }

    pub fn set_content(&mut self, patterns: ContentPatterns, files: BTreeSet<PathBuf>) {
        self.content_patterns = patterns;
        self.content_files = files;
    }

    pub fn config_dependencies(&self) -> &BTreeSet<PathBuf> {
        &self.config_deps
    }

    pub fn context_dependencies(&self) -> &BTreeSet<PathBuf> {
        &self.context_deps
    }

    pub fn content_files(&self) -> &BTreeSet<PathBuf> {
        &self.content_files
    }

    pub fn content_patterns(&self) -> &ContentPatterns {
        &self.content_patterns
    }

    /// Always watch `path`, whether or not it is a dependency.
    pub fn pin(&mut self, path: &Path) {
        let key = self.key(path);
        self.pinned.insert(key);
    }

    /// Never report changes to `path`.
    pub fn ignore(&mut self, path: &Path) {
        // The output may not exist yet; keep both spellings.
        let key = self.key(path);
        self.ignored.insert(key);
        self.ignored.insert(path.to_path_buf());
    }

    pub fn watch_set(&self) -> WatchSet {
        let files = self
            .config_deps
            .iter()
            .chain(&self.context_deps)
            .chain(&self.content_files)
            .chain(&self.pinned)
            .cloned()
            .collect();

        WatchSet {
            root: self.root.clone(),
            files,
            patterns: self.content_patterns.clone(),
            ignored: self.ignored.clone(),
        }
    }
}
