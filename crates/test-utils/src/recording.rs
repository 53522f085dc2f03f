//! Recording fakes for the watcher and context-factory seams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stylewatch::config::ResolvedConfig;
use stylewatch::context::{BuildContext, ChangedContentItem, ContextFactory, UtilityContextFactory};
use stylewatch::errors::Result;
use stylewatch::watch::{FileWatcher, WatchSet};

/// Records every watch set it is asked to refresh to.
///
/// Clones share the log, so a test can keep one handle and give the other
/// to the session.
#[derive(Debug, Clone, Default)]
pub struct RecordingWatcher {
    refreshes: Arc<Mutex<Vec<WatchSet>>>,
}

impl RecordingWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<WatchSet> {
        self.refreshes.lock().unwrap().last().cloned()
    }
}

impl FileWatcher for RecordingWatcher {
    fn refresh_watched_files(&mut self, set: &WatchSet) -> anyhow::Result<()> {
        self.refreshes.lock().unwrap().push(set.clone());
        Ok(())
    }
}

/// Wraps [`UtilityContextFactory`] and counts how many contexts it built.
#[derive(Debug, Clone, Default)]
pub struct CountingFactory {
    created: Arc<AtomicUsize>,
}

impl CountingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ContextFactory for CountingFactory {
    fn create_context(
        &self,
        config: Arc<ResolvedConfig>,
        changed_content: Vec<ChangedContentItem>,
    ) -> Result<BuildContext> {
        self.created.fetch_add(1, Ordering::SeqCst);
        UtilityContextFactory.create_context(config, changed_content)
    }
}
