// src/watch/watcher.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::watch::{ChangedFile, FileWatcher, WatchSet};

/// `notify`-backed watcher.
///
/// Watches the parent directory of every tracked file (non-recursively) and
/// the base directory of every content pattern (recursively, or its nearest
/// existing ancestor while the base is missing). Events are
/// filtered through the current [`WatchSet`] and delivered as
/// [`RuntimeEvent::ChangeBatch`]. Dropping this stops watching.
pub struct NotifyWatcher {
    inner: RecommendedWatcher,
    /// Directory -> recursive?
    watched: BTreeMap<PathBuf, bool>,
    filter: Arc<Mutex<WatchSet>>,
}

impl std::fmt::Debug for NotifyWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyWatcher")
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

/// Directories to watch for `set`, mapped to whether the watch is recursive.
///
/// A content base that does not exist yet is covered by its nearest existing
/// ancestor, watched recursively, so files created under it are still seen.
pub fn wanted_dirs(set: &WatchSet) -> BTreeMap<PathBuf, bool> {
    let mut dirs: BTreeMap<PathBuf, bool> = BTreeMap::new();

    for base in set.patterns.base_dirs(&set.root) {
        if base.is_dir() {
            dirs.insert(base, true);
        } else if base.is_file() {
            if let Some(parent) = base.parent() {
                dirs.entry(parent.to_path_buf()).or_insert(false);
            }
        } else if let Some(existing) = base.ancestors().skip(1).find(|a| a.is_dir()) {
            dirs.insert(existing.to_path_buf(), true);
        }
    }

    for file in &set.files {
        if let Some(parent) = file.parent().filter(|p| p.is_dir()) {
            dirs.entry(parent.to_path_buf()).or_insert(false);
        }
    }

    dirs
}

fn mode(recursive: bool) -> RecursiveMode {
    if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    }
}

impl FileWatcher for NotifyWatcher {
    fn refresh_watched_files(&mut self, set: &WatchSet) -> Result<()> {
        *self
            .filter
            .lock()
            .map_err(|_| anyhow!("watch filter mutex poisoned"))? = set.clone();

        let wanted = wanted_dirs(set);

        for (dir, recursive) in &self.watched {
            if wanted.get(dir) != Some(recursive) {
                debug!(dir = ?dir, "unwatching");
                if let Err(err) = self.inner.unwatch(dir) {
                    warn!(dir = ?dir, "failed to unwatch: {err}");
                }
            }
        }

        for (dir, recursive) in &wanted {
            if self.watched.get(dir) != Some(recursive) {
                debug!(dir = ?dir, recursive, "watching");
                self.inner
                    .watch(dir, mode(*recursive))
                    .with_context(|| format!("watching {:?}", dir))?;
            }
        }

        debug!(dirs = wanted.len(), files = set.files.len(), "refreshed watched files");
        self.watched = wanted;
        Ok(())
    }
}

/// Start a watcher that sends change batches into `runtime_tx`.
///
/// Nothing is watched until the first
/// [`refresh_watched_files`](FileWatcher::refresh_watched_files). Events
/// arriving within `debounce` of each other are coalesced into one batch.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    debounce: Duration,
) -> Result<NotifyWatcher> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);

    let filter = Arc::new(Mutex::new(WatchSet {
        root: root.clone(),
        ..WatchSet::default()
    }));

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let inner = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("stylewatch: failed to forward notify event: {err}");
                }
            }
            Err(err) => eprintln!("stylewatch: file watch error: {err}"),
        },
        Config::default(),
    )?;

    info!("file watcher started for {:?}", root);

    let task_filter = Arc::clone(&filter);
    tokio::spawn(async move {
        while let Some(first) = event_rx.recv().await {
            let mut changed: BTreeSet<PathBuf> = BTreeSet::new();
            collect(&task_filter, first, &mut changed);

            loop {
                match tokio::time::timeout(debounce, event_rx.recv()).await {
                    Ok(Some(event)) => collect(&task_filter, event, &mut changed),
                    Ok(None) | Err(_) => break,
                }
            }

            if changed.is_empty() {
                continue;
            }

            let batch: Vec<ChangedFile> = changed.into_iter().map(ChangedFile::new).collect();
            debug!(files = batch.len(), "sending change batch");
            if runtime_tx.send(RuntimeEvent::ChangeBatch(batch)).await.is_err() {
                break;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(NotifyWatcher {
        inner,
        watched: BTreeMap::new(),
        filter,
    })
}

fn collect(filter: &Mutex<WatchSet>, event: Event, changed: &mut BTreeSet<PathBuf>) {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return;
    }
    let Ok(filter) = filter.lock() else {
        return;
    };
    for path in event.paths {
        if filter.wants(&path) {
            changed.insert(path);
        } else {
            debug!(file = ?path, "ignoring change outside the watch set");
        }
    }
}
