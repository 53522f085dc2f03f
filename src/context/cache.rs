// src/context/cache.rs

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::config::{
    default_config, load_config_graph, locate_config, ConfigResolver, ContentConfig,
    LoadedConfig,
};
use crate::context::{describe_source, ChangedContentItem, ContextFactory, SharedContext};
use crate::errors::{Result, StyleError};
use crate::fs::FileSystem;
use crate::watch::{expand_content_paths, read_all, ContentPatterns, DependencyTracker, FileWatcher};

/// Inputs needed to build a fresh context.
#[derive(Debug, Clone, Copy)]
pub struct ContextRecipe<'a> {
    pub fs: &'a dyn FileSystem,
    /// `--config`; wins over the upward search.
    pub explicit_config: Option<&'a Path>,
    /// Where the upward config search starts.
    pub search_from: &'a Path,
    /// `--content`; replaces every configured content entry.
    pub content_override: Option<&'a [String]>,
    pub resolver: &'a dyn ConfigResolver,
    pub factory: &'a dyn ContextFactory,
}

/// Owns the single active build context.
///
/// A context lives for one generation: from its creation in
/// [`get_or_create`](ContextCache::get_or_create) until the next
/// [`invalidate`](ContextCache::invalidate). Content queued in between is
/// handed to the live context on the next call.
#[derive(Debug, Default)]
pub struct ContextCache {
    current: Option<SharedContext>,
    pending: Vec<ChangedContentItem>,
    generation: u64,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Number of contexts created so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Items waiting for the next [`get_or_create`](Self::get_or_create).
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn queue_content<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = ChangedContentItem>,
    {
        self.pending.extend(items);
    }

    /// Discard the current context. The next call to
    /// [`get_or_create`](Self::get_or_create) rebuilds from scratch.
    pub fn invalidate(&mut self) {
        if self.current.take().is_some() {
            debug!(generation = self.generation, "context invalidated");
        }
        self.pending.clear();
    }

    pub fn get_or_create(
        &mut self,
        recipe: ContextRecipe<'_>,
        tracker: &mut DependencyTracker,
        watcher: &mut Option<Box<dyn FileWatcher>>,
    ) -> Result<SharedContext> {
        if let Some(current) = &self.current {
            let pending = std::mem::take(&mut self.pending);
            if !pending.is_empty() {
                debug!(items = pending.len(), "flushing queued content into context");
                lock(current)?.push_content(pending);
            }
            return Ok(Arc::clone(current));
        }

        let config_path = locate_config(recipe.fs, recipe.explicit_config, recipe.search_from);

        let evicted = tracker.evict_config_cache();
        debug!(evicted, "evicted cached config modules");

        let loaded = match &config_path {
            Some(path) => load_config_graph(tracker.module_cache_mut(), recipe.fs, path)?,
            None => LoadedConfig::defaults_only(),
        };
        let mut resolved = recipe.resolver.resolve(&loaded, &default_config()?)?;
        if let Some(patterns) = recipe.content_override {
            resolved.content = ContentConfig {
                patterns: patterns.to_vec(),
                raw: Vec::new(),
            };
        }
        let resolved = Arc::new(resolved);

        let context = recipe.factory.create_context(Arc::clone(&resolved), Vec::new())?;

        tracker.record_config_dependencies(loaded.dependencies());
        tracker.reset_context_dependencies();

        let patterns = ContentPatterns::compile(&resolved.content.patterns)?;
        let files = expand_content_paths(recipe.fs, tracker.root(), &patterns)?;
        tracker.set_content(patterns, files);

        if let Some(watcher) = watcher.as_mut() {
            watcher.refresh_watched_files(&tracker.watch_set())?;
        }

        let items = read_all(recipe.fs, tracker.content_files(), &resolved.content.raw)?;
        let shared: SharedContext = Arc::new(Mutex::new(context));
        lock(&shared)?.push_content(items);

        self.pending.clear();
        self.generation += 1;
        info!(
            generation = self.generation,
            config = ?describe_source(config_path.as_deref()),
            content_files = tracker.content_files().len(),
            raw = resolved.content.raw.len(),
            "created build context"
        );

        self.current = Some(Arc::clone(&shared));
        Ok(shared)
    }
}

fn lock(context: &SharedContext) -> Result<std::sync::MutexGuard<'_, crate::context::BuildContext>> {
    context
        .lock()
        .map_err(|_| StyleError::Pipeline("build context mutex poisoned".to_string()))
}
