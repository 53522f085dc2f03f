// src/engine/session.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigResolver, LayeredResolver};
use crate::context::{
    ChangedContentItem, ContextCache, ContextFactory, ContextRecipe, SharedContext,
    UtilityContextFactory,
};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::{AssembleFlags, PipelineBuilder, PipelineMode};
use crate::watch::path_utils::map_path;
use crate::watch::{DependencyTracker, FileWatcher};

/// Where the entry stylesheet comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// `--input -`
    Stdin,
    File(PathBuf),
    /// No `--input`: the three layer directives.
    Default,
}

impl InputSource {
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("-") => InputSource::Stdin,
            Some(path) => InputSource::File(PathBuf::from(path)),
            None => InputSource::Default,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            InputSource::File(path) => Some(path),
            InputSource::Stdin | InputSource::Default => None,
        }
    }
}

/// Per-invocation build options.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Working directory; content patterns and relative paths resolve here.
    pub root: PathBuf,
    pub input: InputSource,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub content: Option<Vec<String>>,
    pub minify: bool,
    pub autoprefixer: bool,
    pub pipeline: PipelineMode,
}

impl BuildOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            input: InputSource::Default,
            output: None,
            config: None,
            content: None,
            minify: false,
            autoprefixer: true,
            pipeline: PipelineMode::BuiltIn,
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

/// State owned by one invocation, passed by `&mut` to the build executor
/// and the watch coordinator.
#[derive(Debug)]
pub struct Session {
    options: BuildOptions,
    fs: Arc<dyn FileSystem>,
    tracker: DependencyTracker,
    cache: ContextCache,
    resolver: Box<dyn ConfigResolver>,
    factory: Box<dyn ContextFactory>,
    pipeline: PipelineBuilder,
    watcher: Option<Box<dyn FileWatcher>>,
}

impl Session {
    pub fn new(mut options: BuildOptions, fs: Arc<dyn FileSystem>) -> Self {
        if let InputSource::File(path) = &options.input {
            options.input = InputSource::File(options.absolute(path));
        }
        options.output = options.output.as_deref().map(|p| options.absolute(p));
        options.config = options.config.as_deref().map(|p| options.absolute(p));

        let mut tracker = DependencyTracker::new(Arc::clone(&fs), &options.root);
        if let Some(input) = options.input.path() {
            tracker.pin(input);
        }
        if let Some(output) = &options.output {
            tracker.ignore(output);
            tracker.ignore(&map_path(output));
        }

        let pipeline = PipelineBuilder::new(options.pipeline.clone(), Arc::clone(&fs), &options.root);

        Self {
            options,
            fs,
            tracker,
            cache: ContextCache::new(),
            resolver: Box::new(LayeredResolver),
            factory: Box::new(UtilityContextFactory),
            pipeline,
            watcher: None,
        }
    }

    pub fn with_factory(mut self, factory: Box<dyn ContextFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_resolver(mut self, resolver: Box<dyn ConfigResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn set_watcher(&mut self, watcher: Box<dyn FileWatcher>) {
        self.watcher = Some(watcher);
    }

    pub fn has_watcher(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn tracker(&self) -> &DependencyTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DependencyTracker {
        &mut self.tracker
    }

    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    pub fn pipeline(&self) -> &PipelineBuilder {
        &self.pipeline
    }

    pub fn assemble_flags(&self) -> AssembleFlags {
        AssembleFlags {
            minify: self.options.minify,
            autoprefixer: self.options.autoprefixer,
        }
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    pub fn queue_content<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = ChangedContentItem>,
    {
        self.cache.queue_content(items);
    }

    /// The live context, creating it if there is none.
    pub fn context(&mut self) -> Result<SharedContext> {
        let search_from = self
            .options
            .input
            .path()
            .and_then(Path::parent)
            .unwrap_or(self.options.root.as_path());

        let recipe = ContextRecipe {
            fs: self.fs.as_ref(),
            explicit_config: self.options.config.as_deref(),
            search_from,
            content_override: self.options.content.as_deref(),
            resolver: self.resolver.as_ref(),
            factory: self.factory.as_ref(),
        };
        self.cache
            .get_or_create(recipe, &mut self.tracker, &mut self.watcher)
    }

    /// Push the tracker's current watch set to the watcher, if any.
    pub fn refresh_watcher(&mut self) -> Result<()> {
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.refresh_watched_files(&self.tracker.watch_set())?;
        }
        Ok(())
    }
}
