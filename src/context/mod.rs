// src/context/mod.rs

//! The build context: an expensive, config-derived design system plus the
//! queue of content waiting to be scanned by the next pipeline run.
//!
//! - [`cache`] owns the single active context and decides between a full
//!   rebuild and an incremental refresh.
//! - [`engine`] is the built-in design system (`UtilityEngine`).
//! - [`candidates`] extracts class candidates from template text.

pub mod cache;
pub mod candidates;
pub mod engine;

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::ResolvedConfig;
use crate::css::Node;
use crate::errors::Result;
use crate::types::Layer;

pub use cache::{ContextCache, ContextRecipe};
pub use engine::{UtilityContextFactory, UtilityEngine};

/// Newly available template text plus the extension hint for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedContentItem {
    pub text: String,
    pub extension: String,
}

impl ChangedContentItem {
    pub fn new(text: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extension: extension.into(),
        }
    }
}

/// Turns scanned content into generated CSS.
pub trait DesignSystem: Send + Debug {
    /// Absorb one content item; returns how many new candidates it added.
    fn scan(&mut self, item: &ChangedContentItem) -> usize;

    /// Generate the nodes for one layer from everything scanned so far.
    fn generate(&self, layer: Layer) -> Vec<Node>;
}

/// Builds a [`BuildContext`] from resolved configuration.
pub trait ContextFactory: Send + Sync + Debug {
    fn create_context(
        &self,
        config: Arc<ResolvedConfig>,
        changed_content: Vec<ChangedContentItem>,
    ) -> Result<BuildContext>;
}

/// Handle shared between the context cache and the generation stage.
pub type SharedContext = Arc<Mutex<BuildContext>>;

#[derive(Debug)]
pub struct BuildContext {
    config: Arc<ResolvedConfig>,
    changed_content: Vec<ChangedContentItem>,
    design: Box<dyn DesignSystem>,
}

impl BuildContext {
    pub fn new(
        config: Arc<ResolvedConfig>,
        changed_content: Vec<ChangedContentItem>,
        design: Box<dyn DesignSystem>,
    ) -> Self {
        Self {
            config,
            changed_content,
            design,
        }
    }

    pub fn config(&self) -> &Arc<ResolvedConfig> {
        &self.config
    }

    /// Config file the context was built from; `None` for built-in defaults.
    pub fn config_path(&self) -> Option<&Path> {
        self.config.source.as_deref()
    }

    /// Content queued but not yet scanned.
    pub fn pending_content(&self) -> &[ChangedContentItem] {
        &self.changed_content
    }

    pub fn push_content<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = ChangedContentItem>,
    {
        self.changed_content.extend(items);
    }

    /// Scan and drop every queued item. Returns the number of new candidates.
    pub fn flush_content(&mut self) -> usize {
        let items = std::mem::take(&mut self.changed_content);
        let mut added = 0;
        for item in &items {
            added += self.design.scan(item);
        }
        debug!(items = items.len(), added, "scanned queued content");
        added
    }

    pub fn generate(&self, layer: Layer) -> Vec<Node> {
        self.design.generate(layer)
    }
}

/// Path of the config file behind a context, for logging.
pub fn describe_source(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("<built-in defaults>"))
}
