// src/engine/core.rs

//! Pure watch-coordinator logic.
//!
//! Decides what a change batch means for the context without touching the
//! filesystem, the pipeline or Tokio, so it can be tested directly against
//! a [`DependencyTracker`].

use std::collections::HashSet;
use std::path::PathBuf;

use crate::types::ChangeClass;
use crate::watch::{ChangedFile, DependencyTracker};

/// Coordinator state. Exactly one build is in flight while `Building`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinatorState {
    #[default]
    Idle,
    Building,
}

/// What to do with one change batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchPlan {
    /// Drop the context. `trigger` is the first file that forced it.
    Invalidate { trigger: PathBuf, class: ChangeClass },
    /// Queue the text of these files into the live context.
    Incremental(Vec<PathBuf>),
}

/// Classify every file in `batch`. A single config or context dependency
/// invalidates the context for the whole batch.
pub fn plan_batch(tracker: &DependencyTracker, batch: &[ChangedFile]) -> BatchPlan {
    let mut content = Vec::with_capacity(batch.len());
    let mut invalidation = None;

    for file in batch {
        let class = tracker.classify(&file.path);
        if class.invalidates_context() {
            invalidation.get_or_insert((file.path.clone(), class));
        } else {
            content.push(file.path.clone());
        }
    }

    match invalidation {
        Some((trigger, class)) => BatchPlan::Invalidate { trigger, class },
        None => BatchPlan::Incremental(content),
    }
}

/// Merge batches that queued up during a build, keeping first-seen order.
pub fn coalesce<I>(batches: I) -> Vec<ChangedFile>
where
    I: IntoIterator<Item = Vec<ChangedFile>>,
{
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|f| seen.insert(f.path.clone()))
        .collect()
}
