// src/engine/mod.rs

//! Build and watch orchestration.
//!
//! - [`session`] holds everything one invocation owns.
//! - [`build`] is the build executor: read input, run the pipeline, write
//!   output.
//! - [`core`] is the pure part of the watch coordinator: batch planning and
//!   coalescing, with no IO.
//! - [`coordinator`] applies a plan to the session and triggers a build.
//! - [`runtime`] is the async shell that feeds watcher batches to the
//!   coordinator.

pub mod build;
pub mod coordinator;
pub mod core;
pub mod runtime;
pub mod session;

use crate::watch::ChangedFile;

/// Events flowing into the runtime from the watcher and signal handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// One debounced batch of changed files.
    ChangeBatch(Vec<ChangedFile>),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub use build::{build, BuildReport, DEFAULT_INPUT};
pub use coordinator::WatchCoordinator;
pub use core::{coalesce, plan_batch, BatchPlan, CoordinatorState};
pub use runtime::Runtime;
pub use session::{BuildOptions, InputSource, Session};
