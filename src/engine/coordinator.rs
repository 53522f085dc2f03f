// src/engine/coordinator.rs

use tracing::{debug, info, warn};

use crate::context::ChangedContentItem;
use crate::engine::build::{build, BuildReport};
use crate::engine::core::{plan_batch, BatchPlan, CoordinatorState};
use crate::engine::session::Session;
use crate::errors::Result;
use crate::watch::{read_item, ChangedFile};

/// Reacts to change batches: invalidate or queue content, then build.
#[derive(Debug, Default)]
pub struct WatchCoordinator {
    state: CoordinatorState,
    builds: u64,
}

impl WatchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Builds triggered through this coordinator.
    pub fn builds(&self) -> u64 {
        self.builds
    }

    pub async fn on_batch(&mut self, session: &mut Session, batch: &[ChangedFile]) -> Result<BuildReport> {
        self.state = CoordinatorState::Building;

        match plan_batch(session.tracker(), batch) {
            BatchPlan::Invalidate { trigger, class } => {
                info!(file = ?trigger, ?class, "dependency changed; rebuilding context");
                session.invalidate();
            }
            BatchPlan::Incremental(paths) => {
                let mut items: Vec<ChangedContentItem> = Vec::with_capacity(paths.len());
                for path in &paths {
                    match read_item(session.fs().as_ref(), path) {
                        Ok(item) => items.push(item),
                        // Deleted or unreadable between the event and now.
                        Err(err) => warn!(file = ?path, "skipping changed file: {err:#}"),
                    }
                }
                debug!(items = items.len(), "queued changed content");
                session.queue_content(items);
            }
        }

        let result = build(session).await;
        self.state = CoordinatorState::Idle;
        self.builds += 1;
        result
    }
}
