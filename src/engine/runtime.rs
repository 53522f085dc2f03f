// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::engine::core::coalesce;
use crate::engine::coordinator::WatchCoordinator;
use crate::engine::session::Session;
use crate::engine::RuntimeEvent;
use crate::errors::Result;

/// Async shell around the [`WatchCoordinator`].
///
/// Events are handled strictly one at a time, so at most one build is in
/// flight. Batches that arrive while a build runs wait in the channel and
/// are coalesced into a single batch for the next build.
pub struct Runtime {
    session: Session,
    coordinator: WatchCoordinator,
    event_rx: mpsc::Receiver<RuntimeEvent>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(session: Session, event_rx: mpsc::Receiver<RuntimeEvent>) -> Self {
        Self {
            session,
            coordinator: WatchCoordinator::new(),
            event_rx,
        }
    }

    /// Main event loop; returns on shutdown or when every sender is gone.
    pub async fn run(mut self) -> Result<Session> {
        info!("stylewatch runtime started");

        while let Some(event) = self.event_rx.recv().await {
            let RuntimeEvent::ChangeBatch(first) = event else {
                info!("shutdown requested; stopping runtime");
                break;
            };

            let mut batches = vec![first];
            let mut shutdown = false;
            while let Ok(next) = self.event_rx.try_recv() {
                match next {
                    RuntimeEvent::ChangeBatch(files) => batches.push(files),
                    RuntimeEvent::ShutdownRequested => {
                        shutdown = true;
                        break;
                    }
                }
            }
            if shutdown {
                info!("shutdown requested; stopping runtime");
                break;
            }

            let merged = batches.len();
            let batch = coalesce(batches);
            debug!(batches = merged, files = batch.len(), "handling change batch");
            eprintln!("Rebuilding...");

            if let Err(err) = self.coordinator.on_batch(&mut self.session, &batch).await {
                error!("rebuild failed: {err:?}");
                eprintln!("{err}");
            }
        }

        info!(builds = self.coordinator.builds(), "runtime exiting");
        Ok(self.session)
    }
}
