//! View dispatcher - renders the active view after every transition.
//!
//! Rendering is driven purely by tag membership. The dispatcher never looks
//! at the URL; tags are the abstraction boundary between routing and
//! presentation.

use crate::reducer::{AppEnvironment, AppReducer};
use crate::types::{AppAction, AppState, ViewTag};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use waymark_runtime::Store;

/// Rendering seam consumed by the dispatcher
///
/// Implementations receive the active tags and a read-only state snapshot;
/// they emit nothing back except user intents forwarded through the store.
pub trait Renderer: Send + Sync {
    /// Draw the view for the given tags and state
    fn render(&self, tags: &[ViewTag], state: &AppState);
}

/// Subscribes to store transitions and re-renders after each one
///
/// The dispatcher observes the action broadcast rather than polling state:
/// every processed action marks a completed transition, at which point the
/// post-transition state is snapshot and handed to the renderer.
pub struct ViewDispatcher {
    task: JoinHandle<()>,
}

impl ViewDispatcher {
    /// Spawn the dispatcher over the store's action broadcast
    pub fn spawn(
        store: Store<AppState, AppAction, AppEnvironment, AppReducer>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let mut actions = store.subscribe_actions();

        let task = tokio::spawn(async move {
            loop {
                match actions.recv().await {
                    Ok(action) => {
                        tracing::trace!(kind = action.kind(), "transition observed");

                        let snapshot = store.state(Clone::clone).await;
                        renderer.render(snapshot.tags(), &snapshot);
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Dropped transitions only cost intermediate frames;
                        // the next render uses current state anyway.
                        tracing::warn!(skipped, "view dispatcher lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!("view dispatcher finished");
        });

        Self { task }
    }

    /// Tear down the dispatcher task
    pub fn shutdown(self) {
        self.task.abort();
        tracing::debug!("view dispatcher torn down");
    }
}
