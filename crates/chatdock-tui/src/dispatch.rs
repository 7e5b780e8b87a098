//! Runs queued chat requests as background tasks.
//!
//! Each request becomes a `tokio::spawn`ed task. The run loop polls the
//! handles every iteration without blocking and feeds finished outcomes back
//! into the [`App`]. A task that panics or is cancelled still settles the
//! session, with an aborted error.

use crate::app::App;
use chatdock_engine::{ChatBackend, ChatError, ChatResponse};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type ChatTask = JoinHandle<Result<ChatResponse, ChatError>>;

/// Owns the backend and the in-flight request tasks.
pub struct RequestDispatcher<B> {
    backend: B,
    handles: Vec<ChatTask>,
}

impl<B> RequestDispatcher<B>
where
    B: ChatBackend + Clone + 'static,
{
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            handles: Vec::new(),
        }
    }

    /// Spawn a task for every request the app has queued.
    pub fn spawn_queued(&mut self, app: &mut App) {
        for request in app.take_requests() {
            debug!(question = %request.question, "Spawning chat request");
            let backend = self.backend.clone();
            let handle = tokio::spawn(async move { backend.ask(request).await });
            self.handles.push(handle);
        }
    }

    /// Deliver the outcomes of finished tasks, oldest first.
    pub async fn collect_finished(&mut self, app: &mut App) {
        let mut completed = Vec::new();
        for (i, handle) in self.handles.iter().enumerate() {
            if handle.is_finished() {
                completed.push(i);
            }
        }
        // Remove from the back so earlier indices stay valid, then settle in
        // submission order.
        let mut finished = Vec::with_capacity(completed.len());
        for i in completed.into_iter().rev() {
            finished.push(self.handles.remove(i));
        }
        for handle in finished.into_iter().rev() {
            let outcome = handle.await.unwrap_or_else(|e| {
                warn!(error = %e, "Chat request task did not complete");
                Err(ChatError::Aborted(e.to_string()))
            });
            app.resolve_request(outcome);
        }
    }

    /// Number of requests still running.
    pub fn in_flight(&self) -> usize {
        self.handles.len()
    }

    /// Abort every running request.
    pub fn abort_all(self) {
        for handle in self.handles {
            handle.abort();
        }
    }
}
