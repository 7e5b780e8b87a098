//! A [`Session`] wired to a [`ChatBackend`].
//!
//! [`Conversation::submit`] runs the whole round trip inline: it feeds the
//! question to the session, executes the resulting `Send` effect against the
//! backend, and resolves the session with the outcome. Callers that need the
//! request to run concurrently (the TUI) drive `Session` directly instead.

use crate::backend::ChatBackend;
use crate::protocol::ChatRequest;
use crate::session::{Effect, Session};
use tracing::debug;

/// Session plus the backend that answers it.
#[derive(Debug)]
pub struct Conversation<B> {
    session: Session,
    backend: B,
}

impl<B: ChatBackend> Conversation<B> {
    pub fn new(session: Session, backend: B) -> Self {
        Self { session, backend }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Submit `text` and wait for the reply.
    ///
    /// Returns the view effects produced along the way, with `Send` effects
    /// already carried out. A rejected submit returns no effects and performs
    /// no request.
    pub async fn submit(&mut self, text: &str) -> Vec<Effect> {
        let mut view_effects = Vec::new();
        let mut outbound: Vec<ChatRequest> = Vec::new();

        for effect in self.session.submit(text) {
            match effect {
                Effect::Send(request) => outbound.push(request),
                other => view_effects.push(other),
            }
        }

        for request in outbound {
            debug!(question = %request.question, "Executing send effect");
            let outcome = self.backend.ask(request).await;
            view_effects.extend(self.session.resolve(outcome));
        }

        view_effects
    }

    /// Hand back the session, e.g. for export.
    pub fn into_session(self) -> Session {
        self.session
    }
}
