//! Wire types for the question-answering service.
//!
//! One request shape, one response shape:
//!
//! ```text
//! POST /chat   {"question": "...", "session_id": "default"}
//! 200 OK       {"answer": "..."}
//! ```
//!
//! Anything else (non-2xx, unreadable body, missing `answer`) is a
//! [`ChatError`].

use serde::{Deserialize, Serialize};

/// Session identifier sent with every question.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Client → server: a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub question: String,
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            session_id: session_id.into(),
        }
    }
}

/// Server → client: the answer. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

impl ChatResponse {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

/// Server → client: health probe result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Parse a success body into a [`ChatResponse`].
pub fn parse_answer(body: &str) -> Result<ChatResponse, ChatError> {
    serde_json::from_str(body).map_err(|e| ChatError::Malformed(e.to_string()))
}

/// Why a question did not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// The request never reached the server, or no response came back.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("Server error: {status}")]
    Server { status: u16, body: String },

    /// The body was not JSON or had no string `answer`.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The request task ended without producing an outcome.
    #[error("Request aborted: {0}")]
    Aborted(String),
}
