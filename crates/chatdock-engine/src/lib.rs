//! chatdock-engine: Headless core of the chatdock widget
//!
//! This crate provides everything except the terminal front end:
//! - The conversation session state machine and its effects
//! - Wire types for the question-answering service
//! - HTTP and scripted backends
//! - Configuration and transcript export

pub mod backend;
pub mod clock;
pub mod config;
pub mod conversation;
pub mod message;
pub mod protocol;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use backend::{BackendError, ChatBackend, HttpBackend, HttpOptions, ScriptedBackend};
pub use clock::{format_clock_time, Clock, FixedClock, SteppingClock, SystemClock};
pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH};
pub use conversation::Conversation;
pub use message::{Message, Origin};
pub use protocol::{ChatError, ChatRequest, ChatResponse, HealthStatus, DEFAULT_SESSION_ID};
pub use session::{
    fallback_text, Effect, Session, SessionOptions, CONNECTIVITY_FALLBACK, DEFAULT_GREETING,
    GENERIC_FALLBACK, SERVICE_FALLBACK,
};
pub use transcript::TranscriptError;

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
