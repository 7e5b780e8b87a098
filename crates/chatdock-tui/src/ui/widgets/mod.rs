//! Reusable widgets for the chatdock TUI.

pub mod launcher;
pub mod status_bar;
pub mod text_input;
pub mod transcript;

pub use launcher::{Launcher, LAUNCHER_LABEL};
pub use status_bar::{KeyHint, StatusBar};
pub use text_input::TextInputState;
pub use transcript::TranscriptView;
