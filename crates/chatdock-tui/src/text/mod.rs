//! Text layout utilities.
//!
//! - [`wrap_text`] - Word-wrap message text for the transcript
//! - [`visual_width`], [`truncate_to_width`] - Unicode-aware width helpers

mod width;
mod wrap;

pub use width::{tail_to_width, truncate_to_width, visual_width};
pub use wrap::wrap_text;
