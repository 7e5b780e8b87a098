//! Screen definitions for the chatdock TUI.

pub mod chat_panel;
pub mod dock;

use crate::app::App;
use ratatui::{buffer::Buffer, layout::Rect};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Render whichever screen matches the app's open flag.
pub fn render_app(app: &App, area: Rect, buf: &mut Buffer) {
    if app.open {
        chat_panel::ChatPanelScreen.render(app, area, buf);
    } else {
        dock::DockScreen.render(app, area, buf);
    }
}
