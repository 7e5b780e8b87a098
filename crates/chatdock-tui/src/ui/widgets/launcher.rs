//! The launcher button that opens the chat panel.

use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

/// Default launcher caption.
pub const LAUNCHER_LABEL: &str = "Chat";

/// A stateless button. Rendering draws it; [`Launcher::activate`] runs the
/// caller's open callback. It owns no state of its own.
#[derive(Debug, Clone, Copy)]
pub struct Launcher<'a> {
    label: &'a str,
}

impl<'a> Launcher<'a> {
    pub fn new(label: &'a str) -> Self {
        Self { label }
    }

    /// Invoke `on_open`. This is the launcher's whole contract.
    pub fn activate<F: FnOnce()>(&self, on_open: F) {
        on_open();
    }
}

impl Default for Launcher<'_> {
    fn default() -> Self {
        Self::new(LAUNCHER_LABEL)
    }
}

impl Widget for Launcher<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Styles::border_active())
            .style(Styles::launcher());
        Paragraph::new(self.label)
            .alignment(Alignment::Center)
            .style(Styles::launcher())
            .block(block)
            .render(area, buf);
    }
}
