//! Status bar widget.

use crate::text::{truncate_to_width, visual_width};
use crate::ui::theme::{Palette, Styles};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

/// A key hint for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// One-line bar at the bottom of the screen: a mode badge, key hints, and a
/// right-aligned message.
#[derive(Debug, Clone)]
pub struct StatusBar<'a> {
    mode: &'a str,
    hints: Vec<KeyHint>,
    right_text: Option<&'a str>,
    right_style: Style,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar.
    pub fn new(mode: &'a str) -> Self {
        Self {
            mode,
            hints: Vec::new(),
            right_text: None,
            right_style: Styles::status_bar(),
        }
    }

    /// Add key hints.
    #[must_use]
    pub fn hints(mut self, hints: Vec<KeyHint>) -> Self {
        self.hints = hints;
        self
    }

    /// Set right-aligned text.
    #[must_use]
    pub fn right(mut self, text: &'a str) -> Self {
        self.right_text = Some(text);
        self
    }

    /// Style for the right-aligned text.
    #[must_use]
    pub fn right_style(mut self, style: Style) -> Self {
        self.right_style = style.bg(Palette::STATUS_BG);
        self
    }
}

impl Widget for StatusBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 1 {
            return;
        }

        for x in area.x..area.x.saturating_add(area.width) {
            buf[(x, area.y)].set_char(' ').set_bg(Palette::STATUS_BG);
        }

        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.mode),
                Styles::default().bg(Palette::ACCENT).fg(Palette::BG),
            ),
            Span::styled(" ", Styles::status_bar()),
        ];
        for hint in &self.hints {
            spans.push(Span::styled(format!(" {} ", hint.key), Styles::key_hint()));
            spans.push(Span::styled(
                format!(" {} ", hint.label),
                Styles::key_label(),
            ));
        }

        let left_line = Line::from(spans);
        let left_width = left_line.width();
        buf.set_line(area.x, area.y, &left_line, area.width);

        // The right text may overwrite hints but never the mode badge.
        if let Some(text) = self.right_text {
            let badge = visual_width(self.mode) + 3;
            let room = usize::from(area.width).saturating_sub(badge + 1);
            if room > 3 {
                let text = truncate_to_width(text, room);
                let width = visual_width(&text) as u16;
                let x = area.x + area.width - width - 1;
                if usize::from(x - area.x) < left_width {
                    // Blank out the hints underneath before drawing over them.
                    for cx in x.saturating_sub(1)..area.x + area.width {
                        buf[(cx, area.y)].set_char(' ').set_style(Styles::status_bar());
                    }
                }
                buf.set_string(x, area.y, &text, self.right_style);
            }
        }
    }
}
