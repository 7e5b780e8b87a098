//! Transcript view: the message list inside the chat panel.

use crate::text::wrap_text;
use crate::ui::theme::{spinner, Styles};
use chatdock_engine::{format_clock_time, Message, Origin};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Message bubbles use at most this share of the transcript width.
const BUBBLE_PERCENT: usize = 80;

/// Build the wrapped, aligned lines for `messages` at `width` cells.
///
/// User messages are right-aligned, assistant messages left-aligned. Each
/// message gets an author line with its `HH:MM` time and is followed by a
/// blank separator. A pending request adds an in-progress line at the end.
pub fn transcript_lines(
    messages: &[Message],
    pending: bool,
    tick: usize,
    width: u16,
) -> Vec<Line<'static>> {
    let bubble = (usize::from(width) * BUBBLE_PERCENT / 100).max(10);
    let mut lines = Vec::new();

    for message in messages {
        let time = format_clock_time(message.created_at());
        let (header, style) = match message.origin() {
            Origin::User => (format!("{time}  You"), Styles::user()),
            Origin::Assistant => (format!("Assistant  {time}"), Styles::assistant()),
        };

        let mut block = vec![Line::from(Span::styled(header, style))];
        for row in wrap_text(message.text(), bubble) {
            block.push(Line::from(Span::styled(row, Styles::default())));
        }

        if message.is_user() {
            lines.extend(block.into_iter().map(Line::right_aligned));
        } else {
            lines.extend(block);
        }
        lines.push(Line::from(""));
    }

    if pending {
        lines.push(Line::from(Span::styled(
            format!("{} Thinking...", spinner(tick)),
            Styles::dim(),
        )));
    }

    lines
}

/// First visible line when `total` lines are shown in `height` rows and the
/// view is scrolled `from_bottom` lines up from the latest message.
pub fn scroll_top(total: usize, height: usize, from_bottom: usize) -> usize {
    let max_top = total.saturating_sub(height);
    max_top - from_bottom.min(max_top)
}

/// How far up the view can scroll.
pub fn max_scroll(total: usize, height: usize) -> usize {
    total.saturating_sub(height)
}

/// Renders the transcript, pinned to the latest message unless scrolled.
#[derive(Debug, Clone)]
pub struct TranscriptView<'a> {
    messages: &'a [Message],
    pending: bool,
    tick: usize,
    scroll: usize,
}

impl<'a> TranscriptView<'a> {
    pub fn new(messages: &'a [Message]) -> Self {
        Self {
            messages,
            pending: false,
            tick: 0,
            scroll: 0,
        }
    }

    /// Show the in-progress indicator, animated by `tick`.
    #[must_use]
    pub fn pending(mut self, pending: bool, tick: usize) -> Self {
        self.pending = pending;
        self.tick = tick;
        self
    }

    /// Lines scrolled up from the bottom.
    #[must_use]
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

impl Widget for TranscriptView<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let lines = transcript_lines(self.messages, self.pending, self.tick, area.width);
        let top = scroll_top(lines.len(), usize::from(area.height), self.scroll);
        Paragraph::new(lines)
            .style(Styles::default())
            .scroll((top.min(usize::from(u16::MAX)) as u16, 0))
            .render(area, buf);
    }
}
