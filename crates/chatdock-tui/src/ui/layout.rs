//! Layout helpers for the chatdock TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Largest chat panel, in cells.
pub const PANEL_WIDTH: u16 = 56;
pub const PANEL_HEIGHT: u16 = 22;

/// Launcher button size.
pub const LAUNCHER_WIDTH: u16 = 12;
pub const LAUNCHER_HEIGHT: u16 = 3;

/// Height of the entry row inside the panel, borders included.
pub const INPUT_HEIGHT: u16 = 3;

/// Create the main layout with status bar at bottom.
pub fn main_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// A rect of at most `width` x `height` anchored to the bottom-right corner
/// of `area`, leaving a one-cell margin where there is room.
pub fn bottom_right(width: u16, height: u16, area: Rect) -> Rect {
    let margin_x = u16::from(area.width > width + 1);
    let margin_y = u16::from(area.height > height);
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width - width - margin_x;
    let y = area.y + area.height - height - margin_y;
    Rect::new(x, y, width, height)
}

/// Where the chat panel sits within the content area.
pub fn panel_rect(content: Rect) -> Rect {
    bottom_right(PANEL_WIDTH, PANEL_HEIGHT, content)
}

/// Where the launcher sits within the content area.
pub fn launcher_rect(content: Rect) -> Rect {
    bottom_right(LAUNCHER_WIDTH, LAUNCHER_HEIGHT, content)
}

/// Split the panel interior into transcript and entry row.
pub fn panel_layout(inner: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(INPUT_HEIGHT)])
        .split(inner);
    (chunks[0], chunks[1])
}

/// Split the entry row into the text field and the submit affordance.
pub fn input_row_layout(row: Rect, button_width: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(button_width + 1)])
        .split(row);
    (chunks[0], chunks[1])
}

/// Whether a terminal cell falls inside `rect`.
pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}
