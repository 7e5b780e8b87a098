//! Test utilities for chatdock-tui rendering tests.
//!
//! Helpers for building apps with deterministic clocks, rendering screens
//! into a buffer, and flattening buffers to strings for assertions.

use crate::app::App;
use crate::screens::Screen as ScreenTrait;
use chatdock_engine::{Config, SteppingClock};
use chrono::{Duration, TimeZone, Utc};
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};
use std::sync::Arc;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test terminal with the default dimensions (80x24).
pub fn create_test_terminal() -> Terminal<TestBackend> {
    create_test_terminal_sized(TEST_WIDTH, TEST_HEIGHT)
}

/// Create a test terminal with custom dimensions.
pub fn create_test_terminal_sized(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Create a closed app with default config and a clock that advances one
/// minute per reading.
pub fn create_test_app() -> App {
    create_test_app_with_config(&Config::default())
}

/// Create a closed app from `config` with the stepping test clock.
pub fn create_test_app_with_config(config: &Config) -> App {
    let clock = SteppingClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        Duration::minutes(1),
    );
    let mut app = App::with_clock(config, Arc::new(clock));
    app.viewport = Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT);
    app
}

/// Convert a buffer to a string representation for assertions.
///
/// Trailing whitespace is trimmed from each row.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            let cell = buffer.cell((x, y)).unwrap();
            result.push_str(cell.symbol());
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}

/// Render a screen to a buffer and return it as a string.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    render_screen_to_string_sized(screen, app, TEST_WIDTH, TEST_HEIGHT)
}

/// Render a screen to a buffer and return it as a string with custom dimensions.
pub fn render_screen_to_string_sized<S: ScreenTrait>(
    screen: &S,
    app: &App,
    width: u16,
    height: u16,
) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::chat_panel::ChatPanelScreen;
    use crate::event::Action;

    #[test]
    fn test_create_test_terminal() {
        let terminal = create_test_terminal();
        let size = terminal.size().unwrap();
        assert_eq!(size.width, TEST_WIDTH);
        assert_eq!(size.height, TEST_HEIGHT);
    }

    #[test]
    fn test_create_test_app() {
        let app = create_test_app();
        assert!(!app.open);
        assert_eq!(app.title, "Insurellm AI Chatbot");
    }

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", ratatui::style::Style::default());
        buffer.set_string(0, 1, "World", ratatui::style::Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld\n");
    }

    #[test]
    fn test_small_terminal_does_not_panic() {
        let mut app = create_test_app();
        app.handle_action(Action::Open);
        let screen = render_screen_to_string_sized(&ChatPanelScreen, &app, 20, 6);
        assert!(!screen.is_empty());
    }
}
