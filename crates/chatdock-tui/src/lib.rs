//! chatdock-tui: Terminal chat widget for a question-answering backend
//!
//! This crate provides the TUI layer for chatdock, including:
//! - The host page with a launcher docked bottom-right
//! - The chat panel (transcript, entry field, send button)
//! - Background dispatch of chat requests
//! - Headless mode for testing and automation

mod app;
mod dispatch;
mod event;
pub mod headless;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod text;
mod ui;

pub use app::{App, Focus};
pub use chatdock_engine;
pub use dispatch::RequestDispatcher;
pub use event::{Action, Event, EventHandler, KeyContext};

use chatdock_engine::{ChatBackend, Config, HttpBackend};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture, MouseButton, MouseEvent, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, stdout};
use ui::layout::{contains, launcher_rect, main_layout};

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Options for an interactive session.
#[derive(Debug, Clone, Default)]
pub struct TuiOptions {
    /// Start with the chat panel already open.
    pub open: bool,
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop against the configured HTTP
/// endpoint, and restores the terminal on exit.
pub async fn run_tui(
    config: &Config,
    options: TuiOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    // Fail on a bad endpoint before touching the terminal.
    let backend = HttpBackend::new(&config.endpoint, config.http_options())?;

    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let mut app = App::new(config);
    if let Ok(dir) = std::env::current_dir() {
        app.export_dir = dir;
    }
    app.set_open(options.open);

    // Create event handler (4 Hz tick rate = 250ms)
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events, backend).await;

    terminal.show_cursor()?;

    result
}

async fn run_loop<B>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    backend: B,
) -> Result<(), Box<dyn std::error::Error>>
where
    B: ChatBackend + Clone + 'static,
{
    let mut dispatcher = RequestDispatcher::new(backend);

    loop {
        terminal.draw(|frame| {
            app.viewport = frame.area();
            screens::render_app(app, frame.area(), frame.buffer_mut());
        })?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::Tick => app.tick(),
                Event::Resize(_, _) => {
                    // Terminal will handle resize automatically
                }
            }
        }

        dispatcher.spawn_queued(app);
        dispatcher.collect_finished(app).await;

        if app.should_quit {
            dispatcher.abort_all();
            break;
        }
    }

    Ok(())
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if !app.open => {
            if launcher_hit(app.viewport, mouse.column, mouse.row) {
                app.handle_action(Action::Open);
            }
        }
        MouseEventKind::ScrollUp if app.open => app.handle_action(Action::ScrollUp),
        MouseEventKind::ScrollDown if app.open => app.handle_action(Action::ScrollDown),
        _ => {}
    }
}

fn launcher_hit(viewport: Rect, column: u16, row: u16) -> bool {
    let (main_area, _) = main_layout(viewport);
    contains(launcher_rect(main_area), column, row)
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_app;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[test]
    fn test_click_on_launcher_opens_panel() {
        let mut app = create_test_app();
        let (main_area, _) = main_layout(app.viewport);
        let target = launcher_rect(main_area);

        handle_mouse(
            &mut app,
            mouse(MouseEventKind::Down(MouseButton::Left), target.x + 1, target.y + 1),
        );
        assert!(app.open);
        assert!(app.session.is_some());
    }

    #[test]
    fn test_click_elsewhere_does_nothing() {
        let mut app = create_test_app();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 0, 0));
        assert!(!app.open);
        assert!(app.session.is_none());
    }

    #[test]
    fn test_wheel_ignored_while_closed() {
        let mut app = create_test_app();
        handle_mouse(&mut app, mouse(MouseEventKind::ScrollUp, 10, 10));
        assert_eq!(app.transcript_scroll, 0);
    }
}
