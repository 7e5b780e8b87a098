//! Event handling for the chatdock TUI.

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// A tick event for UI updates.
    Tick,
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Event handler that runs in a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        // crossterm polling blocks, so it gets its own thread.
        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let event = match evt {
                            CrosstermEvent::Key(key) if key.kind == event::KeyEventKind::Press => {
                                Some(Event::Key(key))
                            }
                            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                            _ => None,
                        };
                        if let Some(e) = event {
                            if tx_clone.send(e).is_err() {
                                break;
                            }
                        }
                    }
                } else if tx_clone.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Get the next event, blocking until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Key action that can be performed in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Activate the launcher.
    Open,
    /// Hide the chat panel.
    Close,
    Submit,
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    HistoryPrev,
    HistoryNext,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    /// Move focus from the input to the transcript.
    FocusTranscript,
    /// Move focus back to the input.
    FocusInput,
    Export,
    None,
}

/// Which part of the UI receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    /// Panel hidden; only the launcher is visible.
    Closed,
    /// Panel open, entry field focused. `history_keys` routes Up/Down to
    /// history instead of scrolling.
    Input { history_keys: bool },
    /// Panel open, transcript focused.
    Transcript,
}

/// Convert a key event to an action based on context.
pub fn key_to_action(key: KeyEvent, context: KeyContext) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match context {
        KeyContext::Closed => match key.code {
            KeyCode::Enter | KeyCode::Char('c') => Action::Open,
            KeyCode::Char('q') => Action::Quit,
            _ => Action::None,
        },
        KeyContext::Input { history_keys } => {
            if ctrl {
                return match key.code {
                    KeyCode::Char('e') => Action::Export,
                    _ => Action::None,
                };
            }
            match key.code {
                KeyCode::Esc => Action::Close,
                KeyCode::Tab => Action::FocusTranscript,
                KeyCode::Enter => Action::Submit,
                KeyCode::Char(c) => Action::Insert(c),
                KeyCode::Backspace => Action::Backspace,
                KeyCode::Delete => Action::Delete,
                KeyCode::Left => Action::Left,
                KeyCode::Right => Action::Right,
                KeyCode::Home => Action::Home,
                KeyCode::End => Action::End,
                KeyCode::Up if history_keys => Action::HistoryPrev,
                KeyCode::Down if history_keys => Action::HistoryNext,
                KeyCode::Up => Action::ScrollUp,
                KeyCode::Down => Action::ScrollDown,
                KeyCode::PageUp => Action::PageUp,
                KeyCode::PageDown => Action::PageDown,
                _ => Action::None,
            }
        }
        KeyContext::Transcript => {
            if ctrl {
                return match key.code {
                    KeyCode::Char('e') => Action::Export,
                    _ => Action::None,
                };
            }
            match key.code {
                KeyCode::Esc => Action::Close,
                KeyCode::Tab | KeyCode::Char('i') => Action::FocusInput,
                KeyCode::Up | KeyCode::Char('k') => Action::ScrollUp,
                KeyCode::Down | KeyCode::Char('j') => Action::ScrollDown,
                KeyCode::PageUp => Action::PageUp,
                KeyCode::PageDown => Action::PageDown,
                _ => Action::None,
            }
        }
    }
}
