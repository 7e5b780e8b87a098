//! Application state and update logic for the chatdock TUI.
//!
//! [`App`] is the parent container: it owns the open/closed flag and hands
//! every conversation operation to a [`Session`]. Session effects are applied
//! here; `Send` effects are queued for the run loop, which performs the
//! request and reports back through [`App::resolve_request`].

use crate::event::{key_to_action, Action, KeyContext};
use crate::ui::layout::{main_layout, panel_layout, panel_rect};
use crate::ui::widgets::transcript::{max_scroll, transcript_lines};
use crate::ui::widgets::{Launcher, TextInputState};
use chatdock_engine::transcript;
use chatdock_engine::{
    ChatError, ChatRequest, ChatResponse, Clock, Config, Effect, Session, SessionOptions,
    SystemClock,
};
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Rows moved by PageUp/PageDown.
const PAGE_SCROLL: usize = 8;

/// Ticks a notification stays visible (~3 seconds at 4 Hz).
const NOTIFICATION_TICKS: usize = 12;

/// Which part of the open panel receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Transcript,
}

/// Application state.
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the chat panel is visible. Owned here, not by the session.
    pub open: bool,

    /// The conversation, created the first time the panel opens.
    pub session: Option<Session>,

    /// Text input state for the entry field.
    pub input_state: TextInputState,

    /// Keyboard focus inside the panel.
    pub focus: Focus,

    /// Lines the transcript is scrolled up from the latest message.
    pub transcript_scroll: usize,

    /// Tick counter for animations.
    pub tick: usize,

    /// Notification message (displayed temporarily, cleared after some ticks).
    pub notification: Option<String>,

    /// Whether the notification reports a failure.
    pub notification_is_error: bool,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,

    /// Panel title.
    pub title: String,

    /// Entry field placeholder.
    pub placeholder: String,

    /// Chat endpoint, for display.
    pub endpoint: String,

    /// Last known terminal size, used to bound scrolling.
    pub viewport: Rect,

    /// Where transcript exports are written.
    pub export_dir: PathBuf,

    session_options: SessionOptions,
    clock: Arc<dyn Clock>,
    outbox: Vec<ChatRequest>,
}

impl App {
    /// Create a new app instance from configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an app with an explicit time source.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            should_quit: false,
            open: false,
            session: None,
            input_state: TextInputState::new(),
            focus: Focus::Input,
            transcript_scroll: 0,
            tick: 0,
            notification: None,
            notification_is_error: false,
            notification_ttl: 0,
            title: config.title.clone(),
            placeholder: config.placeholder.clone(),
            endpoint: config.endpoint.clone(),
            viewport: Rect::new(0, 0, 80, 24),
            export_dir: PathBuf::from("."),
            session_options: config.session_options(),
            clock,
            outbox: Vec::new(),
        }
    }

    /// Whether a request is awaiting its outcome.
    pub fn is_pending(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_pending)
    }

    /// Key routing context for the current state.
    pub fn key_context(&self) -> KeyContext {
        if !self.open {
            return KeyContext::Closed;
        }
        match self.focus {
            Focus::Input => KeyContext::Input {
                history_keys: self.input_state.is_empty()
                    || self.input_state.is_browsing_history(),
            },
            Focus::Transcript => KeyContext::Transcript,
        }
    }

    /// Translate a key press and handle it.
    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = key_to_action(key, self.key_context());
        self.handle_action(action);
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => {
                info!("Quit requested");
                self.should_quit = true;
            }
            Action::Open => {
                if !self.open {
                    let mut open = self.open;
                    Launcher::default().activate(|| open = true);
                    self.set_open(open);
                }
            }
            Action::Close => self.close(),
            Action::Export => self.export_transcript(),
            _ if !self.open => {}
            Action::ScrollUp => self.scroll_up(1),
            Action::ScrollDown => self.scroll_down(1),
            Action::PageUp => self.scroll_up(PAGE_SCROLL),
            Action::PageDown => self.scroll_down(PAGE_SCROLL),
            Action::FocusTranscript => self.focus = Focus::Transcript,
            Action::FocusInput => self.focus = Focus::Input,
            // Everything below edits or submits the entry, which is
            // disabled while a request is pending.
            _ if self.is_pending() => {}
            Action::Submit => self.submit(),
            Action::Insert(c) => self.edit(|input| input.insert(c)),
            Action::Backspace => self.edit(TextInputState::backspace),
            Action::Delete => self.edit(TextInputState::delete),
            Action::Left => self.input_state.move_left(),
            Action::Right => self.input_state.move_right(),
            Action::Home => self.input_state.move_home(),
            Action::End => self.input_state.move_end(),
            Action::HistoryPrev => self.edit(TextInputState::history_prev),
            Action::HistoryNext => self.edit(TextInputState::history_next),
        }
    }

    /// Set the open flag. This is the parent's setter handed to the launcher
    /// and to the session's close effect.
    pub fn set_open(&mut self, open: bool) {
        if open == self.open {
            return;
        }
        self.open = open;
        if open {
            if self.session.is_none() {
                self.session = Some(Session::new(
                    self.session_options.clone(),
                    Arc::clone(&self.clock),
                ));
            }
            // Opening focuses the entry and shows the latest message.
            self.focus = Focus::Input;
            self.transcript_scroll = 0;
            debug!("Chat panel opened");
        } else {
            debug!("Chat panel closed");
        }
    }

    fn close(&mut self) {
        if let Some(session) = &self.session {
            let effect = session.close();
            self.apply_effects(vec![effect]);
        } else {
            self.set_open(false);
        }
    }

    fn edit(&mut self, f: impl FnOnce(&mut TextInputState)) {
        f(&mut self.input_state);
        if let Some(session) = &mut self.session {
            session.update_draft(self.input_state.content());
        }
    }

    fn submit(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        let effects = session.submit(self.input_state.content());
        if effects.is_empty() {
            return;
        }
        self.input_state.remember();
        self.apply_effects(effects);
    }

    /// Settle the in-flight request with its outcome.
    pub fn resolve_request(&mut self, outcome: Result<ChatResponse, ChatError>) {
        let Some(session) = &mut self.session else {
            warn!("Request outcome arrived without a session");
            return;
        };
        let effects = session.resolve(outcome);
        self.apply_effects(effects);
    }

    /// Requests the session asked to send, oldest first.
    pub fn take_requests(&mut self) -> Vec<ChatRequest> {
        std::mem::take(&mut self.outbox)
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send(request) => self.outbox.push(request),
                Effect::ScrollToLatest => self.transcript_scroll = 0,
                Effect::FocusInput => {
                    self.focus = Focus::Input;
                    // The session cleared its draft on settle; mirror it.
                    let draft = self.session.as_ref().map_or("", Session::draft);
                    if draft.is_empty() {
                        self.input_state.clear();
                    }
                }
                Effect::Close => self.set_open(false),
            }
        }
    }

    /// How far the transcript can scroll at the current viewport.
    pub fn max_transcript_scroll(&self) -> usize {
        let Some(session) = &self.session else {
            return 0;
        };
        let (content, _) = main_layout(self.viewport);
        let panel = panel_rect(content);
        let inner = Rect::new(
            panel.x + 1,
            panel.y + 1,
            panel.width.saturating_sub(2),
            panel.height.saturating_sub(2),
        );
        let (transcript_area, _) = panel_layout(inner);
        let total = transcript_lines(
            session.messages(),
            session.is_pending(),
            self.tick,
            transcript_area.width,
        )
        .len();
        max_scroll(total, usize::from(transcript_area.height))
    }

    fn scroll_up(&mut self, rows: usize) {
        self.transcript_scroll = (self.transcript_scroll + rows).min(self.max_transcript_scroll());
    }

    fn scroll_down(&mut self, rows: usize) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(rows);
    }

    fn export_transcript(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        match transcript::export(session, &self.title, &self.export_dir, self.clock.now()) {
            Ok(path) => {
                info!(path = %path.display(), "Transcript exported");
                self.set_notification(format!("Transcript saved to {}", path.display()), false);
            }
            Err(e) => {
                warn!(error = %e, "Transcript export failed");
                self.set_notification(format!("Failed to export transcript: {e}"), true);
            }
        }
    }

    /// Set a temporary notification message.
    fn set_notification(&mut self, msg: String, is_error: bool) {
        self.notification = Some(msg);
        self.notification_is_error = is_error;
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Increment tick counter and update time-based state.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("open", &self.open)
            .field("session", &self.session)
            .field("focus", &self.focus)
            .field("transcript_scroll", &self.transcript_scroll)
            .field("outbox", &self.outbox)
            .finish_non_exhaustive()
    }
}
