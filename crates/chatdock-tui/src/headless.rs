//! Headless mode for the chatdock TUI.
//!
//! Runs the real app loop against a `TestBackend` terminal so the widget can
//! be driven end to end without a tty. Input is sent via a channel and the
//! rendered screen is published after every iteration.

use crate::app::App;
use crate::dispatch::RequestDispatcher;
use crate::event::Action;
use crate::screens::render_app;
use chatdock_engine::{ChatBackend, Config};
use crossterm::event::KeyEvent;
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// Something to feed the headless app.
#[derive(Debug, Clone, Copy)]
pub enum HeadlessInput {
    /// A raw key press, routed like a real terminal key.
    Key(KeyEvent),
    /// An already-resolved action.
    Action(Action),
}

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    /// Whether the chat panel is open.
    pub open: bool,
    /// Whether a request is in flight.
    pub pending: bool,
    /// Number of messages in the transcript (0 before first open).
    pub message_count: usize,
    /// Whether the TUI should quit.
    pub should_quit: bool,
}

/// Handle to control a headless TUI instance.
pub struct HeadlessHandle {
    input_tx: mpsc::UnboundedSender<HeadlessInput>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send an action to the TUI.
    ///
    /// Returns `true` if the action was sent successfully.
    pub fn send_action(&self, action: Action) -> bool {
        self.input_tx.send(HeadlessInput::Action(action)).is_ok()
    }

    /// Send a key press to the TUI.
    pub fn send_key(&self, key: KeyEvent) -> bool {
        self.input_tx.send(HeadlessInput::Key(key)).is_ok()
    }

    /// Type `text` into the entry field.
    pub fn type_text(&self, text: &str) -> bool {
        text.chars().all(|c| self.send_action(Action::Insert(c)))
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(
        &mut self,
        condition: F,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            if tokio::time::timeout(remaining, self.state_rx.changed())
                .await
                .is_err()
            {
                return None;
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(
        &mut self,
        text: &str,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen_contents.contains(text), timeout)
            .await
    }

    /// Check if the TUI has quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
    /// Start with the panel open.
    pub open: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 50,
            open: false,
        }
    }
}

/// Run the TUI in headless mode with `backend` answering questions.
///
/// Returns a handle to control the TUI and a join handle for the background task.
///
/// # Example
///
/// ```ignore
/// let backend = ScriptedBackend::new().answer("Yes.");
/// let (mut handle, task) = run_tui_headless(&config, backend, HeadlessConfig::default());
///
/// handle.send_action(Action::Open);
/// handle.type_text("Do you cover boats?");
/// handle.send_action(Action::Submit);
/// handle.wait_for_text("Yes.", Duration::from_secs(1)).await;
///
/// handle.send_action(Action::Quit);
/// task.await.unwrap();
/// ```
pub fn run_tui_headless<B>(
    config: &Config,
    backend: B,
    options: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>)
where
    B: ChatBackend + Clone + 'static,
{
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let mut app = App::new(config);
    app.set_open(options.open);

    let task = tokio::spawn(async move {
        run_headless_loop(app, backend, options, input_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    let handle = HeadlessHandle { input_tx, state_rx };

    (handle, task)
}

async fn run_headless_loop<B>(
    mut app: App,
    backend: B,
    options: HeadlessConfig,
    mut input_rx: mpsc::UnboundedReceiver<HeadlessInput>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    B: ChatBackend + Clone + 'static,
{
    let backend_term = TestBackend::new(options.width, options.height);
    let mut terminal = Terminal::new(backend_term)?;
    let mut dispatcher = RequestDispatcher::new(backend);

    let tick_duration = std::time::Duration::from_millis(options.tick_rate_ms);

    loop {
        terminal.draw(|frame| {
            app.viewport = frame.area();
            render_app(&app, frame.area(), frame.buffer_mut());
        })?;

        let _ = state_tx.send(HeadlessState {
            screen_contents: buffer_to_string(terminal.backend().buffer()),
            open: app.open,
            pending: app.is_pending(),
            message_count: app.session.as_ref().map_or(0, |s| s.messages().len()),
            should_quit: app.should_quit,
        });

        if app.should_quit {
            break;
        }

        dispatcher.spawn_queued(&mut app);
        dispatcher.collect_finished(&mut app).await;

        let input = tokio::select! {
            Some(input) = input_rx.recv() => Some(input),
            () = tokio::time::sleep(tick_duration) => None,
        };

        match input {
            Some(HeadlessInput::Key(key)) => app.handle_key(key),
            Some(HeadlessInput::Action(action)) => app.handle_action(action),
            None => app.tick(),
        }
    }

    dispatcher.abort_all();
    Ok(())
}

/// Convert a terminal buffer to a string representation.
fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
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
