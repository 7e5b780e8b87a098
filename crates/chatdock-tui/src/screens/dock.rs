//! The host page with the launcher docked in its corner.

use crate::app::App;
use crate::screens::Screen;
use crate::ui::layout::{launcher_rect, main_layout};
use crate::ui::theme::Styles;
use crate::ui::widgets::{KeyHint, Launcher, StatusBar};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Mode badge shown in the status bar.
pub const MODE: &str = "chatdock";

/// The page behind the chat widget. Shows the launcher while the panel is
/// closed.
pub struct DockScreen;

impl Screen for DockScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let (main_area, status_area) = main_layout(area);

        render_host(app, main_area, buf);

        if !app.open {
            Launcher::default().render(launcher_rect(main_area), buf);
        }

        let hints = if app.open {
            vec![
                KeyHint::new("Enter", "Send"),
                KeyHint::new("Tab", "Focus"),
                KeyHint::new("Ctrl+E", "Export"),
                KeyHint::new("Esc", "Close"),
            ]
        } else {
            vec![KeyHint::new("Enter", "Open chat"), KeyHint::new("q", "Quit")]
        };
        let mut status_bar = StatusBar::new(MODE).hints(hints);
        if let Some(notification) = &app.notification {
            status_bar = status_bar.right(notification);
            if app.notification_is_error {
                status_bar = status_bar.right_style(Styles::error());
            }
        } else if app.is_pending() {
            status_bar = status_bar.right("waiting for reply");
        } else {
            status_bar = status_bar.right(&app.endpoint);
        }
        status_bar.render(status_area, buf);
    }
}

fn render_host(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::border())
        .style(Styles::default());

    let inner = block.inner(area);
    block.render(area, buf);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", app.title), Styles::highlight())),
        Line::from(""),
        Line::from(Span::styled(
            "  The assistant lives in the bottom-right corner.",
            Styles::default(),
        )),
        Line::from(Span::styled(
            "  Press Enter (or click the button) to open it, Esc to tuck it away.",
            Styles::dim(),
        )),
    ];
    Paragraph::new(lines)
        .style(Styles::default())
        .wrap(Wrap { trim: false })
        .render(inner, buf);
}
