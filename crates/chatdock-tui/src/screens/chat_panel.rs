//! Chat panel - the open widget docked bottom-right.

use crate::app::{App, Focus};
use crate::screens::dock::DockScreen;
use crate::screens::Screen;
use crate::text::truncate_to_width;
use crate::ui::layout::{input_row_layout, main_layout, panel_layout, panel_rect};
use crate::ui::theme::{Styles, Symbols};
use crate::ui::widgets::TranscriptView;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

/// The open chat panel, drawn over the host page.
pub struct ChatPanelScreen;

impl Screen for ChatPanelScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        // The host page stays visible behind the panel.
        DockScreen.render(app, area, buf);

        let (main_area, _) = main_layout(area);
        render_panel(app, panel_rect(main_area), buf);
    }
}

#[allow(clippy::cast_possible_truncation)]
fn render_panel(app: &App, area: Rect, buf: &mut Buffer) {
    Clear.render(area, buf);

    let title_room = usize::from(area.width).saturating_sub(16);
    let block = Block::default()
        .title(format!(" {} ", truncate_to_width(&app.title, title_room)))
        .title_style(Styles::title())
        .title(Line::from(" Esc x ").right_aligned())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Styles::border_active())
        .style(Styles::default());

    let inner = block.inner(area);
    block.render(area, buf);

    let Some(session) = &app.session else {
        return;
    };

    let (transcript_area, input_area) = panel_layout(inner);
    let pending = session.is_pending();

    TranscriptView::new(session.messages())
        .pending(pending, app.tick)
        .scroll(app.transcript_scroll)
        .render(transcript_area, buf);

    let label = if pending {
        Symbols::SENDING
    } else {
        Symbols::SEND
    };
    let (field_area, button_area) = input_row_layout(input_area, Symbols::SEND.len() as u16);

    let input_focused = app.focus == Focus::Input;
    let field_block = Block::default()
        .borders(Borders::ALL)
        .border_style(if input_focused && !pending {
            Styles::border_active()
        } else {
            Styles::border()
        })
        .style(Styles::default());
    app.input_state
        .widget()
        .focused(input_focused)
        .disabled(pending)
        .placeholder(&app.placeholder)
        .block(field_block)
        .render(field_area, buf);

    let button_style = if pending {
        Styles::button_disabled()
    } else {
        Styles::button()
    };
    // Vertically centre the label in the entry row.
    let button_row = Rect::new(
        button_area.x + 1,
        button_area.y + button_area.height / 2,
        button_area.width.saturating_sub(1),
        1,
    );
    Paragraph::new(Line::from(Span::styled(label, button_style))).render(button_row, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Action;
    use crate::test_utils::{create_test_app, render_screen_to_string};
    use chatdock_engine::{format_clock_time, ChatResponse};

    fn open_app() -> App {
        let mut app = create_test_app();
        app.handle_action(Action::Open);
        app
    }

    #[test]
    fn test_open_panel_shows_title_greeting_and_time() {
        let app = open_app();
        let screen = render_screen_to_string(&ChatPanelScreen, &app);

        assert!(screen.contains(" Insurellm AI Chatbot "));
        assert!(screen.contains("Hi! Ask me anything about Insurellm."));
        let ts = app.session.as_ref().unwrap().messages()[0].created_at();
        assert!(screen.contains(&format!("Assistant  {}", format_clock_time(ts))));
        assert!(screen.contains("Type your question..."));
        assert!(screen.contains("[ Send ]"));
        // Launcher is hidden while open.
        assert!(!screen.contains("│   Chat   │"));
    }

    #[test]
    fn test_pending_disables_send_and_shows_indicator() {
        let mut app = open_app();
        for c in "Do you cover boats?".chars() {
            app.handle_action(Action::Insert(c));
        }
        app.handle_action(Action::Submit);

        let screen = render_screen_to_string(&ChatPanelScreen, &app);
        assert!(screen.contains("[ ... ]"));
        assert!(!screen.contains("[ Send ]"));
        assert!(screen.contains("Thinking..."));
        // The question stays in the (disabled) field until settled.
        assert!(screen.contains("> Do you cover boats?"));
        assert!(screen.contains("waiting for reply"));
    }

    #[test]
    fn test_settled_reply_visible_and_field_cleared() {
        let mut app = open_app();
        for c in "What plans do you offer?".chars() {
            app.handle_action(Action::Insert(c));
        }
        app.handle_action(Action::Submit);
        app.resolve_request(Ok(ChatResponse::new("Auto and home.")));

        let screen = render_screen_to_string(&ChatPanelScreen, &app);
        assert!(screen.contains("What plans do you offer?"));
        assert!(screen.contains("Auto and home."));
        assert!(screen.contains("[ Send ]"));
        assert!(screen.contains("> _Type your question..."));
    }

    #[test]
    fn test_latest_message_visible_after_many_turns() {
        let mut app = open_app();
        for i in 0..15 {
            for c in format!("question {i}").chars() {
                app.handle_action(Action::Insert(c));
            }
            app.handle_action(Action::Submit);
            app.resolve_request(Ok(ChatResponse::new(format!("reply number {i}"))));
        }

        let screen = render_screen_to_string(&ChatPanelScreen, &app);
        assert!(screen.contains("reply number 14"));
        assert!(!screen.contains("reply number 0"));
    }

    #[test]
    fn test_user_message_right_aligned_in_panel() {
        let mut app = open_app();
        for c in "hello".chars() {
            app.handle_action(Action::Insert(c));
        }
        app.handle_action(Action::Submit);
        app.resolve_request(Ok(ChatResponse::new("hi")));

        let screen = render_screen_to_string(&ChatPanelScreen, &app);
        let row = screen
            .lines()
            .find(|l| l.contains("hello"))
            .unwrap();
        // Right-aligned text ends against the panel border (and the host
        // frame just beyond it).
        assert!(row.trim_end().trim_end_matches('│').ends_with("hello"));
    }
}
