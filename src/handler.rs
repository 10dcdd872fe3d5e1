use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane};
use crate::controller::Event;
use crate::state::InputEdit;
use crate::tui::AppEvent;

const WHEEL_LINES: u16 = 3;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => {
            if app.focus == FocusPane::Input {
                app.type_text(&text);
            }
        }
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }

    // Deliver a finished request as soon as possible, not only on ticks
    app.poll_pending().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any pane
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('n') => {
                app.dispatch(Event::Reset);
                return;
            }
            KeyCode::Char('d') => {
                app.scroll_half_page_down();
                return;
            }
            KeyCode::Char('u') => {
                app.scroll_half_page_up();
                return;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Tab => {
            app.toggle_focus();
            return;
        }
        KeyCode::PageUp => {
            app.scroll_half_page_up();
            return;
        }
        KeyCode::PageDown => {
            app.scroll_half_page_down();
            return;
        }
        _ => {}
    }

    match app.focus {
        FocusPane::Input => handle_input_key(app, key),
        FocusPane::Transcript => handle_transcript_key(app, key),
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // Shift+Enter or Alt+Enter inserts a newline; plain Enter sends
        KeyCode::Enter
            if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            app.edit_input(InputEdit::Newline);
        }
        KeyCode::Enter => {
            if app.state().input.is_submittable() {
                app.dispatch(Event::Submit);
            }
        }
        KeyCode::Esc => {
            app.focus = FocusPane::Transcript;
        }
        KeyCode::Backspace => app.edit_input(InputEdit::Backspace),
        KeyCode::Delete => app.edit_input(InputEdit::Delete),
        KeyCode::Left => app.edit_input(InputEdit::Left),
        KeyCode::Right => app.edit_input(InputEdit::Right),
        KeyCode::Home => app.edit_input(InputEdit::Home),
        KeyCode::End => app.edit_input(InputEdit::End),
        KeyCode::Char(c) => app.edit_input(InputEdit::Char(c)),
        _ => {}
    }
}

fn handle_transcript_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),
        KeyCode::Char('n') => app.dispatch(Event::Reset),
        KeyCode::Char('i') | KeyCode::Enter | KeyCode::Esc => app.focus = FocusPane::Input,
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let over_transcript = app
        .transcript_area
        .is_some_and(|area| point_in_rect(mouse.column, mouse.row, area));
    if !over_transcript {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_LINES),
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{settings, ScriptedBackend};
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn app() -> App {
        App::new(ScriptedBackend::new(vec![Ok("Hello".to_string())], Ok(())), &settings())
    }

    async fn type_keys(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c), KeyModifiers::NONE)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_enter_submits_and_shift_enter_adds_newline() {
        let mut app = app();
        type_keys(&mut app, "a").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::SHIFT)).await.unwrap();
        type_keys(&mut app, "b").await;
        assert_eq!(app.state().input.text(), "a\nb");

        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).await.unwrap();
        assert_eq!(app.state().transcript.messages()[0].text(), "a\nb");
        assert!(app.has_pending_request());

        app.finish_pending().await;
        assert_eq!(app.state().transcript.len(), 2);
    }

    #[tokio::test]
    async fn test_enter_on_blank_input_does_nothing() {
        let mut app = app();
        type_keys(&mut app, "   ").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).await.unwrap();

        assert!(app.state().transcript.is_empty());
        assert!(!app.has_pending_request());
        assert_eq!(app.state().input.text(), "   ");
    }

    #[tokio::test]
    async fn test_ctrl_n_starts_new_chat() {
        let mut app = app();
        type_keys(&mut app, "hi").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).await.unwrap();
        app.finish_pending().await;

        handle_event(&mut app, key(KeyCode::Char('n'), KeyModifiers::CONTROL)).await.unwrap();
        app.finish_pending().await;
        assert!(app.state().transcript.is_empty());
        assert!(app.state().show_welcome);
    }

    #[tokio::test]
    async fn test_q_only_quits_from_transcript() {
        let mut app = app();
        type_keys(&mut app, "q").await;
        assert!(!app.should_quit);
        assert_eq!(app.state().input.text(), "q");

        handle_event(&mut app, key(KeyCode::Esc, KeyModifiers::NONE)).await.unwrap();
        assert_eq!(app.focus, FocusPane::Transcript);
        type_keys(&mut app, "q").await;
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Char('c'), KeyModifiers::CONTROL)).await.unwrap();
        assert!(app.should_quit);
    }
}
