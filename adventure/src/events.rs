//! Event handling for the adventure TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode};

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Insert => handle_insert_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

/// Handle keys in NORMAL mode (vim-style navigation and hotkeys)
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('i') => {
            app.input_mode = InputMode::Insert;
            EventResult::NeedsRedraw
        }
        KeyCode::Char('a') => {
            app.input_mode = InputMode::Insert;
            app.cursor_end();
            EventResult::NeedsRedraw
        }
        KeyCode::Char(':') => {
            app.enter_command_mode();
            EventResult::NeedsRedraw
        }

        // Suggested choices
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(number) = c.to_digit(10) {
                app.choose(number as usize);
            }
            EventResult::NeedsRedraw
        }

        KeyCode::Char('z') => {
            app.cycle_image_size();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('s') => {
            app.toggle_sidebar();
            EventResult::NeedsRedraw
        }

        KeyCode::Char('?') | KeyCode::F(1) => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }

        KeyCode::Char('q') => EventResult::Quit,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_down(1);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_up(1);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('G') => {
            app.scroll_to_bottom();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('g') => {
            app.scroll_to_top();
            EventResult::NeedsRedraw
        }
        KeyCode::PageUp => {
            app.scroll_up(10);
            EventResult::NeedsRedraw
        }
        KeyCode::PageDown => {
            app.scroll_down(10);
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}

/// Handle keys in INSERT mode (free text input)
fn handle_insert_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            EventResult::NeedsRedraw
        }

        KeyCode::Enter => {
            // Keep the draft while the story is still generating
            if app.is_generating_story {
                app.set_status("The story is still being written...");
                return EventResult::NeedsRedraw;
            }
            if let Some(input) = app.submit_input() {
                if app.send_player_action(input) {
                    app.enter_normal_mode();
                }
            }
            EventResult::NeedsRedraw
        }

        KeyCode::Left => {
            app.cursor_left();
            EventResult::NeedsRedraw
        }
        KeyCode::Right => {
            app.cursor_right();
            EventResult::NeedsRedraw
        }
        KeyCode::Home => {
            app.cursor_home();
            EventResult::NeedsRedraw
        }
        KeyCode::End => {
            app.cursor_end();
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace => {
            app.backspace();
            EventResult::NeedsRedraw
        }
        KeyCode::Delete => {
            app.delete();
            EventResult::NeedsRedraw
        }
        KeyCode::Up => {
            app.history_prev();
            EventResult::NeedsRedraw
        }
        KeyCode::Down => {
            app.history_next();
            EventResult::NeedsRedraw
        }

        KeyCode::Char(c) => {
            app.type_char(c);
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}

/// Handle keys in COMMAND mode (: commands)
fn handle_command_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.clear_input();
            EventResult::NeedsRedraw
        }

        KeyCode::Enter => {
            let command = app.input_buffer().to_string();
            app.clear_input();
            app.input_mode = InputMode::Normal;

            if command.len() > 1 {
                app.process_command(&command);
            }

            if app.should_quit {
                EventResult::Quit
            } else {
                EventResult::NeedsRedraw
            }
        }

        KeyCode::Left => {
            if app.cursor_position() > 1 {
                app.cursor_left();
            }
            EventResult::NeedsRedraw
        }
        KeyCode::Right => {
            app.cursor_right();
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace => {
            if app.cursor_position() > 1 {
                app.backspace();
            } else {
                // Backspace on a bare ":" leaves command mode
                app.input_mode = InputMode::Normal;
                app.clear_input();
            }
            EventResult::NeedsRedraw
        }

        KeyCode::Char(c) => {
            app.type_char(c);
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}

/// Handle key when overlay is open
fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => {
            app.close_overlay();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{WorkerRequest, WorkerResponse};
    use adventure_core::{ImageSize, MockStory};
    use tokio::sync::mpsc;

    fn press(app: &mut App, code: KeyCode) -> EventResult {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn test_app() -> (App, mpsc::Receiver<WorkerRequest>) {
        let (request_tx, request_rx) = mpsc::channel(8);
        let (_response_tx, response_rx) = mpsc::channel(64);
        let mut app = App::new(request_tx, response_rx, ImageSize::OneK);
        app.apply_worker_response(WorkerResponse::StoryReady {
            story: MockStory::narrative("You stand at a fork."),
            action: None,
            turn: 1,
        });
        (app, request_rx)
    }

    #[test]
    fn test_digit_picks_choice() {
        let (mut app, mut requests) = test_app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(
            requests.try_recv().unwrap(),
            WorkerRequest::Choice("Look around".to_string())
        );
    }

    #[test]
    fn test_insert_and_submit() {
        let (mut app, mut requests) = test_app();
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Insert);

        for c in "dig".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            requests.try_recv().unwrap(),
            WorkerRequest::PlayerAction("dig".to_string())
        );
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.input_buffer().is_empty());
    }

    #[test]
    fn test_submit_while_generating_keeps_draft() {
        let (mut app, mut requests) = test_app();
        app.is_generating_story = true;
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Enter);

        assert!(requests.try_recv().is_err());
        assert_eq!(app.input_buffer(), "x");
        assert_eq!(app.input_mode, InputMode::Insert);
    }

    #[test]
    fn test_z_cycles_size() {
        let (mut app, mut requests) = test_app();
        press(&mut app, KeyCode::Char('z'));
        assert_eq!(app.image_size, ImageSize::TwoK);
        assert_eq!(
            requests.try_recv().unwrap(),
            WorkerRequest::SetImageSize(ImageSize::TwoK)
        );
    }

    #[test]
    fn test_command_mode_quit() {
        let (mut app, _requests) = test_app();
        press(&mut app, KeyCode::Char(':'));
        assert_eq!(app.input_mode, InputMode::Command);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(press(&mut app, KeyCode::Enter), EventResult::Quit);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let (mut app, mut requests) = test_app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.has_overlay());

        press(&mut app, KeyCode::Char('1'));
        assert!(requests.try_recv().is_err());

        press(&mut app, KeyCode::Esc);
        assert!(!app.has_overlay());
    }

    #[test]
    fn test_q_quits_in_normal_mode() {
        let (mut app, _requests) = test_app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), EventResult::Quit);
    }
}
