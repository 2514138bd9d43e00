use crate::application::{App, AppMode, Command};
use crate::domain::{Point, PointerEvent, PointerResponse};
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

pub struct InputHandler;

impl InputHandler {
    /// Dispatches a key press; returns blocking work for the event loop.
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> Option<Command> {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => {
                Self::handle_editing_mode(app, key);
                None
            }
            AppMode::UploadPath => Self::handle_upload_mode(app, key),
            AppMode::ConfirmReset => {
                Self::handle_confirm_reset_mode(app, key);
                None
            }
            AppMode::Help => {
                Self::handle_help_mode(app, key);
                None
            }
        }
    }

    /// Feeds mouse input to the signature pad.
    ///
    /// Scroll events are swallowed while a stroke is in progress so the
    /// form does not move under the pen.
    pub fn handle_mouse_event(app: &mut App, event: MouseEvent) -> PointerResponse {
        let origin = Point::new(0.0, 0.0);
        let pointer = match event.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerEvent::Down(origin),
            MouseEventKind::Drag(MouseButton::Left) => PointerEvent::Move(origin),
            MouseEventKind::Up(MouseButton::Left) => PointerEvent::Up,
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown if app.signature.is_drawing() => {
                return PointerResponse::Captured;
            }
            MouseEventKind::ScrollUp if app.mode == AppMode::Normal => {
                app.select_previous();
                return PointerResponse::Ignored;
            }
            MouseEventKind::ScrollDown if app.mode == AppMode::Normal => {
                app.select_next();
                return PointerResponse::Ignored;
            }
            _ => return PointerResponse::Ignored,
        };
        app.pointer(pointer, event.column, event.row)
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> Option<Command> {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('s') => return app.submit(),
                KeyCode::Char('u') => {
                    app.start_upload_input();
                    return None;
                }
                KeyCode::Char('r') => {
                    app.request_reset();
                    return None;
                }
                KeyCode::Char('l') => {
                    app.clear_signature();
                    app.set_status("Signature cleared");
                    return None;
                }
                _ => {}
            }
        }

        match key {
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => app.select_previous(),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.select_next(),
            KeyCode::Home => app.selected = 0,
            KeyCode::End => app.selected = app.controls.len().saturating_sub(1),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::F(2) => app.activate_selected(),
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            _ => {}
        }
        None
    }

    fn handle_text_key(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Backspace => app.delete_before_cursor(),
            KeyCode::Delete => app.delete_at_cursor(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            other => Self::handle_text_key(app, other),
        }
    }

    fn handle_upload_mode(app: &mut App, key: KeyCode) -> Option<Command> {
        match key {
            KeyCode::Enter => return app.finish_upload_input(),
            KeyCode::Esc => app.cancel_upload_input(),
            other => Self::handle_text_key(app, other),
        }
        None
    }

    fn handle_confirm_reset_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_reset(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_reset(),
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
                app.help_scroll = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }
}
