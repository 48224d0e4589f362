use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::app::actions::Action;
use crate::constants::{SCROLL_ARROW_AMOUNT, SCROLL_PAGE_AMOUNT};

/// Map a terminal event to an action. `None` means quit.
pub fn handle_event(event: &Event) -> Option<Action> {
    match event {
        Event::Key(key) => {
            if key.kind != KeyEventKind::Press {
                return Some(Action::None);
            }

            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return match key.code {
                    KeyCode::Char('q') | KeyCode::Char('c') => None,
                    KeyCode::Char('n') => Some(Action::NewSession),
                    _ => Some(Action::None),
                };
            }

            let action = match key.code {
                KeyCode::Enter => Action::Submit,
                KeyCode::Esc => Action::StopStreaming,
                KeyCode::Char(c) => Action::InputChar(c),
                KeyCode::Backspace => Action::InputBackspace,
                KeyCode::Delete => Action::InputDelete,
                KeyCode::Left => Action::CursorLeft,
                KeyCode::Right => Action::CursorRight,
                KeyCode::Home => Action::CursorHome,
                KeyCode::End => Action::CursorEnd,
                KeyCode::Up => Action::ScrollUp(SCROLL_ARROW_AMOUNT),
                KeyCode::Down => Action::ScrollDown(SCROLL_ARROW_AMOUNT),
                KeyCode::PageUp => Action::ScrollUp(SCROLL_PAGE_AMOUNT),
                KeyCode::PageDown => Action::ScrollDown(SCROLL_PAGE_AMOUNT),
                _ => Action::None,
            };
            Some(action)
        }
        // The input is a single line: terminals may send \r\n or \r
        Event::Paste(text) => {
            let flattened = text.replace("\r\n", " ").replace(['\r', '\n'], " ");
            Some(Action::InsertText(flattened))
        }
        _ => Some(Action::None),
    }
}
