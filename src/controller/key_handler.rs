use crate::controller::command_types::{ActiveView, Command};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub struct KeyHandler;

impl KeyHandler {
    /// Ctrl+S or Ctrl+Enter submits an inline editor.
    pub fn is_save_combo(key_event: &KeyEvent) -> bool {
        key_event.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key_event.code, KeyCode::Char('s') | KeyCode::Enter)
    }

    pub fn is_quit(key_event: &KeyEvent) -> bool {
        key_event.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key_event.code, KeyCode::Char('c') | KeyCode::Char('q'))
    }

    /// Printable input (Shift allowed) or Backspace, which start a search
    /// from anywhere outside an input.
    pub fn search_input(key_event: &KeyEvent) -> Option<Command> {
        if key_event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }
        match key_event.code {
            KeyCode::Char(c) if !c.is_control() => Some(Command::SearchInput(c)),
            KeyCode::Backspace => Some(Command::SearchBackspace),
            _ => None,
        }
    }

    /// Keys while the search field has focus. Character input is handled
    /// first through [`KeyHandler::search_input`].
    pub fn parse_search_key(key_event: &KeyEvent) -> Option<Command> {
        if let Some(command) = Self::search_input(key_event) {
            return Some(command);
        }
        match key_event.code {
            KeyCode::Up => Some(Command::MoveUp),
            KeyCode::Down => Some(Command::MoveDown),
            KeyCode::Enter => Some(Command::Activate),
            KeyCode::Esc => Some(Command::Escape),
            _ => None,
        }
    }

    pub fn parse_list_key(view: ActiveView, key_event: &KeyEvent) -> Option<Command> {
        let key = key_event.code;
        let modifiers = key_event.modifiers;
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let alt = modifiers.contains(KeyModifiers::ALT);

        match key {
            // Control combinations first (more specific)
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => Some(Command::Quit),
            KeyCode::Char('r') if ctrl => Some(Command::Rename),
            KeyCode::Char('d') if ctrl => Some(Command::Delete),
            KeyCode::Char('n') if ctrl => Some(Command::CreateNew),
            KeyCode::Char('e') if ctrl && view == ActiveView::Items => Some(Command::EditItem),
            KeyCode::Char('l') if ctrl => Some(Command::Redraw),
            KeyCode::Char('k') | KeyCode::Char('p') if ctrl => Some(Command::MoveUp),
            KeyCode::Char('j') if ctrl => Some(Command::MoveDown),
            KeyCode::Left if ctrl || alt => Some(Command::Back),

            KeyCode::Up | KeyCode::BackTab => Some(Command::MoveUp),
            KeyCode::Down | KeyCode::Tab => Some(Command::MoveDown),
            KeyCode::Home | KeyCode::PageUp => Some(Command::MoveFirst),
            KeyCode::End | KeyCode::PageDown => Some(Command::MoveLast),
            KeyCode::Left => Some(Command::ActionLeft),
            KeyCode::Right => Some(Command::ActionRight),
            KeyCode::Enter => Some(Command::Activate),
            KeyCode::F(2) => Some(Command::Rename),
            KeyCode::Delete => Some(Command::Delete),
            KeyCode::Esc => Some(Command::Escape),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_save_combo() {
        assert!(KeyHandler::is_save_combo(&key(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert!(KeyHandler::is_save_combo(&key(KeyCode::Enter, KeyModifiers::CONTROL)));
        assert!(!KeyHandler::is_save_combo(&key(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn test_search_input_allows_shift_only() {
        assert_eq!(
            KeyHandler::search_input(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(Command::SearchInput('A'))
        );
        assert_eq!(
            KeyHandler::search_input(&key(KeyCode::Char('a'), KeyModifiers::CONTROL)),
            None
        );
        assert_eq!(
            KeyHandler::search_input(&key(KeyCode::Char('a'), KeyModifiers::ALT)),
            None
        );
        assert_eq!(
            KeyHandler::search_input(&key(KeyCode::Backspace, KeyModifiers::NONE)),
            Some(Command::SearchBackspace)
        );
    }

    #[test]
    fn test_list_keys() {
        let parse = |code, modifiers| KeyHandler::parse_list_key(ActiveView::Items, &key(code, modifiers));
        assert_eq!(parse(KeyCode::Down, KeyModifiers::NONE), Some(Command::MoveDown));
        assert_eq!(parse(KeyCode::Left, KeyModifiers::NONE), Some(Command::ActionLeft));
        assert_eq!(parse(KeyCode::Left, KeyModifiers::ALT), Some(Command::Back));
        assert_eq!(parse(KeyCode::F(2), KeyModifiers::NONE), Some(Command::Rename));
        assert_eq!(parse(KeyCode::Char('e'), KeyModifiers::CONTROL), Some(Command::EditItem));
        assert_eq!(parse(KeyCode::Char('c'), KeyModifiers::CONTROL), Some(Command::Quit));
    }

    #[test]
    fn test_edit_shortcut_only_in_item_view() {
        let ctrl_e = key(KeyCode::Char('e'), KeyModifiers::CONTROL);
        assert_eq!(KeyHandler::parse_list_key(ActiveView::Directories, &ctrl_e), None);
    }
}
