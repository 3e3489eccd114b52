use crossterm::event::{KeyCode, KeyEvent};

/// Modal box drawn over the list. Captures all keys while open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    ConfirmDeleteDirectory { name: String },
    Alert { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayOutcome {
    Pending,
    Dismissed,
    DeleteDirectory(String),
}

impl Overlay {
    pub fn alert(message: impl Into<String>) -> Self {
        Overlay::Alert {
            message: message.into(),
        }
    }

    pub fn handle_key(&self, key: KeyEvent) -> OverlayOutcome {
        match self {
            Overlay::ConfirmDeleteDirectory { name } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    OverlayOutcome::DeleteDirectory(name.clone())
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => OverlayOutcome::Dismissed,
                _ => OverlayOutcome::Pending,
            },
            // Any real key dismisses; a lone modifier does not.
            Overlay::Alert { .. } => match key.code {
                KeyCode::Modifier(_) => OverlayOutcome::Pending,
                _ => OverlayOutcome::Dismissed,
            },
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            Overlay::ConfirmDeleteDirectory { name } => vec![
                format!("Delete folder \"{name}\" and all of its items?"),
                String::new(),
                "[y] Delete    [n] Cancel".to_string(),
            ],
            Overlay::Alert { message } => {
                let mut lines: Vec<String> = message.lines().map(str::to_string).collect();
                lines.push(String::new());
                lines.push("Press any key".to_string());
                lines
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_confirm_yes_no() {
        let overlay = Overlay::ConfirmDeleteDirectory {
            name: "Work".to_string(),
        };
        assert_eq!(
            overlay.handle_key(key(KeyCode::Char('y'))),
            OverlayOutcome::DeleteDirectory("Work".to_string())
        );
        assert_eq!(overlay.handle_key(key(KeyCode::Esc)), OverlayOutcome::Dismissed);
        assert_eq!(overlay.handle_key(key(KeyCode::Down)), OverlayOutcome::Pending);
    }

    #[test]
    fn test_alert_dismiss() {
        let overlay = Overlay::alert("Rename failed");
        assert_eq!(overlay.handle_key(key(KeyCode::Char('y'))), OverlayOutcome::Dismissed);
        assert_eq!(overlay.handle_key(key(KeyCode::Enter)), OverlayOutcome::Dismissed);
        assert_eq!(
            overlay.handle_key(key(KeyCode::Modifier(crossterm::event::ModifierKeyCode::LeftShift))),
            OverlayOutcome::Pending
        );
        assert_eq!(overlay.lines()[0], "Rename failed");
    }
}
