use super::key_handler::KeyHandler;
use super::text_field::TextField;
use crate::model::ClipboardItem;
use crate::view::markup::{EditorAnchor, EditorMarkup, Span, Style};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the editor was opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorKind {
    RenameDirectory { old_name: String },
    CreateDirectory,
    EditItem { id: i64, directory: String },
    CreateItem { directory: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    Pending,
    Cancelled,
    Commit,
}

/// In-place editor shown inside a list. It owns every key while open.
#[derive(Debug, Clone)]
pub struct InlineEditor {
    pub kind: EditorKind,
    anchor: EditorAnchor,
    fields: Vec<TextField>,
    focus: usize,
}

impl InlineEditor {
    pub fn rename_directory(old_name: &str, anchor: EditorAnchor) -> Self {
        Self {
            kind: EditorKind::RenameDirectory {
                old_name: old_name.to_string(),
            },
            anchor,
            fields: vec![TextField::new("Name", old_name, false)],
            focus: 0,
        }
    }

    pub fn create_directory() -> Self {
        Self {
            kind: EditorKind::CreateDirectory,
            anchor: EditorAnchor::AfterList,
            fields: vec![TextField::new("New folder", "", false)],
            focus: 0,
        }
    }

    pub fn edit_item(item: &ClipboardItem, entry: usize) -> Self {
        Self {
            kind: EditorKind::EditItem {
                id: item.id,
                directory: item.directory.clone(),
            },
            anchor: EditorAnchor::Entry(entry),
            fields: vec![
                TextField::new("Content", &item.content, true),
                TextField::new("Memo", item.memo_text().unwrap_or_default(), false),
            ],
            focus: 0,
        }
    }

    pub fn create_item(directory: &str) -> Self {
        Self {
            kind: EditorKind::CreateItem {
                directory: directory.to_string(),
            },
            anchor: EditorAnchor::BeforeList,
            fields: vec![
                TextField::new("Content", "", true),
                TextField::new("Memo", "", false),
            ],
            focus: 0,
        }
    }

    #[cfg(test)]
    pub fn anchor(&self) -> EditorAnchor {
        self.anchor
    }

    /// Trimmed text of field `i`.
    pub fn value(&self, i: usize) -> String {
        self.fields
            .get(i)
            .map(|f| f.text().trim().to_string())
            .unwrap_or_default()
    }

    /// Untrimmed text of field `i`.
    pub fn raw_value(&self, i: usize) -> String {
        self.fields.get(i).map(TextField::text).unwrap_or_default()
    }

    /// Memo as sent to the backend: blank becomes absent.
    pub fn memo(&self) -> Option<String> {
        let memo = self.value(1);
        (!memo.is_empty()).then_some(memo)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorOutcome {
        if KeyHandler::is_save_combo(&key) {
            return EditorOutcome::Commit;
        }
        if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            self.focus = (self.focus + 1) % self.fields.len();
            return EditorOutcome::Pending;
        }
        let field = &mut self.fields[self.focus];
        match key.code {
            KeyCode::Esc => return EditorOutcome::Cancelled,
            KeyCode::Enter if field.is_multiline() => field.insert_newline(),
            KeyCode::Enter => return EditorOutcome::Commit,
            KeyCode::Backspace => field.delete_backward(),
            KeyCode::Delete => field.delete_forward(),
            KeyCode::Left => field.move_left(),
            KeyCode::Right => field.move_right(),
            KeyCode::Home => field.move_home(),
            KeyCode::End => field.move_end(),
            KeyCode::Char(c)
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                field.insert_char(c);
            }
            _ => {}
        }
        EditorOutcome::Pending
    }

    pub fn markup(&self) -> EditorMarkup {
        let single = self.fields.len() == 1;
        let mut lines = Vec::new();
        for (i, field) in self.fields.iter().enumerate() {
            let rendered = field.render_lines(i == self.focus);
            for (n, spans) in rendered.into_iter().enumerate() {
                let mut line = Vec::new();
                if !single {
                    let label = if n == 0 {
                        format!("{:<8}", format!("{}:", field.label))
                    } else {
                        " ".repeat(8)
                    };
                    line.push(Span::new(label, Style::Dim));
                }
                line.extend(spans);
                lines.push(line);
            }
        }
        if !single {
            lines.push(vec![Span::new(
                "Ctrl+S save  Tab next field  Esc cancel",
                Style::Dim,
            )]);
        }
        EditorMarkup {
            anchor: self.anchor,
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(editor: &mut InlineEditor, text: &str) {
        for c in text.chars() {
            editor.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_single_line_enter_commits() {
        let mut editor = InlineEditor::create_directory();
        type_str(&mut editor, " Notes ");
        assert_eq!(editor.handle_key(key(KeyCode::Enter)), EditorOutcome::Commit);
        assert_eq!(editor.value(0), "Notes");
    }

    #[test]
    fn test_escape_cancels() {
        let mut editor = InlineEditor::rename_directory("Work", EditorAnchor::Entry(1));
        assert_eq!(editor.value(0), "Work");
        assert_eq!(editor.handle_key(key(KeyCode::Esc)), EditorOutcome::Cancelled);
    }

    #[test]
    fn test_multiline_enter_inserts_and_save_combo_commits() {
        let mut editor = InlineEditor::create_item("Clipboard");
        type_str(&mut editor, "a");
        assert_eq!(editor.handle_key(key(KeyCode::Enter)), EditorOutcome::Pending);
        type_str(&mut editor, "b");
        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(editor.handle_key(save), EditorOutcome::Commit);
        assert_eq!(editor.raw_value(0), "a\nb");
    }

    #[test]
    fn test_tab_moves_to_memo_field() {
        let mut editor = InlineEditor::create_item("Clipboard");
        type_str(&mut editor, "body");
        editor.handle_key(key(KeyCode::Tab));
        type_str(&mut editor, "note");
        assert_eq!(editor.memo(), Some("note".to_string()));
        assert_eq!(editor.value(0), "body");
    }

    #[test]
    fn test_blank_memo_is_absent() {
        let item = ClipboardItem {
            id: 4,
            content: "x".to_string(),
            directory: "Work".to_string(),
            memo: Some("old".to_string()),
            created_at: String::new(),
        };
        let mut editor = InlineEditor::edit_item(&item, 0);
        editor.handle_key(key(KeyCode::Tab));
        for _ in 0..3 {
            editor.handle_key(key(KeyCode::Backspace));
        }
        assert_eq!(editor.memo(), None);
        assert_eq!(
            editor.kind,
            EditorKind::EditItem {
                id: 4,
                directory: "Work".to_string()
            }
        );
    }

    #[test]
    fn test_markup_labels_fields() {
        let editor = InlineEditor::create_item("Clipboard");
        let markup = editor.markup();
        assert_eq!(markup.anchor, EditorAnchor::BeforeList);
        let first: String = markup.lines[0].iter().map(|s| s.text.as_str()).collect();
        assert!(first.starts_with("Content:"));
    }
}
