use crate::view::markup::{Span, Style};

/// Editable text with a character cursor, used by inline editors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub label: &'static str,
    chars: Vec<char>,
    cursor: usize,
    multiline: bool,
}

impl TextField {
    pub fn new(label: &'static str, initial: &str, multiline: bool) -> Self {
        let chars: Vec<char> = initial.chars().collect();
        let cursor = chars.len();
        Self {
            label,
            chars,
            cursor,
            multiline,
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn insert_char(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        if self.multiline {
            self.insert_char('\n');
        }
    }

    pub fn delete_backward(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn move_home(&mut self) {
        self.cursor = self.chars[..self.cursor]
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |pos| pos + 1);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.chars[self.cursor..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(self.chars.len(), |pos| self.cursor + pos);
    }

    /// One span list per text line; the cursor cell is drawn inverted when
    /// the field has focus.
    pub fn render_lines(&self, focused: bool) -> Vec<Vec<Span>> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut spans = Vec::new();

        for (i, &c) in self.chars.iter().enumerate() {
            if focused && i == self.cursor {
                spans.push(Span::new(std::mem::take(&mut current), Style::Input));
                let shown = if c == '\n' { ' ' } else { c };
                spans.push(Span::new(shown.to_string(), Style::Cursor));
                if c == '\n' {
                    lines.push(std::mem::take(&mut spans));
                }
                continue;
            }
            if c == '\n' {
                spans.push(Span::new(std::mem::take(&mut current), Style::Input));
                lines.push(std::mem::take(&mut spans));
            } else {
                current.push(c);
            }
        }

        spans.push(Span::new(current, Style::Input));
        if focused && self.cursor == self.chars.len() {
            spans.push(Span::new(" ", Style::Cursor));
        }
        lines.push(spans);
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Vec<Span>]) -> Vec<String> {
        lines
            .iter()
            .map(|spans| spans.iter().map(|s| s.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_insert_and_delete_at_cursor() {
        let mut f = TextField::new("Name", "ac", false);
        f.move_left();
        f.insert_char('b');
        assert_eq!(f.text(), "abc");
        f.delete_backward();
        assert_eq!(f.text(), "ac");
        f.delete_forward();
        assert_eq!(f.text(), "a");
    }

    #[test]
    fn test_newline_only_in_multiline_fields() {
        let mut single = TextField::new("Name", "a", false);
        single.insert_newline();
        assert_eq!(single.text(), "a");

        let mut multi = TextField::new("Content", "a", true);
        multi.insert_newline();
        multi.insert_char('b');
        assert_eq!(multi.text(), "a\nb");
    }

    #[test]
    fn test_home_end_stay_on_current_line() {
        let mut f = TextField::new("Content", "one\ntwo", true);
        f.move_home();
        f.insert_char('>');
        assert_eq!(f.text(), "one\n>two");
        f.move_end();
        f.insert_char('!');
        assert_eq!(f.text(), "one\n>two!");
    }

    #[test]
    fn test_render_lines_with_cursor() {
        let f = TextField::new("Content", "ab\ncd", true);
        assert_eq!(plain(&f.render_lines(false)), vec!["ab", "cd"]);
        assert_eq!(plain(&f.render_lines(true)), vec!["ab", "cd "]);
    }
}
