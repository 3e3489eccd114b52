use super::markup::{Line, Markup, Style};
use crossterm::{
    cursor, execute,
    style::{Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType, size},
};
use std::io::{self, Write, stdout};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[derive(Clone)]
pub struct RenderParams<'a> {
    pub markup: &'a Markup,
    pub status_message: &'a str,
    pub hints: &'a str,
    pub overlay: Option<&'a [String]>,
}

pub struct View {
    last_lines: Vec<String>,
    last_header: String,
    last_status: String,
    last_terminal_size: (u16, u16),
    scroll_offset: usize,
    needs_full_redraw: bool,
    render_count: usize,
}

impl View {
    pub fn new() -> Self {
        Self {
            last_lines: Vec::new(),
            last_header: String::new(),
            last_status: String::new(),
            last_terminal_size: (0, 0),
            scroll_offset: 0,
            needs_full_redraw: true,
            render_count: 0,
        }
    }

    fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))
    }

    fn move_cursor(&self, line: usize, column: usize) -> io::Result<()> {
        execute!(stdout(), cursor::MoveTo(column as u16, line as u16))
    }

    fn write_row(&self, row: usize, text: &str) -> io::Result<()> {
        self.move_cursor(row, 0)?;
        execute!(stdout(), Clear(ClearType::CurrentLine))?;
        print!("{text}");
        Ok(())
    }

    pub fn render(&mut self, params: &RenderParams) -> io::Result<()> {
        let (width, height) = size()?;
        let width = width as usize;
        let height = height as usize;

        self.render_count += 1;

        // Force full redraw every 50 renders to prevent state drift
        if self.render_count % 50 == 0 {
            self.needs_full_redraw = true;
        }

        if self.last_terminal_size != (width as u16, height as u16) {
            self.needs_full_redraw = true;
            self.last_terminal_size = (width as u16, height as u16);
        }

        if self.needs_full_redraw {
            self.clear_screen()?;
            self.needs_full_redraw = false;
            self.last_lines.clear();
            self.last_header.clear();
            self.last_status.clear();
        }

        // Header row, list body, status row
        let max_lines = height.saturating_sub(2);
        let markup = params.markup;

        let selected = markup.selected_entries().first().and_then(|&e| markup.entry_span(e));
        self.scroll_offset = scroll_for(selected, self.scroll_offset, max_lines, markup.lines.len());

        let header = paint(&markup.header, width);
        if header != self.last_header {
            self.write_row(0, &header)?;
            self.last_header = header;
        }

        let mut visible_lines: Vec<String> = (0..max_lines)
            .map(|i| {
                markup
                    .lines
                    .get(self.scroll_offset + i)
                    .map(|line| paint(line, width))
                    .unwrap_or_default()
            })
            .collect();

        if let Some(overlay) = params.overlay {
            draw_overlay(&mut visible_lines, overlay, width);
        }

        if self.last_lines != visible_lines {
            // Only redraw changed lines
            for (i, line) in visible_lines.iter().enumerate() {
                if i >= self.last_lines.len() || self.last_lines[i] != *line {
                    self.write_row(i + 1, line)?;
                }
            }
            self.last_lines = visible_lines;
        }

        let status = if params.status_message.is_empty() {
            params.hints
        } else {
            params.status_message
        };
        let (clipped, _) = clip_to_width(status, width);
        if self.last_status != clipped && height > 0 {
            self.write_row(height - 1, &clipped)?;
            self.last_status = clipped;
        }

        stdout().flush()?;
        Ok(())
    }

    pub fn force_redraw(&mut self) {
        self.needs_full_redraw = true;
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
        self.needs_full_redraw = true;
    }
}

/// Scroll offset keeping the selected entry's lines visible. Entries taller
/// than the screen show their first line.
fn scroll_for(selected: Option<(usize, usize)>, offset: usize, visible: usize, total: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    let max_offset = total.saturating_sub(visible);
    let Some((first, last)) = selected else {
        return offset.min(max_offset);
    };
    let offset = if first < offset {
        first
    } else if last >= offset + visible {
        (last + 1 - visible).min(first)
    } else {
        offset
    };
    offset.min(max_offset)
}

/// Printable stand-in for a control character, in caret notation where
/// one exists (`ESC` is `^[`).
fn visible_control(ch: char) -> Option<String> {
    if !ch.is_control() {
        return None;
    }
    Some(match ch as u32 {
        code @ 0..=0x1f => format!("^{}", char::from(code as u8 + b'@')),
        0x7f => "^?".to_string(),
        _ => char::REPLACEMENT_CHARACTER.to_string(),
    })
}

/// Longest prefix of `text` that fits in `width` terminal cells. Control
/// characters never reach the terminal raw.
fn clip_to_width(text: &str, width: usize) -> (String, usize) {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let shown = visible_control(ch);
        let w = match &shown {
            Some(s) => s.width(),
            None => ch.width().unwrap_or(0),
        };
        if used + w > width {
            break;
        }
        match shown {
            Some(s) => out.push_str(&s),
            None => out.push(ch),
        }
        used += w;
    }
    (out, used)
}

fn style_codes(style: Style) -> String {
    match style {
        Style::Plain | Style::Input => String::new(),
        Style::Dim | Style::Placeholder => format!("{}", SetForegroundColor(Color::DarkGrey)),
        Style::Title => format!("{}", SetAttribute(Attribute::Bold)),
        Style::Folder => format!("{}", SetForegroundColor(Color::Blue)),
        Style::Count => format!("{}", SetForegroundColor(Color::DarkGrey)),
        Style::Memo => format!("{}", SetForegroundColor(Color::Magenta)),
        Style::Highlight => format!(
            "{}{}",
            SetBackgroundColor(Color::Yellow),
            SetForegroundColor(Color::Black)
        ),
        Style::Button => format!("{}", SetForegroundColor(Color::Cyan)),
        Style::ButtonFocused => format!(
            "{}{}",
            SetBackgroundColor(Color::Cyan),
            SetForegroundColor(Color::Black)
        ),
        Style::Cursor => format!("{}", SetAttribute(Attribute::Reverse)),
        Style::Error => format!("{}", SetForegroundColor(Color::Red)),
    }
}

fn paint(line: &Line, width: usize) -> String {
    let mut result = String::new();
    let mut remaining = width;
    for span in &line.spans {
        if remaining == 0 {
            break;
        }
        let (text, used) = clip_to_width(&span.text, remaining);
        remaining -= used;
        let codes = style_codes(span.style);
        if codes.is_empty() {
            result.push_str(&text);
        } else {
            result.push_str(&format!("{codes}{text}{}{ResetColor}", SetAttribute(Attribute::Reset)));
        }
    }
    result
}

/// Centered box over the list rows.
fn draw_overlay(rows: &mut [String], overlay: &[String], width: usize) {
    if rows.is_empty() || width < 8 {
        return;
    }
    let inner = overlay
        .iter()
        .map(|l| l.chars().filter_map(|c| c.width()).sum::<usize>())
        .max()
        .unwrap_or(0)
        .min(width - 4);
    let mut boxed = vec![format!("+{}+", "-".repeat(inner + 2))];
    for line in overlay {
        let (text, used) = clip_to_width(line, inner);
        boxed.push(format!("| {text}{} |", " ".repeat(inner - used)));
    }
    boxed.push(format!("+{}+", "-".repeat(inner + 2)));

    let top = rows.len().saturating_sub(boxed.len()) / 2;
    let left = (width.saturating_sub(inner + 4)) / 2;
    for (i, line) in boxed.into_iter().enumerate() {
        if let Some(row) = rows.get_mut(top + i) {
            *row = format!(
                "{}{}{line}{ResetColor}",
                " ".repeat(left),
                SetAttribute(Attribute::Reverse)
            );
        }
    }
}
