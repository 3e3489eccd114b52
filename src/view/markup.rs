/// Pure list rendering.
///
/// Both views are turned into a flat list of styled [`Line`]s. Lines that
/// belong to a selectable entry carry that entry's index, so the renderer
/// can keep the selection on screen and tests can inspect what was drawn
/// without a terminal.
use crate::cache::LoadState;
use crate::controller::selection::{ItemAction, Selection};
use crate::model::{ClipboardItem, Directory};
use crate::search::SearchState;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Dim,
    Title,
    Folder,
    Count,
    Memo,
    Highlight,
    Button,
    ButtonFocused,
    Input,
    Cursor,
    Placeholder,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
    pub entry: Option<usize>,
    pub selected: bool,
}

impl Line {
    pub fn plain(spans: Vec<Span>) -> Self {
        Self {
            spans,
            entry: None,
            selected: false,
        }
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Shown instead of a list body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    Loading,
    NoResults,
    Empty,
    Failed(String),
    Unavailable,
}

impl Placeholder {
    pub fn message(&self) -> String {
        match self {
            Placeholder::Loading => "Loading...".to_string(),
            Placeholder::NoResults => "No results".to_string(),
            Placeholder::Empty => "No items".to_string(),
            Placeholder::Failed(msg) => format!("Failed to load: {msg}"),
            Placeholder::Unavailable => "Not connected to the clipboard service".to_string(),
        }
    }

    fn line(&self) -> Line {
        let style = match self {
            Placeholder::Failed(_) => Style::Error,
            _ => Style::Placeholder,
        };
        Line::plain(vec![Span::new(format!("  {}", self.message()), style)])
    }
}

/// Where an open inline editor replaces or extends the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAnchor {
    /// Takes the place of entry `n`.
    Entry(usize),
    /// Replaces the view title.
    Title,
    BeforeList,
    AfterList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorMarkup {
    pub anchor: EditorAnchor,
    pub lines: Vec<Vec<Span>>,
}

/// A row of the directory view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryEntry<'a> {
    Folder(&'a Directory),
    NewFolder,
    Hit(&'a ClipboardItem),
}

/// Matching folders, then "New Folder" while the query is empty, then
/// matching items from every folder while it is not.
pub fn directory_entries<'a>(
    directories: &'a [Directory],
    all_items: &'a [ClipboardItem],
    search: &SearchState,
) -> Vec<DirectoryEntry<'a>> {
    let mut entries: Vec<DirectoryEntry<'a>> = search
        .filter_directories(directories)
        .into_iter()
        .map(DirectoryEntry::Folder)
        .collect();

    if search.is_active() {
        entries.extend(search.filter_items(all_items).into_iter().map(DirectoryEntry::Hit));
    } else {
        entries.push(DirectoryEntry::NewFolder);
    }
    entries
}

pub fn item_entries<'a>(items: &'a [ClipboardItem], search: &SearchState) -> Vec<&'a ClipboardItem> {
    search.filter_items(items)
}

/// Inputs shared by both list renderers.
pub struct ListContext<'a> {
    pub search: &'a SearchState,
    pub selection: &'a Selection,
    pub state: &'a LoadState,
    pub available: bool,
    pub content_lines: usize,
    pub date_format: &'a str,
    pub editor: Option<&'a EditorMarkup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    pub header: Line,
    pub lines: Vec<Line>,
    pub placeholder: Option<Placeholder>,
}

impl Markup {
    /// Entries drawn with the selection marker.
    pub fn selected_entries(&self) -> Vec<usize> {
        let mut entries: Vec<usize> = self
            .lines
            .iter()
            .filter(|l| l.selected)
            .filter_map(|l| l.entry)
            .collect();
        entries.dedup();
        entries
    }

    /// Number of distinct entries drawn.
    #[cfg(test)]
    pub fn entry_count(&self) -> usize {
        let mut entries: Vec<usize> = self.lines.iter().filter_map(|l| l.entry).collect();
        entries.dedup();
        entries.len()
    }

    /// First and last line index of `entry`.
    pub fn entry_span(&self, entry: usize) -> Option<(usize, usize)> {
        let first = self.lines.iter().position(|l| l.entry == Some(entry))?;
        let last = self.lines.iter().rposition(|l| l.entry == Some(entry))?;
        Some((first, last))
    }
}

fn body_placeholder(ctx: &ListContext, has_data: bool) -> Option<Placeholder> {
    if !ctx.available && !has_data {
        return Some(Placeholder::Unavailable);
    }
    match ctx.state {
        LoadState::Loading if !has_data => Some(Placeholder::Loading),
        LoadState::Failed(msg) if !has_data => Some(Placeholder::Failed(msg.clone())),
        _ => None,
    }
}

fn header_line(title: Vec<Span>, ctx: &ListContext) -> Line {
    if let Some(editor) = ctx.editor.filter(|e| e.anchor == EditorAnchor::Title) {
        let mut spans = vec![Span::new("Rename: ", Style::Dim)];
        spans.extend(editor.lines.first().cloned().unwrap_or_default());
        return Line::plain(spans);
    }
    if ctx.search.is_focused() || ctx.search.is_active() {
        let mut spans = vec![Span::new("Search: ", Style::Dim)];
        spans.push(Span::new(ctx.search.query(), Style::Input));
        if ctx.search.is_focused() {
            spans.push(Span::new(" ", Style::Cursor));
        }
        return Line::plain(spans);
    }
    Line::plain(title)
}

fn editor_lines(editor: &EditorMarkup, entry: Option<usize>) -> Vec<Line> {
    editor
        .lines
        .iter()
        .map(|spans| {
            let mut line = vec![Span::new("  ", Style::Plain)];
            line.extend(spans.iter().cloned());
            Line {
                spans: line,
                entry,
                selected: entry.is_some(),
            }
        })
        .collect()
}

fn editor_at(ctx: &ListContext, anchor: EditorAnchor) -> Option<Vec<Line>> {
    let editor = ctx.editor.filter(|e| e.anchor == anchor)?;
    let entry = match anchor {
        EditorAnchor::Entry(i) => Some(i),
        _ => None,
    };
    Some(editor_lines(editor, entry))
}

/// Split `text` into plain and highlighted spans.
pub fn highlight(text: &str, ranges: &[Range<usize>], base: Style) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;
    for range in ranges {
        if range.start > last {
            spans.push(Span::new(&text[last..range.start], base));
        }
        spans.push(Span::new(&text[range.clone()], Style::Highlight));
        last = range.end;
    }
    if last < text.len() || spans.is_empty() {
        spans.push(Span::new(&text[last..], base));
    }
    spans
}

fn marker(selected: bool) -> Span {
    if selected {
        Span::new("> ", Style::Title)
    } else {
        Span::new("  ", Style::Plain)
    }
}

fn tag(lines: Vec<Vec<Span>>, entry: usize, selected: bool) -> impl Iterator<Item = Line> {
    lines.into_iter().map(move |spans| Line {
        spans,
        entry: Some(entry),
        selected,
    })
}

/// Up to `max_lines` lines of `content`, the last one marked when cut.
fn content_preview(content: &str, max_lines: usize) -> Vec<String> {
    let all: Vec<String> = content.lines().map(|l| l.replace('\t', "    ")).collect();
    if all.is_empty() {
        return vec![String::new()];
    }
    let max_lines = max_lines.max(1);
    let mut shown: Vec<String> = all.iter().take(max_lines).cloned().collect();
    if all.len() > max_lines {
        if let Some(last) = shown.last_mut() {
            last.push_str(" ...");
        }
    }
    shown
}

fn hit_lines(item: &ClipboardItem, ctx: &ListContext, selected: bool) -> Vec<Vec<Span>> {
    let preview = content_preview(&item.content, 1).join("");
    let mut first = vec![marker(selected)];
    first.extend(highlight(&preview, &ctx.search.match_ranges(&preview), Style::Plain));
    first.push(Span::new(format!("  in {}", item.directory), Style::Dim));
    vec![first]
}

pub fn directories_markup(
    directories: &[Directory],
    all_items: &[ClipboardItem],
    ctx: &ListContext,
) -> Markup {
    let header = header_line(vec![Span::new("PasteSheet", Style::Title)], ctx);
    if let Some(placeholder) = body_placeholder(ctx, !directories.is_empty()) {
        return Markup {
            header,
            lines: vec![placeholder.line()],
            placeholder: Some(placeholder),
        };
    }

    let entries = directory_entries(directories, all_items, ctx.search);
    let mut lines = Vec::new();
    let mut hits_started = false;

    for (i, entry) in entries.iter().enumerate() {
        if let Some(editor) = editor_at(ctx, EditorAnchor::Entry(i)) {
            lines.extend(editor);
            continue;
        }
        let selected = ctx.selection.index() == Some(i);
        let spans = match entry {
            DirectoryEntry::Folder(dir) => {
                let style = if dir.is_aggregate() {
                    Style::Dim
                } else {
                    Style::Folder
                };
                let mut spans = vec![marker(selected)];
                spans.extend(highlight(&dir.name, &ctx.search.match_ranges(&dir.name), style));
                spans.push(Span::new(format!("  ({})", dir.count), Style::Count));
                vec![spans]
            }
            DirectoryEntry::NewFolder => vec![vec![marker(selected), Span::new("+ New Folder", Style::Dim)]],
            DirectoryEntry::Hit(item) => {
                if !hits_started {
                    hits_started = true;
                    lines.push(Line::plain(vec![Span::new("  Items", Style::Dim)]));
                }
                hit_lines(item, ctx, selected)
            }
        };
        lines.extend(tag(spans, i, selected));
    }

    if let Some(editor) = editor_at(ctx, EditorAnchor::AfterList) {
        lines.extend(editor);
    }

    let placeholder = entries.is_empty().then_some(Placeholder::NoResults);
    if let Some(p) = &placeholder {
        lines.push(p.line());
    }

    Markup {
        header,
        lines,
        placeholder,
    }
}

fn item_lines(item: &ClipboardItem, ctx: &ListContext, selected: bool) -> Vec<Vec<Span>> {
    let mut rows = Vec::new();

    if let Some(memo) = item.memo_text() {
        let mut spans = vec![marker(selected)];
        spans.extend(highlight(memo, &ctx.search.match_ranges(memo), Style::Memo));
        rows.push(spans);
    }

    for line in content_preview(&item.content, ctx.content_lines) {
        let lead = if rows.is_empty() {
            marker(selected)
        } else {
            Span::new("  ", Style::Plain)
        };
        let mut spans = vec![lead];
        spans.extend(highlight(&line, &ctx.search.match_ranges(&line), Style::Plain));
        rows.push(spans);
    }

    let mut meta = vec![
        Span::new("  ", Style::Plain),
        Span::new(
            format!("#{} {}   ", item.id, item.created_at_display(ctx.date_format)),
            Style::Dim,
        ),
    ];
    for (i, action) in ItemAction::ALL.iter().enumerate() {
        let style = if selected && ctx.selection.action_index() == i {
            Style::ButtonFocused
        } else {
            Style::Button
        };
        meta.push(Span::new(format!("[{}]", action.label()), style));
        meta.push(Span::new(" ", Style::Plain));
    }
    rows.push(meta);
    rows
}

pub fn items_markup(
    directory: &str,
    items: &[ClipboardItem],
    ctx: &ListContext,
) -> Markup {
    let title = vec![
        Span::new(directory, Style::Title),
        Span::new(format!("  ({})", items.len()), Style::Count),
    ];
    let header = header_line(title, ctx);

    if let Some(placeholder) = body_placeholder(ctx, !items.is_empty()) {
        return Markup {
            header,
            lines: vec![placeholder.line()],
            placeholder: Some(placeholder),
        };
    }

    let entries = item_entries(items, ctx.search);
    let mut lines = editor_at(ctx, EditorAnchor::BeforeList).unwrap_or_default();

    for (i, item) in entries.iter().enumerate() {
        if let Some(editor) = editor_at(ctx, EditorAnchor::Entry(i)) {
            lines.extend(editor);
            continue;
        }
        let selected = ctx.selection.index() == Some(i);
        lines.extend(tag(item_lines(item, ctx, selected), i, selected));
    }

    let placeholder = if !entries.is_empty() {
        None
    } else if ctx.search.is_active() {
        Some(Placeholder::NoResults)
    } else {
        Some(Placeholder::Empty)
    };
    if let Some(p) = &placeholder {
        lines.push(p.line());
    }

    Markup {
        header,
        lines,
        placeholder,
    }
}
