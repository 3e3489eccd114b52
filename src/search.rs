use crate::model::{ClipboardItem, Directory};
use regex::Regex;
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    InvalidPattern(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::InvalidPattern(e) => write!(f, "Invalid search pattern: {e}"),
        }
    }
}

impl std::error::Error for SearchError {}

/// Search field of one view: the typed query, whether the field has focus,
/// and the compiled case-insensitive literal matcher.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    focused: bool,
    regex: Option<Regex>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn set_query(&mut self, query: &str) -> Result<(), SearchError> {
        self.query = query.to_string();
        if query.is_empty() {
            self.regex = None;
            return Ok(());
        }

        // Escape special regex characters for literal search
        let regex_str = format!("(?i){}", regex::escape(query));
        match Regex::new(&regex_str) {
            Ok(regex) => {
                self.regex = Some(regex);
                Ok(())
            }
            Err(e) => {
                self.regex = None;
                Err(SearchError::InvalidPattern(e.to_string()))
            }
        }
    }

    pub fn push_char(&mut self, c: char) -> Result<(), SearchError> {
        let mut query = self.query.clone();
        query.push(c);
        self.set_query(&query)
    }

    pub fn pop_char(&mut self) -> Result<(), SearchError> {
        let mut query = self.query.clone();
        query.pop();
        self.set_query(&query)
    }

    /// Empty the query and drop focus.
    pub fn clear(&mut self) {
        self.query.clear();
        self.regex = None;
        self.focused = false;
    }

    pub fn matches(&self, text: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(text),
            None => true,
        }
    }

    /// Byte ranges of every match, for highlighting.
    pub fn match_ranges(&self, text: &str) -> Vec<Range<usize>> {
        match &self.regex {
            Some(regex) => regex.find_iter(text).map(|m| m.range()).collect(),
            None => Vec::new(),
        }
    }

    pub fn matches_item(&self, item: &ClipboardItem) -> bool {
        self.matches(&item.content) || item.memo.as_deref().is_some_and(|m| self.matches(m))
    }

    pub fn filter_directories<'a>(&self, directories: &'a [Directory]) -> Vec<&'a Directory> {
        directories.iter().filter(|d| self.matches(&d.name)).collect()
    }

    pub fn filter_items<'a>(&self, items: &'a [ClipboardItem]) -> Vec<&'a ClipboardItem> {
        items.iter().filter(|it| self.matches_item(it)).collect()
    }
}
