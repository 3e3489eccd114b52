/// Value records exchanged with the backend.
///
/// The front end only ever holds disposable copies of these; ids and
/// timestamps are always assigned by the backend.
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Name of the virtual aggregate over every stored item.
pub const ALL_ITEMS: &str = "All Items";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardItem {
    pub id: i64,
    pub content: String,
    pub directory: String,
    #[serde(default)]
    pub memo: Option<String>,
    pub created_at: String,
}

impl ClipboardItem {
    /// Memo text if present and not blank.
    pub fn memo_text(&self) -> Option<&str> {
        self.memo.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    pub fn belongs_to(&self, directory: &str) -> bool {
        same_name(&self.directory, directory)
    }

    /// Format `created_at` with a chrono format string, falling back to the
    /// raw backend value when it cannot be parsed.
    pub fn created_at_display(&self, format: &str) -> String {
        let raw = self.created_at.trim();
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return parsed.format(format).to_string();
        }
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return parsed.format(format).to_string();
        }
        raw.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub name: String,
    #[serde(default)]
    pub count: usize,
}

impl Directory {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        is_aggregate(&self.name)
    }
}

/// Case-insensitive name comparison used for directory matching.
pub fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub fn is_aggregate(name: &str) -> bool {
    same_name(name, ALL_ITEMS)
}
