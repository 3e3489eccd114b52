use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const RC_FILE_NAME: &str = ".pastesheetrc";
pub const BACKEND_ENV: &str = "PASTE_SHEET_BACKEND";

#[derive(Debug, Clone, PartialEq)]
pub struct RcConfig {
    pub default_directory: String,
    pub show_all_items: bool,
    pub content_lines: usize,
    pub date_format: String,
    pub backend_command: Option<String>,
    pub push_events: bool,
    pub poll_interval_secs: u64,
    pub request_timeout_ms: u64,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            default_directory: "Clipboard".to_string(),
            show_all_items: false,
            content_lines: 2,
            date_format: "%Y-%m-%d %H:%M".to_string(),
            backend_command: None,
            push_events: true,
            poll_interval_secs: 2,
            request_timeout_ms: 5000,
        }
    }
}

pub struct RcLoader;

impl RcLoader {
    /// Get the path to the RC file
    /// Looks for .pastesheetrc in:
    /// 1. Current directory
    /// 2. Home directory (~/.pastesheetrc)
    pub fn get_rc_path() -> Option<PathBuf> {
        let current_rc = Path::new(RC_FILE_NAME);
        if current_rc.exists() {
            return Some(current_rc.to_path_buf());
        }

        if let Some(home) = dirs::home_dir() {
            let home_rc = home.join(RC_FILE_NAME);
            if home_rc.exists() {
                return Some(home_rc);
            }
        }

        None
    }

    /// Load the RC file (explicit path first), then let the environment
    /// supply a backend command the file did not set.
    pub fn load_config(explicit: Option<&Path>) -> RcConfig {
        let mut config = RcConfig::default();

        let path = explicit.map(Path::to_path_buf).or_else(Self::get_rc_path);
        if let Some(rc_path) = path {
            match fs::read_to_string(&rc_path) {
                Ok(content) => {
                    debug!(path = %rc_path.display(), "Loading rc file");
                    Self::parse_config_content(&content, &mut config);
                }
                Err(e) => {
                    warn!(path = %rc_path.display(), error = %e, "Could not read rc file");
                }
            }
        }

        if config.backend_command.is_none() {
            if let Ok(command) = env::var(BACKEND_ENV) {
                if !command.trim().is_empty() {
                    config.backend_command = Some(command.trim().to_string());
                }
            }
        }

        config
    }

    /// Parse the content of an RC file
    fn parse_config_content(content: &str, config: &mut RcConfig) {
        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with('"') {
                continue;
            }

            Self::parse_config_line(line, config);
        }
    }

    fn parse_config_line(line: &str, config: &mut RcConfig) {
        // Backend commands may legitimately contain '#', so they skip comment stripping.
        let raw = line.strip_prefix("set ").unwrap_or(line).trim();
        if let Some(command) = raw.strip_prefix("backend=") {
            let command = command.trim();
            if !command.is_empty() {
                config.backend_command = Some(command.to_string());
            }
            return;
        }

        let line = if let Some(pos) = line.find('#') {
            &line[..pos]
        } else {
            line
        }
        .trim();

        if let Some(stripped) = line.strip_prefix("set ") {
            let setting = stripped.trim();
            match setting {
                "allitems" => config.show_all_items = true,
                "noallitems" => config.show_all_items = false,
                "events" => config.push_events = true,
                "noevents" => config.push_events = false,
                _ => {
                    if let Some((key, value)) = setting.split_once('=') {
                        Self::apply_key_value(key.trim(), value.trim(), config);
                    }
                }
            }
        } else if let Some((key, value)) = line.split_once('=') {
            Self::apply_key_value(key.trim(), value.trim(), config);
        }
    }

    fn apply_key_value(key: &str, value: &str, config: &mut RcConfig) {
        match key {
            "default_directory" | "defaultdir" => {
                if !value.is_empty() {
                    config.default_directory = value.to_string();
                }
            }
            "all_items" | "allitems" => {
                config.show_all_items = parse_bool(value).unwrap_or(config.show_all_items);
            }
            "content_lines" | "lines" => {
                if let Ok(lines) = value.parse::<usize>() {
                    if (1..=10).contains(&lines) {
                        config.content_lines = lines;
                    }
                }
            }
            "date_format" | "datefmt" => {
                if !value.is_empty() {
                    config.date_format = value.to_string();
                }
            }
            "events" => {
                config.push_events = parse_bool(value).unwrap_or(config.push_events);
            }
            "poll_interval" => {
                if let Ok(secs) = value.parse::<u64>() {
                    if secs > 0 {
                        config.poll_interval_secs = secs;
                    }
                }
            }
            "request_timeout_ms" | "timeout" => {
                if let Ok(ms) = value.parse::<u64>() {
                    if ms >= 100 {
                        config.request_timeout_ms = ms;
                    }
                }
            }
            _ => {} // Unknown setting, ignore
        }
    }

    /// Generate a sample RC file content
    pub fn generate_sample_rc() -> String {
        r#"# PasteSheet configuration file (.pastesheetrc)
# Lines starting with # or " are comments

# Folder that always sorts first and can never be renamed or deleted
default_directory=Clipboard

# Show the virtual "All Items" folder (or set noallitems)
set noallitems

# Item rows
content_lines=2
date_format=%Y-%m-%d %H:%M

# Backend host speaking JSON lines on stdin/stdout
# backend=pastesheet-host --stdio

# Set noevents if the host cannot push clipboard-updated events;
# the list is then polled every poll_interval seconds
set events
poll_interval=2
request_timeout_ms=5000
"#
        .to_string()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
