/// Backend bridge - the only path from the UI to the native backend
///
/// Commands are typed `Request`s that serialize to the
/// `{"command": ..., "args": {...}}` shape the host expects. The bridge is
/// resolved once at startup; without a host it stays `Unavailable` and every
/// call fails fast with `BridgeError::Unavailable`.

pub mod memory;
pub mod process;

pub use memory::MemoryBackend;
pub use process::ProcessBackend;

use crate::config::RcConfig;
use crate::error::BridgeError;
use crate::model::{ClipboardItem, Directory};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum Request {
    GetDirectories,
    GetClipboardHistory,
    CreateDirectory {
        name: String,
    },
    RenameDirectory {
        #[serde(rename = "oldName")]
        old_name: String,
        #[serde(rename = "newName")]
        new_name: String,
    },
    DeleteDirectory {
        name: String,
    },
    CreateHistoryItem {
        content: String,
        directory: String,
        memo: Option<String>,
    },
    UpdateHistoryItem {
        id: i64,
        content: String,
        directory: String,
        memo: Option<String>,
    },
    DeleteHistoryItem {
        id: i64,
    },
    PasteText {
        text: String,
    },
    ToggleMainWindow,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::GetDirectories => "get_directories",
            Request::GetClipboardHistory => "get_clipboard_history",
            Request::CreateDirectory { .. } => "create_directory",
            Request::RenameDirectory { .. } => "rename_directory",
            Request::DeleteDirectory { .. } => "delete_directory",
            Request::CreateHistoryItem { .. } => "create_history_item",
            Request::UpdateHistoryItem { .. } => "update_history_item",
            Request::DeleteHistoryItem { .. } => "delete_history_item",
            Request::PasteText { .. } => "paste_text",
            Request::ToggleMainWindow => "toggle_main_window",
        }
    }

    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Request::CreateDirectory { .. }
                | Request::RenameDirectory { .. }
                | Request::DeleteDirectory { .. }
                | Request::CreateHistoryItem { .. }
                | Request::UpdateHistoryItem { .. }
                | Request::DeleteHistoryItem { .. }
        )
    }
}

/// Notifications pushed by the backend outside any request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    ClipboardUpdated,
    WindowVisible(bool),
    WindowFocused,
}

impl PushEvent {
    /// Map a wire event name and payload; unknown events are ignored.
    pub fn from_wire(name: &str, payload: &Value) -> Option<Self> {
        match name {
            "clipboard-updated" => Some(PushEvent::ClipboardUpdated),
            "window-visible" => Some(PushEvent::WindowVisible(
                payload.as_bool().unwrap_or(true),
            )),
            "window-focus" | "window-focused" => Some(PushEvent::WindowFocused),
            _ => None,
        }
    }
}

pub trait Backend {
    fn invoke(&mut self, request: &Request) -> Result<Value, BridgeError>;

    /// Next queued push event, without blocking.
    fn try_next_event(&mut self) -> Option<PushEvent>;

    /// Whether this backend delivers `ClipboardUpdated` on its own. When it
    /// does not, the UI falls back to polling.
    fn pushes_events(&self) -> bool {
        true
    }
}

pub struct Bridge {
    backend: Option<Box<dyn Backend>>,
}

impl Bridge {
    pub fn connected(backend: Box<dyn Backend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    /// Probe the host environment: `--demo`, then a configured host command.
    pub fn resolve(config: &RcConfig, demo: bool) -> Self {
        if demo {
            info!(backend = "memory", "Using seeded demo backend");
            return Self::connected(Box::new(
                MemoryBackend::seeded(&config.default_directory).with_system_clipboard(),
            ));
        }

        let Some(command) = config.backend_command.as_deref() else {
            warn!("No backend host configured, running read-only");
            return Self::unavailable();
        };

        match ProcessBackend::spawn(command, config.request_timeout_ms, config.push_events) {
            Ok(backend) => {
                info!(backend = command, "Connected to backend host");
                Self::connected(Box::new(backend))
            }
            Err(e) => {
                warn!(backend = command, error = %e, "Backend host failed to start, running read-only");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn pushes_events(&self) -> bool {
        self.backend.as_ref().is_some_and(|b| b.pushes_events())
    }

    pub fn invoke(&mut self, request: &Request) -> Result<Value, BridgeError> {
        let backend = self.backend.as_mut().ok_or(BridgeError::Unavailable)?;
        debug!(command = request.name(), "invoke");
        let result = backend.invoke(request);
        match result {
            Ok(_) if request.is_mutation() => {
                info!(command = request.name(), "Backend state changed");
            }
            Ok(_) => {}
            Err(ref e) => {
                warn!(command = request.name(), error = %e, "Backend command failed");
            }
        }
        result
    }

    pub fn try_next_event(&mut self) -> Option<PushEvent> {
        self.backend.as_mut().and_then(|b| b.try_next_event())
    }

    fn call<T: DeserializeOwned>(&mut self, request: Request) -> Result<T, BridgeError> {
        let value = self.invoke(&request)?;
        Ok(serde_json::from_value(value)?)
    }

    fn call_unit(&mut self, request: Request) -> Result<(), BridgeError> {
        self.invoke(&request).map(|_| ())
    }

    pub fn get_directories(&mut self) -> Result<Vec<Directory>, BridgeError> {
        self.call(Request::GetDirectories)
    }

    pub fn get_clipboard_history(&mut self) -> Result<Vec<ClipboardItem>, BridgeError> {
        self.call(Request::GetClipboardHistory)
    }

    pub fn create_directory(&mut self, name: &str) -> Result<(), BridgeError> {
        self.call_unit(Request::CreateDirectory {
            name: name.to_string(),
        })
    }

    pub fn rename_directory(&mut self, old_name: &str, new_name: &str) -> Result<(), BridgeError> {
        self.call_unit(Request::RenameDirectory {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        })
    }

    pub fn delete_directory(&mut self, name: &str) -> Result<(), BridgeError> {
        self.call_unit(Request::DeleteDirectory {
            name: name.to_string(),
        })
    }

    pub fn create_history_item(
        &mut self,
        content: &str,
        directory: &str,
        memo: Option<&str>,
    ) -> Result<(), BridgeError> {
        self.call_unit(Request::CreateHistoryItem {
            content: content.to_string(),
            directory: directory.to_string(),
            memo: memo.map(str::to_string),
        })
    }

    pub fn update_history_item(
        &mut self,
        id: i64,
        content: &str,
        directory: &str,
        memo: Option<&str>,
    ) -> Result<(), BridgeError> {
        self.call_unit(Request::UpdateHistoryItem {
            id,
            content: content.to_string(),
            directory: directory.to_string(),
            memo: memo.map(str::to_string),
        })
    }

    pub fn delete_history_item(&mut self, id: i64) -> Result<(), BridgeError> {
        self.call_unit(Request::DeleteHistoryItem { id })
    }

    pub fn paste_text(&mut self, text: &str) -> Result<(), BridgeError> {
        self.call_unit(Request::PasteText {
            text: text.to_string(),
        })
    }

    pub fn toggle_main_window(&mut self) -> Result<(), BridgeError> {
        self.call_unit(Request::ToggleMainWindow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let req = Request::RenameDirectory {
            old_name: "X".into(),
            new_name: "Y".into(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"command": "rename_directory", "args": {"oldName": "X", "newName": "Y"}})
        );
        assert_eq!(
            serde_json::to_value(Request::GetDirectories).unwrap(),
            json!({"command": "get_directories"})
        );
    }

    #[test]
    fn test_request_names_match_wire_tags() {
        let requests = [
            Request::GetClipboardHistory,
            Request::DeleteHistoryItem { id: 4 },
            Request::PasteText { text: "a".into() },
            Request::ToggleMainWindow,
        ];
        for req in requests {
            let value = serde_json::to_value(&req).unwrap();
            assert_eq!(value["command"], req.name());
        }
    }

    #[test]
    fn test_unavailable_bridge_fails_fast() {
        let mut bridge = Bridge::unavailable();
        assert!(!bridge.is_available());
        assert!(matches!(
            bridge.get_directories(),
            Err(BridgeError::Unavailable)
        ));
        assert_eq!(bridge.try_next_event(), None);
    }

    #[test]
    fn test_push_event_from_wire() {
        assert_eq!(
            PushEvent::from_wire("clipboard-updated", &Value::Null),
            Some(PushEvent::ClipboardUpdated)
        );
        assert_eq!(
            PushEvent::from_wire("window-visible", &json!(false)),
            Some(PushEvent::WindowVisible(false))
        );
        assert_eq!(PushEvent::from_wire("something-else", &Value::Null), None);
    }
}
