use super::{Backend, PushEvent, Request};
use crate::error::BridgeError;
use crate::model::{ClipboardItem, Directory};
use arboard::Clipboard;
use chrono::Local;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Store {
    default_directory: String,
    directories: Vec<String>,
    items: Vec<ClipboardItem>,
    next_id: i64,
    pasted: Vec<String>,
    invoked: Vec<&'static str>,
    window_visible: bool,
    events: VecDeque<PushEvent>,
}

/// In-process backend with the storage rules of the native host.
///
/// Clones share the same store, so a test can keep a handle while the
/// application owns the boxed backend.
#[derive(Clone)]
pub struct MemoryBackend {
    store: Rc<RefCell<Store>>,
    system_clipboard: bool,
}

impl MemoryBackend {
    pub fn new(default_directory: &str) -> Self {
        let store = Store {
            default_directory: default_directory.to_string(),
            directories: vec![default_directory.to_string()],
            next_id: 1,
            window_visible: true,
            ..Store::default()
        };
        Self {
            store: Rc::new(RefCell::new(store)),
            system_clipboard: false,
        }
    }

    /// Backend pre-filled with a few entries for `--demo`.
    pub fn seeded(default_directory: &str) -> Self {
        let backend = Self::new(default_directory);
        {
            let mut store = backend.store.borrow_mut();
            store.directories.push("Snippets".to_string());
            store.directories.push("Work".to_string());
            let seed = [
                ("git log --oneline --graph", "Snippets", Some("pretty log")),
                ("https://doc.rust-lang.org/std/", default_directory, None),
                ("Meeting moved to 3pm", "Work", Some("calendar")),
                ("SELECT * FROM paste_sheets ORDER BY created_at DESC;", "Snippets", None),
                ("Hello from the clipboard", default_directory, None),
            ];
            for (content, directory, memo) in seed {
                store.insert(content, directory, memo.map(str::to_string));
            }
        }
        backend
    }

    /// Copy pasted text to the system clipboard as well.
    pub fn with_system_clipboard(mut self) -> Self {
        self.system_clipboard = true;
        self
    }

    /// Simulate a clipboard capture by the native side.
    #[cfg(test)]
    pub fn capture(&self, content: &str) {
        let mut store = self.store.borrow_mut();
        let directory = store.default_directory.clone();
        store.insert(content, &directory, None);
        store.events.push_back(PushEvent::ClipboardUpdated);
    }

    #[cfg(test)]
    pub fn pasted(&self) -> Vec<String> {
        self.store.borrow().pasted.clone()
    }

    #[cfg(test)]
    pub fn invoked(&self) -> Vec<&'static str> {
        self.store.borrow().invoked.clone()
    }

    #[cfg(test)]
    pub fn items(&self) -> Vec<ClipboardItem> {
        self.store.borrow().listed_items()
    }

    #[cfg(test)]
    pub fn directory_names(&self) -> Vec<String> {
        self.store.borrow().directories.clone()
    }

    #[cfg(test)]
    pub fn window_visible(&self) -> bool {
        self.store.borrow().window_visible
    }

    fn copy_to_system_clipboard(&self, text: &str) {
        match Clipboard::new().and_then(|mut c| c.set_text(text.to_string())) {
            Ok(()) => debug!(len = text.len(), "Copied to system clipboard"),
            Err(e) => warn!(error = %e, "System clipboard unavailable"),
        }
    }
}

impl Store {
    fn insert(&mut self, content: &str, directory: &str, memo: Option<String>) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(ClipboardItem {
            id,
            content: content.to_string(),
            directory: directory.to_string(),
            memo,
            created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        });
        id
    }

    /// Newest first; ids break ties within the same second.
    fn listed_items(&self) -> Vec<ClipboardItem> {
        let mut items = self.items.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items
    }

    fn has_directory(&self, name: &str) -> bool {
        self.directories.iter().any(|d| d == name)
    }

    fn item_mut(&mut self, id: i64) -> Option<&mut ClipboardItem> {
        self.items.iter_mut().find(|it| it.id == id)
    }
}

fn reject(request: &Request, message: &str) -> BridgeError {
    BridgeError::rejected(request.name(), message)
}

impl Backend for MemoryBackend {
    fn invoke(&mut self, request: &Request) -> Result<Value, BridgeError> {
        let mut store = self.store.borrow_mut();
        store.invoked.push(request.name());

        match request {
            Request::GetDirectories => {
                let dirs: Vec<Directory> = store
                    .directories
                    .iter()
                    .map(|name| {
                        let count = store.items.iter().filter(|it| &it.directory == name).count();
                        Directory::new(name.clone(), count)
                    })
                    .collect();
                Ok(serde_json::to_value(dirs)?)
            }
            Request::GetClipboardHistory => Ok(serde_json::to_value(store.listed_items())?),
            Request::CreateDirectory { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(reject(request, "Directory name cannot be empty"));
                }
                if store.has_directory(name) {
                    return Err(reject(request, &format!("Directory \"{name}\" already exists")));
                }
                store.directories.push(name.to_string());
                Ok(Value::Null)
            }
            Request::RenameDirectory { old_name, new_name } => {
                let (old_name, new_name) = (old_name.trim(), new_name.trim());
                if old_name == store.default_directory || new_name == store.default_directory {
                    return Err(reject(request, "The default directory cannot be renamed"));
                }
                if new_name.is_empty() {
                    return Err(reject(request, "Directory name cannot be empty"));
                }
                if store.has_directory(new_name) {
                    return Err(reject(request, &format!("Directory \"{new_name}\" already exists")));
                }
                let Some(slot) = store.directories.iter_mut().find(|d| *d == old_name) else {
                    return Err(reject(request, &format!("No directory named \"{old_name}\"")));
                };
                *slot = new_name.to_string();
                for item in store.items.iter_mut().filter(|it| it.directory == old_name) {
                    item.directory = new_name.to_string();
                }
                Ok(Value::Null)
            }
            Request::DeleteDirectory { name } => {
                if *name == store.default_directory {
                    return Err(reject(request, "The default directory cannot be deleted"));
                }
                store.items.retain(|it| &it.directory != name);
                store.directories.retain(|d| d != name);
                Ok(Value::Null)
            }
            Request::CreateHistoryItem {
                content,
                directory,
                memo,
            } => {
                if !store.has_directory(directory) {
                    store.directories.push(directory.clone());
                }
                let id = store.insert(content, directory, memo.clone());
                Ok(json!({ "id": id }))
            }
            Request::UpdateHistoryItem {
                id,
                content,
                directory,
                memo,
            } => {
                let created_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
                let Some(item) = store.item_mut(*id) else {
                    return Err(reject(request, &format!("No item with id {id}")));
                };
                item.content = content.clone();
                item.directory = directory.clone();
                item.memo = memo.clone();
                item.created_at = created_at;
                Ok(Value::Null)
            }
            Request::DeleteHistoryItem { id } => {
                let before = store.items.len();
                store.items.retain(|it| it.id != *id);
                if store.items.len() == before {
                    return Err(reject(request, &format!("No item with id {id}")));
                }
                Ok(Value::Null)
            }
            Request::PasteText { text } => {
                store.pasted.push(text.clone());
                drop(store);
                if self.system_clipboard {
                    self.copy_to_system_clipboard(text);
                }
                Ok(Value::Null)
            }
            Request::ToggleMainWindow => {
                store.window_visible = !store.window_visible;
                let visible = store.window_visible;
                store.events.push_back(PushEvent::WindowVisible(visible));
                Ok(Value::Null)
            }
        }
    }

    fn try_next_event(&mut self) -> Option<PushEvent> {
        self.store.borrow_mut().events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MemoryBackend {
        MemoryBackend::new("Clipboard")
    }

    #[test]
    fn test_directory_counts_follow_items() {
        let mut b = backend();
        b.invoke(&Request::CreateDirectory { name: "Work".into() }).unwrap();
        b.invoke(&Request::CreateHistoryItem {
            content: "a".into(),
            directory: "Work".into(),
            memo: None,
        })
        .unwrap();
        let dirs: Vec<Directory> =
            serde_json::from_value(b.invoke(&Request::GetDirectories).unwrap()).unwrap();
        assert_eq!(dirs, vec![Directory::new("Clipboard", 0), Directory::new("Work", 1)]);
    }

    #[test]
    fn test_duplicate_directory_rejected() {
        let mut b = backend();
        let err = b
            .invoke(&Request::CreateDirectory { name: "Clipboard".into() })
            .unwrap_err();
        assert!(matches!(err, BridgeError::Rejected { .. }));
    }

    #[test]
    fn test_rename_moves_items() {
        let mut b = backend();
        b.invoke(&Request::CreateDirectory { name: "X".into() }).unwrap();
        b.invoke(&Request::CreateHistoryItem {
            content: "a".into(),
            directory: "X".into(),
            memo: None,
        })
        .unwrap();
        b.invoke(&Request::RenameDirectory {
            old_name: "X".into(),
            new_name: "Y".into(),
        })
        .unwrap();
        assert_eq!(b.directory_names(), vec!["Clipboard", "Y"]);
        assert_eq!(b.items()[0].directory, "Y");
    }

    #[test]
    fn test_default_directory_is_protected() {
        let mut b = backend();
        assert!(b.invoke(&Request::DeleteDirectory { name: "Clipboard".into() }).is_err());
        assert!(
            b.invoke(&Request::RenameDirectory {
                old_name: "Clipboard".into(),
                new_name: "Other".into(),
            })
            .is_err()
        );
    }

    #[test]
    fn test_delete_directory_drops_its_items() {
        let mut b = backend();
        b.invoke(&Request::CreateDirectory { name: "Tmp".into() }).unwrap();
        b.invoke(&Request::CreateHistoryItem {
            content: "gone".into(),
            directory: "Tmp".into(),
            memo: None,
        })
        .unwrap();
        b.invoke(&Request::DeleteDirectory { name: "Tmp".into() }).unwrap();
        assert!(b.items().is_empty());
        assert_eq!(b.directory_names(), vec!["Clipboard"]);
    }

    #[test]
    fn test_unknown_item_id_rejected() {
        let mut b = backend();
        assert!(b.invoke(&Request::DeleteHistoryItem { id: 99 }).is_err());
        assert!(
            b.invoke(&Request::UpdateHistoryItem {
                id: 99,
                content: "x".into(),
                directory: "Clipboard".into(),
                memo: None,
            })
            .is_err()
        );
    }

    #[test]
    fn test_items_listed_newest_first() {
        let b = backend();
        b.capture("first");
        b.capture("second");
        let contents: Vec<String> = b.items().into_iter().map(|it| it.content).collect();
        assert_eq!(contents, vec!["second", "first"]);
    }

    #[test]
    fn test_capture_queues_clipboard_event() {
        let mut b = backend();
        b.capture("copied");
        assert_eq!(b.try_next_event(), Some(PushEvent::ClipboardUpdated));
        assert_eq!(b.try_next_event(), None);
    }

    #[test]
    fn test_paste_records_text_and_toggle_flips_visibility() {
        let mut b = backend();
        b.invoke(&Request::PasteText { text: "hi".into() }).unwrap();
        b.invoke(&Request::ToggleMainWindow).unwrap();
        assert_eq!(b.pasted(), vec!["hi"]);
        assert!(!b.window_visible());
        assert_eq!(b.invoked(), vec!["paste_text", "toggle_main_window"]);
    }
}
