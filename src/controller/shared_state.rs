use crate::bridge::Bridge;
use crate::cache::DataCache;
use crate::config::RcConfig;
use crate::controller::command_types::{ActiveView, Command};
use crate::controller::inline_editor::{EditorKind, EditorOutcome, InlineEditor};
use crate::controller::overlay::{Overlay, OverlayOutcome};
use crate::controller::selection::{ActionMove, ItemAction, Selection};
use crate::error::{AppError, BridgeError, GuardError};
use crate::model::{ClipboardItem, is_aggregate, same_name};
use crate::search::SearchState;
use crate::view::markup::{self, DirectoryEntry, EditorAnchor};
use crossterm::event::KeyEvent;
use tracing::{debug, error, info, warn};

/// Result of handling a key event in a view controller
#[derive(Debug, PartialEq)]
pub enum Transition {
    Stay,
    /// The window was hidden; the session ends.
    Hide,
    Quit,
}

/// Trait that both list controllers implement
pub trait ViewController {
    fn handle_key(&mut self, key_event: KeyEvent, shared: &mut SharedAppState) -> Transition;
}

/// Owned copy of the selected directory-view row.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryTarget {
    Folder(usize, String),
    NewFolder,
    Hit(ClipboardItem),
}

/// All mutable interaction state. Controllers only change it through the
/// methods below.
pub struct SharedAppState {
    pub bridge: Bridge,
    pub cache: DataCache,
    pub config: RcConfig,
    pub active_view: ActiveView,
    pub current_directory: Option<String>,
    pub directory_selection: Selection,
    pub item_selection: Selection,
    pub directory_search: SearchState,
    pub item_search: SearchState,
    pub editor: Option<InlineEditor>,
    pub overlay: Option<Overlay>,
    pub status_message: String,
    /// A push refresh arrived while an editor or overlay was open.
    pub deferred_refresh: bool,
    /// Request a full repaint on the next frame.
    pub redraw_requested: bool,
    pending_directories: bool,
    pending_items: bool,
}

impl SharedAppState {
    pub fn new(bridge: Bridge, config: RcConfig) -> Self {
        let status_message = if bridge.is_available() {
            String::new()
        } else {
            BridgeError::Unavailable.user_message()
        };
        Self {
            cache: DataCache::new(&config.default_directory, config.show_all_items),
            bridge,
            config,
            active_view: ActiveView::Directories,
            current_directory: None,
            directory_selection: Selection::new(),
            item_selection: Selection::new(),
            directory_search: SearchState::new(),
            item_search: SearchState::new(),
            editor: None,
            overlay: None,
            status_message,
            deferred_refresh: false,
            redraw_requested: false,
            pending_directories: true,
            pending_items: false,
        }
    }

    /// An editor or overlay owns the keyboard.
    pub fn is_busy(&self) -> bool {
        self.editor.is_some() || self.overlay.is_some()
    }

    pub fn search(&self) -> &SearchState {
        match self.active_view {
            ActiveView::Directories => &self.directory_search,
            ActiveView::Items => &self.item_search,
        }
    }

    fn search_mut(&mut self) -> &mut SearchState {
        match self.active_view {
            ActiveView::Directories => &mut self.directory_search,
            ActiveView::Items => &mut self.item_search,
        }
    }

    pub fn selection(&self) -> &Selection {
        match self.active_view {
            ActiveView::Directories => &self.directory_selection,
            ActiveView::Items => &self.item_selection,
        }
    }

    fn selection_mut(&mut self) -> &mut Selection {
        match self.active_view {
            ActiveView::Directories => &mut self.directory_selection,
            ActiveView::Items => &mut self.item_selection,
        }
    }

    pub fn directory_entries(&self) -> Vec<DirectoryEntry<'_>> {
        markup::directory_entries(
            self.cache.directories(),
            self.cache.all_items(),
            &self.directory_search,
        )
    }

    pub fn visible_items(&self) -> Vec<&ClipboardItem> {
        markup::item_entries(self.cache.items(), &self.item_search)
    }

    /// Rows of the active view, as rendered.
    pub fn entry_count(&self) -> usize {
        match self.active_view {
            ActiveView::Directories => self.directory_entries().len(),
            ActiveView::Items => self.visible_items().len(),
        }
    }

    pub fn selected_directory_target(&self) -> Option<DirectoryTarget> {
        let index = self.directory_selection.index()?;
        let entries = self.directory_entries();
        Some(match entries.get(index)? {
            DirectoryEntry::Folder(dir) => DirectoryTarget::Folder(index, dir.name.clone()),
            DirectoryEntry::NewFolder => DirectoryTarget::NewFolder,
            DirectoryEntry::Hit(item) => DirectoryTarget::Hit((*item).clone()),
        })
    }

    pub fn selected_item(&self) -> Option<(usize, ClipboardItem)> {
        let index = self.item_selection.index()?;
        let item = self.visible_items().get(index).map(|it| (*it).clone())?;
        Some((index, item))
    }

    // Selection

    /// Select entry `index` of the active view, discarding any open edit.
    pub fn select(&mut self, index: usize) -> bool {
        self.editor = None;
        let len = self.entry_count();
        self.selection_mut().select(index, len)
    }

    pub fn move_selection(&mut self, forward: bool) {
        self.editor = None;
        let len = self.entry_count();
        let selection = self.selection_mut();
        if forward {
            selection.next(len);
        } else {
            selection.prev(len);
        }
    }

    pub fn move_to_edge(&mut self, last: bool) {
        let len = self.entry_count();
        if len > 0 {
            self.select(if last { len - 1 } else { 0 });
        }
    }

    /// Moves the item action cursor. Returns true when it ran past Paste and
    /// the directory list was shown instead.
    pub fn move_action_cursor(&mut self, delta: isize) -> bool {
        if self.active_view != ActiveView::Items || self.item_selection.index().is_none() {
            return false;
        }
        match self.item_selection.move_action(delta) {
            ActionMove::Moved => false,
            ActionMove::PastStart => {
                self.show_directories();
                true
            }
        }
    }

    // Search

    pub fn search_input(&mut self, command: &Command) {
        let search = self.search_mut();
        search.focus();
        let result = match command {
            Command::SearchInput(c) => search.push_char(*c),
            Command::SearchBackspace => search.pop_char(),
            _ => return,
        };
        if let Err(e) = result {
            warn!(error = %e, "Search pattern rejected");
        }
        self.refilter();
    }

    pub fn blur_search(&mut self) {
        self.search_mut().blur();
    }

    pub fn clear_search(&mut self) {
        self.search_mut().clear();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.editor = None;
        let len = self.entry_count();
        self.selection_mut().reset(len);
    }

    // View switching

    pub fn open_directory(&mut self, name: &str) {
        info!(directory = name, "Opening directory");
        self.current_directory = Some(name.to_string());
        self.item_search.clear();
        self.editor = None;
        self.item_selection.clear();
        self.active_view = ActiveView::Items;
        self.cache.mark_items_loading(name);
        self.pending_items = true;
    }

    pub fn show_directories(&mut self) {
        self.active_view = ActiveView::Directories;
        self.directory_search.clear();
        self.editor = None;
        let len = self.entry_count();
        if self.directory_selection.index().is_none() {
            self.directory_selection.reset(len);
        } else {
            self.directory_selection.clamp(len);
        }
    }

    /// Title of the active view.
    pub fn title(&self) -> String {
        match self.active_view {
            ActiveView::Directories => "PasteSheet".to_string(),
            ActiveView::Items => self.current_directory.clone().unwrap_or_default(),
        }
    }

    // Loading

    pub fn has_pending_loads(&self) -> bool {
        self.pending_directories || self.pending_items
    }

    /// Run fetches queued by navigation, after their loading state was drawn.
    pub fn run_pending_loads(&mut self) {
        if std::mem::take(&mut self.pending_directories) {
            let result = self.reload_directories();
            self.note_load_failure(result);
        }
        if std::mem::take(&mut self.pending_items) {
            let result = self.reload_items();
            self.note_load_failure(result);
        }
    }

    fn note_load_failure(&mut self, result: Result<(), BridgeError>) {
        match result {
            Ok(()) | Err(BridgeError::Unavailable) => {}
            Err(e) => {
                error!(error = %e, "Load failed");
                self.status_message = format!("Failed to load: {}", e.user_message());
            }
        }
    }

    pub fn reload_directories(&mut self) -> Result<(), BridgeError> {
        let result = self.cache.reload_directories(&mut self.bridge);
        let len = self.directory_entries().len();
        match result {
            Ok(()) => self.directory_selection.reset(len),
            Err(_) => self.directory_selection.clamp(len),
        }
        result
    }

    pub fn reload_items(&mut self) -> Result<(), BridgeError> {
        let Some(directory) = self.current_directory.clone() else {
            return Ok(());
        };
        let result = self.cache.reload_items(&mut self.bridge, &directory);
        let len = self.visible_items().len();
        match result {
            Ok(()) => self.item_selection.reset(len),
            Err(_) => self.item_selection.clamp(len),
        }
        result
    }

    /// Reaction to a clipboard-change push: reload everything now, or once
    /// the open editor or overlay closes.
    pub fn refresh_all(&mut self) {
        if self.is_busy() {
            debug!("Refresh deferred until the editor closes");
            self.deferred_refresh = true;
            return;
        }
        self.deferred_refresh = false;
        let result = self.reload_directories();
        self.note_load_failure(result);
        if self.active_view == ActiveView::Items {
            let result = self.reload_items();
            self.note_load_failure(result);
        }
    }

    pub fn flush_deferred_refresh(&mut self) {
        if self.deferred_refresh && !self.is_busy() {
            self.refresh_all();
        }
    }

    // Errors

    /// Route a failed action to the user: guards and missing backend go to
    /// the status line, backend rejections to a blocking alert.
    pub fn report(&mut self, err: AppError) {
        match err {
            AppError::Guard(e) => {
                info!(reason = %e, "Action refused");
                self.status_message = e.to_string();
            }
            AppError::Bridge(BridgeError::Unavailable) => {
                self.status_message = BridgeError::Unavailable.user_message();
            }
            other => {
                error!(error = %other, "Action failed");
                self.overlay = Some(Overlay::alert(other.user_message()));
            }
        }
    }

    fn require_backend(&self) -> Result<(), BridgeError> {
        if self.bridge.is_available() {
            Ok(())
        } else {
            Err(BridgeError::Unavailable)
        }
    }

    fn guard_mutable_directory(&self, name: &str) -> Result<(), GuardError> {
        if name.trim().is_empty() {
            return Err(GuardError::NoTarget);
        }
        if self.cache.is_protected(name) {
            return Err(GuardError::ProtectedDirectory(name.to_string()));
        }
        Ok(())
    }

    /// Both lists are refreshed even when the first reload fails.
    fn reload_after_mutation(&mut self, items: bool) -> Result<(), AppError> {
        let items_result = if items { self.reload_items() } else { Ok(()) };
        let directories_result = self.reload_directories();
        Ok(items_result.and(directories_result)?)
    }

    // Directory actions

    pub fn begin_rename_directory(&mut self) -> Result<(), AppError> {
        let (name, anchor) = match self.active_view {
            ActiveView::Directories => match self.selected_directory_target() {
                Some(DirectoryTarget::Folder(index, name)) => (name, EditorAnchor::Entry(index)),
                _ => return Err(GuardError::NoTarget.into()),
            },
            ActiveView::Items => {
                let name = self.current_directory.clone().ok_or(GuardError::NoTarget)?;
                (name, EditorAnchor::Title)
            }
        };
        self.guard_mutable_directory(&name)?;
        self.require_backend()?;
        self.editor = Some(InlineEditor::rename_directory(&name, anchor));
        Ok(())
    }

    pub fn request_delete_directory(&mut self) -> Result<(), AppError> {
        let Some(DirectoryTarget::Folder(_, name)) = self.selected_directory_target() else {
            return Err(GuardError::NoTarget.into());
        };
        self.guard_mutable_directory(&name)?;
        self.require_backend()?;
        self.overlay = Some(Overlay::ConfirmDeleteDirectory { name });
        Ok(())
    }

    pub fn delete_directory(&mut self, name: &str) -> Result<(), AppError> {
        self.guard_mutable_directory(name)?;
        self.bridge.delete_directory(name)?;
        if self
            .current_directory
            .as_deref()
            .is_some_and(|open| same_name(open, name))
        {
            self.current_directory = None;
        }
        self.status_message = format!("Deleted folder \"{name}\"");
        self.reload_after_mutation(false)
    }

    pub fn begin_create_directory(&mut self) -> Result<(), AppError> {
        self.require_backend()?;
        self.editor = Some(InlineEditor::create_directory());
        Ok(())
    }

    // Item actions

    pub fn begin_create_item(&mut self) -> Result<(), AppError> {
        let open = self.current_directory.clone().ok_or(GuardError::NoTarget)?;
        self.require_backend()?;
        let directory = if is_aggregate(&open) {
            self.cache.default_directory().to_string()
        } else {
            open
        };
        self.editor = Some(InlineEditor::create_item(&directory));
        Ok(())
    }

    pub fn begin_edit_item(&mut self) -> Result<(), AppError> {
        let (index, item) = self.selected_item().ok_or(GuardError::NoTarget)?;
        self.require_backend()?;
        self.editor = Some(InlineEditor::edit_item(&item, index));
        Ok(())
    }

    pub fn delete_selected_item(&mut self) -> Result<(), AppError> {
        let (_, item) = self.selected_item().ok_or(GuardError::NoTarget)?;
        self.bridge.delete_history_item(item.id)?;
        self.status_message = "Item deleted".to_string();
        self.reload_after_mutation(true)
    }

    /// Paste `text` into the previously focused application and hide.
    pub fn paste_and_hide(&mut self, text: &str) -> Result<Transition, AppError> {
        self.bridge.paste_text(text)?;
        Ok(self.hide())
    }

    pub fn hide(&mut self) -> Transition {
        if !self.bridge.is_available() {
            return Transition::Quit;
        }
        if let Err(e) = self.bridge.toggle_main_window() {
            warn!(error = %e, "Window toggle failed");
        }
        Transition::Hide
    }

    /// Run the focused button of the selected item.
    pub fn activate_item_action(&mut self) -> Result<Transition, AppError> {
        let (_, item) = self.selected_item().ok_or(GuardError::NoTarget)?;
        match self.item_selection.action() {
            ItemAction::Paste => self.paste_and_hide(&item.content),
            ItemAction::Edit => self.begin_edit_item().map(|_| Transition::Stay),
            ItemAction::Delete => self.delete_selected_item().map(|_| Transition::Stay),
        }
    }

    // Editors and overlays

    pub fn handle_editor_key(&mut self, key_event: KeyEvent) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        match editor.handle_key(key_event) {
            EditorOutcome::Pending => {}
            EditorOutcome::Cancelled => self.editor = None,
            EditorOutcome::Commit => {
                if let Err(e) = self.commit_editor() {
                    self.report(e);
                }
            }
        }
    }

    /// Submit the open editor. It is closed whatever the outcome, except
    /// when an edited item was left without content.
    pub fn commit_editor(&mut self) -> Result<(), AppError> {
        let Some(editor) = self.editor.take() else {
            return Ok(());
        };

        match editor.kind.clone() {
            EditorKind::RenameDirectory { old_name } => {
                let new_name = editor.value(0);
                if new_name.is_empty() || new_name == old_name {
                    return Ok(());
                }
                self.guard_mutable_directory(&old_name)?;
                guard_new_directory_name(&new_name)?;
                self.bridge.rename_directory(&old_name, &new_name)?;
                if self
                    .current_directory
                    .as_deref()
                    .is_some_and(|open| same_name(open, &old_name))
                {
                    self.current_directory = Some(new_name.clone());
                    self.cache.rename_items_directory(&old_name, &new_name);
                }
                self.status_message = format!("Renamed \"{old_name}\" to \"{new_name}\"");
                self.reload_after_mutation(false)
            }
            EditorKind::CreateDirectory => {
                let name = editor.value(0);
                if name.is_empty() {
                    return Ok(());
                }
                guard_new_directory_name(&name)?;
                self.bridge.create_directory(&name)?;
                self.status_message = format!("Created folder \"{name}\"");
                self.reload_after_mutation(false)
            }
            EditorKind::EditItem { id, directory } => {
                let content = editor.raw_value(0);
                if content.trim().is_empty() {
                    self.editor = Some(editor);
                    return Err(GuardError::EmptyContent.into());
                }
                let memo = editor.memo();
                self.bridge
                    .update_history_item(id, &content, &directory, memo.as_deref())?;
                self.status_message = "Item saved".to_string();
                self.reload_after_mutation(true)
            }
            EditorKind::CreateItem { directory } => {
                let content = editor.raw_value(0);
                if content.trim().is_empty() {
                    return Ok(());
                }
                let memo = editor.memo();
                self.bridge
                    .create_history_item(&content, &directory, memo.as_deref())?;
                self.status_message = "Item created".to_string();
                self.reload_after_mutation(true)
            }
        }
    }

    pub fn handle_overlay_key(&mut self, key_event: KeyEvent) {
        let Some(overlay) = self.overlay.as_ref() else {
            return;
        };
        match overlay.handle_key(key_event) {
            OverlayOutcome::Pending => {}
            OverlayOutcome::Dismissed => self.overlay = None,
            OverlayOutcome::DeleteDirectory(name) => {
                self.overlay = None;
                if let Err(e) = self.delete_directory(&name) {
                    self.report(e);
                }
            }
        }
    }
}

/// The aggregate view owns its name, so no folder may take it.
fn guard_new_directory_name(name: &str) -> Result<(), GuardError> {
    if is_aggregate(name) {
        return Err(GuardError::ReservedName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{Backend, MemoryBackend, PushEvent, Request};
    use serde_json::Value;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Host whose next history listing fails once `fail_next` is set.
    struct FlakyHistory {
        inner: MemoryBackend,
        fail_next: Rc<Cell<bool>>,
    }

    impl Backend for FlakyHistory {
        fn invoke(&mut self, request: &Request) -> Result<Value, BridgeError> {
            if *request == Request::GetClipboardHistory && self.fail_next.replace(false) {
                return Err(BridgeError::rejected(request.name(), "history locked"));
            }
            self.inner.invoke(request)
        }

        fn try_next_event(&mut self) -> Option<PushEvent> {
            self.inner.try_next_event()
        }
    }

    fn type_into_editor(state: &mut SharedAppState, text: &str) {
        for c in text.chars() {
            state.handle_editor_key(KeyEvent::from(crossterm::event::KeyCode::Char(c)));
        }
    }

    fn state_with(backend: &MemoryBackend) -> SharedAppState {
        let mut state = SharedAppState::new(
            Bridge::connected(Box::new(backend.clone())),
            RcConfig::default(),
        );
        state.run_pending_loads();
        state
    }

    fn create_dir(backend: &MemoryBackend, name: &str) {
        let mut bridge = Bridge::connected(Box::new(backend.clone()));
        bridge.create_directory(name).unwrap();
    }

    #[test]
    fn test_startup_selects_first_directory() {
        let backend = MemoryBackend::new("Clipboard");
        let state = state_with(&backend);
        assert_eq!(state.directory_selection.index(), Some(0));
        assert_eq!(
            state.selected_directory_target(),
            Some(DirectoryTarget::Folder(0, "Clipboard".to_string()))
        );
    }

    #[test]
    fn test_protected_directories_never_reach_backend() {
        let backend = MemoryBackend::new("Clipboard");
        let mut state = state_with(&backend);
        let before = backend.invoked().len();

        let err = state.request_delete_directory().unwrap_err();
        assert!(matches!(err, AppError::Guard(GuardError::ProtectedDirectory(_))));
        assert!(state.overlay.is_none());

        let err = state.delete_directory("All Items").unwrap_err();
        assert!(matches!(err, AppError::Guard(GuardError::ProtectedDirectory(_))));

        assert_eq!(backend.invoked().len(), before);
    }

    #[test]
    fn test_rename_open_directory_updates_title_in_place() {
        let backend = MemoryBackend::new("Clipboard");
        create_dir(&backend, "X");
        let mut state = state_with(&backend);
        state.open_directory("X");
        state.run_pending_loads();

        state.begin_rename_directory().unwrap();
        assert_eq!(state.editor.as_ref().map(|e| e.anchor()), Some(EditorAnchor::Title));
        state.handle_editor_key(KeyEvent::from(crossterm::event::KeyCode::Backspace));
        state.handle_editor_key(KeyEvent::from(crossterm::event::KeyCode::Char('Y')));
        state.handle_editor_key(KeyEvent::from(crossterm::event::KeyCode::Enter));

        assert_eq!(state.active_view, ActiveView::Items);
        assert_eq!(state.current_directory.as_deref(), Some("Y"));
        assert_eq!(state.title(), "Y");
        assert!(backend.directory_names().contains(&"Y".to_string()));
    }

    #[test]
    fn test_unchanged_rename_is_noop() {
        let backend = MemoryBackend::new("Clipboard");
        create_dir(&backend, "Work");
        let mut state = state_with(&backend);
        state.select(1);
        state.begin_rename_directory().unwrap();
        let before = backend.invoked().len();
        state.handle_editor_key(KeyEvent::from(crossterm::event::KeyCode::Enter));
        assert!(state.editor.is_none());
        assert_eq!(backend.invoked().len(), before);
    }

    #[test]
    fn test_rejected_mutation_shows_alert_and_keeps_list() {
        let backend = MemoryBackend::new("Clipboard");
        create_dir(&backend, "Work");
        let mut state = state_with(&backend);
        state.begin_create_directory().unwrap();
        for c in "Work".chars() {
            state.handle_editor_key(KeyEvent::from(crossterm::event::KeyCode::Char(c)));
        }
        state.handle_editor_key(KeyEvent::from(crossterm::event::KeyCode::Enter));

        assert!(matches!(state.overlay, Some(Overlay::Alert { .. })));
        assert_eq!(state.cache.directories().len(), 2);
        assert!(state.directory_selection.index().is_some());
    }

    #[test]
    fn test_push_refresh_deferred_while_editing() {
        let backend = MemoryBackend::new("Clipboard");
        let mut state = state_with(&backend);
        state.begin_create_directory().unwrap();
        backend.capture("fresh");

        state.refresh_all();
        assert!(state.deferred_refresh);
        assert_eq!(state.cache.all_items().len(), 0);

        state.editor = None;
        state.flush_deferred_refresh();
        assert!(!state.deferred_refresh);
        assert_eq!(state.cache.all_items().len(), 1);
    }

    #[test]
    fn test_headless_refuses_actions() {
        let mut state = SharedAppState::new(Bridge::unavailable(), RcConfig::default());
        state.run_pending_loads();
        assert_eq!(state.directory_selection.index(), None);

        let err = state.begin_create_directory().unwrap_err();
        state.report(err);
        assert!(state.overlay.is_none());
        assert_eq!(state.status_message, BridgeError::Unavailable.user_message());
        assert_eq!(state.hide(), Transition::Quit);
    }

    #[test]
    fn test_create_folder_named_like_aggregate_is_refused() {
        let backend = MemoryBackend::new("Clipboard");
        let mut state = state_with(&backend);
        let before = backend.invoked().len();

        state.begin_create_directory().unwrap();
        type_into_editor(&mut state, "all items");
        state.handle_editor_key(KeyEvent::from(crossterm::event::KeyCode::Enter));

        assert_eq!(backend.invoked().len(), before);
        assert_eq!(backend.directory_names(), vec!["Clipboard"]);
        assert_eq!(state.status_message, "\"all items\" is a reserved name");
        assert!(state.overlay.is_none());
    }

    #[test]
    fn test_rename_folder_to_aggregate_name_is_refused() {
        let backend = MemoryBackend::new("Clipboard");
        create_dir(&backend, "Work");
        let mut state = state_with(&backend);
        state.select(1);
        state.begin_rename_directory().unwrap();
        for _ in 0.."Work".len() {
            state.handle_editor_key(KeyEvent::from(crossterm::event::KeyCode::Backspace));
        }
        type_into_editor(&mut state, "All Items");
        let before = backend.invoked().len();
        state.handle_editor_key(KeyEvent::from(crossterm::event::KeyCode::Enter));

        assert_eq!(backend.invoked().len(), before);
        assert_eq!(backend.directory_names(), vec!["Clipboard", "Work"]);
        assert!(state.editor.is_none());
        assert_eq!(state.status_message, "\"All Items\" is a reserved name");
    }

    #[test]
    fn test_failed_item_reload_still_refreshes_folder_counts() {
        let backend = MemoryBackend::new("Clipboard");
        create_dir(&backend, "Work");
        let fail_next = Rc::new(Cell::new(false));
        let mut state = SharedAppState::new(
            Bridge::connected(Box::new(FlakyHistory {
                inner: backend.clone(),
                fail_next: fail_next.clone(),
            })),
            RcConfig::default(),
        );
        state.run_pending_loads();
        state.open_directory("Work");
        state.run_pending_loads();

        let mut bridge = Bridge::connected(Box::new(backend.clone()));
        bridge.create_history_item("note", "Work", None).unwrap();
        fail_next.set(true);

        let err = state.reload_after_mutation(true).unwrap_err();
        assert!(matches!(err, AppError::Bridge(BridgeError::Rejected { .. })));
        let work = state
            .cache
            .directories()
            .iter()
            .find(|d| d.name == "Work")
            .map(|d| d.count);
        assert_eq!(work, Some(1));
    }
}
