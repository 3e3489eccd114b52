use crate::controller::command_types::{ActiveView, Command};
use crate::controller::key_handler::KeyHandler;
use crate::controller::shared_state::{DirectoryTarget, SharedAppState, Transition, ViewController};
use crossterm::event::KeyEvent;

/// Navigation rules of the folder list.
pub struct DirectoryController;

impl DirectoryController {
    pub fn new() -> Self {
        Self
    }

    /// Enter opens a folder, starts "New Folder" or pastes a search hit.
    /// Right only drills into folders.
    fn activate(&self, shared: &mut SharedAppState, from_enter: bool) -> Transition {
        match shared.selected_directory_target() {
            Some(DirectoryTarget::Folder(_, name)) => shared.open_directory(&name),
            Some(DirectoryTarget::NewFolder) if from_enter => {
                if let Err(e) = shared.begin_create_directory() {
                    shared.report(e);
                }
            }
            Some(DirectoryTarget::Hit(item)) if from_enter => {
                match shared.paste_and_hide(&item.content) {
                    Ok(transition) => return transition,
                    Err(e) => shared.report(e),
                }
            }
            _ => {}
        }
        Transition::Stay
    }
}

impl ViewController for DirectoryController {
    fn handle_key(&mut self, key_event: KeyEvent, shared: &mut SharedAppState) -> Transition {
        let Some(command) = KeyHandler::parse_list_key(ActiveView::Directories, &key_event) else {
            return Transition::Stay;
        };

        let result = match command {
            Command::MoveUp => {
                shared.move_selection(false);
                Ok(())
            }
            Command::MoveDown => {
                shared.move_selection(true);
                Ok(())
            }
            Command::MoveFirst => {
                shared.move_to_edge(false);
                Ok(())
            }
            Command::MoveLast => {
                shared.move_to_edge(true);
                Ok(())
            }
            Command::Activate => return self.activate(shared, true),
            Command::ActionRight => return self.activate(shared, false),
            Command::Rename => shared.begin_rename_directory(),
            Command::Delete => shared.request_delete_directory(),
            Command::CreateNew => shared.begin_create_directory(),
            Command::Redraw => {
                shared.redraw_requested = true;
                Ok(())
            }
            Command::Quit => return Transition::Quit,
            _ => Ok(()),
        };

        if let Err(e) = result {
            shared.report(e);
        }
        Transition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{Bridge, MemoryBackend};
    use crate::config::RcConfig;
    use crate::controller::overlay::Overlay;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn setup() -> (MemoryBackend, SharedAppState) {
        let backend = MemoryBackend::new("Clipboard");
        let mut bridge = Bridge::connected(Box::new(backend.clone()));
        bridge.create_directory("Work").unwrap();
        let mut shared = SharedAppState::new(bridge, RcConfig::default());
        shared.run_pending_loads();
        (backend, shared)
    }

    fn press(controller: &mut DirectoryController, shared: &mut SharedAppState, code: KeyCode) -> Transition {
        controller.handle_key(KeyEvent::new(code, KeyModifiers::NONE), shared)
    }

    #[test]
    fn test_arrows_wrap() {
        let (_, mut shared) = setup();
        let mut controller = DirectoryController::new();
        // Clipboard, Work, New Folder
        press(&mut controller, &mut shared, KeyCode::Up);
        assert_eq!(shared.directory_selection.index(), Some(2));
        press(&mut controller, &mut shared, KeyCode::Down);
        assert_eq!(shared.directory_selection.index(), Some(0));
    }

    #[test]
    fn test_enter_opens_folder() {
        let (_, mut shared) = setup();
        let mut controller = DirectoryController::new();
        press(&mut controller, &mut shared, KeyCode::Down);
        press(&mut controller, &mut shared, KeyCode::Enter);
        assert_eq!(shared.active_view, ActiveView::Items);
        assert_eq!(shared.current_directory.as_deref(), Some("Work"));
        assert!(shared.has_pending_loads());
    }

    #[test]
    fn test_delete_asks_for_confirmation() {
        let (backend, mut shared) = setup();
        let mut controller = DirectoryController::new();
        press(&mut controller, &mut shared, KeyCode::Down);
        press(&mut controller, &mut shared, KeyCode::Delete);
        assert_eq!(
            shared.overlay,
            Some(Overlay::ConfirmDeleteDirectory {
                name: "Work".to_string()
            })
        );
        shared.handle_overlay_key(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE));
        assert!(shared.overlay.is_none());
        assert_eq!(backend.directory_names(), vec!["Clipboard".to_string()]);
        assert_eq!(shared.cache.directories().len(), 1);
    }

    #[test]
    fn test_enter_on_new_folder_opens_editor() {
        let (backend, mut shared) = setup();
        let mut controller = DirectoryController::new();
        press(&mut controller, &mut shared, KeyCode::End);
        press(&mut controller, &mut shared, KeyCode::Enter);
        assert!(shared.editor.is_some());

        for c in "Notes".chars() {
            shared.handle_editor_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        shared.handle_editor_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(backend.directory_names().contains(&"Notes".to_string()));
        assert_eq!(shared.cache.directories().len(), 3);
    }

    #[test]
    fn test_empty_new_folder_is_silent_cancel() {
        let (backend, mut shared) = setup();
        shared.begin_create_directory().unwrap();
        let before = backend.invoked().len();
        shared.handle_editor_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(shared.editor.is_none());
        assert!(shared.overlay.is_none());
        assert_eq!(backend.invoked().len(), before);
    }
}
