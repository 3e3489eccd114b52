use crate::controller::command_types::{ActiveView, Command};
use crate::controller::key_handler::KeyHandler;
use crate::controller::shared_state::{SharedAppState, Transition, ViewController};
use crossterm::event::KeyEvent;

/// Navigation rules of the item list of one folder.
pub struct ItemController;

impl ItemController {
    pub fn new() -> Self {
        Self
    }
}

impl ViewController for ItemController {
    fn handle_key(&mut self, key_event: KeyEvent, shared: &mut SharedAppState) -> Transition {
        let Some(command) = KeyHandler::parse_list_key(ActiveView::Items, &key_event) else {
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
            Command::ActionLeft => {
                if shared.item_selection.index().is_none() {
                    shared.show_directories();
                } else {
                    shared.move_action_cursor(-1);
                }
                Ok(())
            }
            Command::ActionRight => {
                shared.move_action_cursor(1);
                Ok(())
            }
            Command::Back => {
                shared.show_directories();
                Ok(())
            }
            Command::Activate => match shared.activate_item_action() {
                Ok(transition) => return transition,
                Err(e) => Err(e),
            },
            Command::EditItem => shared.begin_edit_item(),
            Command::Delete => shared.delete_selected_item(),
            Command::CreateNew => shared.begin_create_item(),
            Command::Rename => shared.begin_rename_directory(),
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
