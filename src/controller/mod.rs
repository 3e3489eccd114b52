/// Controller subsystem - Handles all user input and backend actions
///
/// `app` routes each key press; `directories` and `items` hold the
/// navigation rules of the two views; `shared_state` is the single owner of
/// selection, search, editor and overlay state.

pub mod app;
pub mod command_types;
pub mod directories;
pub mod inline_editor;
pub mod items;
pub mod key_handler;
pub mod overlay;
pub mod selection;
pub mod shared_state;
pub mod text_field;

// Re-export public interface
pub use app::AppController;
pub use shared_state::SharedAppState;
