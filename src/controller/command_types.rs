#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Directories,
    Items,
}

/// A key press resolved against the list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Selection movement
    MoveUp,
    MoveDown,
    MoveFirst,
    MoveLast,

    // Action cursor (item view) / open (directory view)
    ActionLeft,
    ActionRight,
    Activate,

    Back,
    Rename,
    Delete,
    CreateNew,
    EditItem,

    // Search field
    SearchInput(char),
    SearchBackspace,

    Escape,
    Redraw,
    Quit,
}
