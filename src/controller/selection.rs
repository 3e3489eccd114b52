/// Buttons on every item row, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Paste,
    Edit,
    Delete,
}

impl ItemAction {
    pub const ALL: [ItemAction; 3] = [ItemAction::Paste, ItemAction::Edit, ItemAction::Delete];

    pub fn label(&self) -> &'static str {
        match self {
            ItemAction::Paste => "Paste",
            ItemAction::Edit => "Edit",
            ItemAction::Delete => "Delete",
        }
    }
}

const LAST_ACTION: usize = ItemAction::ALL.len() - 1;

/// Result of moving the action cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMove {
    Moved,
    /// Left was requested while already on the first button.
    PastStart,
}

/// Selected entry of one list plus the action cursor within it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    index: Option<usize>,
    action: usize,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn action(&self) -> ItemAction {
        ItemAction::ALL[self.action]
    }

    pub fn action_index(&self) -> usize {
        self.action
    }

    /// Select `index` and put the action cursor back on Paste.
    /// Out-of-range indices leave the selection untouched.
    pub fn select(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            return false;
        }
        self.index = Some(index);
        self.action = 0;
        true
    }

    pub fn clear(&mut self) {
        self.index = None;
        self.action = 0;
    }

    /// State after a (re)load: first entry, or nothing for an empty list.
    pub fn reset(&mut self, len: usize) {
        if len == 0 {
            self.clear();
        } else {
            self.select(0, len);
        }
    }

    /// Keep the index valid after the list changed size.
    pub fn clamp(&mut self, len: usize) {
        match self.index {
            Some(_) if len == 0 => self.clear(),
            Some(i) if i >= len => {
                self.select(0, len);
            }
            _ => {}
        }
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let next = match self.index {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.select(next, len);
    }

    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let prev = match self.index {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        };
        self.select(prev, len);
    }

    /// Clamp within the buttons; moving left from the first one reports
    /// `PastStart` instead of wrapping.
    pub fn move_action(&mut self, delta: isize) -> ActionMove {
        if delta < 0 && self.action == 0 {
            return ActionMove::PastStart;
        }
        let target = self.action as isize + delta;
        self.action = target.clamp(0, LAST_ACTION as isize) as usize;
        ActionMove::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_both_directions() {
        let mut s = Selection::new();
        s.reset(3);
        s.prev(3);
        assert_eq!(s.index(), Some(2));
        s.next(3);
        assert_eq!(s.index(), Some(0));
    }

    #[test]
    fn test_empty_list_is_noop() {
        let mut s = Selection::new();
        s.next(0);
        s.prev(0);
        assert_eq!(s.index(), None);
        s.reset(0);
        assert_eq!(s.index(), None);
    }

    #[test]
    fn test_select_resets_action_cursor() {
        let mut s = Selection::new();
        s.reset(2);
        s.move_action(1);
        assert_eq!(s.action(), ItemAction::Edit);
        s.next(2);
        assert_eq!(s.action(), ItemAction::Paste);
    }

    #[test]
    fn test_out_of_range_select_ignored() {
        let mut s = Selection::new();
        s.reset(2);
        assert!(!s.select(5, 2));
        assert_eq!(s.index(), Some(0));
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut s = Selection::new();
        s.reset(5);
        s.select(4, 5);
        s.clamp(2);
        assert_eq!(s.index(), Some(0));
        s.clamp(0);
        assert_eq!(s.index(), None);
    }

    #[test]
    fn test_action_cursor_bounds() {
        let mut s = Selection::new();
        s.reset(1);
        assert_eq!(s.move_action(-1), ActionMove::PastStart);
        assert_eq!(s.action_index(), 0);
        s.move_action(1);
        s.move_action(1);
        s.move_action(1);
        assert_eq!(s.action(), ItemAction::Delete);
        s.move_action(-1);
        assert_eq!(s.action(), ItemAction::Edit);
    }
}
