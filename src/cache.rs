/// In-memory snapshots of backend data.
///
/// Every reload is stamped with a generation taken before the fetch; a
/// snapshot is only applied if it is newer than the one currently shown, so
/// a slow stale reply can never overwrite a fresher list.
use crate::bridge::Bridge;
use crate::error::BridgeError;
use crate::model::{ALL_ITEMS, ClipboardItem, Directory, is_aggregate, same_name};
use std::cmp::Ordering;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug, Clone)]
struct Slot<T> {
    data: Vec<T>,
    state: LoadState,
    applied: Option<Generation>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            state: LoadState::Loading,
            applied: None,
        }
    }

    fn apply(&mut self, generation: Generation, data: Vec<T>) -> bool {
        if self.applied.is_some_and(|applied| applied >= generation) {
            return false;
        }
        self.data = data;
        self.state = LoadState::Ready;
        self.applied = Some(generation);
        true
    }

    /// A failed reload keeps whatever was shown before.
    fn fail(&mut self, message: String) {
        if self.applied.is_none() {
            self.state = LoadState::Failed(message);
        } else {
            self.state = LoadState::Ready;
        }
    }
}

pub struct DataCache {
    directories: Slot<Directory>,
    all_items: Vec<ClipboardItem>,
    items: Slot<ClipboardItem>,
    items_directory: Option<String>,
    issued: u64,
    default_directory: String,
    show_all_items: bool,
}

impl DataCache {
    pub fn new(default_directory: &str, show_all_items: bool) -> Self {
        Self {
            directories: Slot::new(),
            all_items: Vec::new(),
            items: Slot::new(),
            items_directory: None,
            issued: 0,
            default_directory: default_directory.to_string(),
            show_all_items,
        }
    }

    pub fn directories(&self) -> &[Directory] {
        &self.directories.data
    }

    /// Every stored item, as of the last directory reload.
    pub fn all_items(&self) -> &[ClipboardItem] {
        &self.all_items
    }

    /// Items of the open directory.
    pub fn items(&self) -> &[ClipboardItem] {
        &self.items.data
    }

    #[cfg(test)]
    pub fn items_directory(&self) -> Option<&str> {
        self.items_directory.as_deref()
    }

    pub fn directories_state(&self) -> &LoadState {
        &self.directories.state
    }

    pub fn items_state(&self) -> &LoadState {
        &self.items.state
    }

    pub fn default_directory(&self) -> &str {
        &self.default_directory
    }

    /// Directories that must never be renamed or deleted.
    pub fn is_protected(&self, name: &str) -> bool {
        is_aggregate(name) || same_name(name, &self.default_directory)
    }

    pub fn begin(&mut self) -> Generation {
        self.issued += 1;
        Generation(self.issued)
    }

    pub fn mark_items_loading(&mut self, directory: &str) {
        if self.items_directory.as_deref() != Some(directory) {
            self.items = Slot::new();
            self.items_directory = Some(directory.to_string());
        }
        self.items.state = LoadState::Loading;
    }

    pub fn apply_directories(
        &mut self,
        generation: Generation,
        directories: Vec<Directory>,
        items: Vec<ClipboardItem>,
    ) -> bool {
        let directories = build_directory_list(
            directories,
            &items,
            &self.default_directory,
            self.show_all_items,
        );
        let applied = self.directories.apply(generation, directories);
        if applied {
            self.all_items = items;
        } else {
            debug!(?generation, "Discarding stale directory snapshot");
        }
        applied
    }

    pub fn apply_items(&mut self, generation: Generation, directory: &str, items: Vec<ClipboardItem>) -> bool {
        if self.items_directory.as_deref() != Some(directory) {
            self.items = Slot::new();
            self.items_directory = Some(directory.to_string());
        }
        let applied = self.items.apply(generation, items_for(items, directory));
        if !applied {
            debug!(?generation, directory, "Discarding stale item snapshot");
        }
        applied
    }

    pub fn reload_directories(&mut self, bridge: &mut Bridge) -> Result<(), BridgeError> {
        let generation = self.begin();
        let fetched = bridge
            .get_directories()
            .and_then(|dirs| Ok((dirs, bridge.get_clipboard_history()?)));
        match fetched {
            Ok((dirs, items)) => {
                if self.apply_directories(generation, dirs, items) {
                    info!(
                        directories = self.directories.data.len(),
                        items = self.all_items.len(),
                        "Directories reloaded"
                    );
                }
                Ok(())
            }
            Err(e) => {
                self.directories.fail(e.user_message());
                Err(e)
            }
        }
    }

    pub fn reload_items(&mut self, bridge: &mut Bridge, directory: &str) -> Result<(), BridgeError> {
        let generation = self.begin();
        match bridge.get_clipboard_history() {
            Ok(items) => {
                if self.apply_items(generation, directory, items) {
                    info!(directory, count = self.items.data.len(), "Items reloaded");
                }
                Ok(())
            }
            Err(e) => {
                if self.items_directory.as_deref() != Some(directory) {
                    self.items = Slot::new();
                    self.items_directory = Some(directory.to_string());
                }
                self.items.fail(e.user_message());
                Err(e)
            }
        }
    }

    /// Follow a rename of the open directory without refetching.
    pub fn rename_items_directory(&mut self, old_name: &str, new_name: &str) {
        if self
            .items_directory
            .as_deref()
            .is_some_and(|open| same_name(open, old_name))
        {
            self.items_directory = Some(new_name.to_string());
            for item in &mut self.items.data {
                item.directory = new_name.to_string();
            }
        }
    }
}

/// Counts recomputed from items, backend aggregates dropped, default first,
/// optional "All Items" second, the rest alphabetical.
pub fn build_directory_list(
    directories: Vec<Directory>,
    items: &[ClipboardItem],
    default_directory: &str,
    show_all_items: bool,
) -> Vec<Directory> {
    let mut list: Vec<Directory> = directories
        .into_iter()
        .filter(|d| !d.is_aggregate())
        .map(|d| {
            let count = items.iter().filter(|it| it.belongs_to(&d.name)).count();
            Directory::new(d.name, count)
        })
        .collect();

    list.sort_by(|a, b| {
        let a_default = same_name(&a.name, default_directory);
        let b_default = same_name(&b.name, default_directory);
        match (a_default, b_default) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
        }
    });

    if show_all_items {
        let position = usize::from(
            list.first()
                .is_some_and(|d| same_name(&d.name, default_directory)),
        );
        list.insert(position, Directory::new(ALL_ITEMS, items.len()));
    }

    list
}

/// Items of `directory`, or all of them for the aggregate.
pub fn items_for(items: Vec<ClipboardItem>, directory: &str) -> Vec<ClipboardItem> {
    if is_aggregate(directory) {
        return items;
    }
    items.into_iter().filter(|it| it.belongs_to(directory)).collect()
}
