//! Selection and edit mode of the bookmark list.
//!
//! Selected entries are `{id, index}` references into the list as currently
//! displayed, so the selection is only meaningful until the list changes.

use crate::types::bookmark::ItemRef;

/// Trait defining selection operations.
pub trait SelectionManagerTrait {
    fn toggle_edit_mode(&mut self);
    fn toggle_selection(&mut self, item: ItemRef);
    fn is_selected(&self, id: i64) -> bool;
    fn selection(&self) -> &[ItemRef];
    fn edit_mode(&self) -> bool;
    /// Drops the selection, leaving edit mode as it is.
    fn clear(&mut self);
    /// Drops the selection and leaves edit mode.
    fn exit(&mut self);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionManager {
    selection: Vec<ItemRef>,
    edit_mode: bool,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionManagerTrait for SelectionManager {
    fn toggle_edit_mode(&mut self) {
        self.selection.clear();
        self.edit_mode = !self.edit_mode;
    }

    fn toggle_selection(&mut self, item: ItemRef) {
        match self.selection.iter().position(|s| s.id == item.id) {
            Some(pos) => {
                self.selection.remove(pos);
            }
            None => self.selection.push(item),
        }
    }

    fn is_selected(&self, id: i64) -> bool {
        self.selection.iter().any(|s| s.id == id)
    }

    fn selection(&self) -> &[ItemRef] {
        &self.selection
    }

    fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    fn clear(&mut self) {
        self.selection.clear();
    }

    fn exit(&mut self) {
        self.selection.clear();
        self.edit_mode = false;
    }
}
