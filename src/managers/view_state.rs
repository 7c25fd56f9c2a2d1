//! Explicit state of the bookmark list view.
//!
//! All list, page, tag and selection changes go through the update methods
//! here, and each one broadcasts a `ViewEvent` so the rendering layer can
//! redraw what changed.

use tokio::sync::broadcast;

use crate::managers::page_state_manager::{PageStateController, PageStateTrait};
use crate::managers::selection_manager::{SelectionManager, SelectionManagerTrait};
use crate::managers::tag_catalog_manager::{TagCatalog, TagCatalogTrait};
use crate::types::bookmark::{Bookmark, BookmarkPage, ItemRef, Tag};
use crate::types::dialog::TagsDialogState;
use crate::types::events::{UserError, ViewEvent};

/// Buffered notifications per subscriber before the slowest one lags.
pub const EVENT_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct ViewState {
    page: PageStateController,
    bookmarks: Vec<Bookmark>,
    tags: TagCatalog,
    selection: SelectionManager,
    tags_dialog: TagsDialogState,
    last_error: Option<UserError>,
    events: broadcast::Sender<ViewEvent>,
}

impl ViewState {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            page: PageStateController::new(),
            bookmarks: Vec::new(),
            tags: TagCatalog::new(),
            selection: SelectionManager::new(),
            tags_dialog: TagsDialogState::default(),
            last_error: None,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    /// Broadcasts an event. Having no subscriber is fine.
    pub fn notify(&self, event: ViewEvent) {
        let _ = self.events.send(event);
    }

    // --- read access ---

    pub fn page_state(&self) -> &PageStateController {
        &self.page
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn tags(&self) -> &TagCatalog {
        &self.tags
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn tags_dialog(&self) -> &TagsDialogState {
        &self.tags_dialog
    }

    pub fn last_error(&self) -> Option<&UserError> {
        self.last_error.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    // --- loading ---

    pub fn begin_load(&mut self) -> bool {
        if !self.page.begin_load() {
            return false;
        }
        self.notify(ViewEvent::LoadingChanged(true));
        true
    }

    pub fn end_load(&mut self) {
        self.page.end_load();
        self.notify(ViewEvent::LoadingChanged(false));
    }

    // --- query and paging ---

    // query and page changes drop the selection before any fetch

    pub fn set_search(&mut self, search: &str) {
        if self.page.search() == search {
            return;
        }
        self.page.set_search(search);
        self.clear_selection();
        self.notify(ViewEvent::SearchChanged(search.to_string()));
    }

    pub fn reset_query(&mut self) {
        self.set_search("");
        self.page.reset();
        self.clear_selection();
    }

    pub fn start_search(&mut self) {
        self.page.start_search();
        self.clear_selection();
    }

    pub fn change_page(&mut self, page: u32) {
        self.page.change_page(page);
        self.clear_selection();
        self.notify(ViewEvent::ScrollReset);
    }

    /// Applies search and page decoded from a location or history entry.
    pub fn restore_query(&mut self, search: &str, page: u32) {
        self.set_search(search);
        self.page.change_page(page);
        self.clear_selection();
    }

    /// Replaces the list wholesale with a fetched page. Selection and edit
    /// mode refer to the old list, so both are reset.
    pub fn replace_page(&mut self, page: BookmarkPage) {
        self.page.apply_response(page.page, page.max_page);
        self.bookmarks = page.bookmarks;
        self.notify(ViewEvent::BookmarksReplaced {
            count: self.bookmarks.len(),
        });
        self.notify(ViewEvent::PageChanged {
            page: self.page.page(),
            max_page: self.page.max_page(),
        });
        self.exit_selection();
    }

    // --- in-place list patches ---

    pub fn insert_bookmark(&mut self, index: usize, book: Bookmark) {
        let index = index.min(self.bookmarks.len());
        self.bookmarks.insert(index, book);
        self.notify(ViewEvent::BookmarkInserted { index });
    }

    /// Replaces the record at `index`. Out-of-range indices are ignored.
    pub fn replace_bookmark(&mut self, index: usize, book: Bookmark) -> bool {
        match self.bookmarks.get_mut(index) {
            Some(slot) => {
                *slot = book;
                self.notify(ViewEvent::BookmarkUpdated { index });
                true
            }
            None => false,
        }
    }

    /// Runs a patch against the list and returns its result. The caller
    /// reports what changed through [`ViewState::notify`].
    pub fn patch_bookmarks<R>(&mut self, patch: impl FnOnce(&mut Vec<Bookmark>) -> R) -> R {
        patch(&mut self.bookmarks)
    }

    // --- tags ---

    pub fn replace_tags(&mut self, tags: Vec<Tag>) {
        self.tags.replace(tags);
        self.notify(ViewEvent::TagsReplaced {
            count: self.tags.len(),
        });
    }

    pub fn rename_tag(&mut self, idx: usize, new_name: &str) -> Option<String> {
        let old = self.tags.rename(idx, new_name)?;
        self.notify(ViewEvent::TagsReplaced {
            count: self.tags.len(),
        });
        Some(old)
    }

    pub fn tags_dialog_mut(&mut self) -> &mut TagsDialogState {
        &mut self.tags_dialog
    }

    // --- selection ---

    pub fn toggle_edit_mode(&mut self) {
        self.selection.toggle_edit_mode();
        self.notify(ViewEvent::SelectionChanged { count: 0 });
        self.notify(ViewEvent::EditModeChanged(self.selection.edit_mode()));
    }

    pub fn toggle_selection(&mut self, item: ItemRef) {
        self.selection.toggle_selection(item);
        self.notify(ViewEvent::SelectionChanged {
            count: self.selection.selection().len(),
        });
    }

    /// Drops the selection, staying in edit mode.
    pub fn clear_selection(&mut self) {
        if self.selection.selection().is_empty() {
            return;
        }
        self.selection.clear();
        self.notify(ViewEvent::SelectionChanged { count: 0 });
    }

    /// Drops the selection and leaves edit mode.
    pub fn exit_selection(&mut self) {
        let had_selection = !self.selection.selection().is_empty();
        let was_editing = self.selection.edit_mode();
        self.selection.exit();
        if had_selection {
            self.notify(ViewEvent::SelectionChanged { count: 0 });
        }
        if was_editing {
            self.notify(ViewEvent::EditModeChanged(false));
        }
    }

    // --- errors ---

    /// Shows an error to the user.
    pub fn raise_error(&mut self, error: UserError) {
        tracing::error!(status = ?error.status, "{}", error.message);
        self.last_error = Some(error.clone());
        self.notify(ViewEvent::ErrorRaised(error));
    }

    /// The user closed the error message.
    pub fn dismiss_error(&mut self) -> Option<UserError> {
        self.last_error.take()
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}
