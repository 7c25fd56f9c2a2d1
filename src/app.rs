//! Home view controller for shelfview.
//!
//! `HomeView` holds the view state and every service acting on it, and
//! exposes the user-facing actions of the bookmark list: navigation, search,
//! selection, single and batch edits, and the dialogs that lead to them.

use tokio::sync::broadcast;

use crate::managers::history_manager::{HistorySync, Navigator};
use crate::managers::page_state_manager::PageStateTrait;
use crate::managers::selection_manager::SelectionManagerTrait;
use crate::managers::tag_catalog_manager::TagCatalogTrait;
use crate::managers::view_state::ViewState;
use crate::services::api_client::ApiClient;
use crate::services::batch_mutation::{BatchMutationCoordinator, BatchOutcome};
use crate::services::bookmark_editor::{BookmarkEditor, EditOutcome, RenameOutcome};
use crate::services::collection_sync::{CollectionSyncEngine, FetchOptions, FetchOutcome};
use crate::services::query_parser;
use crate::services::transport::Transport;
use crate::types::bookmark::{BookmarkForm, ItemRef};
use crate::types::dialog::{DialogConfig, DialogData};
use crate::types::errors::ViewError;
use crate::types::events::{UserError, ViewEvent};
use crate::types::history::HistoryState;
use crate::types::settings::DisplayOptions;

/// What submitting the open dialog will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Add,
    Edit(ItemRef),
    Delete(Vec<ItemRef>),
    AddTags(Vec<ItemRef>),
    UpdateCache(Vec<ItemRef>),
    RenameTag(usize),
}

/// The dialog on screen and the action bound to its main button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDialog {
    pub config: DialogConfig,
    pub action: PendingAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No dialog was open.
    NoDialog,
    /// Input was rejected; the dialog stays up for correction.
    KeptOpen,
    /// The action ran and the dialog closed.
    Done,
}

pub struct HomeView<T, N> {
    client: ApiClient<T>,
    sync: CollectionSyncEngine<T>,
    batch: BatchMutationCoordinator<T>,
    editor: BookmarkEditor<T>,
    state: ViewState,
    history: HistorySync<N>,
    display: DisplayOptions,
    dialog: Option<ActiveDialog>,
}

impl<T: Transport + Clone, N: Navigator> HomeView<T, N> {
    pub fn new(transport: T, navigator: N, display: DisplayOptions) -> Self {
        let client = ApiClient::new(transport);
        Self {
            sync: CollectionSyncEngine::new(client.clone()),
            batch: BatchMutationCoordinator::new(client.clone()),
            editor: BookmarkEditor::new(client.clone()),
            client,
            state: ViewState::new(),
            history: HistorySync::new(navigator),
            display,
            dialog: None,
        }
    }

    // --- accessors ---

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub fn history(&self) -> &HistorySync<N> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistorySync<N> {
        &mut self.history
    }

    pub fn display(&self) -> DisplayOptions {
        self.display
    }

    pub fn dialog(&self) -> Option<&ActiveDialog> {
        self.dialog.as_ref()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.state.subscribe()
    }

    /// Closes the error message currently shown, if any.
    pub fn dismiss_error(&mut self) -> Option<UserError> {
        self.state.dismiss_error()
    }

    // --- lifecycle ---

    /// Applies search/page from the current location, starts listening for
    /// history pops, and loads the first page together with the tags.
    pub async fn mount(&mut self) -> Result<FetchOutcome, ViewError> {
        if let Some((search, page)) = self.history.mount() {
            self.state.restore_query(&search, page);
        }
        tracing::info!(search = self.state.page_state().search(), "home view mounted");
        self.fetch(FetchOptions::initial()).await
    }

    pub fn unmount(&mut self) {
        self.history.unmount();
        tracing::info!("home view unmounted");
    }

    /// Back/forward navigation landed on a history entry.
    pub async fn on_pop_state(
        &mut self,
        entry: Option<HistoryState>,
    ) -> Result<FetchOutcome, ViewError> {
        if self.state.page_state().is_loading() {
            return Ok(FetchOutcome::Skipped);
        }
        let Some((search, page)) = self.history.restore(entry.as_ref()) else {
            return Ok(FetchOutcome::Skipped);
        };
        self.state.restore_query(&search, page);
        self.fetch(FetchOptions::quiet()).await
    }

    // --- navigation ---

    /// Clears the search, goes back to page 1 and reloads the tags as well.
    pub async fn reload_data(&mut self) -> Result<FetchOutcome, ViewError> {
        if self.state.page_state().is_loading() {
            return Ok(FetchOutcome::Skipped);
        }
        self.state.reset_query();
        self.fetch(FetchOptions::reload()).await
    }

    pub async fn search_bookmarks(&mut self, text: &str) -> Result<FetchOutcome, ViewError> {
        if self.state.page_state().is_loading() {
            return Ok(FetchOutcome::Skipped);
        }
        self.state.set_search(text);
        self.state.start_search();
        self.fetch(FetchOptions::navigate()).await
    }

    pub async fn change_page(&mut self, page: u32) -> Result<FetchOutcome, ViewError> {
        if self.state.page_state().is_loading() {
            return Ok(FetchOutcome::Skipped);
        }
        self.state.change_page(page);
        self.fetch(FetchOptions::navigate()).await
    }

    /// Adds a tag filter to the search text, unless it is already there.
    /// The current page is kept.
    pub async fn filter_tag(&mut self, tag_name: &str) -> Result<FetchOutcome, ViewError> {
        if self.state.page_state().is_loading() {
            return Ok(FetchOutcome::Skipped);
        }
        let Some(search) = query_parser::append_tag_filter(self.state.page_state().search(), tag_name)
        else {
            return Ok(FetchOutcome::Skipped);
        };
        self.state.set_search(&search);
        self.fetch(FetchOptions::navigate()).await
    }

    async fn fetch(&mut self, options: FetchOptions) -> Result<FetchOutcome, ViewError> {
        Ok(self
            .sync
            .fetch(&mut self.state, &mut self.history, options)
            .await?)
    }

    // --- selection ---

    pub fn toggle_edit_mode(&mut self) {
        self.state.toggle_edit_mode();
    }

    pub fn toggle_selection(&mut self, item: ItemRef) {
        self.state.toggle_selection(item);
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.state.selection().is_selected(id)
    }

    pub fn selection(&self) -> &[ItemRef] {
        self.state.selection().selection()
    }

    // --- operations ---

    pub async fn create_bookmark(&mut self, form: &BookmarkForm) -> Result<EditOutcome, ViewError> {
        self.editor.create(&mut self.state, form).await
    }

    pub async fn edit_bookmark(
        &mut self,
        item: ItemRef,
        form: &BookmarkForm,
    ) -> Result<EditOutcome, ViewError> {
        self.editor.edit(&mut self.state, item, form).await
    }

    pub async fn delete_bookmarks(&mut self, items: &[ItemRef]) -> Result<BatchOutcome, ViewError> {
        Ok(self
            .batch
            .delete(&mut self.state, &mut self.history, items)
            .await?)
    }

    pub async fn add_tags(
        &mut self,
        items: &[ItemRef],
        raw_tags: &str,
    ) -> Result<BatchOutcome, ViewError> {
        Ok(self.batch.add_tags(&mut self.state, items, raw_tags).await?)
    }

    pub async fn update_cache(
        &mut self,
        items: &[ItemRef],
        create_archive: bool,
    ) -> Result<BatchOutcome, ViewError> {
        Ok(self
            .batch
            .update_cache(&mut self.state, items, create_archive)
            .await?)
    }

    pub async fn rename_tag(
        &mut self,
        idx: usize,
        new_name: &str,
    ) -> Result<RenameOutcome, ViewError> {
        self.editor
            .rename_tag(&mut self.state, &mut self.history, idx, new_name)
            .await
    }

    // --- dialogs ---

    pub fn show_dialog_add(&mut self) -> &DialogConfig {
        let config = DialogConfig::add_bookmark(self.state.tags().names(), &self.display);
        self.open_dialog(config, PendingAction::Add)
    }

    /// Opens the edit form for a displayed bookmark. Invalid references open
    /// nothing.
    pub fn show_dialog_edit(&mut self, item: ItemRef) -> Option<&DialogConfig> {
        let target = item.target()?;
        let book = self.state.bookmarks().get(target.index)?;
        let config = DialogConfig::edit_bookmark(book, self.state.tags().names());
        Some(self.open_dialog(config, PendingAction::Edit(item)))
    }

    pub fn show_dialog_delete(&mut self, items: &[ItemRef]) -> Option<&DialogConfig> {
        let items = valid_items(items)?;
        let config = DialogConfig::delete_bookmarks(items.len());
        Some(self.open_dialog(config, PendingAction::Delete(items)))
    }

    pub fn show_dialog_add_tags(&mut self, items: &[ItemRef]) -> Option<&DialogConfig> {
        let items = valid_items(items)?;
        let config = DialogConfig::add_tags(self.state.tags().names());
        Some(self.open_dialog(config, PendingAction::AddTags(items)))
    }

    pub fn show_dialog_update_cache(&mut self, items: &[ItemRef]) -> Option<&DialogConfig> {
        let items = valid_items(items)?;
        let config = DialogConfig::update_cache(self.display.use_archive);
        Some(self.open_dialog(config, PendingAction::UpdateCache(items)))
    }

    pub fn show_dialog_rename_tag(&mut self, idx: usize) -> Option<&DialogConfig> {
        let tag = self.state.tags().get(idx)?;
        let config = DialogConfig::rename_tag(&tag.name);
        Some(self.open_dialog(config, PendingAction::RenameTag(idx)))
    }

    /// Opens the tag catalog dialog in browse mode.
    pub fn show_dialog_tags(&mut self) {
        self.state.tags_dialog_mut().open();
        self.state.notify(ViewEvent::DialogChanged { visible: true });
    }

    /// Main button of the tag catalog dialog.
    pub fn tags_dialog_main(&mut self) {
        self.state.tags_dialog_mut().main_click();
    }

    /// Second button of the tag catalog dialog: switches to rename mode.
    pub fn tags_dialog_rename_mode(&mut self) {
        self.state.tags_dialog_mut().second_click();
    }

    pub fn close_tags_dialog(&mut self) {
        self.state.tags_dialog_mut().escape();
    }

    /// A tag in the catalog dialog was clicked: filters by it in browse
    /// mode, or opens the rename form in rename mode. Returns `None` when
    /// the rename form was opened.
    pub async fn tag_clicked(&mut self, idx: usize) -> Result<Option<FetchOutcome>, ViewError> {
        if self.state.tags_dialog().edit_mode {
            self.state.tags_dialog_mut().visible = false;
            self.show_dialog_rename_tag(idx);
            return Ok(None);
        }
        let Some(name) = self.state.tags().get(idx).map(|t| t.name.clone()) else {
            return Ok(Some(FetchOutcome::Skipped));
        };
        self.filter_tag(&name).await.map(Some)
    }

    /// Runs the action bound to the open dialog with the submitted values.
    ///
    /// Input the action rejects without a server call keeps the dialog
    /// open. Otherwise the dialog closes, whether the call succeeded or not.
    pub async fn submit_dialog(&mut self, data: DialogData) -> Result<SubmitOutcome, ViewError> {
        let Some(active) = self.dialog.take() else {
            return Ok(SubmitOutcome::NoDialog);
        };

        let result = match &active.action {
            PendingAction::Add => self
                .create_bookmark(&form_from(&data))
                .await
                .map(|o| o != EditOutcome::Skipped),
            PendingAction::Edit(item) => self
                .edit_bookmark(*item, &form_from(&data))
                .await
                .map(|o| o != EditOutcome::Skipped),
            PendingAction::Delete(items) => self
                .delete_bookmarks(items)
                .await
                .map(|o| o != BatchOutcome::Skipped),
            PendingAction::AddTags(items) => self
                .add_tags(items, data.text("tags"))
                .await
                .map(|o| o != BatchOutcome::Skipped),
            PendingAction::UpdateCache(items) => self
                .update_cache(items, data.flag("createArchive"))
                .await
                .map(|o| o != BatchOutcome::Skipped),
            PendingAction::RenameTag(idx) => self
                .rename_tag(*idx, data.text("newName"))
                .await
                .map(|o| o != RenameOutcome::Skipped),
        };

        match result {
            Ok(true) => {
                self.state.notify(ViewEvent::DialogChanged { visible: false });
                Ok(SubmitOutcome::Done)
            }
            Ok(false) => {
                self.dialog = Some(active);
                Ok(SubmitOutcome::KeptOpen)
            }
            Err(ViewError::Validation(err)) => {
                self.dialog = Some(active);
                Err(err.into())
            }
            Err(err) => {
                self.state.notify(ViewEvent::DialogChanged { visible: false });
                Err(err)
            }
        }
    }

    /// Closes the open dialog. Leaving the rename form goes back to the tag
    /// catalog.
    pub fn cancel_dialog(&mut self) {
        let Some(active) = self.dialog.take() else {
            return;
        };
        if let PendingAction::RenameTag(_) = active.action {
            self.state.tags_dialog_mut().visible = true;
        }
        self.state.notify(ViewEvent::DialogChanged { visible: false });
    }

    fn open_dialog(&mut self, config: DialogConfig, action: PendingAction) -> &DialogConfig {
        tracing::debug!(title = %config.title, "dialog opened");
        self.state.notify(ViewEvent::DialogChanged { visible: true });
        &self.dialog.insert(ActiveDialog { config, action }).config
    }
}

fn valid_items(items: &[ItemRef]) -> Option<Vec<ItemRef>> {
    let items: Vec<ItemRef> = items
        .iter()
        .copied()
        .filter(|item| item.target().is_some())
        .collect();
    (!items.is_empty()).then_some(items)
}

fn form_from(data: &DialogData) -> BookmarkForm {
    BookmarkForm {
        url: data.text("url").to_string(),
        title: data.text("title").to_string(),
        excerpt: data.text("excerpt").to_string(),
        tags: data.text("tags").to_string(),
        make_public: data.flag("makePublic"),
        create_archive: data.flag("createArchive"),
    }
}
