//! Collection Sync Engine.
//!
//! Loads one page of the collection for the current search text, replaces the
//! list with it, and optionally records a history entry and refreshes the tag
//! catalog. Every fetch is gated by the view's loading flag.

use crate::managers::history_manager::{HistorySync, Navigator};
use crate::managers::page_state_manager::PageStateTrait;
use crate::managers::view_state::ViewState;
use crate::services::api_client::ApiClient;
use crate::services::query_parser;
use crate::services::transport::Transport;
use crate::types::errors::ApiError;
use crate::types::events::ViewEvent;

/// What a fetch does besides loading the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Push a history entry for the loaded search/page.
    pub persist_history: bool,
    /// Reload the tag catalog after the page.
    pub refresh_tags: bool,
}

impl FetchOptions {
    /// Search or page navigation started by the user.
    pub fn navigate() -> Self {
        Self {
            persist_history: true,
            refresh_tags: false,
        }
    }

    /// Explicit reload: new history entry and fresh tags.
    pub fn reload() -> Self {
        Self {
            persist_history: true,
            refresh_tags: true,
        }
    }

    /// Initial load on mount, from the current location.
    pub fn initial() -> Self {
        Self {
            persist_history: false,
            refresh_tags: true,
        }
    }

    /// Back/forward navigation and in-place refreshes.
    pub fn quiet() -> Self {
        Self {
            persist_history: false,
            refresh_tags: false,
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::navigate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Another fetch was in flight; nothing changed.
    Skipped,
    Loaded { tags_refreshed: bool },
}

/// Result of a fetch that ran after another operation (a refill after a
/// delete, a reload after a tag rename).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// The operation did not call for a fetch.
    NotNeeded,
    Loaded,
    /// Another fetch was in flight.
    Skipped,
    /// The fetch failed; its error was surfaced on the view state.
    Failed,
}

impl FollowUp {
    pub fn from_fetch(result: &Result<FetchOutcome, ApiError>) -> Self {
        match result {
            Ok(FetchOutcome::Loaded { .. }) => FollowUp::Loaded,
            Ok(FetchOutcome::Skipped) => FollowUp::Skipped,
            Err(_) => FollowUp::Failed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectionSyncEngine<T> {
    client: ApiClient<T>,
}

impl<T: Transport> CollectionSyncEngine<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self { client }
    }

    /// Fetches the current page for the current search text.
    ///
    /// A failed page load leaves selection and edit mode, is surfaced on
    /// `state` and returned. A failed tag refresh only logs a warning.
    /// Loading is cleared exactly once, after the tag refresh.
    pub async fn fetch<N: Navigator>(
        &self,
        state: &mut ViewState,
        history: &mut HistorySync<N>,
        options: FetchOptions,
    ) -> Result<FetchOutcome, ApiError> {
        if !state.begin_load() {
            tracing::debug!("fetch skipped, already loading");
            return Ok(FetchOutcome::Skipped);
        }

        let outcome = self.load(state, history, options).await;
        state.end_load();

        if let Err(err) = &outcome {
            state.exit_selection();
            state.raise_error(err.into());
        }
        outcome
    }

    async fn load<N: Navigator>(
        &self,
        state: &mut ViewState,
        history: &mut HistorySync<N>,
        options: FetchOptions,
    ) -> Result<FetchOutcome, ApiError> {
        let search = state.page_state().search().to_string();
        let query = query_parser::parse(&search);
        let page = state.page_state().page();
        tracing::debug!(keyword = %query.keyword, tags = ?query.tags, page, "loading bookmarks");

        let loaded = self.client.list_bookmarks(&query, page).await?;
        state.replace_page(loaded);

        if options.persist_history {
            let url = history.record(&search, state.page_state().page());
            state.notify(ViewEvent::HistoryPushed { url });
        }

        let tags_refreshed = options.refresh_tags && self.refresh_tags(state).await;
        Ok(FetchOutcome::Loaded { tags_refreshed })
    }

    async fn refresh_tags(&self, state: &mut ViewState) -> bool {
        match self.client.list_tags().await {
            Ok(tags) => {
                state.replace_tags(tags);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "tag refresh failed");
                false
            }
        }
    }
}
