//! Batch Mutation Coordinator.
//!
//! Runs delete, add-tags and cache-update operations on a set of displayed
//! bookmarks and patches the list in place from the server's answer. Each
//! item is addressed by the `{id, index}` pair captured when the operation
//! started; positions are never looked up again after the round trip.

use crate::managers::history_manager::{HistorySync, Navigator};
use crate::managers::view_state::ViewState;
use crate::services::api_client::ApiClient;
use crate::services::collection_sync::{CollectionSyncEngine, FetchOptions, FollowUp};
use crate::services::query_parser;
use crate::services::transport::Transport;
use crate::types::bookmark::{validate_targets, Bookmark, ItemRef, Tag, Target};
use crate::types::errors::ApiError;
use crate::types::events::ViewEvent;

/// After a delete, a list shorter than this is refilled from the server.
pub const PAGE_FILL_THRESHOLD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Nothing valid to act on; no request was sent.
    Skipped,
    Applied {
        /// Number of list entries removed or replaced.
        affected: usize,
        /// How the refill fetch after a delete went.
        top_up: FollowUp,
    },
}

#[derive(Debug, Clone)]
pub struct BatchMutationCoordinator<T> {
    client: ApiClient<T>,
    sync: CollectionSyncEngine<T>,
}

impl<T: Transport + Clone> BatchMutationCoordinator<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self {
            sync: CollectionSyncEngine::new(client.clone()),
            client,
        }
    }

    /// Deletes the referenced bookmarks and drops them from the list.
    pub async fn delete<N: Navigator>(
        &self,
        state: &mut ViewState,
        history: &mut HistorySync<N>,
        items: &[ItemRef],
    ) -> Result<BatchOutcome, ApiError> {
        let targets = validate_targets(items);
        if targets.is_empty() {
            return Ok(BatchOutcome::Skipped);
        }

        let result = self.client.delete_bookmarks(&ids_of(&targets)).await;
        state.exit_selection();
        if let Err(err) = result {
            state.raise_error((&err).into());
            return Err(err);
        }

        let indices: Vec<usize> = targets.iter().map(|t| t.index).collect();
        let removed = state.patch_bookmarks(|list| remove_indices_descending(list, &indices));
        tracing::info!(removed = removed.len(), "bookmarks deleted");
        let affected = removed.len();
        state.notify(ViewEvent::BookmarksRemoved { indices: removed });

        let top_up = if state.bookmarks().len() < PAGE_FILL_THRESHOLD {
            // the delete stands even when the refill fails
            let refill = self.sync.fetch(state, history, FetchOptions::quiet()).await;
            FollowUp::from_fetch(&refill)
        } else {
            FollowUp::NotNeeded
        };

        Ok(BatchOutcome::Applied { affected, top_up })
    }

    /// Adds the comma separated tags in `raw` to the referenced bookmarks.
    pub async fn add_tags(
        &self,
        state: &mut ViewState,
        items: &[ItemRef],
        raw: &str,
    ) -> Result<BatchOutcome, ApiError> {
        let targets = validate_targets(items);
        let names = query_parser::parse_tag_list(raw);
        if targets.is_empty() || names.is_empty() {
            return Ok(BatchOutcome::Skipped);
        }

        let tags: Vec<Tag> = names.into_iter().map(Tag::named).collect();
        let result = self.client.add_tags(&ids_of(&targets), &tags).await;
        self.apply_updates(state, &targets, result)
    }

    /// Refreshes cached content of the referenced bookmarks.
    pub async fn update_cache(
        &self,
        state: &mut ViewState,
        items: &[ItemRef],
        create_archive: bool,
    ) -> Result<BatchOutcome, ApiError> {
        let targets = validate_targets(items);
        if targets.is_empty() {
            return Ok(BatchOutcome::Skipped);
        }

        let result = self
            .client
            .update_cache(&ids_of(&targets), create_archive)
            .await;
        self.apply_updates(state, &targets, result)
    }

    fn apply_updates(
        &self,
        state: &mut ViewState,
        targets: &[Target],
        result: Result<Vec<Bookmark>, ApiError>,
    ) -> Result<BatchOutcome, ApiError> {
        state.exit_selection();
        let updated = match result {
            Ok(updated) => updated,
            Err(err) => {
                state.raise_error((&err).into());
                return Err(err);
            }
        };

        let replaced = state.patch_bookmarks(|list| reconcile_by_id(list, targets, updated));
        for index in &replaced {
            state.notify(ViewEvent::BookmarkUpdated { index: *index });
        }
        tracing::info!(updated = replaced.len(), "bookmarks updated");

        Ok(BatchOutcome::Applied {
            affected: replaced.len(),
            top_up: FollowUp::NotNeeded,
        })
    }
}

fn ids_of(targets: &[Target]) -> Vec<i64> {
    targets.iter().map(|t| t.id).collect()
}

/// Removes the given positions highest first, so earlier removals never
/// shift later ones. Duplicates and positions past the end are ignored.
/// Returns the removed positions in removal order.
pub fn remove_indices_descending<T>(list: &mut Vec<T>, indices: &[usize]) -> Vec<usize> {
    let mut order = indices.to_vec();
    order.sort_unstable_by(|a, b| b.cmp(a));
    order.dedup();

    let mut removed = Vec::with_capacity(order.len());
    for index in order {
        if index < list.len() {
            list.remove(index);
            removed.push(index);
        }
    }
    removed
}

/// Puts each returned bookmark at the position captured for its id.
///
/// Response order does not matter. Bookmarks with an id that was not part of
/// the request, or whose position no longer exists, are skipped. Returns the
/// replaced positions.
pub fn reconcile_by_id(
    list: &mut [Bookmark],
    targets: &[Target],
    updated: Vec<Bookmark>,
) -> Vec<usize> {
    let mut replaced = Vec::with_capacity(updated.len());
    for book in updated {
        let Some(target) = targets.iter().find(|t| t.id == book.id) else {
            tracing::warn!(id = book.id, "server returned an unrequested bookmark");
            continue;
        };
        match list.get_mut(target.index) {
            Some(slot) => {
                *slot = book;
                replaced.push(target.index);
            }
            None => tracing::warn!(id = target.id, index = target.index, "position gone"),
        }
    }
    replaced
}
