//! Single-item operations: create, edit and tag rename.

use crate::managers::history_manager::{HistorySync, Navigator};
use crate::managers::page_state_manager::PageStateTrait;
use crate::managers::tag_catalog_manager::TagCatalogTrait;
use crate::managers::view_state::ViewState;
use crate::services::api_client::ApiClient;
use crate::services::collection_sync::{CollectionSyncEngine, FetchOptions, FollowUp};
use crate::services::query_parser;
use crate::services::transport::Transport;
use crate::types::bookmark::{BookmarkForm, ItemRef, NewBookmark, Tag};
use crate::types::errors::{ValidationError, ViewError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Input was rejected silently; nothing was sent.
    Skipped,
    /// The server's record now sits at `index`.
    Applied { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Skipped,
    /// `reload` is `NotNeeded` unless the search text referenced the old
    /// name, in which case the list was fetched again with the new one.
    Renamed { reload: FollowUp },
}

#[derive(Debug, Clone)]
pub struct BookmarkEditor<T> {
    client: ApiClient<T>,
    sync: CollectionSyncEngine<T>,
}

impl<T: Transport + Clone> BookmarkEditor<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self {
            sync: CollectionSyncEngine::new(client.clone()),
            client,
        }
    }

    /// Creates a bookmark and shows it at the top of the list.
    pub async fn create(
        &self,
        state: &mut ViewState,
        form: &BookmarkForm,
    ) -> Result<EditOutcome, ViewError> {
        let url = form.url.trim();
        if url.is_empty() {
            let err = ValidationError::EmptyUrl;
            state.raise_error((&err).into());
            return Err(err.into());
        }

        let book = NewBookmark {
            url: url.to_string(),
            title: form.title.trim().to_string(),
            excerpt: form.excerpt.trim().to_string(),
            public: i32::from(form.make_public),
            tags: tags_of(&form.tags),
            create_archive: form.create_archive,
        };

        match self.client.create_bookmark(&book).await {
            Ok(created) => {
                tracing::info!(id = created.id, "bookmark created");
                state.insert_bookmark(0, created);
                Ok(EditOutcome::Applied { index: 0 })
            }
            Err(err) => {
                state.raise_error((&err).into());
                Err(err.into())
            }
        }
    }

    /// Saves edited fields of the bookmark at `item` and puts the server's
    /// answer back at the same position. An empty title is ignored.
    pub async fn edit(
        &self,
        state: &mut ViewState,
        item: ItemRef,
        form: &BookmarkForm,
    ) -> Result<EditOutcome, ViewError> {
        let Some(target) = item.target() else {
            return Ok(EditOutcome::Skipped);
        };
        let title = form.title.trim();
        if title.is_empty() {
            return Ok(EditOutcome::Skipped);
        }
        let Some(mut book) = state.bookmarks().get(target.index).cloned() else {
            return Ok(EditOutcome::Skipped);
        };

        book.url = form.url.trim().to_string();
        book.title = title.to_string();
        book.excerpt = form.excerpt.trim().to_string();
        book.public = i32::from(form.make_public);
        book.tags = tags_of(&form.tags);

        match self.client.update_bookmark(&book).await {
            Ok(saved) => {
                state.replace_bookmark(target.index, saved);
                Ok(EditOutcome::Applied {
                    index: target.index,
                })
            }
            Err(err) => {
                state.raise_error((&err).into());
                Err(err.into())
            }
        }
    }

    /// Renames the catalog tag at `idx`. When the search text filters on the
    /// old name, its first occurrence is rewritten and the list reloaded.
    pub async fn rename_tag<N: Navigator>(
        &self,
        state: &mut ViewState,
        history: &mut HistorySync<N>,
        idx: usize,
        new_name: &str,
    ) -> Result<RenameOutcome, ViewError> {
        let Some(tag) = state.tags().get(idx).cloned() else {
            return Ok(RenameOutcome::Skipped);
        };

        if let Err(err) = self.client.rename_tag(tag.id, new_name).await {
            state.tags_dialog_mut().escape();
            state.raise_error((&err).into());
            return Err(err.into());
        }

        state.rename_tag(idx, new_name);
        state.tags_dialog_mut().open();
        tracing::info!(id = tag.id, from = %tag.name, to = new_name, "tag renamed");

        let old_token = query_parser::to_query_token(&tag.name);
        let search = state.page_state().search().to_string();
        if !search.contains(&old_token) {
            return Ok(RenameOutcome::Renamed {
                reload: FollowUp::NotNeeded,
            });
        }

        let new_token = query_parser::to_query_token(new_name);
        state.set_search(&search.replacen(&old_token, &new_token, 1));
        // the rename stands even when the reload fails
        let reload = self.sync.fetch(state, history, FetchOptions::navigate()).await;
        Ok(RenameOutcome::Renamed {
            reload: FollowUp::from_fetch(&reload),
        })
    }
}

fn tags_of(raw: &str) -> Vec<Tag> {
    query_parser::parse_tag_list(raw)
        .into_iter()
        .map(Tag::named)
        .collect()
}
