//! Typed client for the bookmark server endpoints.
//!
//! Every call maps a non-2xx response to `ApiError::Http` carrying the
//! status and the response body as plain text.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::services::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::types::bookmark::{Bookmark, BookmarkPage, NewBookmark, Tag};
use crate::types::errors::ApiError;
use crate::types::query::SearchQuery;

pub const BOOKMARKS_PATH: &str = "/api/bookmarks";
pub const BOOKMARK_TAGS_PATH: &str = "/api/bookmarks/tags";
pub const TAGS_PATH: &str = "/api/tags";
pub const TAG_PATH: &str = "/api/tag";
pub const CACHE_PATH: &str = "/api/cache";

/// Bookmark API over any `Transport`.
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET /api/bookmarks` for one page of a query.
    pub async fn list_bookmarks(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<BookmarkPage, ApiError> {
        let request = ApiRequest::new(Method::Get, BOOKMARKS_PATH)
            .query("keyword", query.keyword.clone())
            .query("tags", query.tags_param())
            .query("page", page.to_string());
        self.call_json(request).await
    }

    /// `GET /api/tags`.
    pub async fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.call_json(ApiRequest::new(Method::Get, TAGS_PATH)).await
    }

    /// `POST /api/bookmarks`.
    pub async fn create_bookmark(&self, book: &NewBookmark) -> Result<Bookmark, ApiError> {
        let request = ApiRequest::new(Method::Post, BOOKMARKS_PATH).json(to_json(book)?);
        self.call_json(request).await
    }

    /// `PUT /api/bookmarks` with the full record.
    pub async fn update_bookmark(&self, book: &Bookmark) -> Result<Bookmark, ApiError> {
        let request = ApiRequest::new(Method::Put, BOOKMARKS_PATH).json(to_json(book)?);
        self.call_json(request).await
    }

    /// `DELETE /api/bookmarks`; the body is the id array.
    pub async fn delete_bookmarks(&self, ids: &[i64]) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Delete, BOOKMARKS_PATH).json(json!(ids));
        self.call(request).await.map(|_| ())
    }

    /// `PUT /api/cache`: re-fetches content, optionally regenerating archives.
    pub async fn update_cache(
        &self,
        ids: &[i64],
        create_archive: bool,
    ) -> Result<Vec<Bookmark>, ApiError> {
        let request = ApiRequest::new(Method::Put, CACHE_PATH)
            .json(json!({ "ids": ids, "createArchive": create_archive }));
        self.call_json(request).await
    }

    /// `PUT /api/bookmarks/tags`: adds tags to several bookmarks.
    pub async fn add_tags(&self, ids: &[i64], tags: &[Tag]) -> Result<Vec<Bookmark>, ApiError> {
        let request = ApiRequest::new(Method::Put, BOOKMARK_TAGS_PATH)
            .json(json!({ "ids": ids, "tags": tags }));
        self.call_json(request).await
    }

    /// `PUT /api/tag`. The response body is not used.
    pub async fn rename_tag(&self, id: i64, name: &str) -> Result<(), ApiError> {
        let request =
            ApiRequest::new(Method::Put, TAG_PATH).json(json!({ "id": id, "name": name }));
        self.call(request).await.map(|_| ())
    }

    async fn call(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                message: response.body,
            });
        }
        Ok(response)
    }

    async fn call_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let response = self.call(request).await?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn to_json<S: serde::Serialize>(value: &S) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
