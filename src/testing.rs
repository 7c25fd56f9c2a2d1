//! Test doubles for exercising the view controller without a server.
//!
//! `MockTransport` answers requests from scripted responses keyed by method
//! and path, and records every request it sees.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::services::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::types::bookmark::{Bookmark, Tag};
use crate::types::errors::ApiError;

#[derive(Debug, Default)]
struct MockState {
    queued: HashMap<(Method, String), VecDeque<Result<ApiResponse, ApiError>>>,
    fallback: HashMap<(Method, String), ApiResponse>,
    requests: Vec<ApiRequest>,
}

/// Scripted transport. Clones share the same script and request log.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a one-shot response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        self.push(method, path, Ok(ApiResponse::new(status, body)));
    }

    /// Queues a one-shot JSON response for `method path`.
    pub fn respond_json(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.respond(method, path, status, body.to_string());
    }

    /// Queues a one-shot network failure for `method path`.
    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Err(ApiError::Network(message.to_string())));
    }

    /// Response used for `method path` once its queue is empty.
    pub fn always(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state
                .fallback
                .insert((method, path.to_string()), ApiResponse::new(status, body));
        }
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state
            .lock()
            .map(|s| s.requests.clone())
            .unwrap_or_default()
    }

    /// Requests sent to `method path`.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn clear_requests(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.requests.clear();
        }
    }

    fn push(&self, method: Method, path: &str, response: Result<ApiResponse, ApiError>) {
        if let Ok(mut state) = self.state.lock() {
            state
                .queued
                .entry((method, path.to_string()))
                .or_default()
                .push_back(response);
        }
    }

    fn answer(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let key = (request.method, request.path.clone());
        state.requests.push(request);

        if let Some(response) = state.queued.get_mut(&key).and_then(VecDeque::pop_front) {
            return response;
        }
        if let Some(response) = state.fallback.get(&key) {
            return Ok(response.clone());
        }
        Ok(ApiResponse::new(
            404,
            format!("no mock response for {} {}", key.0.as_str(), key.1),
        ))
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.answer(request)
    }
}

/// A bookmark fixture with predictable fields.
pub fn bookmark(id: i64) -> Bookmark {
    Bookmark {
        id,
        url: format!("https://example.com/{}", id),
        title: format!("Bookmark {}", id),
        excerpt: String::new(),
        public: 0,
        tags: Vec::new(),
        has_content: false,
        has_archive: false,
        image_url: String::new(),
    }
}

/// Bookmarks with ids `ids`, in order.
pub fn bookmarks(ids: impl IntoIterator<Item = i64>) -> Vec<Bookmark> {
    ids.into_iter().map(bookmark).collect()
}

/// JSON body of a collection page.
pub fn page_json(page: u32, max_page: u32, books: &[Bookmark]) -> serde_json::Value {
    json!({ "page": page, "maxPage": max_page, "bookmarks": books })
}

/// JSON body of a tag catalog.
pub fn tags_json(tags: &[Tag]) -> serde_json::Value {
    json!(tags)
}

/// A catalog tag fixture.
pub fn tag(id: i64, name: &str, n_bookmarks: i64) -> Tag {
    Tag {
        id,
        name: name.to_string(),
        n_bookmarks,
    }
}
