use std::fmt;

use super::errors::{ApiError, ValidationError, ViewError};

/// An error as presented to the user: a message and, for server failures,
/// the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserError {
    pub message: String,
    pub status: Option<u16>,
}

impl UserError {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<&ApiError> for UserError {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Http { status, message } => UserError::new(message.clone(), Some(*status)),
            other => UserError::new(other.to_string(), None),
        }
    }
}

impl From<&ValidationError> for UserError {
    fn from(err: &ValidationError) -> Self {
        UserError::new(err.to_string(), None)
    }
}

impl From<&ViewError> for UserError {
    fn from(err: &ViewError) -> Self {
        match err {
            ViewError::Api(e) => e.into(),
            ViewError::Validation(e) => e.into(),
        }
    }
}

/// Change notifications broadcast to the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    LoadingChanged(bool),
    BookmarksReplaced { count: usize },
    BookmarkInserted { index: usize },
    BookmarkUpdated { index: usize },
    BookmarksRemoved { indices: Vec<usize> },
    PageChanged { page: u32, max_page: u32 },
    SearchChanged(String),
    TagsReplaced { count: usize },
    SelectionChanged { count: usize },
    EditModeChanged(bool),
    HistoryPushed { url: String },
    ScrollReset,
    DialogChanged { visible: bool },
    ErrorRaised(UserError),
}
