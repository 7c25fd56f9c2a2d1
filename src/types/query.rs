use serde::{Deserialize, Serialize};

/// Structured form of a free-text search string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Remaining free text, trimmed and single-spaced.
    pub keyword: String,
    /// Tag filters in discovery order. Duplicates are kept.
    pub tags: Vec<String>,
}

impl SearchQuery {
    /// Tags as sent in the `tags` request parameter.
    pub fn tags_param(&self) -> String {
        self.tags.join(",")
    }

    pub fn is_empty(&self) -> bool {
        self.keyword.is_empty() && self.tags.is_empty()
    }
}
