use serde::{Deserialize, Serialize};

/// A saved bookmark as returned by the collection endpoint.
///
/// Records are always replaced whole with what the server sends back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub public: i32,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub has_content: bool,
    #[serde(default)]
    pub has_archive: bool,
    #[serde(default, rename = "imageURL")]
    pub image_url: String,
}

impl Bookmark {
    /// Tag names joined the way the edit form displays them.
    pub fn tag_line(&self) -> String {
        self.tags
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A tag, either from the catalog or attached to a bookmark.
///
/// Tags built locally for a request only carry a name; zero `id` and
/// `nBookmarks` are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "nBookmarks", skip_serializing_if = "is_zero")]
    pub n_bookmarks: i64,
}

impl Tag {
    /// A request-side tag holding only its name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            n_bookmarks: 0,
        }
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// One page of the collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkPage {
    pub page: u32,
    #[serde(rename = "maxPage")]
    pub max_page: u32,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

/// Body of `POST /api/bookmarks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub public: i32,
    pub tags: Vec<Tag>,
    pub create_archive: bool,
}

/// Fields entered in the create or edit form, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkForm {
    pub url: String,
    pub title: String,
    pub excerpt: String,
    /// Comma separated tag names.
    pub tags: String,
    pub make_public: bool,
    pub create_archive: bool,
}

/// A reference to a displayed item as handed in by the UI: possibly invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub id: i64,
    pub index: i64,
}

impl ItemRef {
    pub fn new(id: i64, index: i64) -> Self {
        Self { id, index }
    }

    /// Validates the reference. Non-positive ids and negative indices are rejected.
    pub fn target(&self) -> Option<Target> {
        if self.id < 1 || self.index < 0 {
            return None;
        }
        Some(Target {
            id: self.id,
            index: self.index as usize,
        })
    }
}

/// A validated `{id, index}` pair captured before a server round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    pub id: i64,
    pub index: usize,
}

/// Normalizes a list of raw references, dropping invalid entries.
pub fn validate_targets(items: &[ItemRef]) -> Vec<Target> {
    items.iter().filter_map(ItemRef::target).collect()
}
