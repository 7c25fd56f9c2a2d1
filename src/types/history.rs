use serde::{Deserialize, Serialize};

/// Page identifier of the bookmark list view.
pub const HOME_PAGE_ID: &str = "page-home";

/// Location hash prefix owned by the bookmark list view.
pub const HOME_LOCATION: &str = "home";

/// State attached to a navigation history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    #[serde(default = "default_active_page")]
    pub active_page: String,
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl HistoryState {
    pub fn home(search: impl Into<String>, page: u32) -> Self {
        Self {
            active_page: HOME_PAGE_ID.to_string(),
            search: search.into(),
            page,
        }
    }
}

impl Default for HistoryState {
    fn default() -> Self {
        Self::home("", 1)
    }
}

fn default_active_page() -> String {
    HOME_PAGE_ID.to_string()
}

fn default_page() -> u32 {
    1
}

/// A navigation history entry: state plus the location it displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub state: Option<HistoryState>,
    pub url: String,
}
