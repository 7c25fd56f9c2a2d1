//! History Sync for the bookmark list.
//!
//! Mirrors search text and page number into navigation history entries and
//! restores them on back/forward navigation. The navigation stack itself is
//! behind the `Navigator` trait; `MemoryNavigator` keeps it in memory.

use crate::types::history::{HistoryEntry, HistoryState, HOME_LOCATION, HOME_PAGE_ID};

/// Navigation history the view writes to.
pub trait Navigator {
    /// Current location fragment, e.g. `#home?page=2`.
    fn location_hash(&self) -> String;
    fn push_state(&mut self, state: HistoryState, url: &str);
}

/// Back/forward stack kept in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNavigator {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl MemoryNavigator {
    /// Starts at `hash` with no state attached, like a freshly opened page.
    pub fn new(hash: &str) -> Self {
        Self {
            entries: vec![HistoryEntry {
                state: None,
                url: hash.to_string(),
            }],
            cursor: 0,
        }
    }

    /// Steps back. Returns the state of the entry now current, to be handed
    /// to the view as a pop event; `None` when already at the oldest entry.
    pub fn back(&mut self) -> Option<Option<HistoryState>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].state.clone())
    }

    /// Steps forward, see [`MemoryNavigator::back`].
    pub fn forward(&mut self) -> Option<Option<HistoryState>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].state.clone())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("")
    }
}

impl Navigator for MemoryNavigator {
    fn location_hash(&self) -> String {
        self.current().url.clone()
    }

    fn push_state(&mut self, state: HistoryState, url: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry {
            state: Some(state),
            url: url.to_string(),
        });
        self.cursor = self.entries.len() - 1;
    }
}

/// Keeps the view's search/page state and the navigation history in step.
#[derive(Debug)]
pub struct HistorySync<N> {
    navigator: N,
    listening: bool,
}

impl<N: Navigator> HistorySync<N> {
    pub fn new(navigator: N) -> Self {
        Self {
            navigator,
            listening: false,
        }
    }

    /// Starts listening for pop events and returns the search/page encoded
    /// in the current location, when it points at this view.
    pub fn mount(&mut self) -> Option<(String, u32)> {
        self.listening = true;
        decode_location(&self.navigator.location_hash())
    }

    /// Stops listening; later pop events are ignored.
    pub fn unmount(&mut self) {
        self.listening = false;
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Search/page to apply for a pop event, or `None` when the event is not
    /// for this view. A missing state counts as this view's defaults.
    pub fn restore(&self, state: Option<&HistoryState>) -> Option<(String, u32)> {
        if !self.listening {
            return None;
        }
        let state = state.cloned().unwrap_or_default();
        if state.active_page != HOME_PAGE_ID {
            return None;
        }
        Some((state.search, state.page.max(1)))
    }

    /// Pushes a history entry for `search`/`page`. Returns the entry URL.
    pub fn record(&mut self, search: &str, page: u32) -> String {
        let url = entry_url(search, page);
        self.navigator
            .push_state(HistoryState::home(search, page), &url);
        url
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }
}

/// Location of a history entry: `#home`, plus `page` when past the first
/// page and `search` when non-empty.
pub fn entry_url(search: &str, page: u32) -> String {
    let mut queries = Vec::new();
    if page > 1 {
        queries.push(format!("page={}", page));
    }
    if !search.is_empty() {
        queries.push(format!("search={}", urlencoding::encode(search)));
    }

    let mut url = format!("#{}", HOME_LOCATION);
    if !queries.is_empty() {
        url.push('?');
        url.push_str(&queries.join("&"));
    }
    url
}

/// Decodes `search` (default empty) and `page` (default 1) from a location
/// fragment that points at this view.
pub fn decode_location(hash: &str) -> Option<(String, u32)> {
    let hash = hash.strip_prefix('#').unwrap_or(hash);
    let (location, rest) = match hash.find('?') {
        Some(pos) => hash.split_at(pos),
        None => (hash, ""),
    };
    if location != HOME_LOCATION {
        return None;
    }

    // last occurrence wins, like a greedy match over the whole fragment
    let params: Vec<&str> = rest.split(|c| c == '?' || c == '&').collect();

    let search = params
        .iter()
        .rev()
        .find_map(|p| p.strip_prefix("search="))
        .map(|raw| {
            urlencoding::decode(raw)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        })
        .unwrap_or_default();

    let page = params
        .iter()
        .rev()
        .filter_map(|p| p.strip_prefix("page="))
        .map(|raw| {
            raw.chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
        })
        .find(|digits| !digits.is_empty())
        .and_then(|digits| digits.parse::<u32>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1);

    Some((search, page))
}
