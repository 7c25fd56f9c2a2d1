//! Page State Controller for the bookmark list.
//!
//! Owns the search text, the current and last page numbers, and the
//! single-flight loading flag that gates every collection fetch.

/// Trait defining page state operations.
pub trait PageStateTrait {
    /// Marks a fetch as started. Returns `false`, changing nothing, when one
    /// is already in flight.
    fn begin_load(&mut self) -> bool;
    fn end_load(&mut self);
    fn is_loading(&self) -> bool;
    fn page(&self) -> u32;
    fn max_page(&self) -> u32;
    fn search(&self) -> &str;
    fn set_search(&mut self, search: &str);
    /// Explicit reload: page 1 and an empty search.
    fn reset(&mut self);
    /// New search: page 1, search text kept.
    fn start_search(&mut self);
    /// Page navigation: search text kept.
    fn change_page(&mut self, page: u32);
    fn apply_response(&mut self, page: u32, max_page: u32);
}

/// In-memory page state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStateController {
    search: String,
    page: u32,
    max_page: u32,
    loading: bool,
}

impl PageStateController {
    pub fn new() -> Self {
        Self {
            search: String::new(),
            page: 1,
            max_page: 0,
            loading: false,
        }
    }
}

impl Default for PageStateController {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStateTrait for PageStateController {
    fn begin_load(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    fn end_load(&mut self) {
        self.loading = false;
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn page(&self) -> u32 {
        self.page
    }

    fn max_page(&self) -> u32 {
        self.max_page
    }

    fn search(&self) -> &str {
        &self.search
    }

    fn set_search(&mut self, search: &str) {
        self.search = search.to_string();
    }

    fn reset(&mut self) {
        self.page = 1;
        self.search.clear();
    }

    fn start_search(&mut self) {
        self.page = 1;
    }

    fn change_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    fn apply_response(&mut self, page: u32, max_page: u32) {
        self.page = page.max(1);
        self.max_page = max_page;
    }
}
