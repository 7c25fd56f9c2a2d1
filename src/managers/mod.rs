// shelfview state managers
// Managers own the view's state: page and search, selection, tag catalog, history.

pub mod history_manager;
pub mod page_state_manager;
pub mod selection_manager;
pub mod tag_catalog_manager;
pub mod view_state;
