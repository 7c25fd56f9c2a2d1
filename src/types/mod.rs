// shelfview shared types
// Plain data: bookmarks and tags, queries, history entries, dialogs, events, errors, settings.

pub mod bookmark;
pub mod dialog;
pub mod errors;
pub mod events;
pub mod history;
pub mod query;
pub mod settings;
