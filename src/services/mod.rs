// shelfview services
// Services talk to the bookmark server and apply its answers to the view state.

pub mod api_client;
pub mod batch_mutation;
pub mod bookmark_editor;
pub mod collection_sync;
pub mod query_parser;
pub mod settings_engine;
pub mod transport;
