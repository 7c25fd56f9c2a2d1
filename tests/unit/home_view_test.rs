//! Unit tests for the home view controller.
//!
//! Exercises the user-facing actions end to end against a scripted
//! transport: navigation, tag filtering, dialogs, single-item edits and tag
//! renames.

use serde_json::json;

use shelfview::app::{HomeView, PendingAction, SubmitOutcome};
use shelfview::managers::history_manager::{MemoryNavigator, Navigator};
use shelfview::managers::page_state_manager::PageStateTrait;
use shelfview::managers::selection_manager::SelectionManagerTrait;
use shelfview::managers::tag_catalog_manager::TagCatalogTrait;
use shelfview::services::api_client::{BOOKMARKS_PATH, TAGS_PATH, TAG_PATH};
use shelfview::services::bookmark_editor::RenameOutcome;
use shelfview::services::collection_sync::{FetchOutcome, FollowUp};
use shelfview::services::transport::Method;
use shelfview::testing::{bookmark, bookmarks, page_json, tag, tags_json, MockTransport};
use shelfview::types::bookmark::ItemRef;
use shelfview::types::dialog::{DialogData, FieldValue};
use shelfview::types::errors::{ValidationError, ViewError};
use shelfview::types::events::ViewEvent;
use shelfview::types::settings::DisplayOptions;

type View = HomeView<MockTransport, MemoryNavigator>;

/// Mounted view at `hash` whose server always answers with five bookmarks
/// on `page` and a three-tag catalog.
async fn mounted(hash: &str, page: u32) -> (MockTransport, View) {
    let mock = MockTransport::new();
    mock.always(
        Method::Get,
        BOOKMARKS_PATH,
        200,
        page_json(page, 3, &bookmarks(1..=5)).to_string(),
    );
    mock.always(
        Method::Get,
        TAGS_PATH,
        200,
        tags_json(&[tag(1, "go", 2), tag(2, "web dev", 1), tag(3, "rust", 4)]).to_string(),
    );
    let display = DisplayOptions {
        use_archive: true,
        make_public: false,
        list_mode: false,
    };
    let mut view = HomeView::new(mock.clone(), MemoryNavigator::new(hash), display);
    view.mount().await.unwrap();
    mock.clear_requests();
    (mock, view)
}

fn ids(view: &View) -> Vec<i64> {
    view.state().bookmarks().iter().map(|b| b.id).collect()
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Reload clears the search, returns to page 1, and refreshes the tags.
#[tokio::test]
async fn test_reload_resets_query_and_refreshes_tags() {
    let (mock, mut view) = mounted("#home?page=2&search=tokio", 1).await;

    let outcome = view.reload_data().await.unwrap();

    assert_eq!(outcome, FetchOutcome::Loaded { tags_refreshed: true });
    let sent = mock.requests_to(Method::Get, BOOKMARKS_PATH);
    assert_eq!(sent[0].query_value("page"), Some("1"));
    assert_eq!(sent[0].query_value("keyword"), Some(""));
    assert_eq!(mock.requests_to(Method::Get, TAGS_PATH).len(), 1);
    assert_eq!(view.history().navigator().location_hash(), "#home");
}

/// Paging resets the scroll position of the list.
#[tokio::test]
async fn test_change_page_resets_scroll() {
    let (_mock, mut view) = mounted("#home", 1).await;
    let mut events = view.subscribe();

    view.change_page(2).await.unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert_eq!(seen.first(), Some(&ViewEvent::ScrollReset));
}

/// Filtering by a tag appends its token, keeps the page, and a second
/// click on the same tag does nothing.
#[tokio::test]
async fn test_filter_tag_appends_once_and_keeps_page() {
    let (mock, mut view) = mounted("#home?page=2&search=guide", 2).await;

    view.filter_tag("web dev").await.unwrap();
    assert_eq!(view.state().page_state().search(), "guide \"#web dev\"");
    let sent = mock.requests_to(Method::Get, BOOKMARKS_PATH);
    assert_eq!(sent[0].query_value("page"), Some("2"));
    assert_eq!(sent[0].query_value("keyword"), Some("guide"));
    assert_eq!(sent[0].query_value("tags"), Some("web dev"));

    mock.clear_requests();
    assert_eq!(
        view.filter_tag("web dev").await.unwrap(),
        FetchOutcome::Skipped
    );
    assert!(mock.requests().is_empty());
}

/// Clicking a tag in browse mode filters by it.
#[tokio::test]
async fn test_tag_click_in_browse_mode_filters() {
    let (mock, mut view) = mounted("#home", 1).await;
    view.show_dialog_tags();

    let outcome = view.tag_clicked(0).await.unwrap();

    assert!(matches!(outcome, Some(FetchOutcome::Loaded { .. })));
    assert_eq!(view.state().page_state().search(), "#go");
    assert_eq!(mock.requests_to(Method::Get, BOOKMARKS_PATH).len(), 1);
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// A page or query change that fails still drops the selection, so no
/// batch operation can run against positions of the old list.
#[tokio::test]
async fn test_failed_navigation_drops_selection() {
    let (mock, mut view) = mounted("#home", 1).await;
    view.toggle_edit_mode();
    view.toggle_selection(ItemRef::new(2, 1));
    mock.respond(Method::Get, BOOKMARKS_PATH, 500, "database is locked");

    assert!(view.change_page(2).await.is_err());
    assert!(view.selection().is_empty());
    assert!(!view.state().selection().edit_mode());
    assert_eq!(ids(&view), vec![1, 2, 3, 4, 5]);

    view.toggle_edit_mode();
    view.toggle_selection(ItemRef::new(3, 2));
    mock.respond(Method::Get, BOOKMARKS_PATH, 500, "database is locked");

    assert!(view.search_bookmarks("#other").await.is_err());
    assert_eq!(view.state().page_state().search(), "#other");
    assert!(view.selection().is_empty());
    assert!(!view.state().selection().edit_mode());
    let stale = view.selection().to_vec();
    assert!(view.show_dialog_delete(&stale).is_none());
}

#[tokio::test]
async fn test_selection_follows_edit_mode() {
    let (_mock, mut view) = mounted("#home", 1).await;
    view.toggle_edit_mode();
    view.toggle_selection(ItemRef::new(2, 1));
    view.toggle_selection(ItemRef::new(4, 3));
    assert!(view.is_selected(2));
    assert_eq!(view.selection().len(), 2);

    view.toggle_edit_mode();
    assert!(!view.is_selected(2));
    assert!(view.selection().is_empty());
}

// ---------------------------------------------------------------------------
// Create and edit dialogs
// ---------------------------------------------------------------------------

/// The add form offers the catalog as completions and pre-fills the check
/// boxes from the display options.
#[tokio::test]
async fn test_add_dialog_defaults() {
    let (_mock, mut view) = mounted("#home", 1).await;

    let config = view.show_dialog_add().clone();

    assert_eq!(config.title, "New Bookmark");
    assert_eq!(
        config.field("tags").unwrap().dictionary,
        vec!["go", "web dev", "rust"]
    );
    assert_eq!(
        config.field("createArchive").unwrap().value,
        FieldValue::Flag(true)
    );
    assert_eq!(
        config.field("makePublic").unwrap().value,
        FieldValue::Flag(false)
    );
}

/// An empty URL is rejected locally and the form stays open.
#[tokio::test]
async fn test_add_with_empty_url_keeps_dialog() {
    let (mock, mut view) = mounted("#home", 1).await;
    view.show_dialog_add();

    let result = view
        .submit_dialog(DialogData::new().with_text("url", "   "))
        .await;

    assert_eq!(
        result,
        Err(ViewError::Validation(ValidationError::EmptyUrl))
    );
    assert!(view.dialog().is_some());
    assert!(mock.requests().is_empty());
    assert_eq!(
        view.state().last_error().unwrap().message,
        "URL must not be empty"
    );
}

/// A created bookmark is sent normalized and shown first.
#[tokio::test]
async fn test_add_inserts_created_bookmark_first() {
    let (mock, mut view) = mounted("#home", 1).await;
    mock.respond_json(Method::Post, BOOKMARKS_PATH, 201, json!(bookmark(99)));
    let config = view.show_dialog_add().clone();

    let data = DialogData::from_config(&config)
        .with_text("url", " https://example.com/99 ")
        .with_text("title", " Ninety nine ")
        .with_text("tags", "Rust,  Web   Dev");
    let outcome = view.submit_dialog(data).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Done);
    assert!(view.dialog().is_none());
    assert_eq!(ids(&view), vec![99, 1, 2, 3, 4, 5]);
    assert_eq!(
        mock.requests()[0].body,
        Some(json!({
            "url": "https://example.com/99",
            "title": "Ninety nine",
            "excerpt": "",
            "public": 0,
            "tags": [{ "name": "rust" }, { "name": "web dev" }],
            "createArchive": true,
        }))
    );
}

/// A server failure closes the form and shows the server's message.
#[tokio::test]
async fn test_add_server_failure_closes_dialog() {
    let (mock, mut view) = mounted("#home", 1).await;
    mock.respond(Method::Post, BOOKMARKS_PATH, 409, "URL already exists");
    view.show_dialog_add();

    let result = view
        .submit_dialog(DialogData::new().with_text("url", "https://example.com/1"))
        .await;

    assert!(matches!(result, Err(ViewError::Api(_))));
    assert!(view.dialog().is_none());
    assert_eq!(ids(&view), vec![1, 2, 3, 4, 5]);
    assert_eq!(view.state().last_error().unwrap().status, Some(409));
}

/// Edit fills the form from the row, ignores an empty title, and puts the
/// server's record back at the same row.
#[tokio::test]
async fn test_edit_replaces_row_in_place() {
    let (mock, mut view) = mounted("#home", 1).await;
    let config = view.show_dialog_edit(ItemRef::new(2, 1)).cloned().unwrap();
    assert_eq!(config.title, "Edit Bookmark");
    assert!(config.show_label);
    assert_eq!(
        config.field("url").unwrap().value,
        FieldValue::Text("https://example.com/2".to_string())
    );

    let blank = DialogData::from_config(&config).with_text("title", "  ");
    assert_eq!(view.submit_dialog(blank).await.unwrap(), SubmitOutcome::KeptOpen);
    assert!(mock.requests().is_empty());

    let mut saved = bookmark(2);
    saved.title = "Renamed".to_string();
    mock.respond_json(Method::Put, BOOKMARKS_PATH, 200, json!(saved));
    let data = DialogData::from_config(&config)
        .with_text("title", "Renamed")
        .with_text("tags", "A, b")
        .with_flag("makePublic", true);
    assert_eq!(view.submit_dialog(data).await.unwrap(), SubmitOutcome::Done);

    let body = mock.requests()[0].body.clone().unwrap();
    assert_eq!(body["id"], json!(2));
    assert_eq!(body["public"], json!(1));
    assert_eq!(body["tags"], json!([{ "name": "a" }, { "name": "b" }]));
    assert_eq!(ids(&view), vec![1, 2, 3, 4, 5]);
    assert_eq!(view.state().bookmarks()[1].title, "Renamed");
}

// ---------------------------------------------------------------------------
// Batch dialogs
// ---------------------------------------------------------------------------

/// Delete dialog text depends on how many rows are affected.
#[tokio::test]
async fn test_delete_dialog_texts() {
    let (_mock, mut view) = mounted("#home", 1).await;

    let single = view.show_dialog_delete(&[ItemRef::new(1, 0)]).cloned().unwrap();
    assert_eq!(single.title, "Delete Bookmark");
    assert_eq!(single.content, "Are you sure ? This action is irreversible.");
    assert_eq!((single.main_text.as_str(), single.second_text.as_str()), ("Yes", "No"));

    let multi = view
        .show_dialog_delete(&[ItemRef::new(1, 0), ItemRef::new(0, 4), ItemRef::new(3, 2)])
        .cloned()
        .unwrap();
    assert_eq!(multi.title, "Delete Bookmarks");
    assert_eq!(
        view.dialog().unwrap().action,
        PendingAction::Delete(vec![ItemRef::new(1, 0), ItemRef::new(3, 2)])
    );
}

/// Confirming deletion removes the rows and refills the short page.
#[tokio::test]
async fn test_delete_dialog_submit() {
    let (mock, mut view) = mounted("#home", 1).await;
    mock.respond(Method::Delete, BOOKMARKS_PATH, 200, "1");
    mock.respond_json(Method::Get, BOOKMARKS_PATH, 200, page_json(1, 1, &bookmarks([1, 3, 4, 5, 6])));
    view.show_dialog_delete(&[ItemRef::new(2, 1)]);

    let outcome = view.submit_dialog(DialogData::new()).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Done);
    assert_eq!(mock.requests()[0].body, Some(json!([2])));
    assert_eq!(ids(&view), vec![1, 3, 4, 5, 6]);
}

/// The cache dialog pre-checks archive regeneration from display options.
#[tokio::test]
async fn test_update_cache_dialog_default() {
    let (_mock, mut view) = mounted("#home", 1).await;
    let config = view.show_dialog_update_cache(&[ItemRef::new(1, 0)]).cloned().unwrap();
    assert_eq!(
        config.field("createArchive").unwrap().value,
        FieldValue::Flag(true)
    );
    assert!(view.show_dialog_add_tags(&[ItemRef::new(-1, 0)]).is_none());
}

#[tokio::test]
async fn test_submit_without_dialog() {
    let (mock, mut view) = mounted("#home", 1).await;
    assert_eq!(
        view.submit_dialog(DialogData::new()).await.unwrap(),
        SubmitOutcome::NoDialog
    );
    assert!(mock.requests().is_empty());
}

// ---------------------------------------------------------------------------
// Tag rename
// ---------------------------------------------------------------------------

/// Renaming re-sorts the catalog, rewrites the first matching token in the
/// search text, reloads with a new history entry, and returns to the
/// catalog in browse mode.
#[tokio::test]
async fn test_rename_tag_rewrites_search() {
    let (mock, mut view) = mounted("#home", 1).await;
    view.search_bookmarks("#rust tokio #rust").await.unwrap();
    mock.clear_requests();
    mock.respond(Method::Put, TAG_PATH, 200, "{}");

    view.show_dialog_tags();
    view.tags_dialog_rename_mode();
    assert_eq!(view.tag_clicked(2).await.unwrap(), None);
    assert!(!view.state().tags_dialog().visible);
    let config = view.dialog().unwrap().config.clone();
    assert_eq!(config.content, "Change the name for tag \"#rust\"");

    let outcome = view
        .submit_dialog(DialogData::new().with_text("newName", "Alpha"))
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Done);
    assert_eq!(mock.requests()[0].body, Some(json!({ "id": 3, "name": "Alpha" })));
    assert_eq!(view.state().tags().names(), vec!["Alpha", "go", "web dev"]);
    assert_eq!(view.state().page_state().search(), "#Alpha tokio #rust");
    assert_eq!(
        view.history().navigator().location_hash(),
        "#home?search=%23Alpha%20tokio%20%23rust"
    );
    assert!(view.state().tags_dialog().visible);
    assert!(!view.state().tags_dialog().edit_mode);
}

/// When the search does not mention the old name nothing is reloaded.
#[tokio::test]
async fn test_rename_unrelated_tag_does_not_reload() {
    let (mock, mut view) = mounted("#home", 1).await;
    mock.respond(Method::Put, TAG_PATH, 200, "{}");

    view.rename_tag(0, "golang").await.unwrap();

    assert!(mock.requests_to(Method::Get, BOOKMARKS_PATH).is_empty());
    assert_eq!(view.state().tags().names(), vec!["golang", "rust", "web dev"]);
}

/// The rename stands when the reload that follows it fails.
#[tokio::test]
async fn test_rename_reports_failed_reload() {
    let (mock, mut view) = mounted("#home?search=%23go", 1).await;
    mock.respond(Method::Put, TAG_PATH, 200, "{}");
    mock.respond(Method::Get, BOOKMARKS_PATH, 503, "busy");

    let outcome = view.rename_tag(0, "golang").await.unwrap();

    assert_eq!(
        outcome,
        RenameOutcome::Renamed {
            reload: FollowUp::Failed
        }
    );
    assert_eq!(view.state().page_state().search(), "#golang");
    assert_eq!(view.state().tags().names(), vec!["golang", "rust", "web dev"]);
    assert_eq!(view.state().last_error().unwrap().status, Some(503));

    assert_eq!(view.dismiss_error().unwrap().message, "busy");
    assert!(view.state().last_error().is_none());
}

/// A failed rename closes the catalog and shows the error.
#[tokio::test]
async fn test_rename_failure_closes_tags_dialog() {
    let (mock, mut view) = mounted("#home", 1).await;
    mock.respond(Method::Put, TAG_PATH, 400, "name already used");
    view.show_dialog_tags();
    view.tags_dialog_rename_mode();
    view.tag_clicked(1).await.unwrap();

    let result = view
        .submit_dialog(DialogData::new().with_text("newName", "go"))
        .await;

    assert!(result.is_err());
    assert!(view.dialog().is_none());
    assert!(!view.state().tags_dialog().visible);
    assert!(!view.state().tags_dialog().edit_mode);
    assert_eq!(view.state().tags().names(), vec!["go", "web dev", "rust"]);
    assert_eq!(view.state().last_error().unwrap().message, "name already used");
}

// ---------------------------------------------------------------------------
// Tag catalog dialog buttons
// ---------------------------------------------------------------------------

/// The main button leaves rename mode first and closes on the next click;
/// escape closes from any mode.
#[tokio::test]
async fn test_tags_dialog_buttons() {
    let (_mock, mut view) = mounted("#home", 1).await;

    view.show_dialog_tags();
    view.tags_dialog_rename_mode();
    assert_eq!(view.state().tags_dialog().title(), "Rename Tags");

    view.tags_dialog_main();
    assert!(view.state().tags_dialog().visible);
    assert!(!view.state().tags_dialog().edit_mode);
    view.tags_dialog_main();
    assert!(!view.state().tags_dialog().visible);

    view.show_dialog_tags();
    view.tags_dialog_rename_mode();
    view.close_tags_dialog();
    assert!(!view.state().tags_dialog().visible);
    assert!(!view.state().tags_dialog().edit_mode);
}
