//! Unit tests for the Batch Mutation Coordinator.
//!
//! Delete, add-tags and cache updates against a scripted transport: request
//! bodies, in-place reconciliation, refill after delete, and selection reset.

use rstest::rstest;
use serde_json::json;

use shelfview::managers::history_manager::{HistorySync, MemoryNavigator};
use shelfview::managers::selection_manager::SelectionManagerTrait;
use shelfview::managers::view_state::ViewState;
use shelfview::services::api_client::{
    ApiClient, BOOKMARKS_PATH, BOOKMARK_TAGS_PATH, CACHE_PATH, TAGS_PATH,
};
use shelfview::services::batch_mutation::{BatchMutationCoordinator, BatchOutcome};
use shelfview::services::collection_sync::FollowUp;
use shelfview::services::transport::Method;
use shelfview::testing::{bookmark, bookmarks, page_json, MockTransport};
use shelfview::types::bookmark::{Bookmark, BookmarkPage, ItemRef, Tag};

fn setup(len: i64) -> (MockTransport, BatchMutationCoordinator<MockTransport>, ViewState) {
    setup_with(bookmarks(1..=len))
}

fn setup_with(
    list: Vec<Bookmark>,
) -> (MockTransport, BatchMutationCoordinator<MockTransport>, ViewState) {
    let mock = MockTransport::new();
    let coordinator = BatchMutationCoordinator::new(ApiClient::new(mock.clone()));
    let mut state = ViewState::new();
    state.replace_page(BookmarkPage {
        page: 1,
        max_page: 3,
        bookmarks: list,
    });
    (mock, coordinator, state)
}

fn titles(state: &ViewState) -> Vec<&str> {
    state.bookmarks().iter().map(|b| b.title.as_str()).collect()
}

fn retitled(id: i64, title: &str) -> Bookmark {
    let mut book = bookmark(id);
    book.title = title.to_string();
    book
}

fn history() -> HistorySync<MemoryNavigator> {
    HistorySync::new(MemoryNavigator::new("#home"))
}

fn ids(state: &ViewState) -> Vec<i64> {
    state.bookmarks().iter().map(|b| b.id).collect()
}

/// Puts the view in edit mode with the given items selected.
fn select(state: &mut ViewState, items: &[ItemRef]) {
    state.toggle_edit_mode();
    for item in items {
        state.toggle_selection(*item);
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Only invalid references: nothing is sent and nothing changes.
#[tokio::test]
async fn test_invalid_items_skip_every_operation() {
    let (mock, coordinator, mut state) = setup(3);
    let mut history = history();
    let items = [ItemRef::new(0, 1), ItemRef::new(2, -1)];

    assert_eq!(
        coordinator.delete(&mut state, &mut history, &items).await.unwrap(),
        BatchOutcome::Skipped
    );
    assert_eq!(
        coordinator.add_tags(&mut state, &items, "x").await.unwrap(),
        BatchOutcome::Skipped
    );
    assert_eq!(
        coordinator.update_cache(&mut state, &items, true).await.unwrap(),
        BatchOutcome::Skipped
    );
    assert!(mock.requests().is_empty());
    assert_eq!(ids(&state), vec![1, 2, 3]);
}

/// A tag field with nothing but separators sends nothing.
#[tokio::test]
async fn test_add_tags_without_names_is_skipped() {
    let (mock, coordinator, mut state) = setup(3);
    let outcome = coordinator
        .add_tags(&mut state, &[ItemRef::new(1, 0)], " , ,")
        .await
        .unwrap();
    assert_eq!(outcome, BatchOutcome::Skipped);
    assert!(mock.requests().is_empty());
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Selected rows disappear, the rest keep their order, the request body is
/// the id list, and selection and edit mode are reset.
#[tokio::test]
async fn test_delete_removes_rows_in_place() {
    let (mock, coordinator, mut state) = setup(25);
    let mut history = history();
    let items = [ItemRef::new(2, 1), ItemRef::new(4, 3)];
    select(&mut state, &items);
    mock.respond(Method::Delete, BOOKMARKS_PATH, 200, "1");

    let outcome = coordinator.delete(&mut state, &mut history, &items).await.unwrap();

    assert_eq!(
        outcome,
        BatchOutcome::Applied {
            affected: 2,
            top_up: FollowUp::NotNeeded
        }
    );
    assert_eq!(state.bookmarks().len(), 23);
    assert_eq!(&ids(&state)[..4], &[1, 3, 5, 6]);
    assert_eq!(mock.requests()[0].body, Some(json!([2, 4])));
    assert!(state.selection().selection().is_empty());
    assert!(!state.selection().edit_mode());
}

/// The refill fetch runs only when the list drops strictly below 20 rows.
#[rstest]
#[case(21, 1, FollowUp::NotNeeded)]
#[case(20, 1, FollowUp::Loaded)]
#[case(22, 2, FollowUp::NotNeeded)]
#[case(22, 3, FollowUp::Loaded)]
#[tokio::test]
async fn test_delete_refill_threshold(
    #[case] len: i64,
    #[case] removed: i64,
    #[case] top_up: FollowUp,
) {
    let (mock, coordinator, mut state) = setup(len);
    let mut history = history();
    mock.respond(Method::Delete, BOOKMARKS_PATH, 200, "1");
    mock.respond_json(
        Method::Get,
        BOOKMARKS_PATH,
        200,
        page_json(1, 3, &bookmarks(100..120)),
    );
    let items: Vec<ItemRef> = (0..removed).map(|i| ItemRef::new(i + 1, i)).collect();

    let outcome = coordinator.delete(&mut state, &mut history, &items).await.unwrap();

    assert_eq!(
        outcome,
        BatchOutcome::Applied {
            affected: removed as usize,
            top_up
        }
    );
    let refills = mock.requests_to(Method::Get, BOOKMARKS_PATH);
    let refilled = top_up == FollowUp::Loaded;
    assert_eq!(refills.len(), usize::from(refilled));
    if refilled {
        assert_eq!(state.bookmarks().len(), 20);
        assert_eq!(refills[0].query_value("page"), Some("1"));
        // refill is quiet: no history entry and no tag reload
        assert_eq!(history.navigator().entries().len(), 1);
        assert!(mock.requests_to(Method::Get, TAGS_PATH).is_empty());
    }
}

/// A failed refill is reported in the outcome; the delete itself stands.
#[tokio::test]
async fn test_delete_reports_failed_refill() {
    let (mock, coordinator, mut state) = setup(5);
    let mut history = history();
    mock.respond(Method::Delete, BOOKMARKS_PATH, 200, "1");
    mock.respond(Method::Get, BOOKMARKS_PATH, 502, "bad gateway");

    let outcome = coordinator
        .delete(&mut state, &mut history, &[ItemRef::new(5, 4)])
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BatchOutcome::Applied {
            affected: 1,
            top_up: FollowUp::Failed
        }
    );
    assert_eq!(ids(&state), vec![1, 2, 3, 4]);
    assert_eq!(state.last_error().unwrap().status, Some(502));
}

/// A failed delete keeps every row but still leaves edit mode.
#[tokio::test]
async fn test_delete_failure_keeps_list_and_resets_selection() {
    let (mock, coordinator, mut state) = setup(5);
    let mut history = history();
    let items = [ItemRef::new(1, 0)];
    select(&mut state, &items);
    mock.respond(Method::Delete, BOOKMARKS_PATH, 403, "read only");

    let err = coordinator
        .delete(&mut state, &mut history, &items)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert_eq!(ids(&state), vec![1, 2, 3, 4, 5]);
    assert!(state.selection().selection().is_empty());
    assert!(!state.selection().edit_mode());
    assert_eq!(state.last_error().unwrap().message, "read only");
}

// ---------------------------------------------------------------------------
// Add tags and cache update
// ---------------------------------------------------------------------------

/// Updated records land at the positions captured for their ids even when
/// the server answers in another order.
#[tokio::test]
async fn test_add_tags_reconciles_reversed_response() {
    let (mock, coordinator, mut state) = setup(4);
    let items = [ItemRef::new(2, 1), ItemRef::new(4, 3)];
    select(&mut state, &items);

    let mut fresh = vec![bookmark(4), bookmark(2)];
    for book in &mut fresh {
        book.tags = vec![Tag::named("later")];
    }
    mock.respond_json(Method::Put, BOOKMARK_TAGS_PATH, 200, json!(fresh));

    let outcome = coordinator
        .add_tags(&mut state, &items, "Later, ")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BatchOutcome::Applied {
            affected: 2,
            top_up: FollowUp::NotNeeded
        }
    );
    assert_eq!(ids(&state), vec![1, 2, 3, 4]);
    assert_eq!(state.bookmarks()[1].tag_line(), "later");
    assert_eq!(state.bookmarks()[3].tag_line(), "later");
    assert!(state.bookmarks()[0].tags.is_empty());
    assert_eq!(
        mock.requests()[0].body,
        Some(json!({ "ids": [2, 4], "tags": [{ "name": "later" }] }))
    );
    assert!(!state.selection().edit_mode());
}

/// Ids that do not match their list position: each record still goes to
/// the index captured with its id.
#[tokio::test]
async fn test_add_tags_uses_captured_positions() {
    let (mock, coordinator, mut state) = setup_with(bookmarks([9, 3, 7]));
    mock.respond_json(
        Method::Put,
        BOOKMARK_TAGS_PATH,
        200,
        json!([retitled(9, "new9"), retitled(7, "new7")]),
    );

    coordinator
        .add_tags(&mut state, &[ItemRef::new(7, 2), ItemRef::new(9, 0)], "x")
        .await
        .unwrap();

    assert_eq!(ids(&state), vec![9, 3, 7]);
    assert_eq!(titles(&state), vec!["new9", "Bookmark 3", "new7"]);
    assert_eq!(
        mock.requests()[0].body,
        Some(json!({ "ids": [7, 9], "tags": [{ "name": "x" }] }))
    );
}

/// The captured index wins even when another bookmark sits there now.
#[tokio::test]
async fn test_update_cache_does_not_look_positions_up_again() {
    let (mock, coordinator, mut state) = setup_with(bookmarks([5, 6, 7]));
    mock.respond_json(Method::Put, CACHE_PATH, 200, json!([retitled(7, "cached 7")]));

    coordinator
        .update_cache(&mut state, &[ItemRef::new(7, 0)], false)
        .await
        .unwrap();

    assert_eq!(ids(&state), vec![7, 6, 7]);
    assert_eq!(titles(&state), vec!["cached 7", "Bookmark 6", "Bookmark 7"]);
}

/// Records for ids that were not requested are ignored.
#[tokio::test]
async fn test_update_cache_skips_unknown_ids() {
    let (mock, coordinator, mut state) = setup(3);
    let mut cached = bookmark(3);
    cached.has_archive = true;
    let mut stranger = bookmark(42);
    stranger.has_archive = true;
    mock.respond_json(Method::Put, CACHE_PATH, 200, json!([stranger, cached]));

    let outcome = coordinator
        .update_cache(&mut state, &[ItemRef::new(3, 2)], true)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BatchOutcome::Applied {
            affected: 1,
            top_up: FollowUp::NotNeeded
        }
    );
    assert_eq!(ids(&state), vec![1, 2, 3]);
    assert!(state.bookmarks()[2].has_archive);
    assert_eq!(
        mock.requests()[0].body,
        Some(json!({ "ids": [3], "createArchive": true }))
    );
}

/// A failed cache update clears selection before the error shows.
#[tokio::test]
async fn test_update_cache_failure_resets_selection() {
    let (mock, coordinator, mut state) = setup(2);
    let items = [ItemRef::new(1, 0), ItemRef::new(2, 1)];
    select(&mut state, &items);
    mock.respond(Method::Put, CACHE_PATH, 500, "archiver crashed");

    assert!(coordinator
        .update_cache(&mut state, &items, false)
        .await
        .is_err());
    assert!(state.selection().selection().is_empty());
    assert!(!state.selection().edit_mode());
    assert_eq!(state.last_error().unwrap().status, Some(500));
}
