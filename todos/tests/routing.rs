//! Integration tests for router / state machine synchronization
//!
//! Exercises the full loop: simulated browser navigations flow in through
//! the router listener, transitions emit push events, and pushes rewrite
//! the in-memory address bar - without ever echoing back into the listener.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use waymark_core::environment::Clock;
use waymark_runtime::Store;
use waymark_testing::{init_test_tracing, test_clock};
use waymark_todos::{
    AppAction, AppEnvironment, AppReducer, AppState, History, MemoryHistory, Route,
    RouterService, TodoId, TodoItem, ViewTag,
};

type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

// ============================================================================
// Harness
// ============================================================================

fn seeded(todos: &[(u64, &str)]) -> AppState {
    let now = test_clock().now();
    let mut state = AppState::new();
    for (id, content) in todos {
        state
            .todos
            .push(TodoItem::new(TodoId::new(*id), (*content).to_string(), now));
    }
    state
}

fn harness(initial: AppState) -> (AppStore, Arc<MemoryHistory>, RouterService) {
    init_test_tracing();

    let (history, changes) = MemoryHistory::new();
    let env = AppEnvironment::new(
        Arc::new(test_clock()),
        Arc::clone(&history) as Arc<dyn History>,
    );
    let store = Store::new(initial, AppReducer::new(), env);
    let router = RouterService::spawn(store.clone(), changes);

    (store, history, router)
}

/// Wait until the store broadcasts an action matching the predicate
async fn wait_for(rx: &mut broadcast::Receiver<AppAction>, pred: impl Fn(&AppAction) -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(action) if pred(&action) => break,
                Ok(_) => {},
                Err(error) => panic!("broadcast closed while waiting: {error}"),
            }
        }
    })
    .await
    .expect("timed out waiting for action");
}

/// Let in-flight effects of the last observed action finish
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

// ============================================================================
// Round trip & loop prevention
// ============================================================================

#[tokio::test]
async fn entering_todos_rewrites_the_address_bar() {
    let (store, history, router) = harness(AppState::new());

    let mut handle = store.send(AppAction::NavigateToTodos).await.unwrap();
    handle.wait().await;

    assert_eq!(history.current(), "/todos");
    assert_eq!(history.rewrite_count(), 1);

    router.shutdown();
}

#[tokio::test]
async fn browser_navigation_re_enters_without_looping() {
    let (store, history, router) = harness(AppState::new());

    // Core-initiated entry writes the bar once
    let mut handle = store.send(AppAction::NavigateToTodos).await.unwrap();
    handle.wait().await;
    assert_eq!(history.rewrite_count(), 1);

    // Browser-initiated re-entry: the push is emitted again, but the
    // rewrite is skipped and nothing echoes back into the listener
    let mut rx = store.subscribe_actions();
    history.navigate("/todos");
    wait_for(&mut rx, |a| matches!(a, AppAction::PushTodos)).await;
    settle().await;

    let route = store.state(|s| s.route.clone()).await;
    assert_eq!(route, Route::Todos);
    assert_eq!(history.rewrite_count(), 1, "re-entry must not rewrite the bar");
    assert!(
        matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)),
        "no further events may follow the suppressed rewrite"
    );

    router.shutdown();
}

#[tokio::test]
async fn re_entrant_detail_navigation_is_suppressed() {
    let (store, history, router) = harness(seeded(&[(1, "Foo")]));

    let mut rx = store.subscribe_actions();
    history.navigate("/todo/1");
    wait_for(&mut rx, |a| matches!(a, AppAction::PushTodo { .. })).await;
    settle().await;
    assert_eq!(history.rewrite_count(), 0);

    // Navigating to the same todo again is a no-op: no push, no rewrite
    history.navigate("/todo/1");
    wait_for(&mut rx, |a| matches!(a, AppAction::NavigateToTodo { .. })).await;
    settle().await;

    assert!(
        matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)),
        "re-entrant navigation must not emit a push"
    );
    assert_eq!(history.rewrite_count(), 0);

    router.shutdown();
}

// ============================================================================
// Browser-driven navigation
// ============================================================================

#[tokio::test]
async fn navigating_to_an_existing_todo_selects_it() {
    let (store, history, router) = harness(seeded(&[(1, "Foo")]));

    let mut rx = store.subscribe_actions();
    history.navigate("/todo/1");
    wait_for(&mut rx, |a| matches!(a, AppAction::PushTodo { .. })).await;
    settle().await;

    let (route, selected, tags) = store
        .state(|s| (s.route.clone(), s.selected, s.tags()))
        .await;
    assert_eq!(route, Route::Todo);
    assert_eq!(selected, Some(TodoId::new(1)));
    assert_eq!(tags, &[ViewTag::Todo]);

    // The bar already showed /todo/1; no redundant rewrite happened
    assert_eq!(history.current(), "/todo/1");
    assert_eq!(history.rewrite_count(), 0);

    router.shutdown();
}

#[tokio::test]
async fn navigating_to_an_absent_todo_shows_the_error_view() {
    let (store, history, router) = harness(seeded(&[(1, "Foo")]));

    let mut rx = store.subscribe_actions();
    history.navigate("/todo/99");
    wait_for(&mut rx, |a| matches!(a, AppAction::NavigateToTodo { .. })).await;
    settle().await;

    let (route, selected, tags) = store
        .state(|s| (s.route.clone(), s.selected, s.tags()))
        .await;
    assert_eq!(route, Route::InvalidTodo { id: TodoId::new(99) });
    assert_eq!(selected, None, "selection must be untouched");
    assert_eq!(tags, &[ViewTag::InvalidTodo]);

    // The mistyped URL stays visible; there is no push for the error view
    assert_eq!(history.current(), "/todo/99");
    assert_eq!(history.rewrite_count(), 0);

    router.shutdown();
}

#[tokio::test]
async fn unroutable_paths_show_not_found() {
    let (store, history, router) = harness(AppState::new());

    let mut rx = store.subscribe_actions();
    history.navigate("/bogus/path");
    wait_for(&mut rx, |a| matches!(a, AppAction::RouteNotFound { .. })).await;
    settle().await;

    let tags = store.state(AppState::tags).await;
    assert_eq!(tags, &[ViewTag::NotFound]);
    assert_eq!(history.current(), "/bogus/path");

    // Any later navigation leaves the not-found view
    history.navigate("/todos");
    wait_for(&mut rx, |a| matches!(a, AppAction::PushTodos)).await;
    settle().await;

    let tags = store.state(AppState::tags).await;
    assert_eq!(tags, &[ViewTag::Todos]);

    router.shutdown();
}

// ============================================================================
// User intents through the full loop
// ============================================================================

#[tokio::test]
async fn adding_a_todo_returns_to_the_list_and_rewrites() {
    let (store, history, router) = harness(seeded(&[(1, "Foo")]));

    let mut rx = store.subscribe_actions();
    history.navigate("/todo/new");
    wait_for(&mut rx, |a| matches!(a, AppAction::PushNewTodo)).await;
    settle().await;
    assert_eq!(store.state(AppState::tags).await, &[ViewTag::NewTodo]);

    // Waiting on the handle covers the push and the rewrite it describes
    let mut handle = store
        .send(AppAction::AddNewTodo {
            content: "Bar".to_string(),
        })
        .await
        .unwrap();
    handle.wait().await;

    let contents = store
        .state(|s| {
            s.todos
                .iter()
                .map(|t| (t.id.get(), t.content.clone(), t.completed))
                .collect::<Vec<_>>()
        })
        .await;
    assert_eq!(
        contents,
        vec![
            (1, "Foo".to_string(), false),
            (2, "Bar".to_string(), false)
        ]
    );
    assert_eq!(store.state(AppState::tags).await, &[ViewTag::Todos]);
    assert_eq!(history.current(), "/todos");
    assert_eq!(history.rewrite_count(), 1);

    router.shutdown();
}

#[tokio::test]
async fn rejected_add_keeps_the_form_and_the_bar() {
    let (store, history, router) = harness(AppState::new());

    let mut rx = store.subscribe_actions();
    history.navigate("/todo/new");
    wait_for(&mut rx, |a| matches!(a, AppAction::PushNewTodo)).await;
    settle().await;

    let mut handle = store
        .send(AppAction::AddNewTodo {
            content: String::new(),
        })
        .await
        .unwrap();
    handle.wait().await;

    assert_eq!(store.state(|s| s.count()).await, 0);
    assert_eq!(store.state(AppState::tags).await, &[ViewTag::NewTodo]);
    assert_eq!(history.current(), "/todo/new");

    router.shutdown();
}

#[tokio::test]
async fn removing_the_shown_todo_falls_back_to_the_list() {
    let (store, history, router) = harness(seeded(&[(1, "Foo"), (2, "Bar")]));

    let mut rx = store.subscribe_actions();
    history.navigate("/todo/2");
    wait_for(&mut rx, |a| matches!(a, AppAction::PushTodo { .. })).await;
    settle().await;

    let mut handle = store
        .send(AppAction::RemoveTodo { id: TodoId::new(2) })
        .await
        .unwrap();
    handle.wait().await;

    let (selected, exists, tags) = store
        .state(|s| (s.selected, s.exists(TodoId::new(2)), s.tags()))
        .await;
    assert_eq!(selected, None);
    assert!(!exists);
    assert_eq!(tags, &[ViewTag::Todos]);
    assert_eq!(history.current(), "/todos");
    assert_eq!(history.rewrite_count(), 1);

    router.shutdown();
}

// ============================================================================
// Teardown
// ============================================================================

#[tokio::test]
async fn shutdown_tears_down_listener_and_store() {
    let (store, history, router) = harness(AppState::new());

    let mut handle = store.send(AppAction::NavigateToTodos).await.unwrap();
    handle.wait().await;

    router.shutdown();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    // The store rejects further dispatches...
    assert!(store.send(AppAction::NavigateToTodos).await.is_err());

    // ...and torn-down listeners leave the bar alone
    let before = history.rewrite_count();
    history.navigate("/todo/new");
    settle().await;
    assert_eq!(history.rewrite_count(), before);
}
