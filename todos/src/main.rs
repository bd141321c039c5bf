//! CLI demo for the router-synchronized todo application.
//!
//! Drives the full loop - simulated browser navigations through the router,
//! user intents through the store - and prints each rendered view together
//! with the current address bar.

use std::sync::Arc;
use std::time::Duration;
use waymark_core::environment::SystemClock;
use waymark_runtime::Store;
use waymark_todos::{
    AppAction, AppEnvironment, AppReducer, AppState, History, MemoryHistory, Renderer, Route,
    RouterService, TodoId, ViewDispatcher, ViewTag,
};

/// Renders each view to stdout, selected by tag membership only
struct ConsoleRenderer;

impl Renderer for ConsoleRenderer {
    fn render(&self, tags: &[ViewTag], state: &AppState) {
        // No tag means nothing has been navigated to yet
        let Some(tag) = tags.first() else { return };

        match tag {
            ViewTag::Todos => {
                println!("┌ Todos ({} open)", state.count() - state.completed_count());
                for todo in &state.todos {
                    let mark = if todo.completed { "✓" } else { " " };
                    println!("│  [{mark}] #{} {}", todo.id, todo.content);
                }
                println!("└");
            },
            ViewTag::Todo => {
                if let Some(todo) = state.selected_todo() {
                    let mark = if todo.completed { "✓" } else { " " };
                    println!("┌ Todo #{}", todo.id);
                    println!("│  [{mark}] {}", todo.content);
                    println!("└");
                }
            },
            ViewTag::InvalidTodo => {
                if let Route::InvalidTodo { id } = &state.route {
                    println!("┌ Error\n│  no todo with id {id}\n└");
                }
            },
            ViewTag::NewTodo => {
                println!("┌ New todo\n│  enter content and submit\n└");
            },
            ViewTag::NotFound => {
                if let Route::NotFound { path } = &state.route {
                    println!("┌ Not found\n│  {path}\n└");
                }
            },
        }
    }
}

/// Let the router and view tasks drain before the next step
async fn settle() {
    tokio::time::sleep(Duration::from_millis(80)).await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Waymark Todos ===");

    let (history, changes) = MemoryHistory::new();
    let env = AppEnvironment::new(Arc::new(SystemClock), history.clone());
    let store = Store::new(AppState::new(), AppReducer::new(), env);
    let router = RouterService::spawn(store.clone(), changes);
    let view = ViewDispatcher::spawn(store.clone(), Arc::new(ConsoleRenderer));

    // The browser opens the list view
    println!("\nbrowser → /todos");
    history.navigate("/todos");
    settle().await;

    // Create two todos through the entry form
    for content in ["Buy milk", "Write documentation"] {
        println!("\nbrowser → /todo/new");
        history.navigate("/todo/new");
        settle().await;

        println!("\nuser: add {content:?}");
        let mut handle = store
            .send(AppAction::AddNewTodo {
                content: content.to_string(),
            })
            .await?;
        handle.wait().await;
        settle().await;
        println!("address bar now: {}", history.current());
    }

    // Open the first todo and complete it
    println!("\nbrowser → /todo/1");
    history.navigate("/todo/1");
    settle().await;

    println!("\nuser: toggle #1");
    let mut handle = store.send(AppAction::ToggleTodo { id: TodoId::new(1) }).await?;
    handle.wait().await;
    settle().await;

    // A stale bookmark and a typo
    println!("\nbrowser → /todo/99");
    history.navigate("/todo/99");
    settle().await;
    println!("address bar now: {}", history.current());

    println!("\nbrowser → /bogus");
    history.navigate("/bogus");
    settle().await;

    // Back to the list, then drop a todo
    println!("\nbrowser → /todos");
    history.navigate("/todos");
    settle().await;

    println!("\nuser: remove #2");
    let mut handle = store.send(AppAction::RemoveTodo { id: TodoId::new(2) }).await?;
    handle.wait().await;
    settle().await;

    let (count, completed) = store.state(|s| (s.count(), s.completed_count())).await;
    println!("\nfinal: {completed}/{count} completed, address bar {}", history.current());

    router.shutdown();
    view.shutdown();
    store.shutdown(Duration::from_secs(5)).await?;

    println!("\n=== Demo Complete ===");
    Ok(())
}
