//! Todo application with a router-synchronized state machine core.
//!
//! The list of todos and the active view are owned by a single state
//! machine; the browser address bar and the machine keep each other in sync
//! bidirectionally without ever entering a feedback loop. This crate
//! demonstrates:
//!
//! - A flat route enum driven by navigation events, with validation
//!   resolved synchronously inside one dispatch
//! - Entry emissions: entering a route feeds the matching push event back,
//!   which reduces to an idempotent address-bar rewrite
//! - A router service whose inbound (listener) and outbound (rewrite)
//!   directions are structurally separated
//! - A view dispatcher that renders from classification tags alone
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use waymark_core::environment::SystemClock;
//! use waymark_runtime::Store;
//! use waymark_todos::{
//!     AppAction, AppEnvironment, AppReducer, AppState, MemoryHistory, RouterService,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (history, changes) = MemoryHistory::new();
//! let env = AppEnvironment::new(Arc::new(SystemClock), history.clone());
//! let store = Store::new(AppState::new(), AppReducer::new(), env);
//! let router = RouterService::spawn(store.clone(), changes);
//!
//! // A user-driven navigation flows in through the router...
//! history.navigate("/todo/new");
//!
//! // ...and user intents flow in through dispatch
//! let mut handle = store
//!     .send(AppAction::AddNewTodo { content: "Buy milk".to_string() })
//!     .await?;
//! handle.wait().await;
//!
//! router.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod reducer;
pub mod router;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use reducer::{AppEnvironment, AppReducer};
pub use router::{History, MemoryHistory, RouterService, parse_path, path_for};
pub use types::{AppAction, AppState, Route, TodoId, TodoItem, ViewTag};
pub use view::{Renderer, ViewDispatcher};
