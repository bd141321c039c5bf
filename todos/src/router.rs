//! Router service - bidirectional synchronization with the address bar.
//!
//! The router has two independent responsibilities that must never trigger
//! each other:
//!
//! - **Inbound**: browser-originated path changes are parsed into exactly
//!   one navigation event each and dispatched into the store.
//! - **Outbound**: push events reduce to an address-bar write through
//!   [`History::replace`], which updates the visible path without emitting
//!   a change event.
//!
//! The separation is structural. User navigations travel over a channel the
//! listener consumes; programmatic rewrites go through `replace`, which
//! never touches that channel. A rewrite is also skipped when the bar
//! already shows the target path, so a navigation that originated from the
//! browser is never echoed back out.

use crate::types::{AppAction, AppState, TodoId};
use crate::reducer::{AppEnvironment, AppReducer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use waymark_core::effect::Effect;
use waymark_runtime::Store;

/// Address-bar abstraction
///
/// Implementations must keep `replace` strictly programmatic: it updates
/// the visible path and nothing else. Only user-driven changes (back,
/// forward, manual edits) may reach the inbound listener.
pub trait History: Send + Sync {
    /// The path currently shown
    fn current(&self) -> String;

    /// Programmatically rewrite the path, without emitting a change event
    fn replace(&self, path: &str);
}

/// In-memory address bar with a user-navigation channel
///
/// Stands in for the browser: [`MemoryHistory::navigate`] simulates a
/// user-driven change (and feeds the inbound listener), while the
/// [`History`] impl covers the programmatic direction.
pub struct MemoryHistory {
    path: Mutex<String>,
    rewrites: AtomicUsize,
    changes: mpsc::UnboundedSender<String>,
}

impl MemoryHistory {
    /// Create a history rooted at `/`
    ///
    /// Returns the history and the receiver carrying user navigations,
    /// which is handed to [`RouterService::spawn`].
    #[must_use]
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (changes, rx) = mpsc::unbounded_channel();
        let history = Arc::new(Self {
            path: Mutex::new("/".to_owned()),
            rewrites: AtomicUsize::new(0),
            changes,
        });
        (history, rx)
    }

    /// Simulate a user-driven navigation
    ///
    /// Updates the visible path and emits an inbound change event, the way
    /// a browser fires its location listener on back/forward or a manual
    /// URL edit.
    pub fn navigate(&self, path: &str) {
        *self.path.lock().unwrap_or_else(PoisonError::into_inner) = path.to_owned();
        tracing::debug!(path, "user navigation");
        let _ = self.changes.send(path.to_owned());
    }

    /// Number of programmatic rewrites performed so far
    ///
    /// Lets tests assert that redundant rewrites are skipped.
    #[must_use]
    pub fn rewrite_count(&self) -> usize {
        self.rewrites.load(Ordering::SeqCst)
    }
}

impl History for MemoryHistory {
    fn current(&self) -> String {
        self.path.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn replace(&self, path: &str) {
        *self.path.lock().unwrap_or_else(PoisonError::into_inner) = path.to_owned();
        self.rewrites.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(path, "address bar rewritten");
    }
}

/// Translate a browser path into exactly one navigation event
///
/// Paths are matched case-sensitively. An unparseable path yields
/// [`AppAction::RouteNotFound`], never an error.
///
/// | Path | Navigation event |
/// |---|---|
/// | `/` | `NavigateToTodos` |
/// | `/todos` | `NavigateToTodos` |
/// | `/todo/new` | `NavigateToNewTodo` |
/// | `/todo/:id` (integer id) | `NavigateToTodo { id }` |
/// | anything else | `RouteNotFound { path }` |
#[must_use]
pub fn parse_path(path: &str) -> AppAction {
    match path {
        "/" | "/todos" => AppAction::NavigateToTodos,
        "/todo/new" => AppAction::NavigateToNewTodo,
        _ => {
            if let Some(raw_id) = path.strip_prefix("/todo/") {
                if !raw_id.is_empty() && raw_id.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(id) = raw_id.parse::<u64>() {
                        return AppAction::NavigateToTodo {
                            id: TodoId::new(id),
                        };
                    }
                }
            }
            AppAction::RouteNotFound {
                path: path.to_owned(),
            }
        },
    }
}

/// Serialize a push event into its address-bar path
///
/// Returns `None` for actions that are not push events; routes without a
/// reverse mapping (not-found, invalid todo) have no push event at all.
#[must_use]
pub fn path_for(action: &AppAction) -> Option<String> {
    match action {
        AppAction::PushTodos => Some("/todos".to_owned()),
        AppAction::PushNewTodo => Some("/todo/new".to_owned()),
        AppAction::PushTodo { id } => Some(format!("/todo/{id}")),
        _ => None,
    }
}

/// Describe the outbound address-bar write for a push event
///
/// The write is idempotent: when the bar already shows `path` nothing is
/// written, so a browser-originated navigation never produces an echo
/// rewrite.
#[must_use]
pub fn sync_url(history: Arc<dyn History>, path: String) -> Effect<AppAction> {
    Effect::Future(Box::pin(async move {
        if history.current() == path {
            tracing::trace!(path, "address bar already current, skipping rewrite");
        } else {
            history.replace(&path);
        }
        None
    }))
}

/// The inbound half of the router: a spawned URL listener
///
/// Lives for the lifetime of the application; [`RouterService::shutdown`]
/// tears the listener down. Each inbound navigation is dispatched to
/// completion - including the outbound rewrite its transition may emit -
/// before the next one is read.
pub struct RouterService {
    listener: JoinHandle<()>,
}

impl RouterService {
    /// Spawn the URL listener over a channel of path changes
    pub fn spawn(
        store: Store<AppState, AppAction, AppEnvironment, AppReducer>,
        mut changes: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        let listener = tokio::spawn(async move {
            while let Some(path) = changes.recv().await {
                let action = parse_path(&path);
                tracing::debug!(path, kind = action.kind(), "inbound navigation");

                match store.send(action).await {
                    Ok(mut handle) => handle.wait().await,
                    Err(error) => {
                        tracing::info!(%error, "store rejected navigation, listener stopping");
                        break;
                    },
                }
            }
            tracing::debug!("router listener finished");
        });

        Self { listener }
    }

    /// Tear down the URL listener
    pub fn shutdown(self) {
        self.listener.abort();
        tracing::debug!("router listener torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_paths() {
        assert_eq!(parse_path("/"), AppAction::NavigateToTodos);
        assert_eq!(parse_path("/todos"), AppAction::NavigateToTodos);
        assert_eq!(parse_path("/todo/new"), AppAction::NavigateToNewTodo);
        assert_eq!(
            parse_path("/todo/12"),
            AppAction::NavigateToTodo {
                id: TodoId::new(12)
            }
        );
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(
            parse_path("/Todos"),
            AppAction::RouteNotFound {
                path: "/Todos".to_owned()
            }
        );
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        for path in ["/todo/", "/todo/abc", "/todo/12abc", "/todo/-3", "/todo/+3"] {
            assert_eq!(
                parse_path(path),
                AppAction::RouteNotFound {
                    path: path.to_owned()
                },
                "path {path} must be unroutable"
            );
        }
    }

    #[test]
    fn parse_never_panics_on_junk() {
        assert_eq!(
            parse_path("no-leading-slash"),
            AppAction::RouteNotFound {
                path: "no-leading-slash".to_owned()
            }
        );
        assert_eq!(
            parse_path(""),
            AppAction::RouteNotFound { path: String::new() }
        );
    }

    #[test]
    fn reverse_mapping_covers_push_events_only() {
        assert_eq!(path_for(&AppAction::PushTodos).as_deref(), Some("/todos"));
        assert_eq!(
            path_for(&AppAction::PushNewTodo).as_deref(),
            Some("/todo/new")
        );
        assert_eq!(
            path_for(&AppAction::PushTodo { id: TodoId::new(3) }).as_deref(),
            Some("/todo/3")
        );
        assert_eq!(path_for(&AppAction::NavigateToTodos), None);
    }

    #[test]
    fn navigate_emits_inbound_change() {
        let (history, mut rx) = MemoryHistory::new();

        history.navigate("/todos");

        assert_eq!(history.current(), "/todos");
        assert_eq!(rx.try_recv().ok().as_deref(), Some("/todos"));
    }

    #[test]
    fn replace_is_silent() {
        let (history, mut rx) = MemoryHistory::new();

        history.replace("/todos");

        assert_eq!(history.current(), "/todos");
        assert_eq!(history.rewrite_count(), 1);
        assert!(rx.try_recv().is_err(), "programmatic rewrite must not re-fire the listener");
    }

    #[tokio::test]
    async fn sync_url_skips_redundant_rewrites() {
        let (history, _rx) = MemoryHistory::new();
        history.navigate("/todos");

        let effect = sync_url(Arc::clone(&history) as Arc<dyn History>, "/todos".to_owned());
        let Effect::Future(fut) = effect else {
            unreachable!("sync_url always builds a Future effect");
        };
        assert_eq!(fut.await, None);

        assert_eq!(history.rewrite_count(), 0);
    }
}
