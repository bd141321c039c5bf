//! Reducer for the todo application's navigation machine.
//!
//! All transition logic lives here: navigation events force the route from
//! any current route, guards are evaluated against the action that
//! triggered the transition, and entry emissions are described as feedback
//! effects resolved within the same dispatch. Validation of a requested
//! todo id happens synchronously inside the navigation arm, so there is no
//! externally observable "validating" route.

use crate::router::{self, History};
use crate::types::{AppAction, AppState, Route, TodoId, TodoItem};
use std::sync::Arc;
use waymark_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};

/// Environment dependencies for the application reducer
#[derive(Clone)]
pub struct AppEnvironment {
    /// Clock for creation and completion timestamps
    pub clock: Arc<dyn Clock>,
    /// Address bar written by outbound push effects
    pub history: Arc<dyn History>,
}

impl AppEnvironment {
    /// Creates a new `AppEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, history: Arc<dyn History>) -> Self {
        Self { clock, history }
    }
}

/// Reducer for the todo application
#[derive(Clone, Debug, Default)]
pub struct AppReducer;

impl AppReducer {
    /// Creates a new `AppReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Guard: the requested todo exists in the collection
    ///
    /// Evaluated against the id carried by the navigation action itself,
    /// never against any later event.
    fn is_valid_todo(state: &AppState, id: TodoId) -> bool {
        state.exists(id)
    }

    /// Guard: new-todo content is acceptable (non-empty)
    fn is_content_valid(content: &str) -> bool {
        !content.is_empty()
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Navigation events ==========
            // Handled whatever the current route is: browser back/forward
            // and manual URL edits must always resynchronize the machine.
            AppAction::NavigateToTodos => {
                state.route = Route::Todos;
                smallvec![Effect::feedback(AppAction::PushTodos)]
            },

            AppAction::NavigateToNewTodo => {
                state.route = Route::New;
                smallvec![Effect::feedback(AppAction::PushNewTodo)]
            },

            AppAction::NavigateToTodo { id } => {
                // Re-entrant navigation to the already-selected todo is a
                // no-op; this breaks the push -> navigate -> push cycle.
                if matches!(state.route, Route::Todo) && state.selected == Some(id) {
                    tracing::trace!(%id, "already showing this todo, suppressing");
                    return SmallVec::new();
                }

                if Self::is_valid_todo(state, id) {
                    state.selected = Some(id);
                    state.route = Route::Todo;
                    smallvec![Effect::feedback(AppAction::PushTodo { id })]
                } else {
                    tracing::debug!(%id, "navigation to unknown todo");
                    state.route = Route::InvalidTodo { id };
                    SmallVec::new()
                }
            },

            AppAction::RouteNotFound { path } => {
                tracing::debug!(path, "unroutable path");
                state.route = Route::NotFound { path };
                SmallVec::new()
            },

            // ========== Push events ==========
            // No state change; describe the outbound address-bar write.
            push @ (AppAction::PushTodos | AppAction::PushNewTodo | AppAction::PushTodo { .. }) => {
                let Some(path) = router::path_for(&push) else {
                    return SmallVec::new();
                };
                smallvec![router::sync_url(Arc::clone(&env.history), path)]
            },

            // ========== User intents ==========
            AppAction::AddNewTodo { content } => {
                if !matches!(state.route, Route::New) {
                    tracing::warn!("add rejected outside the new-todo view");
                    return SmallVec::new();
                }

                if !Self::is_content_valid(&content) {
                    tracing::debug!("add rejected: empty content");
                    return SmallVec::new();
                }

                let item = TodoItem::new(state.next_id(), content, env.clock.now());
                state.todos.push(item);
                state.route = Route::Todos;
                smallvec![Effect::feedback(AppAction::PushTodos)]
            },

            AppAction::RemoveTodo { id } => {
                if matches!(state.route, Route::Todos) {
                    // In-place removal, the list view stays active
                    state.remove(id);
                    SmallVec::new()
                } else if matches!(state.route, Route::Todo) {
                    state.remove(id);
                    // The detail view is gone; fall back to the list
                    state.selected = None;
                    state.route = Route::Todos;
                    smallvec![Effect::feedback(AppAction::PushTodos)]
                } else {
                    tracing::warn!(%id, "remove rejected in this view");
                    SmallVec::new()
                }
            },

            AppAction::ToggleTodo { id } => {
                if matches!(state.route, Route::Todos | Route::Todo) {
                    state.toggle(id, env.clock.now());
                } else {
                    tracing::warn!(%id, "toggle rejected in this view");
                }
                SmallVec::new()
            },
        }
    }
}
