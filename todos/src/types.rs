//! Domain types for the router-synchronized todo application.
//!
//! The application state owns the todo collection, the optional selection,
//! and the active route. The route enum is the state machine: transient
//! validation never shows up here because it is resolved synchronously
//! inside a single dispatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use waymark_macros::Action;

/// Unique identifier for a todo item
///
/// Ids are positive and allocated monotonically: a new id is always one
/// greater than the largest id currently in the collection (see
/// [`AppState::next_id`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TodoId(u64);

impl TodoId {
    /// Creates a `TodoId` from a raw integer
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the inner integer
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// Content of the todo
    pub content: String,
    /// Whether the todo is completed
    pub completed: bool,
    /// When the todo was created
    pub created_at: DateTime<Utc>,
    /// When the todo was completed (if completed)
    pub completed_at: Option<DateTime<Utc>>,
}

impl TodoItem {
    /// Creates a new, uncompleted todo item
    #[must_use]
    pub const fn new(id: TodoId, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            content,
            completed: false,
            created_at,
            completed_at: None,
        }
    }

    /// Flips the completion status
    ///
    /// Completing stamps `completed_at`; un-completing clears it.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = self.completed.then_some(now);
    }
}

/// Classification tag attached to the active route
///
/// Tags are the abstraction boundary between routing and presentation: the
/// rendering layer decides what to draw from tag membership alone and never
/// sees a URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewTag {
    /// The todo list view
    Todos,
    /// The single-todo detail view
    Todo,
    /// Navigation referenced a todo id that does not exist
    InvalidTodo,
    /// The new-todo entry view
    NewTodo,
    /// The URL did not match any known pattern
    NotFound,
}

impl ViewTag {
    /// The tag's stable string label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todos => "todos",
            Self::Todo => "todo",
            Self::InvalidTodo => "invalid-todo",
            Self::NewTodo => "new-todo",
            Self::NotFound => "not-found",
        }
    }
}

impl std::fmt::Display for ViewTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active route - the state of the navigation machine
///
/// Every navigation event forces a transition into one of these, whatever
/// the current route is; that is what lets browser back/forward and manual
/// URL edits resynchronize the application.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// Before the first navigation event; nothing is rendered
    #[default]
    Idle,
    /// The todo list
    Todos,
    /// A valid single todo; the selection lives in [`AppState::selected`]
    Todo,
    /// A navigation asked for an id that is not in the collection
    InvalidTodo {
        /// The id the navigation asked for
        id: TodoId,
    },
    /// The new-todo entry form
    New,
    /// No route pattern matched
    NotFound {
        /// The path that failed to match
        path: String,
    },
}

impl Route {
    /// The classification tags of this route
    ///
    /// `Idle` carries no tag: nothing is rendered before the first
    /// navigation event arrives.
    #[must_use]
    pub const fn tags(&self) -> &'static [ViewTag] {
        match self {
            Self::Idle => &[],
            Self::Todos => &[ViewTag::Todos],
            Self::Todo => &[ViewTag::Todo],
            Self::InvalidTodo { .. } => &[ViewTag::InvalidTodo],
            Self::New => &[ViewTag::NewTodo],
            Self::NotFound { .. } => &[ViewTag::NotFound],
        }
    }
}

/// State of the todo application
///
/// Invariant: `selected`, when set, always refers to an id present in
/// `todos`. Every remove path clears the selection if it would otherwise
/// dangle.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppState {
    /// All todos, in insertion order, without duplicate ids
    pub todos: Vec<TodoItem>,
    /// The todo the detail view shows, by id
    pub selected: Option<TodoId>,
    /// The active route
    pub route: Route,
}

impl AppState {
    /// Creates a new empty application state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Returns a todo by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: TodoId) -> bool {
        self.todos.iter().any(|t| t.id == id)
    }

    /// The todo the selection points at, if any
    #[must_use]
    pub fn selected_todo(&self) -> Option<&TodoItem> {
        self.selected.and_then(|id| self.get(id))
    }

    /// The classification tags of the active route
    #[must_use]
    pub const fn tags(&self) -> &'static [ViewTag] {
        self.route.tags()
    }

    /// Allocates the next id: one greater than the largest id present
    ///
    /// New ids are strictly greater than every id in the collection at
    /// allocation time, so the sequence is monotonic but not gap-free.
    #[must_use]
    pub fn next_id(&self) -> TodoId {
        TodoId::new(1 + self.todos.iter().map(|t| t.id.get()).max().unwrap_or(0))
    }

    /// Removes the todo with the given id; no-op if absent
    ///
    /// Clears the selection when it pointed at the removed todo, keeping
    /// the selection invariant intact.
    ///
    /// Returns whether a todo was removed.
    pub fn remove(&mut self, id: TodoId) -> bool {
        let before = self.todos.len();
        self.todos.retain(|t| t.id != id);
        let removed = self.todos.len() != before;
        if removed && self.selected == Some(id) {
            self.selected = None;
        }
        removed
    }

    /// Flips completion of the todo with the given id; no-op if absent
    ///
    /// Returns whether a todo was toggled.
    pub fn toggle(&mut self, id: TodoId, now: DateTime<Utc>) -> bool {
        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            todo.toggle(now);
            true
        } else {
            false
        }
    }
}

/// Actions driving the application state machine
///
/// A tagged union of the three event families:
///
/// - navigation events, emitted by the router when the address bar changes
/// - push events, emitted by the machine to request an address-bar rewrite
/// - user intents, forwarded by the view
///
/// Each action is consumed exactly once by the reducer.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AppAction {
    // ========== Navigation events ==========
    /// The address bar asked for the todo list
    #[navigation]
    NavigateToTodos,

    /// The address bar asked for the new-todo form
    #[navigation]
    NavigateToNewTodo,

    /// The address bar asked for a single todo
    #[navigation]
    NavigateToTodo {
        /// The requested todo
        id: TodoId,
    },

    /// The address bar showed a path no pattern matched
    #[navigation]
    RouteNotFound {
        /// The unmatched path
        path: String,
    },

    // ========== Push events ==========
    /// Rewrite the address bar to the todo list path
    #[push]
    PushTodos,

    /// Rewrite the address bar to the new-todo path
    #[push]
    PushNewTodo,

    /// Rewrite the address bar to a single todo's path
    #[push]
    PushTodo {
        /// The shown todo
        id: TodoId,
    },

    // ========== User intents ==========
    /// Create a todo from the entry form
    #[intent]
    AddNewTodo {
        /// Content of the new todo
        content: String,
    },

    /// Delete a todo
    #[intent]
    RemoveTodo {
        /// The todo to delete
        id: TodoId,
    },

    /// Flip a todo's completion status
    #[intent]
    ToggleTodo {
        /// The todo to toggle
        id: TodoId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn todo_id_display() {
        assert_eq!(format!("{}", TodoId::new(42)), "42");
    }

    #[test]
    fn todo_item_toggle_round_trip() {
        let now = Utc::now();
        let mut item = TodoItem::new(TodoId::new(1), "Test".to_string(), now);

        item.toggle(now);
        assert!(item.completed);
        assert_eq!(item.completed_at, Some(now));

        item.toggle(now);
        assert!(!item.completed);
        assert_eq!(item.completed_at, None);
    }

    #[test]
    fn next_id_is_one_past_the_max() {
        let mut state = AppState::new();
        assert_eq!(state.next_id(), TodoId::new(1));

        let now = Utc::now();
        state.todos.push(TodoItem::new(TodoId::new(1), "a".to_string(), now));
        state.todos.push(TodoItem::new(TodoId::new(7), "b".to_string(), now));
        assert_eq!(state.next_id(), TodoId::new(8));
    }

    #[test]
    fn remove_clears_a_dangling_selection() {
        let now = Utc::now();
        let mut state = AppState::new();
        state.todos.push(TodoItem::new(TodoId::new(1), "a".to_string(), now));
        state.selected = Some(TodoId::new(1));

        assert!(state.remove(TodoId::new(1)));
        assert_eq!(state.selected, None);
    }

    #[test]
    fn remove_keeps_an_unrelated_selection() {
        let now = Utc::now();
        let mut state = AppState::new();
        state.todos.push(TodoItem::new(TodoId::new(1), "a".to_string(), now));
        state.todos.push(TodoItem::new(TodoId::new(2), "b".to_string(), now));
        state.selected = Some(TodoId::new(2));

        assert!(state.remove(TodoId::new(1)));
        assert_eq!(state.selected, Some(TodoId::new(2)));
    }

    #[test]
    fn remove_absent_id_is_a_no_op() {
        let mut state = AppState::new();
        assert!(!state.remove(TodoId::new(9)));
    }

    #[test]
    fn route_tags() {
        assert!(Route::Idle.tags().is_empty());
        assert_eq!(Route::Todos.tags(), &[ViewTag::Todos]);
        assert_eq!(Route::Todo.tags(), &[ViewTag::Todo]);
        assert_eq!(
            Route::InvalidTodo { id: TodoId::new(9) }.tags(),
            &[ViewTag::InvalidTodo]
        );
        assert_eq!(Route::New.tags(), &[ViewTag::NewTodo]);
        assert_eq!(
            Route::NotFound {
                path: "/x".to_string()
            }
            .tags(),
            &[ViewTag::NotFound]
        );
    }

    #[test]
    fn view_tag_labels() {
        assert_eq!(ViewTag::Todos.as_str(), "todos");
        assert_eq!(ViewTag::InvalidTodo.as_str(), "invalid-todo");
        assert_eq!(ViewTag::NewTodo.as_str(), "new-todo");
        assert_eq!(ViewTag::NotFound.as_str(), "not-found");
    }

    #[test]
    fn action_classification() {
        assert!(AppAction::NavigateToTodos.is_navigation());
        assert!(AppAction::PushTodo { id: TodoId::new(1) }.is_push());
        assert!(
            AppAction::AddNewTodo {
                content: "x".to_string()
            }
            .is_intent()
        );
        assert_eq!(AppAction::PushNewTodo.kind(), "push");
    }
}
