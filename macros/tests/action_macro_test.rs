//! Tests for #[derive(Action)] macro

use waymark_macros::Action;

#[derive(Action, Clone, Debug, PartialEq)]
enum AppAction {
    #[navigation]
    NavigateToTodos,

    #[navigation]
    NavigateToTodo {
        id: u64,
    },

    #[navigation]
    RouteNotFound {
        path: String,
    },

    #[push]
    PushTodos,

    #[push]
    PushTodo {
        id: u64,
    },

    #[intent]
    AddNewTodo {
        content: String,
    },

    #[intent]
    ToggleTodo {
        id: u64,
    },
}

#[test]
fn test_is_navigation() {
    let action = AppAction::NavigateToTodo { id: 1 };
    assert!(action.is_navigation());
    assert!(!action.is_push());
    assert!(!action.is_intent());
}

#[test]
fn test_is_push() {
    let action = AppAction::PushTodos;
    assert!(action.is_push());
    assert!(!action.is_navigation());
    assert!(!action.is_intent());
}

#[test]
fn test_is_intent() {
    let action = AppAction::AddNewTodo {
        content: "Test".to_string(),
    };
    assert!(action.is_intent());
    assert!(!action.is_navigation());
    assert!(!action.is_push());
}

#[test]
fn test_kind_labels() {
    assert_eq!(AppAction::NavigateToTodos.kind(), "navigation");
    assert_eq!(AppAction::PushTodo { id: 7 }.kind(), "push");
    assert_eq!(AppAction::ToggleTodo { id: 7 }.kind(), "intent");
}

#[test]
fn test_unit_and_named_variants() {
    // Both unit variants and struct variants classify correctly
    assert!(AppAction::PushTodos.is_push());
    assert!(
        AppAction::RouteNotFound {
            path: "/nope".to_string()
        }
        .is_navigation()
    );
}
