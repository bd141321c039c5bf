//! Derive macros for the Waymark framework
//!
//! This crate provides procedural macros to reduce boilerplate when building
//! router-synchronized state machines with Waymark.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates classification helpers for action enums
//!   (navigation events, push events, user intents)
//!
//! # Example
//!
//! ```ignore
//! use waymark_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     #[navigation]
//!     NavigateToTodos,
//!
//!     #[push]
//!     PushTodos,
//!
//!     #[intent]
//!     ToggleTodo { id: u64 },
//! }
//!
//! // Generated methods:
//! assert!(AppAction::NavigateToTodos.is_navigation());
//! assert!(AppAction::PushTodos.is_push());
//! assert_eq!(AppAction::PushTodos.kind(), "push");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `is_navigation()` - Returns true if this variant is a navigation event
///   (emitted by the router when the URL changes)
/// - `is_push()` - Returns true if this variant is a push event (emitted by
///   the state machine to request a URL rewrite)
/// - `is_intent()` - Returns true if this variant is a user intent
/// - `kind()` - Returns the classification as a static label for logging
///
/// # Attributes
///
/// - `#[navigation]` - Mark a variant as a navigation event
/// - `#[push]` - Mark a variant as a push event
/// - `#[intent]` - Mark a variant as a user intent
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - A variant carries more than one classification attribute
/// - A variant carries no classification attribute
///
/// # Example
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum AppAction {
///     #[navigation]
///     NavigateToTodo { id: u64 },
///
///     #[push]
///     PushTodo { id: u64 },
///
///     #[intent]
///     AddNewTodo { content: String },
/// }
///
/// let action = AppAction::AddNewTodo { content: "Foo".into() };
/// assert!(action.is_intent());
/// assert!(!action.is_push());
/// assert_eq!(action.kind(), "intent");
/// ```
#[proc_macro_derive(Action, attributes(navigation, push, intent))]
#[allow(clippy::expect_used)] // Proc macro panics become compile errors, not runtime panics
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    // Collect variants by classification
    let mut navigation_variants = Vec::new();
    let mut push_variants = Vec::new();
    let mut intent_variants = Vec::new();

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;
        let is_navigation = has_attribute(&variant.attrs, "navigation");
        let is_push = has_attribute(&variant.attrs, "push");
        let is_intent = has_attribute(&variant.attrs, "intent");

        let marks = usize::from(is_navigation) + usize::from(is_push) + usize::from(is_intent);

        if marks > 1 {
            return syn::Error::new_spanned(
                variant,
                "Variant can only carry one of #[navigation], #[push], #[intent]",
            )
            .to_compile_error()
            .into();
        }

        if marks == 0 {
            return syn::Error::new_spanned(
                variant,
                "Variant must be marked #[navigation], #[push], or #[intent]",
            )
            .to_compile_error()
            .into();
        }

        if is_navigation {
            navigation_variants.push(variant_name);
        }

        if is_push {
            push_variants.push(variant_name);
        }

        if is_intent {
            intent_variants.push(variant_name);
        }
    }

    // Build a map of variant names to their field shapes for arm generation
    let variant_map: std::collections::HashMap<_, _> = data_enum
        .variants
        .iter()
        .map(|v| (&v.ident, &v.fields))
        .collect();

    let arm = |variant: &&syn::Ident, body: proc_macro2::TokenStream| {
        // SAFETY: Variants are collected from data_enum.variants above, so they must exist
        #[allow(clippy::expect_used)]
        let fields = variant_map.get(*variant).expect("variant must exist in map");
        match fields {
            Fields::Named(_) => quote! { Self::#variant { .. } => #body, },
            Fields::Unnamed(_) => quote! { Self::#variant(..) => #body, },
            Fields::Unit => quote! { Self::#variant => #body, },
        }
    };

    let is_navigation_arms = navigation_variants.iter().map(|v| arm(v, quote! { true }));
    let is_push_arms = push_variants.iter().map(|v| arm(v, quote! { true }));
    let is_intent_arms = intent_variants.iter().map(|v| arm(v, quote! { true }));

    let kind_arms = data_enum.variants.iter().map(|variant| {
        let label = if has_attribute(&variant.attrs, "navigation") {
            "navigation"
        } else if has_attribute(&variant.attrs, "push") {
            "push"
        } else {
            "intent"
        };
        arm(&&variant.ident, quote! { #label })
    });

    let expanded = quote! {
        impl #name {
            /// Returns true if this action is a navigation event
            #[must_use]
            pub const fn is_navigation(&self) -> bool {
                match self {
                    #(#is_navigation_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is a push event
            #[must_use]
            pub const fn is_push(&self) -> bool {
                match self {
                    #(#is_push_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is a user intent
            #[must_use]
            pub const fn is_intent(&self) -> bool {
                match self {
                    #(#is_intent_arms)*
                    _ => false,
                }
            }

            /// Returns the classification label for logging and metrics
            #[must_use]
            pub const fn kind(&self) -> &'static str {
                match self {
                    #(#kind_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
