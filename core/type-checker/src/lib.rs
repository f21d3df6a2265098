#![warn(clippy::pedantic)]
//! Type Checker for the Cairn Programming Language
//!
//! This crate checks a syntax [`Arena`] produced by `cairn-ast` and yields a
//! [`TypedContext`]: the arena, a type table, one type per node and the
//! diagnostics found along the way.
//!
//! ## Type System
//!
//! - Primitive types: `()`, `Bool`, `I8`-`I64`, `U8`-`U64`
//! - Compound types: lists `[T]`, tuples `(A, B)`, functions `(Fn A B R)`
//! - `String` is the builtin name of `[U8]`
//!
//! There is no inference of literal types: an integer literal or an empty list
//! needs an expected type from its context.
//!
//! ## Checking
//!
//! - Bidirectional: types flow down as goals and up as results
//! - Stack-discipline scopes with shadowing by recency
//! - Error recovery: an offending node gets the unknown type and checking goes on;
//!   expectations derived from unknown types do not produce follow-up diagnostics
//! - Iterative: the walk runs on the `cairn-ast` work stack, so nesting depth is
//!   limited by memory only
//!
//! ## Quick Start
//!
//! ```
//! use cairn_type_checker::TypeCheckerBuilder;
//!
//! let source = "(def main (Fn I32) (fn () I32 42))";
//! let arena = cairn_ast::parse(source).unwrap();
//! let typed_context = TypeCheckerBuilder::build_typed_context(arena, source)
//!     .unwrap()
//!     .typed_context();
//! assert!(typed_context.is_success());
//! ```

use std::marker::PhantomData;

use anyhow::bail;
use cairn_ast::arena::Arena;

use crate::{type_checker::TypeChecker, typed_context::TypedContext};

pub mod errors;
pub mod symbol_table;
mod type_checker;
pub mod type_info;
pub mod typed_context;

/// Marker state hosting the entry point, before any arena has been checked.
pub struct TypeCheckerInitState;

/// Marker state indicating type checking is complete and context is ready.
pub struct TypeCheckerCompleteState;

/// Type alias for a completed type checker builder ready to yield its context.
pub type CompletedTypeCheckerBuilder = TypeCheckerBuilder<TypeCheckerCompleteState>;

/// Builder for running type checking on an AST arena.
///
/// Uses the typestate pattern to ensure type checking completes before
/// accessing the typed context.
pub struct TypeCheckerBuilder<S> {
    typed_context: TypedContext,
    _state: PhantomData<S>,
}

impl TypeCheckerBuilder<TypeCheckerInitState> {
    /// Run type checking on the provided arena and return a completed builder.
    ///
    /// Diagnostics are part of the result, not an error: inspect
    /// [`TypedContext::is_success`].
    ///
    /// # Errors
    ///
    /// Returns an error if the arena has no root.
    #[must_use = "returns builder with typed context, extract with .typed_context()"]
    pub fn build_typed_context(
        arena: Arena,
        source: &str,
    ) -> anyhow::Result<TypeCheckerBuilder<TypeCheckerCompleteState>> {
        let Some(root) = arena.try_root() else {
            bail!("cannot type-check an arena without a root");
        };
        let result = TypeChecker::new(&arena, source).check(root);
        let ctx = TypedContext::new(arena, result.types, result.node_types, result.diagnostics);

        debug_assert!(
            ctx.find_pending_nodes().is_empty(),
            "No node should be left pending after type checking"
        );
        debug_assert!(
            !ctx.is_success() || {
                let untyped = ctx.find_untyped_nodes();
                if !untyped.is_empty() {
                    eprintln!(
                        "Type checker bug: {} node(s) without a type:",
                        untyped.len()
                    );
                    for m in &untyped {
                        eprintln!("  - {} at {} ({})", m.kind, m.location, m.node);
                    }
                }
                untyped.is_empty()
            },
            "All nodes should have a type after a diagnostic-free check"
        );

        Ok(TypeCheckerBuilder {
            typed_context: ctx,
            _state: PhantomData,
        })
    }
}

impl TypeCheckerBuilder<TypeCheckerCompleteState> {
    /// Consume the builder and return the typed context.
    #[must_use = "consumes builder and returns the typed context"]
    pub fn typed_context(self) -> TypedContext {
        self.typed_context
    }
}
