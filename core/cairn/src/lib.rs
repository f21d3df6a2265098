#![warn(clippy::pedantic)]
//! Core Orchestration Crate for the Cairn Compiler
//!
//! This crate provides the entry points of the Cairn front end. It drives the
//! reader and the type checker and turns their results into something a person
//! or a tool can consume.
//!
//! ## Overview
//!
//! ```text
//! source → parse → Arena → type_check → TypedContext → backend
//!                                            ├→ diagnostics::render_all
//!                                            └→ export_json
//! ```
//!
//! Code generation is not part of this workspace: a backend consumes the
//! [`TypedContext`] of a successful check (arena, type table and one type per node).
//!
//! ## Quick Start
//!
//! ```
//! use cairn::{ensure_well_typed, parse, type_check};
//!
//! let source = r#"(def greeting (Fn String) (fn () String "hello"))"#;
//! let arena = parse(source)?;
//! let typed_context = type_check(arena, source)?;
//! ensure_well_typed(&typed_context, source)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All public functions return `anyhow::Result`. Reader errors stop at the first
//! malformed form and keep their [`ParseError`] type, so callers can downcast
//! them for rendering. Type errors are not failures of [`type_check`]; they are
//! collected in the context and turned into an error by [`ensure_well_typed`],
//! which reports all of them at once.
//!
//! ```
//! use cairn::{ensure_well_typed, parse, type_check};
//!
//! let source = "(def answer (Fn I32) (fn () I32 (2, 3)))";
//! let typed_context = type_check(parse(source)?, source)?;
//! let err = ensure_well_typed(&typed_context, source).unwrap_err();
//! assert!(err.to_string().contains("expected `I32`, found `(?, ?)`"));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## See Also
//!
//! - [`cairn_ast::arena::Arena`] - Node storage
//! - [`cairn_ast::work_stack::WorkStack`] - Iterative traversal engine
//! - [`cairn_type_checker::TypeCheckerBuilder`] - Type checking entry point
//!
//! [`ParseError`]: cairn_ast::errors::ParseError

use cairn_ast::arena::Arena;
use cairn_type_checker::{TypeCheckerBuilder, typed_context::TypedContext};
use log::debug;

pub mod diagnostics;
pub mod export;

/// Reads `source` into a syntax arena.
///
/// # Errors
///
/// Returns a [`ParseError`](cairn_ast::errors::ParseError) for the first
/// malformed construct.
pub fn parse(source: &str) -> anyhow::Result<Arena> {
    let arena = cairn_ast::parse(source)?;
    Ok(arena)
}

/// Type-checks `arena` against the `source` it was read from.
///
/// The returned context may hold diagnostics; see [`ensure_well_typed`].
///
/// # Errors
///
/// Returns an error if the arena has no root.
pub fn type_check(arena: Arena, source: &str) -> anyhow::Result<TypedContext> {
    let typed_context = TypeCheckerBuilder::build_typed_context(arena, source)?.typed_context();
    debug!(
        "type check finished with {} diagnostic(s)",
        typed_context.diagnostics().len()
    );
    Ok(typed_context)
}

/// Fails with every rendered diagnostic of `typed_context`.
///
/// # Errors
///
/// Returns an error if checking produced any diagnostic.
pub fn ensure_well_typed(typed_context: &TypedContext, source: &str) -> anyhow::Result<()> {
    if typed_context.is_success() {
        return Ok(());
    }
    let rendered = diagnostics::render_all(typed_context, source);
    anyhow::bail!(rendered.join("\n"))
}

/// Serializes node types and diagnostics of `typed_context` as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_json(typed_context: &TypedContext, source: &str) -> anyhow::Result<String> {
    let program = export::ExportedProgram::new(typed_context, source);
    Ok(serde_json::to_string_pretty(&program)?)
}
