#![warn(clippy::pedantic)]
//! Syntax layer of the Cairn compiler.
//!
//! Source text is read into a flat [`arena::Arena`] of [`nodes::Node`]s. Every tree
//! walk in the workspace, including the reader itself, runs on the
//! [`work_stack::WorkStack`] instead of the host call stack.

pub mod arena;
pub mod builder;
pub mod errors;
pub mod nodes;
pub(crate) mod parser;
pub mod printer;
pub mod work_stack;

use crate::arena::Arena;
use crate::builder::Builder;
use crate::errors::ParseError;

/// Reads `source` into a rooted arena.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered.
pub fn parse(source: &str) -> Result<Arena, ParseError> {
    Builder::new(source).build_ast()
}
