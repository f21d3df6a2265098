//! JSON export of a checked program.
//!
//! ```json
//! {
//!   "success": false,
//!   "nodes": [{ "index": 0, "kind": "root", "start": 0, "end": 42, "type": "()" }],
//!   "diagnostics": [{
//!     "code": "TYPE_MISMATCH", "expected": 6, "got": 14, "node": 9,
//!     "message": "type mismatch: expected `I32`, found `(?, ?)`",
//!     "line": 2, "column": 14
//!   }]
//! }
//! ```
//!
//! Type payloads of a diagnostic are raw type indices; `message` carries them
//! rendered.

use cairn_ast::nodes::NodeIndex;
use cairn_type_checker::{errors::Diagnostic, typed_context::TypedContext};
use serde::Serialize;

use crate::diagnostics::line_col;

#[derive(Debug, Serialize)]
pub struct ExportedProgram {
    pub success: bool,
    pub nodes: Vec<ExportedNode>,
    pub diagnostics: Vec<ExportedDiagnostic>,
}

#[derive(Debug, Serialize)]
pub struct ExportedNode {
    pub index: NodeIndex,
    pub kind: &'static str,
    pub start: u32,
    pub end: u32,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Serialize)]
pub struct ExportedDiagnostic {
    #[serde(flatten)]
    pub diagnostic: Diagnostic,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ExportedProgram {
    #[must_use]
    pub fn new(ctx: &TypedContext, source: &str) -> Self {
        let arena = ctx.arena();
        let nodes = arena
            .indices()
            .map(|index| {
                let span = arena.span(index);
                ExportedNode {
                    index,
                    kind: arena.kind(index).as_str(),
                    start: span.start,
                    end: span.end,
                    ty: ctx.render_node_type(index),
                }
            })
            .collect();
        let diagnostics = ctx
            .diagnostics()
            .iter()
            .map(|diagnostic| {
                let error = ctx.error(diagnostic, source);
                let position = line_col(source, error.location().start);
                ExportedDiagnostic {
                    diagnostic: *diagnostic,
                    message: error.to_string(),
                    line: position.line,
                    column: position.column,
                }
            })
            .collect();
        Self {
            success: ctx.is_success(),
            nodes,
            diagnostics,
        }
    }
}
