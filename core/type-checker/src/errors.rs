use cairn_ast::nodes::{NodeIndex, Span};
use serde::Serialize;
use thiserror::Error;

use crate::type_info::TypeIndex;

/// What went wrong at a node. Type payloads are indices into the session's
/// [`TypeTable`](crate::type_info::TypeTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    BindingNotFound,
    TypeNotFound,
    /// A literal or empty list with no expected type to take.
    AmbiguousType,
    TypeMismatch {
        expected: TypeIndex,
        got: TypeIndex,
    },
    /// A literal whose intrinsic shape cannot have the expected type.
    LiteralMismatch {
        expected: TypeIndex,
    },
    WrongArity {
        expected: usize,
        got: usize,
    },
    IntLargerThanMax {
        expected: TypeIndex,
    },
    CalledNonFunction {
        got: TypeIndex,
    },
}

impl DiagnosticKind {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::BindingNotFound => "BINDING_NOT_FOUND",
            DiagnosticKind::TypeNotFound => "TYPE_NOT_FOUND",
            DiagnosticKind::AmbiguousType => "AMBIGUOUS_TYPE",
            DiagnosticKind::TypeMismatch { .. } => "TYPE_MISMATCH",
            DiagnosticKind::LiteralMismatch { .. } => "LITERAL_MISMATCH",
            DiagnosticKind::WrongArity { .. } => "WRONG_ARITY",
            DiagnosticKind::IntLargerThanMax { .. } => "INT_LARGER_THAN_MAX",
            DiagnosticKind::CalledNonFunction { .. } => "CALLED_NON_FUNCTION",
        }
    }
}

/// A diagnostic and the node that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub node: NodeIndex,
}

/// A [`Diagnostic`] resolved against its source: names are copied out and types
/// rendered, so it can be displayed on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeCheckError {
    #[error("use of undeclared name `{name}`")]
    BindingNotFound { name: String, location: Span },

    #[error("unknown type `{name}`")]
    TypeNotFound { name: String, location: Span },

    #[error("cannot determine the type of `{text}`, add a type annotation")]
    AmbiguousType { text: String, location: Span },

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: String,
        found: String,
        location: Span,
    },

    #[error("literal `{text}` cannot have type `{expected}`")]
    LiteralMismatch {
        expected: String,
        text: String,
        location: Span,
    },

    #[error("function expects {expected} argument(s), but {found} provided")]
    WrongArity {
        expected: usize,
        found: usize,
        location: Span,
    },

    #[error("integer literal `{text}` is larger than the maximum of `{expected}`")]
    IntLargerThanMax {
        expected: String,
        text: String,
        location: Span,
    },

    #[error("called value of type `{found}` is not a function")]
    CalledNonFunction { found: String, location: Span },
}

impl TypeCheckError {
    #[must_use]
    pub fn location(&self) -> Span {
        match self {
            TypeCheckError::BindingNotFound { location, .. }
            | TypeCheckError::TypeNotFound { location, .. }
            | TypeCheckError::AmbiguousType { location, .. }
            | TypeCheckError::TypeMismatch { location, .. }
            | TypeCheckError::LiteralMismatch { location, .. }
            | TypeCheckError::WrongArity { location, .. }
            | TypeCheckError::IntLargerThanMax { location, .. }
            | TypeCheckError::CalledNonFunction { location, .. } => *location,
        }
    }
}
