//! Error types for the AST crate.
//!
//! Reading stops at the first malformed construct; the error carries the span of
//! the offending token or form.

use thiserror::Error;

use crate::nodes::Span;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum ParseError {
    #[error("{span}: unexpected character `{found}`")]
    UnexpectedChar { found: char, span: Span },

    #[error("{span}: unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("{span}: unexpected `{found}`")]
    UnexpectedClose { found: char, span: Span },

    #[error("{span}: unclosed `{open}`")]
    Unclosed { open: char, span: Span },

    #[error("{span}: expected `,` between tuple elements")]
    MalformedTuple { span: Span },

    #[error("{span}: expected {expected}")]
    Expected { expected: &'static str, span: Span },

    #[error("{span}: `{form}` expects {expected} operands, found {found}")]
    FormArity {
        form: &'static str,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("{span}: `def` is only allowed at the top level")]
    NestedDefinition { span: Span },

    #[error("source is larger than 4 GiB")]
    SourceTooLarge,
}

impl ParseError {
    /// Span of the offending construct, if there is one.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedChar { span, .. }
            | ParseError::UnterminatedString { span }
            | ParseError::UnexpectedClose { span, .. }
            | ParseError::Unclosed { span, .. }
            | ParseError::MalformedTuple { span }
            | ParseError::Expected { span, .. }
            | ParseError::FormArity { span, .. }
            | ParseError::NestedDefinition { span } => Some(*span),
            ParseError::SourceTooLarge => None,
        }
    }
}
