//! Typed Context - the result of one checking session
//!
//! [`TypedContext`] bundles the syntax arena with everything the checker produced
//! for it:
//!
//! ```text
//! TypedContext
//! ├─ Arena (syntax tree, unchanged)
//! ├─ TypeTable (every type term of the session)
//! ├─ node_types: Vec<TypeIndex>, one slot per node
//! └─ diagnostics, in discovery order
//! ```
//!
//! A node that was never reached (for example the arguments of a call whose
//! arity is wrong) or at which a diagnostic was reported has the unknown type.
//! When checking produced no diagnostics, every node has a known type.

use cairn_ast::{
    arena::Arena,
    nodes::{Node, NodeIndex, NodeKind, Span},
};

use crate::{
    errors::{Diagnostic, DiagnosticKind, TypeCheckError},
    type_info::{IntKind, TypeIndex, TypeTable},
};

/// Longest literal text quoted in a message.
const MAX_QUOTED_LEN: usize = 40;

#[derive(Debug, Clone, Default)]
pub struct TypedContext {
    arena: Arena,
    types: TypeTable,
    node_types: Vec<TypeIndex>,
    diagnostics: Vec<Diagnostic>,
}

impl TypedContext {
    pub(crate) fn new(
        arena: Arena,
        types: TypeTable,
        node_types: Vec<TypeIndex>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        debug_assert_eq!(arena.len(), node_types.len());
        Self {
            arena,
            types,
            node_types,
            diagnostics,
        }
    }

    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[must_use]
    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// All node types, indexed by [`NodeIndex`].
    #[must_use]
    pub fn node_types(&self) -> &[TypeIndex] {
        &self.node_types
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn node_type(&self, index: NodeIndex) -> TypeIndex {
        self.node_types[index.index()]
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The type of `index` rendered as source text, e.g. `(Fn I32 Bool)`.
    #[must_use]
    pub fn render_node_type(&self, index: NodeIndex) -> String {
        self.types.render(self.node_type(index))
    }

    /// Checks if a node has an integer type of the given kind.
    #[must_use = "this is a pure type check with no side effects"]
    pub fn is_node_int(&self, index: NodeIndex, kind: IntKind) -> bool {
        self.types.int_kind(self.node_type(index)) == Some(kind)
    }

    #[must_use = "returns filtered nodes without side effects"]
    pub fn filter_nodes<T: Fn(&Node) -> bool>(&self, fn_predicate: T) -> Vec<NodeIndex> {
        self.arena.filter_nodes(fn_predicate)
    }

    /// Resolves `diagnostic` against `source` into a displayable error.
    #[must_use]
    pub fn error(&self, diagnostic: &Diagnostic, source: &str) -> TypeCheckError {
        let location = self.arena.span(diagnostic.node);
        let text = || quote(location.text(source));
        let render = |index: TypeIndex| self.types.render(index);
        match diagnostic.kind {
            DiagnosticKind::BindingNotFound => TypeCheckError::BindingNotFound {
                name: text(),
                location,
            },
            DiagnosticKind::TypeNotFound => TypeCheckError::TypeNotFound {
                name: text(),
                location,
            },
            DiagnosticKind::AmbiguousType => TypeCheckError::AmbiguousType {
                text: text(),
                location,
            },
            DiagnosticKind::TypeMismatch { expected, got } => TypeCheckError::TypeMismatch {
                expected: render(expected),
                found: render(got),
                location,
            },
            DiagnosticKind::LiteralMismatch { expected } => TypeCheckError::LiteralMismatch {
                expected: render(expected),
                text: text(),
                location,
            },
            DiagnosticKind::WrongArity { expected, got } => TypeCheckError::WrongArity {
                expected,
                found: got,
                location,
            },
            DiagnosticKind::IntLargerThanMax { expected } => TypeCheckError::IntLargerThanMax {
                expected: render(expected),
                text: text(),
                location,
            },
            DiagnosticKind::CalledNonFunction { got } => TypeCheckError::CalledNonFunction {
                found: render(got),
                location,
            },
        }
    }

    /// Every diagnostic resolved against `source`, in discovery order.
    #[must_use]
    pub fn errors(&self, source: &str) -> Vec<TypeCheckError> {
        self.diagnostics
            .iter()
            .map(|diagnostic| self.error(diagnostic, source))
            .collect()
    }

    /// Nodes whose type is still unknown or pending.
    ///
    /// Empty after a diagnostic-free check.
    #[must_use = "returns list of missing node types for verification"]
    pub fn find_untyped_nodes(&self) -> Vec<MissingNodeType> {
        self.find_nodes_typed(|ty| ty.is_unknown() || ty == TypeIndex::PENDING)
    }

    /// Nodes whose check started but never finished. Always empty.
    #[must_use = "returns list of pending nodes for verification"]
    pub fn find_pending_nodes(&self) -> Vec<MissingNodeType> {
        self.find_nodes_typed(|ty| ty == TypeIndex::PENDING)
    }

    fn find_nodes_typed<T: Fn(TypeIndex) -> bool>(&self, fn_predicate: T) -> Vec<MissingNodeType> {
        self.arena
            .indices()
            .filter(|index| fn_predicate(self.node_type(*index)))
            .map(|index| MissingNodeType {
                node: index,
                kind: self.arena.kind(index),
                location: self.arena.span(index),
            })
            .collect()
    }
}

fn quote(text: &str) -> String {
    if text.len() <= MAX_QUOTED_LEN {
        return text.to_string();
    }
    let mut end = MAX_QUOTED_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// A node left without a type after checking.
#[derive(Debug)]
pub struct MissingNodeType {
    pub node: NodeIndex,
    pub kind: NodeKind,
    pub location: Span,
}
