use core::fmt;
use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Half-open byte range `[start, end)` into the source buffer.
///
/// Identifiers and literals are never copied out of the source; every consumer
/// resolves a span against the buffer it was produced from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns the bytes this span covers.
    ///
    /// # Panics
    ///
    /// Panics if the span lies outside `source`.
    #[must_use]
    pub fn bytes<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        &source[self.start as usize..self.end as usize]
    }

    /// Returns the text this span covers, or an empty string if the span does not
    /// fall on character boundaries.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.start as usize..self.end as usize)
            .unwrap_or_default()
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Index of a node in an [`Arena`](crate::arena::Arena).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeIndex {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A contiguous run `[start, start + len)` into a shared sub-index array.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Serialize)]
pub struct SubRun {
    pub start: u32,
    pub len: u32,
}

impl SubRun {
    pub const EMPTY: SubRun = SubRun { start: 0, len: 0 };

    #[must_use]
    pub const fn range(self) -> std::ops::Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }
}

/// Syntactic category of a node.
///
/// Leaf kinds never own children; compound kinds own a run of the arena's shared
/// child-index array. The expected shape of each compound kind is listed on the
/// variant.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
pub enum NodeKind {
    /// Top-level bindings.
    Root,
    /// `[Binder, type, value]`
    TopLevel,
    /// `[callee, arg...]`
    Call,
    /// Identifier in value position.
    Name,
    /// Identifier in type position.
    TypeName,
    Int,
    /// String literal; the span includes the quotes.
    Str,
    /// The unit literal `()`.
    Unit,
    /// `[element...]`
    List,
    /// `[element, element, ...]`, at least two.
    Tuple,
    /// `[condition, then, else]`
    If,
    /// `[Binder, type]*, return type, body`
    Fn,
    /// `[type, value]`
    As,
    /// A declared name: a parameter or a top-level binding.
    Binder,
    UnitType,
    /// `[element type]`
    ListType,
    /// `[type, type, ...]`, at least two.
    TupleType,
    /// `[param type*, return type]`
    FnType,
}

impl NodeKind {
    #[must_use]
    pub const fn is_leaf(self) -> bool {
        matches!(
            self,
            NodeKind::Name
                | NodeKind::TypeName
                | NodeKind::Int
                | NodeKind::Str
                | NodeKind::Unit
                | NodeKind::Binder
                | NodeKind::UnitType
        )
    }

    /// Returns `true` for nodes that denote a type rather than a value.
    #[must_use]
    pub const fn is_type_expr(self) -> bool {
        matches!(
            self,
            NodeKind::TypeName
                | NodeKind::UnitType
                | NodeKind::ListType
                | NodeKind::TupleType
                | NodeKind::FnType
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::TopLevel => "def",
            NodeKind::Call => "call",
            NodeKind::Name => "name",
            NodeKind::TypeName => "type-name",
            NodeKind::Int => "int",
            NodeKind::Str => "str",
            NodeKind::Unit => "unit",
            NodeKind::List => "list",
            NodeKind::Tuple => "tuple",
            NodeKind::If => "if",
            NodeKind::Fn => "fn",
            NodeKind::As => "as",
            NodeKind::Binder => "binder",
            NodeKind::UnitType => "unit-type",
            NodeKind::ListType => "list-type",
            NodeKind::TupleType => "tuple-type",
            NodeKind::FnType => "fn-type",
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub subs: SubRun,
}
