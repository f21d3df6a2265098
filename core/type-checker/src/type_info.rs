//! Type Information
//!
//! This module defines the [`TypeTable`], the append-only store of every type term
//! created while checking one program.
//!
//! Terms are addressed by [`TypeIndex`] and laid out like the syntax arena: a
//! compound term (function, tuple) owns a run of one shared sub-index array.
//! Compound terms are interned, so building the same structure twice yields the
//! same index. The intern map is only ever probed, never iterated.
//!
//! The first indices are reserved for the builtin terms:
//!
//! | index | term |
//! |---|---|
//! | 0 | unknown (`?`) |
//! | 1 | pending |
//! | 2 | `()` |
//! | 3 | `Bool` |
//! | 4..=11 | `I8`, `I16`, `I32`, `I64`, `U8`, `U16`, `U32`, `U64` |
//! | 12 | `String`, i.e. `[U8]` |

use core::fmt;
use std::fmt::{Display, Formatter, Write};

use cairn_ast::nodes::SubRun;
use cairn_ast::work_stack::{Traversal, WorkStack, run};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Index of a term in a [`TypeTable`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeIndex(pub u32);

impl TypeIndex {
    /// The type of a node that could not be typed because of a reported error.
    pub const UNKNOWN: TypeIndex = TypeIndex(0);
    /// The type of a node whose check has started but not finished.
    pub const PENDING: TypeIndex = TypeIndex(1);
    pub const UNIT: TypeIndex = TypeIndex(2);
    pub const BOOL: TypeIndex = TypeIndex(3);
    pub const STRING: TypeIndex = TypeIndex(12);

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 == Self::UNKNOWN.0
    }
}

impl Display for TypeIndex {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, Serialize)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntKind {
    pub const ALL: [IntKind; 8] = [
        IntKind::I8,
        IntKind::I16,
        IntKind::I32,
        IntKind::I64,
        IntKind::U8,
        IntKind::U16,
        IntKind::U32,
        IntKind::U64,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            IntKind::I8 => "I8",
            IntKind::I16 => "I16",
            IntKind::I32 => "I32",
            IntKind::I64 => "I64",
            IntKind::U8 => "U8",
            IntKind::U16 => "U16",
            IntKind::U32 => "U32",
            IntKind::U64 => "U64",
        }
    }

    /// Largest value a literal of this kind may have. Literals are unsigned, so only
    /// the positive range of the signed kinds is reachable.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn max(self) -> u64 {
        match self {
            IntKind::I8 => i8::MAX as u64,
            IntKind::I16 => i16::MAX as u64,
            IntKind::I32 => i32::MAX as u64,
            IntKind::I64 => i64::MAX as u64,
            IntKind::U8 => u8::MAX as u64,
            IntKind::U16 => u16::MAX as u64,
            IntKind::U32 => u32::MAX as u64,
            IntKind::U64 => u64::MAX,
        }
    }

    /// The reserved table slot of this kind.
    #[must_use]
    pub const fn type_index(self) -> TypeIndex {
        TypeIndex(4 + self as u32)
    }
}

impl Display for IntKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum TypeTerm {
    Unknown,
    Pending,
    Unit,
    Bool,
    Int(IntKind),
    /// Parameter types followed by the return type.
    Function(SubRun),
    Tuple(SubRun),
    List(TypeIndex),
}

/// Structural key of an interned compound term.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
enum InternKey {
    Function(Box<[TypeIndex]>),
    Tuple(Box<[TypeIndex]>),
    List(TypeIndex),
}

/// Builtin names of the type namespace, in prelude order.
pub const BUILTIN_TYPES: [(&str, TypeIndex); 10] = [
    ("Bool", TypeIndex::BOOL),
    ("U8", IntKind::U8.type_index()),
    ("U16", IntKind::U16.type_index()),
    ("U32", IntKind::U32.type_index()),
    ("U64", IntKind::U64.type_index()),
    ("I8", IntKind::I8.type_index()),
    ("I16", IntKind::I16.type_index()),
    ("I32", IntKind::I32.type_index()),
    ("I64", IntKind::I64.type_index()),
    ("String", TypeIndex::STRING),
];

/// Builtin names of the term namespace.
pub const BUILTIN_TERMS: [(&str, TypeIndex); 2] =
    [("true", TypeIndex::BOOL), ("false", TypeIndex::BOOL)];

#[derive(Debug, Clone)]
pub struct TypeTable {
    terms: Vec<TypeTerm>,
    sub_indices: Vec<TypeIndex>,
    interned: FxHashMap<InternKey, TypeIndex>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self {
            terms: vec![
                TypeTerm::Unknown,
                TypeTerm::Pending,
                TypeTerm::Unit,
                TypeTerm::Bool,
            ],
            sub_indices: Vec::new(),
            interned: FxHashMap::default(),
        };
        table
            .terms
            .extend(IntKind::ALL.iter().map(|kind| TypeTerm::Int(*kind)));
        let string = table.new_list(IntKind::U8.type_index());
        debug_assert_eq!(string, TypeIndex::STRING);
        table
    }

    fn push(&mut self, term: TypeTerm) -> TypeIndex {
        let index = u32::try_from(self.terms.len()).expect("type index overflow");
        self.terms.push(term);
        TypeIndex(index)
    }

    fn push_run(&mut self, parts: &[TypeIndex]) -> SubRun {
        let start = u32::try_from(self.sub_indices.len()).expect("type sub-index overflow");
        self.sub_indices.extend_from_slice(parts);
        SubRun {
            start,
            len: u32::try_from(parts.len()).expect("type arity overflow"),
        }
    }

    fn intern(&mut self, key: InternKey) -> TypeIndex {
        if let Some(index) = self.interned.get(&key) {
            return *index;
        }
        let term = match &key {
            InternKey::Function(parts) => TypeTerm::Function(self.push_run(parts)),
            InternKey::Tuple(parts) => TypeTerm::Tuple(self.push_run(parts)),
            InternKey::List(element) => TypeTerm::List(*element),
        };
        let index = self.push(term);
        self.interned.insert(key, index);
        index
    }

    /// Function type taking `params` and returning `ret`.
    pub fn new_function(&mut self, params: &[TypeIndex], ret: TypeIndex) -> TypeIndex {
        let parts: Box<[TypeIndex]> = params.iter().copied().chain([ret]).collect();
        self.intern(InternKey::Function(parts))
    }

    pub fn new_tuple(&mut self, elements: &[TypeIndex]) -> TypeIndex {
        self.intern(InternKey::Tuple(elements.into()))
    }

    pub fn new_list(&mut self, element: TypeIndex) -> TypeIndex {
        self.intern(InternKey::List(element))
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn term(&self, index: TypeIndex) -> TypeTerm {
        self.terms[index.index()]
    }

    #[must_use]
    pub fn subs(&self, run: SubRun) -> &[TypeIndex] {
        &self.sub_indices[run.range()]
    }

    /// Parameter types and return type, if `index` is a function type.
    #[must_use]
    pub fn function_parts(&self, index: TypeIndex) -> Option<(&[TypeIndex], TypeIndex)> {
        match self.term(index) {
            TypeTerm::Function(run) => {
                let (ret, params) = self.subs(run).split_last()?;
                Some((params, *ret))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn tuple_elements(&self, index: TypeIndex) -> Option<&[TypeIndex]> {
        match self.term(index) {
            TypeTerm::Tuple(run) => Some(self.subs(run)),
            _ => None,
        }
    }

    #[must_use]
    pub fn list_element(&self, index: TypeIndex) -> Option<TypeIndex> {
        match self.term(index) {
            TypeTerm::List(element) => Some(element),
            _ => None,
        }
    }

    #[must_use]
    pub fn int_kind(&self, index: TypeIndex) -> Option<IntKind> {
        match self.term(index) {
            TypeTerm::Int(kind) => Some(kind),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Structural equality: tags match and subterms are pairwise equal, in order.
    ///
    /// Runs on an explicit worklist, so arbitrarily deep terms are fine.
    #[must_use]
    pub fn equal(&self, a: TypeIndex, b: TypeIndex) -> bool {
        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            if a == b {
                continue;
            }
            match (self.term(a), self.term(b)) {
                (TypeTerm::Function(x), TypeTerm::Function(y))
                | (TypeTerm::Tuple(x), TypeTerm::Tuple(y)) => {
                    if x.len != y.len {
                        return false;
                    }
                    pending.extend(self.subs(x).iter().copied().zip(self.subs(y).iter().copied()));
                }
                (TypeTerm::List(x), TypeTerm::List(y)) => pending.push((x, y)),
                (x, y) if x == y => {}
                _ => return false,
            }
        }
        true
    }

    /// Renders a term the way it is written in source: `I32`, `[U8]`,
    /// `(Fn I32 Bool)`, `(I32, U8)`, `()`. Unknown terms render as `?`.
    #[must_use]
    pub fn render(&self, index: TypeIndex) -> String {
        let mut renderer = Renderer {
            table: self,
            out: String::new(),
        };
        // Writing into a `String` cannot fail.
        let _ = run(&mut renderer, Render::Term(index));
        renderer.out
    }

    pub fn display(&self, index: TypeIndex) -> impl Display + '_ {
        DisplayType { table: self, index }
    }
}

struct DisplayType<'a> {
    table: &'a TypeTable,
    index: TypeIndex,
}

impl Display for DisplayType<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.table.render(self.index))
    }
}

enum Render {
    Term(TypeIndex),
    Text(&'static str),
}

struct Renderer<'a> {
    table: &'a TypeTable,
    out: String,
}

impl Renderer<'_> {
    /// Schedules `open`, the parts separated by `separator`, then `close`.
    fn sequence(
        stack: &mut WorkStack<Render, ()>,
        open: &'static str,
        parts: &[TypeIndex],
        separator: &'static str,
        close: &'static str,
    ) {
        let mut actions = Vec::with_capacity(parts.len() * 2 + 1);
        actions.push(Render::Text(open));
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                actions.push(Render::Text(separator));
            }
            actions.push(Render::Term(*part));
        }
        actions.push(Render::Text(close));
        stack.push_in_order(actions);
    }
}

impl Traversal for Renderer<'_> {
    type Action = Render;
    type Value = ();
    type Error = fmt::Error;

    fn step(&mut self, action: Render, stack: &mut WorkStack<Render, ()>) -> fmt::Result {
        let index = match action {
            Render::Text(text) => return self.out.write_str(text),
            Render::Term(index) => index,
        };
        match self.table.term(index) {
            TypeTerm::Unknown => self.out.write_char('?')?,
            TypeTerm::Pending => self.out.write_str("<pending>")?,
            TypeTerm::Unit => self.out.write_str("()")?,
            TypeTerm::Bool => self.out.write_str("Bool")?,
            TypeTerm::Int(kind) => self.out.write_str(kind.as_str())?,
            TypeTerm::Function(run) => {
                Self::sequence(stack, "(Fn ", self.table.subs(run), " ", ")");
            }
            TypeTerm::Tuple(run) => {
                Self::sequence(stack, "(", self.table.subs(run), ", ", ")");
            }
            TypeTerm::List(element) => {
                stack.push_in_order([
                    Render::Text("["),
                    Render::Term(element),
                    Render::Text("]"),
                ]);
            }
        }
        Ok(())
    }
}
