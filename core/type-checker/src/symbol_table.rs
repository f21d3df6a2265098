//! Symbol Table
//!
//! A stack-discipline binding environment. Entering a scope pushes its bindings,
//! leaving it pops the same number; lookup walks from the most recent binding down,
//! so inner bindings shadow outer ones.
//!
//! Names are never copied out of the source. A binding stores the span of its
//! declaration and lookup compares the length first, then the bytes. The prelude
//! sits at the bottom of the stack and can never be popped.

use cairn_ast::nodes::Span;
use log::trace;

use crate::type_info::TypeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingName {
    /// A prelude name.
    Builtin(&'static str),
    /// A name declared in the source.
    Source(Span),
}

impl BindingName {
    fn bytes<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        match self {
            BindingName::Builtin(name) => name.as_bytes(),
            BindingName::Source(span) => span.bytes(source),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub name: BindingName,
    pub ty: TypeIndex,
}

impl Binding {
    #[must_use]
    pub fn source(span: Span, ty: TypeIndex) -> Self {
        Self {
            name: BindingName::Source(span),
            ty,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    bindings: Vec<Binding>,
    prelude_len: usize,
}

impl SymbolTable {
    /// Creates a table whose bottom scope holds `prelude`.
    #[must_use]
    pub fn with_prelude<I>(prelude: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, TypeIndex)>,
    {
        let bindings: Vec<Binding> = prelude
            .into_iter()
            .map(|(name, ty)| Binding {
                name: BindingName::Builtin(name),
                ty,
            })
            .collect();
        Self {
            prelude_len: bindings.len(),
            bindings,
        }
    }

    /// Pushes one scope and returns the number of bindings it holds, which is the
    /// count to hand back to [`SymbolTable::pop_scope`].
    pub fn push_scope<I>(&mut self, bindings: I) -> usize
    where
        I: IntoIterator<Item = Binding>,
    {
        let before = self.bindings.len();
        self.bindings.extend(bindings);
        let count = self.bindings.len() - before;
        trace!("push scope of {count} binding(s), depth {}", self.depth());
        count
    }

    /// Drops the `count` most recent bindings.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `count` bindings were pushed above the prelude.
    pub fn pop_scope(&mut self, count: usize) {
        let pushed = self.depth();
        assert!(
            count <= pushed,
            "cannot pop {count} binding(s), only {pushed} pushed above the prelude"
        );
        self.bindings.truncate(self.bindings.len() - count);
        trace!("pop scope of {count} binding(s), depth {}", self.depth());
    }

    /// Type of the most recent binding whose name is the text of `name` in `source`.
    #[must_use]
    pub fn lookup(&self, name: Span, source: &str) -> Option<TypeIndex> {
        let source = source.as_bytes();
        let wanted = name.bytes(source);
        self.bindings
            .iter()
            .rev()
            .find(|binding| {
                let candidate = binding.name.bytes(source);
                candidate.len() == wanted.len() && candidate == wanted
            })
            .map(|binding| binding.ty)
    }

    /// Number of bindings above the prelude.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.bindings.len() - self.prelude_len
    }
}
