//! Indented tree dump, one node per line.
//!
//! ```text
//! root 0..15
//!   def 0..15
//!     binder 5..6 `x`
//!     type-name 7..10 `I32`
//!     int 11..14 `100`
//! ```
//!
//! Indentation stops growing at [`MAX_INDENT_DEPTH`] levels so the output stays
//! linear in the number of nodes; deeper lines carry their depth instead, e.g.
//! `20| call 80..4000`.

use std::fmt::{self, Write};

use crate::arena::Arena;
use crate::nodes::NodeIndex;
use crate::work_stack::{Traversal, WorkStack, run};

const INDENT: usize = 2;

pub const MAX_INDENT_DEPTH: usize = 16;

struct Printer<'a> {
    arena: &'a Arena,
    source: &'a str,
    out: String,
}

impl Traversal for Printer<'_> {
    type Action = (NodeIndex, usize);
    type Value = ();
    type Error = fmt::Error;

    fn step(
        &mut self,
        (index, depth): (NodeIndex, usize),
        stack: &mut WorkStack<(NodeIndex, usize), ()>,
    ) -> fmt::Result {
        let node = self.arena.node(index);
        write!(
            self.out,
            "{:width$}",
            "",
            width = depth.min(MAX_INDENT_DEPTH) * INDENT
        )?;
        if depth > MAX_INDENT_DEPTH {
            write!(self.out, "{depth}| ")?;
        }
        write!(self.out, "{} {}", node.kind, node.span)?;
        if node.kind.is_leaf() {
            write!(self.out, " `{}`", node.span.text(self.source))?;
        }
        self.out.push('\n');
        stack.push_in_order(
            self.arena
                .children(index)
                .iter()
                .map(|child| (*child, depth + 1)),
        );
        Ok(())
    }
}

/// Renders the subtree rooted at `root`.
#[must_use]
pub fn print_subtree(arena: &Arena, source: &str, root: NodeIndex) -> String {
    let mut printer = Printer {
        arena,
        source,
        out: String::new(),
    };
    // Writing into a `String` cannot fail.
    let _ = run(&mut printer, (root, 0));
    printer.out
}

/// Renders the whole tree.
///
/// # Panics
///
/// Panics if the arena has no root.
#[must_use]
pub fn print_tree(arena: &Arena, source: &str) -> String {
    print_subtree(arena, source, arena.root())
}
