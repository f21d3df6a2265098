//! Lowers the reader's concrete syntax tree into the node [`Arena`].
//!
//! The builder assigns meaning to forms: `(def ...)` at the top level, the `if`,
//! `as` and `fn` special forms, calls, tuples, lists and the type-expression
//! grammar. Each CST form is visited with the *position* it occurs in (value,
//! type, binder or top level), because the same text lowers differently in each:
//! `()` is a [`NodeKind::Unit`] value but a [`NodeKind::UnitType`] type.
//!
//! Lowering runs on the [`WorkStack`]: a visit action pushes a build action below
//! the visits of the form's children, and the build action creates the node once
//! all of its children exist. Children are therefore always allocated before their
//! parent, which is what [`Arena::new_node`] requires.
//!
//! ```
//! use cairn_ast::builder::Builder;
//! use cairn_ast::nodes::NodeKind;
//!
//! let arena = Builder::new("(def one I32 1)").build_ast().unwrap();
//! let def = arena.children(arena.root())[0];
//! assert_eq!(arena.kind(def), NodeKind::TopLevel);
//! ```

use log::debug;

use crate::arena::Arena;
use crate::errors::ParseError;
use crate::nodes::{NodeIndex, NodeKind, Span};
use crate::parser::{self, Cst, CstKind};
use crate::work_stack::{Traversal, WorkStack, run_on};

const KEYWORDS: [&str; 4] = ["def", "fn", "if", "as"];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Position {
    TopLevel,
    Value,
    Type,
    Binder,
}

enum Lower {
    Visit { cst: u32, position: Position },
    Build { kind: NodeKind, span: Span, count: usize },
}

pub struct Builder<'a> {
    source: &'a str,
}

impl<'a> Builder<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Reads the source and builds the arena. The root spans the whole source.
    ///
    /// # Errors
    ///
    /// Returns the first malformed token or form as a [`ParseError`].
    pub fn build_ast(self) -> Result<Arena, ParseError> {
        let cst = parser::read(self.source)?;
        let mut lowering = Lowering {
            source: self.source,
            cst: &cst,
            arena: Arena::with_capacity(cst.len() + 1),
            scratch: Vec::new(),
        };
        #[allow(clippy::cast_possible_truncation)]
        let root_span = Span::new(0, self.source.len() as u32);
        let top_level = cst.top_level();
        let mut stack = WorkStack::new();
        stack.push_postorder(
            Lower::Build {
                kind: NodeKind::Root,
                span: root_span,
                count: top_level.len(),
            },
            top_level.iter().map(|&cst| Lower::Visit {
                cst,
                position: Position::TopLevel,
            }),
        );
        run_on(&mut lowering, &mut stack)?;
        let root = stack.pop_operand();
        let mut arena = lowering.arena;
        arena.set_root(root);
        debug!(
            "built {} nodes from {} bytes ({} definitions)",
            arena.len(),
            self.source.len(),
            top_level.len()
        );
        Ok(arena)
    }
}

struct Lowering<'s, 'c> {
    source: &'s str,
    cst: &'c Cst,
    arena: Arena,
    scratch: Vec<NodeIndex>,
}

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

fn expect_operands(
    form: &'static str,
    expected: usize,
    operands: &[u32],
    span: Span,
) -> Result<(), ParseError> {
    if operands.len() == expected {
        return Ok(());
    }
    Err(ParseError::FormArity {
        form,
        expected,
        found: operands.len(),
        span,
    })
}

impl<'s, 'c> Lowering<'s, 'c> {
    fn leaf(&mut self, kind: NodeKind, span: Span, stack: &mut WorkStack<Lower, NodeIndex>) {
        let index = self.arena.new_node(kind, span, &[]);
        stack.push_operand(index);
    }

    fn compound(
        stack: &mut WorkStack<Lower, NodeIndex>,
        kind: NodeKind,
        span: Span,
        children: &[u32],
        position: Position,
    ) {
        stack.push_postorder(
            Lower::Build {
                kind,
                span,
                count: children.len(),
            },
            children.iter().map(|&cst| Lower::Visit { cst, position }),
        );
    }

    fn name(&self, cst: u32) -> Option<&'s str> {
        self.cst.name(cst, self.source)
    }

    fn visit_top_level(
        &mut self,
        cst: u32,
        stack: &mut WorkStack<Lower, NodeIndex>,
    ) -> Result<(), ParseError> {
        let tree = self.cst;
        let node = tree.node(cst);
        let children = tree.children(cst);
        let is_def = node.kind == CstKind::Paren { tuple: false }
            && children.first().and_then(|&head| self.name(head)) == Some("def");
        if !is_def {
            return Err(ParseError::Expected {
                expected: "a `(def name type value)` definition",
                span: node.span,
            });
        }
        let operands = &children[1..];
        expect_operands("def", 3, operands, node.span)?;
        stack.push_postorder(
            Lower::Build {
                kind: NodeKind::TopLevel,
                span: node.span,
                count: 3,
            },
            [
                (operands[0], Position::Binder),
                (operands[1], Position::Type),
                (operands[2], Position::Value),
            ]
            .map(|(cst, position)| Lower::Visit { cst, position }),
        );
        Ok(())
    }

    fn visit_binder(
        &mut self,
        cst: u32,
        stack: &mut WorkStack<Lower, NodeIndex>,
    ) -> Result<(), ParseError> {
        let span = self.cst.node(cst).span;
        match self.name(cst) {
            Some(name) if !is_keyword(name) => {
                self.leaf(NodeKind::Binder, span, stack);
                Ok(())
            }
            _ => Err(ParseError::Expected {
                expected: "a name",
                span,
            }),
        }
    }

    fn visit_value(
        &mut self,
        cst: u32,
        stack: &mut WorkStack<Lower, NodeIndex>,
    ) -> Result<(), ParseError> {
        let tree = self.cst;
        let node = tree.node(cst);
        let span = node.span;
        let children = tree.children(cst);
        match node.kind {
            CstKind::Name => {
                if self.name(cst).is_some_and(is_keyword) {
                    return Err(ParseError::Expected {
                        expected: "an expression",
                        span,
                    });
                }
                self.leaf(NodeKind::Name, span, stack);
            }
            CstKind::Int => self.leaf(NodeKind::Int, span, stack),
            CstKind::Str => self.leaf(NodeKind::Str, span, stack),
            CstKind::Bracket => {
                Self::compound(stack, NodeKind::List, span, children, Position::Value);
            }
            CstKind::Paren { tuple: true } => {
                Self::compound(stack, NodeKind::Tuple, span, children, Position::Value);
            }
            CstKind::Paren { tuple: false } => {
                let Some((&head, operands)) = children.split_first() else {
                    self.leaf(NodeKind::Unit, span, stack);
                    return Ok(());
                };
                match self.name(head) {
                    Some("def") => return Err(ParseError::NestedDefinition { span }),
                    Some("if") => {
                        expect_operands("if", 3, operands, span)?;
                        Self::compound(stack, NodeKind::If, span, operands, Position::Value);
                    }
                    Some("as") => {
                        expect_operands("as", 2, operands, span)?;
                        stack.push_postorder(
                            Lower::Build {
                                kind: NodeKind::As,
                                span,
                                count: 2,
                            },
                            [
                                (operands[0], Position::Type),
                                (operands[1], Position::Value),
                            ]
                            .map(|(cst, position)| Lower::Visit { cst, position }),
                        );
                    }
                    Some("fn") => self.visit_fn(span, operands, stack)?,
                    _ => Self::compound(stack, NodeKind::Call, span, children, Position::Value),
                }
            }
        }
        Ok(())
    }

    /// `(fn ((name type)...) return-type body)`
    fn visit_fn(
        &mut self,
        span: Span,
        operands: &'c [u32],
        stack: &mut WorkStack<Lower, NodeIndex>,
    ) -> Result<(), ParseError> {
        expect_operands("fn", 3, operands, span)?;
        let (params, ret, body) = (operands[0], operands[1], operands[2]);
        let cst: &'c Cst = self.cst;
        if cst.node(params).kind != (CstKind::Paren { tuple: false }) {
            return Err(ParseError::Expected {
                expected: "a parameter list",
                span: cst.node(params).span,
            });
        }
        let params = cst.children(params);
        for &param in params {
            let node = cst.node(param);
            if node.kind != (CstKind::Paren { tuple: false }) || cst.children(param).len() != 2 {
                return Err(ParseError::Expected {
                    expected: "a `(name type)` parameter",
                    span: node.span,
                });
            }
        }
        let binders = params.iter().flat_map(|&param| {
            let pair = cst.children(param);
            [
                Lower::Visit {
                    cst: pair[0],
                    position: Position::Binder,
                },
                Lower::Visit {
                    cst: pair[1],
                    position: Position::Type,
                },
            ]
        });
        let tail = [
            Lower::Visit {
                cst: ret,
                position: Position::Type,
            },
            Lower::Visit {
                cst: body,
                position: Position::Value,
            },
        ];
        stack.push_postorder(
            Lower::Build {
                kind: NodeKind::Fn,
                span,
                count: params.len() * 2 + 2,
            },
            binders.chain(tail),
        );
        Ok(())
    }

    fn visit_type(
        &mut self,
        cst: u32,
        stack: &mut WorkStack<Lower, NodeIndex>,
    ) -> Result<(), ParseError> {
        let tree = self.cst;
        let node = tree.node(cst);
        let span = node.span;
        let children = tree.children(cst);
        let not_a_type = ParseError::Expected {
            expected: "a type",
            span,
        };
        match node.kind {
            CstKind::Name => match self.name(cst) {
                Some(name) if name != "Fn" && !is_keyword(name) => {
                    self.leaf(NodeKind::TypeName, span, stack);
                }
                _ => return Err(not_a_type),
            },
            CstKind::Int | CstKind::Str => return Err(not_a_type),
            CstKind::Bracket => {
                if children.len() != 1 {
                    return Err(ParseError::Expected {
                        expected: "a single element type",
                        span,
                    });
                }
                Self::compound(stack, NodeKind::ListType, span, children, Position::Type);
            }
            CstKind::Paren { tuple: true } => {
                Self::compound(stack, NodeKind::TupleType, span, children, Position::Type);
            }
            CstKind::Paren { tuple: false } => {
                let Some((&head, operands)) = children.split_first() else {
                    self.leaf(NodeKind::UnitType, span, stack);
                    return Ok(());
                };
                if self.name(head) != Some("Fn") {
                    return Err(not_a_type);
                }
                if operands.is_empty() {
                    return Err(ParseError::Expected {
                        expected: "a return type",
                        span,
                    });
                }
                Self::compound(stack, NodeKind::FnType, span, operands, Position::Type);
            }
        }
        Ok(())
    }
}

impl Traversal for Lowering<'_, '_> {
    type Action = Lower;
    type Value = NodeIndex;
    type Error = ParseError;

    fn step(
        &mut self,
        action: Lower,
        stack: &mut WorkStack<Lower, NodeIndex>,
    ) -> Result<(), ParseError> {
        match action {
            Lower::Visit { cst, position } => match position {
                Position::TopLevel => self.visit_top_level(cst, stack),
                Position::Value => self.visit_value(cst, stack),
                Position::Type => self.visit_type(cst, stack),
                Position::Binder => self.visit_binder(cst, stack),
            },
            Lower::Build { kind, span, count } => {
                self.scratch.clear();
                self.scratch.extend(stack.take_operands(count));
                let index = self.arena.new_node(kind, span, &self.scratch);
                stack.push_operand(index);
                Ok(())
            }
        }
    }
}
