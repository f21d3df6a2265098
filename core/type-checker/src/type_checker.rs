//! Type Checker Implementation
//!
//! Bidirectional checking over the node arena. Every value node is checked
//! against a [`Goal`]: either no expectation (the node's type is synthesized), an
//! expected type (the node is checked against it), or a poisoned expectation
//! (the expected type is unknown because of an error already reported, so the
//! node is checked but ambiguity and mismatches are not reported again).
//!
//! The walk runs on a [`WorkStack`]. A node's *descend* action pushes its
//! children's actions above a *combine* action for the node. Every checked or
//! resolved node leaves exactly one [`TypeIndex`] on the operand stack and writes
//! its slot in the node-type table. While a compound node is between its descend
//! and combine actions its slot holds the pending type.
//!
//! Top-level definitions are visible to each other regardless of order: all
//! declared types are resolved and all names are bound before any value is
//! checked.

use std::convert::Infallible;

use cairn_ast::arena::Arena;
use cairn_ast::nodes::{NodeIndex, NodeKind};
use cairn_ast::work_stack::{Traversal, WorkStack, run};
use log::{debug, trace};

use crate::errors::{Diagnostic, DiagnosticKind};
use crate::symbol_table::{Binding, SymbolTable};
use crate::type_info::{BUILTIN_TERMS, BUILTIN_TYPES, TypeIndex, TypeTable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Goal {
    None,
    Expect(TypeIndex),
    Poisoned,
}

impl Goal {
    /// Expectation to hand down for a type that may be unknown.
    fn of(ty: TypeIndex) -> Goal {
        if ty.is_unknown() {
            Goal::Poisoned
        } else {
            Goal::Expect(ty)
        }
    }
}

#[derive(Debug)]
pub(crate) enum Action {
    /// Check a value node.
    Check { node: NodeIndex, goal: Goal },
    /// Resolve a type-expression node.
    Resolve { node: NodeIndex },
    /// Build a compound type from its resolved parts.
    ResolveDone { node: NodeIndex },
    /// Bind every top-level name to its resolved declared type.
    BindTopLevel { root: NodeIndex },
    RootDone { root: NodeIndex, bindings: usize },
    /// Bind the parameters once their annotations are resolved, then check the body.
    FnSignature { node: NodeIndex, goal: Goal },
    FnDone {
        node: NodeIndex,
        ty: TypeIndex,
        bindings: usize,
    },
    /// The callee's type is known; check the arguments against it.
    CallCallee { node: NodeIndex, goal: Goal },
    CallDone {
        node: NodeIndex,
        goal: Goal,
        ret: TypeIndex,
        args: usize,
    },
    /// Check the second branch against the type of the first.
    IfElse { node: NodeIndex },
    IfDone { node: NodeIndex, goal: Goal },
    AsOperand { node: NodeIndex, goal: Goal },
    AsDone {
        node: NodeIndex,
        goal: Goal,
        ty: TypeIndex,
    },
    /// Check the remaining list elements against the type of the first.
    ListRest { node: NodeIndex },
    /// Combine a list or tuple literal.
    Collect { node: NodeIndex, goal: Goal },
}

/// Everything a checking session produces.
pub(crate) struct CheckResult {
    pub(crate) types: TypeTable,
    pub(crate) node_types: Vec<TypeIndex>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

pub(crate) struct TypeChecker<'a> {
    arena: &'a Arena,
    source: &'a str,
    types: TypeTable,
    node_types: Vec<TypeIndex>,
    terms: SymbolTable,
    type_names: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    scratch: Vec<TypeIndex>,
}

impl<'a> TypeChecker<'a> {
    pub(crate) fn new(arena: &'a Arena, source: &'a str) -> Self {
        Self {
            arena,
            source,
            types: TypeTable::new(),
            node_types: vec![TypeIndex::UNKNOWN; arena.len()],
            terms: SymbolTable::with_prelude(BUILTIN_TERMS),
            type_names: SymbolTable::with_prelude(BUILTIN_TYPES),
            diagnostics: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Checks the tree rooted at `root` and consumes the session.
    pub(crate) fn check(mut self, root: NodeIndex) -> CheckResult {
        let operands = match run(
            &mut self,
            Action::Check {
                node: root,
                goal: Goal::None,
            },
        ) {
            Ok(operands) => operands,
            Err(never) => match never {},
        };
        debug_assert_eq!(operands, vec![TypeIndex::UNIT]);
        debug_assert_eq!(self.terms.depth(), 0, "term scopes left open");
        debug!(
            "checked {} nodes: {} types, {} diagnostic(s)",
            self.arena.len(),
            self.types.len(),
            self.diagnostics.len()
        );
        CheckResult {
            types: self.types,
            node_types: self.node_types,
            diagnostics: self.diagnostics,
        }
    }

    fn finish(&mut self, node: NodeIndex, ty: TypeIndex, stack: &mut WorkStack<Action, TypeIndex>) {
        self.node_types[node.index()] = ty;
        stack.push_operand(ty);
    }

    /// Records a diagnostic at `node`, whose type becomes unknown.
    fn report(
        &mut self,
        node: NodeIndex,
        kind: DiagnosticKind,
        stack: &mut WorkStack<Action, TypeIndex>,
    ) {
        self.diagnostics.push(Diagnostic { kind, node });
        self.finish(node, TypeIndex::UNKNOWN, stack);
    }

    /// Reports a mismatch if `goal` expects a type other than `got`.
    fn mismatch(&mut self, node: NodeIndex, goal: Goal, got: TypeIndex) -> bool {
        let Goal::Expect(expected) = goal else {
            return false;
        };
        if got.is_unknown() || self.types.equal(expected, got) {
            return false;
        }
        self.diagnostics.push(Diagnostic {
            kind: DiagnosticKind::TypeMismatch { expected, got },
            node,
        });
        true
    }

    /// Finishes `node` with `got`, or with the unknown type if it mismatches `goal`.
    fn expect(
        &mut self,
        node: NodeIndex,
        goal: Goal,
        got: TypeIndex,
        stack: &mut WorkStack<Action, TypeIndex>,
    ) {
        let ty = if self.mismatch(node, goal, got) {
            TypeIndex::UNKNOWN
        } else {
            got
        };
        self.finish(node, ty, stack);
    }

    /// Moves the top `count` operands into `self.scratch`.
    fn take_into_scratch(&mut self, count: usize, stack: &mut WorkStack<Action, TypeIndex>) {
        self.scratch.clear();
        self.scratch.extend(stack.take_operands(count));
    }

    fn check_node(&mut self, node: NodeIndex, goal: Goal, stack: &mut WorkStack<Action, TypeIndex>) {
        let arena = self.arena;
        let kind = arena.kind(node);
        if !kind.is_leaf() {
            self.node_types[node.index()] = TypeIndex::PENDING;
        }
        match kind {
            NodeKind::Root => {
                let declared_types = arena
                    .children(node)
                    .iter()
                    .map(|def| Action::Resolve {
                        node: arena.child(*def, 1),
                    });
                stack.push_postorder(Action::BindTopLevel { root: node }, declared_types);
            }
            NodeKind::Name => match self.terms.lookup(arena.span(node), self.source) {
                Some(ty) => self.expect(node, goal, ty, stack),
                None => self.report(node, DiagnosticKind::BindingNotFound, stack),
            },
            NodeKind::Int => self.check_int(node, goal, stack),
            NodeKind::Str => self.check_intrinsic(node, goal, TypeIndex::STRING, stack),
            NodeKind::Unit => self.check_intrinsic(node, goal, TypeIndex::UNIT, stack),
            NodeKind::List => self.check_list(node, goal, stack),
            NodeKind::Tuple => self.check_tuple(node, goal, stack),
            NodeKind::If => {
                let cond = Action::Check {
                    node: arena.child(node, 0),
                    goal: Goal::Expect(TypeIndex::BOOL),
                };
                let then = arena.child(node, 1);
                let otherwise = arena.child(node, 2);
                stack.push(Action::IfDone { node, goal });
                if goal == Goal::None {
                    stack.push_in_order([
                        cond,
                        Action::Check { node: then, goal },
                        Action::IfElse { node },
                    ]);
                } else {
                    stack.push_in_order([
                        cond,
                        Action::Check { node: then, goal },
                        Action::Check {
                            node: otherwise,
                            goal,
                        },
                    ]);
                }
            }
            NodeKind::As => {
                stack.push_postorder(
                    Action::AsOperand { node, goal },
                    [Action::Resolve {
                        node: arena.child(node, 0),
                    }],
                );
            }
            NodeKind::Fn => {
                // [binder, type]*, return type, body: resolve every type position.
                let children = arena.children(node);
                let params = (children.len() - 2) / 2;
                let annotations = (0..params)
                    .map(|i| children[2 * i + 1])
                    .chain([children[2 * params]])
                    .map(|ty| Action::Resolve { node: ty });
                stack.push_postorder(Action::FnSignature { node, goal }, annotations);
            }
            NodeKind::Call => {
                trace!("defer call {node} until its callee is checked");
                stack.push(Action::CallCallee { node, goal });
                stack.push(Action::Check {
                    node: arena.child(node, 0),
                    goal: Goal::None,
                });
            }
            NodeKind::TopLevel
            | NodeKind::Binder
            | NodeKind::TypeName
            | NodeKind::UnitType
            | NodeKind::ListType
            | NodeKind::TupleType
            | NodeKind::FnType => unreachable!("`{kind}` node {node} checked as a value"),
        }
    }

    fn check_int(&mut self, node: NodeIndex, goal: Goal, stack: &mut WorkStack<Action, TypeIndex>) {
        match goal {
            Goal::None => self.report(node, DiagnosticKind::AmbiguousType, stack),
            Goal::Poisoned => self.finish(node, TypeIndex::UNKNOWN, stack),
            Goal::Expect(expected) => match self.types.int_kind(expected) {
                None => self.report(node, DiagnosticKind::LiteralMismatch { expected }, stack),
                Some(kind) => {
                    let text = self.arena.span(node).text(self.source);
                    if parse_literal(text).is_some_and(|value| value <= kind.max()) {
                        self.finish(node, expected, stack);
                    } else {
                        self.report(node, DiagnosticKind::IntLargerThanMax { expected }, stack);
                    }
                }
            },
        }
    }

    /// Literals whose type does not depend on the goal.
    fn check_intrinsic(
        &mut self,
        node: NodeIndex,
        goal: Goal,
        intrinsic: TypeIndex,
        stack: &mut WorkStack<Action, TypeIndex>,
    ) {
        match goal {
            Goal::Expect(expected) if !self.types.equal(expected, intrinsic) => {
                self.report(node, DiagnosticKind::LiteralMismatch { expected }, stack);
            }
            _ => self.finish(node, intrinsic, stack),
        }
    }

    fn check_list(&mut self, node: NodeIndex, goal: Goal, stack: &mut WorkStack<Action, TypeIndex>) {
        let arena = self.arena;
        let elements = arena.children(node);
        match goal {
            Goal::Expect(expected) => match self.types.list_element(expected) {
                Some(element) => stack.push_postorder(
                    Action::Collect { node, goal },
                    elements.iter().map(|node| Action::Check {
                        node: *node,
                        goal: Goal::of(element),
                    }),
                ),
                None => self.report(node, DiagnosticKind::LiteralMismatch { expected }, stack),
            },
            Goal::None => match elements.first() {
                None => self.report(node, DiagnosticKind::AmbiguousType, stack),
                Some(first) => {
                    stack.push(Action::Collect { node, goal });
                    stack.push_in_order([
                        Action::Check {
                            node: *first,
                            goal: Goal::None,
                        },
                        Action::ListRest { node },
                    ]);
                }
            },
            Goal::Poisoned => stack.push_postorder(
                Action::Collect { node, goal },
                elements
                    .iter()
                    .map(|node| Action::Check { node: *node, goal }),
            ),
        }
    }

    fn check_tuple(&mut self, node: NodeIndex, goal: Goal, stack: &mut WorkStack<Action, TypeIndex>) {
        let arena = self.arena;
        let elements = arena.children(node);
        let Goal::Expect(expected) = goal else {
            stack.push_postorder(
                Action::Collect { node, goal },
                elements
                    .iter()
                    .map(|node| Action::Check { node: *node, goal }),
            );
            return;
        };
        match self.types.tuple_elements(expected) {
            Some(slots) if slots.len() == elements.len() => stack.push_postorder(
                Action::Collect { node, goal },
                elements.iter().zip(slots).map(|(node, slot)| Action::Check {
                    node: *node,
                    goal: Goal::of(*slot),
                }),
            ),
            _ => {
                // The elements are not checked: one diagnostic for the whole literal.
                self.scratch.clear();
                self.scratch.resize(elements.len(), TypeIndex::UNKNOWN);
                let got = self.types.new_tuple(&self.scratch);
                self.report(node, DiagnosticKind::TypeMismatch { expected, got }, stack);
            }
        }
    }

    fn resolve_node(&mut self, node: NodeIndex, stack: &mut WorkStack<Action, TypeIndex>) {
        let arena = self.arena;
        match arena.kind(node) {
            NodeKind::TypeName => match self.type_names.lookup(arena.span(node), self.source) {
                Some(ty) => self.finish(node, ty, stack),
                None => self.report(node, DiagnosticKind::TypeNotFound, stack),
            },
            NodeKind::UnitType => self.finish(node, TypeIndex::UNIT, stack),
            NodeKind::ListType | NodeKind::TupleType | NodeKind::FnType => {
                self.node_types[node.index()] = TypeIndex::PENDING;
                stack.push_postorder(
                    Action::ResolveDone { node },
                    arena
                        .children(node)
                        .iter()
                        .map(|part| Action::Resolve { node: *part }),
                );
            }
            kind => unreachable!("`{kind}` node {node} resolved as a type"),
        }
    }

    fn resolve_done(&mut self, node: NodeIndex, stack: &mut WorkStack<Action, TypeIndex>) {
        let kind = self.arena.kind(node);
        self.take_into_scratch(self.arena.children(node).len(), stack);
        let ty = if self.scratch.iter().any(|part| part.is_unknown()) {
            TypeIndex::UNKNOWN
        } else {
            match (kind, self.scratch.split_last()) {
                (NodeKind::ListType, Some((element, _))) => self.types.new_list(*element),
                (NodeKind::TupleType, _) => self.types.new_tuple(&self.scratch),
                (NodeKind::FnType, Some((ret, params))) => self.types.new_function(params, *ret),
                _ => unreachable!("malformed `{kind}` node {node}"),
            }
        };
        self.finish(node, ty, stack);
    }

    fn bind_top_level(&mut self, root: NodeIndex, stack: &mut WorkStack<Action, TypeIndex>) {
        let arena = self.arena;
        let defs = arena.children(root);
        self.take_into_scratch(defs.len(), stack);
        for (def, ty) in defs.iter().zip(&self.scratch) {
            self.node_types[def.index()] = *ty;
            self.node_types[arena.child(*def, 0).index()] = *ty;
        }
        let bindings = self.terms.push_scope(
            defs.iter()
                .zip(&self.scratch)
                .map(|(def, ty)| Binding::source(arena.span(arena.child(*def, 0)), *ty)),
        );
        stack.push_postorder(
            Action::RootDone { root, bindings },
            defs.iter().zip(&self.scratch).map(|(def, ty)| Action::Check {
                node: arena.child(*def, 2),
                goal: Goal::of(*ty),
            }),
        );
    }

    fn fn_signature(
        &mut self,
        node: NodeIndex,
        goal: Goal,
        stack: &mut WorkStack<Action, TypeIndex>,
    ) {
        let arena = self.arena;
        let children = arena.children(node);
        let params = (children.len() - 2) / 2;
        self.take_into_scratch(params + 1, stack);
        let ret = self.scratch[params];
        for (i, ty) in self.scratch[..params].iter().enumerate() {
            self.node_types[children[2 * i].index()] = *ty;
        }
        let function = if self.scratch.iter().any(|part| part.is_unknown()) {
            TypeIndex::UNKNOWN
        } else {
            self.types.new_function(&self.scratch[..params], ret)
        };
        let ty = if self.mismatch(node, goal, function) {
            TypeIndex::UNKNOWN
        } else {
            function
        };
        let bindings = self.terms.push_scope(
            self.scratch[..params]
                .iter()
                .enumerate()
                .map(|(i, ty)| Binding::source(arena.span(children[2 * i]), *ty)),
        );
        stack.push(Action::FnDone { node, ty, bindings });
        stack.push(Action::Check {
            node: children[children.len() - 1],
            goal: Goal::of(ret),
        });
    }

    fn call_callee(&mut self, node: NodeIndex, goal: Goal, stack: &mut WorkStack<Action, TypeIndex>) {
        let arena = self.arena;
        let callee = stack.pop_operand();
        let args = &arena.children(node)[1..];
        if callee.is_unknown() {
            self.finish(node, TypeIndex::UNKNOWN, stack);
            return;
        }
        let Some((params, ret)) = self.types.function_parts(callee) else {
            self.report(node, DiagnosticKind::CalledNonFunction { got: callee }, stack);
            return;
        };
        if params.len() != args.len() {
            let kind = DiagnosticKind::WrongArity {
                expected: params.len(),
                got: args.len(),
            };
            self.report(node, kind, stack);
            return;
        }
        stack.push(Action::CallDone {
            node,
            goal,
            ret,
            args: args.len(),
        });
        stack.push_in_order(args.iter().zip(params).map(|(arg, param)| Action::Check {
            node: *arg,
            goal: Goal::of(*param),
        }));
    }

    fn collect(&mut self, node: NodeIndex, goal: Goal, stack: &mut WorkStack<Action, TypeIndex>) {
        let kind = self.arena.kind(node);
        self.take_into_scratch(self.arena.children(node).len(), stack);
        let ty = match goal {
            Goal::Expect(expected) => expected,
            Goal::Poisoned => TypeIndex::UNKNOWN,
            Goal::None if self.scratch.iter().any(|element| element.is_unknown()) => {
                TypeIndex::UNKNOWN
            }
            Goal::None if kind == NodeKind::List => self.types.new_list(self.scratch[0]),
            Goal::None => self.types.new_tuple(&self.scratch),
        };
        self.finish(node, ty, stack);
    }
}

/// Decimal value of an integer literal, or `None` if it does not fit in `u64`.
fn parse_literal(text: &str) -> Option<u64> {
    text.bytes().try_fold(0u64, |value, digit| {
        value
            .checked_mul(10)?
            .checked_add(u64::from(digit.wrapping_sub(b'0')))
    })
}

impl Traversal for TypeChecker<'_> {
    type Action = Action;
    type Value = TypeIndex;
    type Error = Infallible;

    fn step(
        &mut self,
        action: Action,
        stack: &mut WorkStack<Action, TypeIndex>,
    ) -> Result<(), Infallible> {
        match action {
            Action::Check { node, goal } => self.check_node(node, goal, stack),
            Action::Resolve { node } => self.resolve_node(node, stack),
            Action::ResolveDone { node } => self.resolve_done(node, stack),
            Action::BindTopLevel { root } => self.bind_top_level(root, stack),
            Action::RootDone { root, bindings } => {
                stack.discard_operands(self.arena.children(root).len());
                self.terms.pop_scope(bindings);
                self.finish(root, TypeIndex::UNIT, stack);
            }
            Action::FnSignature { node, goal } => self.fn_signature(node, goal, stack),
            Action::FnDone { node, ty, bindings } => {
                stack.discard_operands(1);
                self.terms.pop_scope(bindings);
                self.finish(node, ty, stack);
            }
            Action::CallCallee { node, goal } => self.call_callee(node, goal, stack),
            Action::CallDone {
                node,
                goal,
                ret,
                args,
            } => {
                stack.discard_operands(args);
                self.expect(node, goal, ret, stack);
            }
            Action::IfElse { node } => {
                let then = *stack.peek_operand();
                stack.push(Action::Check {
                    node: self.arena.child(node, 2),
                    goal: Goal::of(then),
                });
            }
            Action::IfDone { node, goal } => {
                let then = stack.take_operands(3).nth(1).unwrap_or(TypeIndex::UNKNOWN);
                let ty = match goal {
                    Goal::Expect(expected) => expected,
                    Goal::None => then,
                    Goal::Poisoned => TypeIndex::UNKNOWN,
                };
                self.finish(node, ty, stack);
            }
            Action::AsOperand { node, goal } => {
                let ty = stack.pop_operand();
                stack.push(Action::AsDone { node, goal, ty });
                stack.push(Action::Check {
                    node: self.arena.child(node, 1),
                    goal: Goal::of(ty),
                });
            }
            Action::AsDone { node, goal, ty } => {
                stack.discard_operands(1);
                self.expect(node, goal, ty, stack);
            }
            Action::ListRest { node } => {
                let first = *stack.peek_operand();
                let rest = &self.arena.children(node)[1..];
                trace!("check {} remaining element(s) of list {node}", rest.len());
                stack.push_in_order(rest.iter().map(|element| Action::Check {
                    node: *element,
                    goal: Goal::of(first),
                }));
            }
            Action::Collect { node, goal } => self.collect(node, goal, stack),
        }
        Ok(())
    }
}
