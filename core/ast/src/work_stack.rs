//! Work-stack scheduler.
//!
//! Every tree algorithm in Cairn (building the arena from raw syntax, printing,
//! rendering types, type checking) runs as a loop over an explicit, heap-resident
//! stack of pending actions instead of recursive calls. Traversal depth is bounded
//! by available memory, not by the host call stack.
//!
//! A traversal typically has two kinds of actions:
//!
//! - a *descend* action visits a node. For a compound node it pushes a *combine*
//!   action for the same node and, above it, descend actions for the node's children.
//! - a *combine* action runs once all of the children's actions have run. Each child
//!   leaves exactly one value on the operand stack; the combine action takes them
//!   with [`WorkStack::take_operands`] in left-to-right order.
//!
//! ```
//! use cairn_ast::work_stack::{Traversal, WorkStack, run};
//!
//! // Sums a tiny tree encoded as (value, children) without recursion.
//! struct Sum<'a>(&'a [(u32, &'a [usize])]);
//!
//! enum Action {
//!     Visit(usize),
//!     Add(usize),
//! }
//!
//! impl Traversal for Sum<'_> {
//!     type Action = Action;
//!     type Value = u32;
//!     type Error = std::convert::Infallible;
//!
//!     fn step(&mut self, action: Action, stack: &mut WorkStack<Action, u32>) -> Result<(), Self::Error> {
//!         match action {
//!             Action::Visit(i) => {
//!                 let children = self.0[i].1.iter().map(|c| Action::Visit(*c));
//!                 stack.push_postorder(Action::Add(i), children);
//!             }
//!             Action::Add(i) => {
//!                 let count = self.0[i].1.len();
//!                 let total: u32 = stack.take_operands(count).sum();
//!                 stack.push_operand(self.0[i].0 + total);
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let tree: &[(u32, &[usize])] = &[(1, &[1, 2]), (2, &[]), (3, &[])];
//! let result = run(&mut Sum(tree), Action::Visit(0)).unwrap();
//! assert_eq!(result, vec![6]);
//! ```

use std::vec::Drain;

/// Pending actions plus the operand stack their combine actions communicate through.
///
/// Both stacks are plain `Vec`s, so growth is amortized doubling and the total cost
/// of a traversal stays linear in the number of actions.
#[derive(Debug)]
pub struct WorkStack<A, V> {
    actions: Vec<A>,
    operands: Vec<V>,
}

impl<A, V> Default for WorkStack<A, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, V> WorkStack<A, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            operands: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_root(action: A) -> Self {
        let mut stack = Self::new();
        stack.push(action);
        stack
    }

    pub fn push(&mut self, action: A) {
        self.actions.push(action);
    }

    /// Pushes `actions` so that they are popped in iteration order.
    pub fn push_in_order<I>(&mut self, actions: I)
    where
        I: IntoIterator<Item = A>,
        I::IntoIter: DoubleEndedIterator,
    {
        for action in actions.into_iter().rev() {
            self.actions.push(action);
        }
    }

    /// Schedules `combine` to run after every action of `children`, which run left
    /// to right.
    pub fn push_postorder<I>(&mut self, combine: A, children: I)
    where
        I: IntoIterator<Item = A>,
        I::IntoIter: DoubleEndedIterator,
    {
        self.actions.push(combine);
        self.push_in_order(children);
    }

    pub fn pop(&mut self) -> Option<A> {
        self.actions.pop()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.actions.len()
    }

    pub fn push_operand(&mut self, value: V) {
        self.operands.push(value);
    }

    /// # Panics
    ///
    /// Panics if the operand stack is empty: a combine action ran before the action
    /// that should have produced its operand.
    pub fn pop_operand(&mut self) -> V {
        self.operands
            .pop()
            .expect("combine action ran before its operand was produced")
    }

    /// # Panics
    ///
    /// Panics if the operand stack is empty.
    #[must_use]
    pub fn peek_operand(&self) -> &V {
        self.operands
            .last()
            .expect("combine action ran before its operand was produced")
    }

    /// Removes the top `count` operands and yields them in left-to-right order,
    /// i.e. the order their producing actions were scheduled in.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `count` operands are available.
    pub fn take_operands(&mut self, count: usize) -> Drain<'_, V> {
        let len = self.operands.len();
        assert!(
            count <= len,
            "combine action expected {count} operands, found {len}"
        );
        self.operands.drain(len - count..)
    }

    /// Drops the top `count` operands.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `count` operands are available.
    pub fn discard_operands(&mut self, count: usize) {
        let len = self.operands.len();
        assert!(
            count <= len,
            "combine action expected {count} operands, found {len}"
        );
        self.operands.truncate(len - count);
    }

    #[must_use]
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Consumes the stack once every action has run and returns what is left on the
    /// operand stack.
    ///
    /// # Panics
    ///
    /// Panics if actions are still pending.
    #[must_use]
    pub fn into_operands(self) -> Vec<V> {
        assert!(
            self.actions.is_empty(),
            "{} actions still pending",
            self.actions.len()
        );
        self.operands
    }
}

/// A tree algorithm expressed as a single-action step function.
pub trait Traversal {
    type Action;
    type Value;
    type Error;

    /// Performs one action. The action may push further actions and operands.
    ///
    /// # Errors
    ///
    /// A traversal may abort by returning an error; the remaining actions are dropped.
    fn step(
        &mut self,
        action: Self::Action,
        stack: &mut WorkStack<Self::Action, Self::Value>,
    ) -> Result<(), Self::Error>;
}

/// Runs `traversal` from `root` until no action is left and returns the operand
/// stack.
///
/// # Errors
///
/// Returns the first error produced by [`Traversal::step`].
pub fn run<T: Traversal>(traversal: &mut T, root: T::Action) -> Result<Vec<T::Value>, T::Error> {
    let mut stack = WorkStack::with_root(root);
    run_on(traversal, &mut stack)?;
    Ok(stack.into_operands())
}

/// Drains `stack`, one action per iteration.
///
/// # Errors
///
/// Returns the first error produced by [`Traversal::step`].
pub fn run_on<T: Traversal>(
    traversal: &mut T,
    stack: &mut WorkStack<T::Action, T::Value>,
) -> Result<(), T::Error> {
    while let Some(action) = stack.pop() {
        traversal.step(action, stack)?;
    }
    Ok(())
}
