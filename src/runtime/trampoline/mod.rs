//! Stack-safe evaluation of effect trees.
//!
//! The interpreter never recurses. Composite nodes are unwound onto an explicit
//! work stack of `Operation`s, the leaf at the bottom is resolved, and the
//! stack is drained against that result until an operation hands back a new
//! node to descend into (the argument of an `Apply`, or the node returned by a
//! `Bind` continuation).
//!
//! Resolving a `Bind` pops its entry before descending into the continuation's
//! node, so a chain of sequential binds runs in constant work-stack depth no
//! matter how many steps it executes. Only the static nesting of a single
//! node (how deeply `map`/`apply_with`/`and_then` were stacked at build time)
//! shows up as stack depth.
use std::rc::Rc;

use crate::runtime::{
    effect::{Effect, Node, NodeKind, Sequel},
    fault::Fault,
    value::{Value, take},
};

mod operation;
mod stats;
mod trace;

use operation::Operation;
use trace::Transition;

pub use stats::RunStats;

/// Interpreter state for one run at a time.
///
/// The work stack and counters belong to this value alone; a `Trampoline`
/// can be reused, and every call to [`Trampoline::run`] starts from an empty
/// stack and fresh [`RunStats`].
pub struct Trampoline {
    operations: Vec<Operation>,
    trace: bool,
    stats: RunStats,
}

impl Default for Trampoline {
    fn default() -> Self {
        Self::new()
    }
}

impl Trampoline {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
            trace: false,
            stats: RunStats::default(),
        }
    }

    /// Pre-sizes the work stack for effects with deep static nesting.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            operations: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Emits a `trace`-level log record for every interpreter transition.
    pub fn set_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    /// Counters from the most recent run.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Operations currently on the work stack. Zero whenever `run` has
    /// returned.
    pub fn depth(&self) -> usize {
        self.operations.len()
    }

    /// Evaluates `effect` to completion.
    ///
    /// A fault returned by any opaque step ends the run immediately: pending
    /// operations are discarded without being resolved and the fault is
    /// returned unchanged. Panics from transforms or continuations unwind
    /// through here untouched.
    pub fn run<A: 'static>(&mut self, effect: &Effect<A>) -> Result<A, Fault> {
        self.operations.clear();
        self.stats = RunStats::default();

        let outcome = self.run_inner(Rc::clone(effect.node()));
        if let Err(fault) = &outcome {
            self.stats.discarded = self.operations.len();
            self.operations.clear();
            log::debug!(
                "trampoline run faulted: {} ({} pending operations discarded)",
                fault,
                self.stats.discarded
            );
        } else {
            log::debug!(
                "trampoline run finished: {} leaves, {} binds, max depth {}",
                self.stats.leaves(),
                self.stats.binds,
                self.stats.max_depth
            );
        }
        outcome.map(take::<A>)
    }

    fn run_inner(&mut self, node: Rc<Node>) -> Result<Value, Fault> {
        let mut current = node;

        loop {
            let mut result = loop {
                let next = match &*current {
                    Node::Map { transform, source } => {
                        self.push(Operation::Map(Rc::clone(transform)));
                        Rc::clone(source)
                    }
                    Node::Apply {
                        apply,
                        function,
                        argument,
                    } => {
                        self.push(Operation::ApplyPending {
                            apply: Rc::clone(apply),
                            argument: Rc::clone(argument),
                        });
                        Rc::clone(function)
                    }
                    Node::Bind { sequel, source } => {
                        self.push(Operation::Bind(sequel.clone()));
                        Rc::clone(source)
                    }
                    Node::Pure(value) => {
                        self.stats.pure_reads += 1;
                        if self.trace {
                            self.trace_transition(Transition::Leaf(NodeKind::Pure));
                        }
                        break value.read();
                    }
                    Node::Opaque(procedure) => {
                        self.stats.opaque_calls += 1;
                        if self.trace {
                            self.trace_transition(Transition::Leaf(NodeKind::Opaque));
                        }
                        break procedure()?;
                    }
                };
                current = next;
            };

            loop {
                let Some(operation) = self.pop() else {
                    return Ok(result);
                };
                match operation {
                    Operation::Map(transform) => {
                        result = transform(result);
                    }
                    Operation::ApplyReady { apply, function } => {
                        result = apply(function, result);
                    }
                    Operation::ApplyPending { apply, argument } => {
                        self.push(Operation::ApplyReady {
                            apply,
                            function: result,
                        });
                        current = argument;
                        break;
                    }
                    Operation::Bind(sequel) => {
                        self.stats.binds += 1;
                        current = match sequel {
                            Sequel::Continuation(continuation) => continuation(result),
                            Sequel::Next(next) => next,
                        };
                        break;
                    }
                }
            }
        }
    }

    #[inline(always)]
    fn push(&mut self, operation: Operation) {
        let kind = operation.kind();
        self.operations.push(operation);
        self.stats.pushed += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.operations.len());
        if self.trace {
            self.trace_transition(Transition::Push(kind));
        }
    }

    #[inline(always)]
    fn pop(&mut self) -> Option<Operation> {
        let operation = self.operations.pop()?;
        self.stats.popped += 1;
        if self.trace {
            self.trace_transition(Transition::Resolve(operation.kind()));
        }
        Some(operation)
    }
}

/// Evaluates `effect` on a fresh [`Trampoline`].
pub fn run<A: 'static>(effect: &Effect<A>) -> Result<A, Fault> {
    Trampoline::new().run(effect)
}
