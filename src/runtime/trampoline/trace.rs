use std::fmt;

use crate::runtime::effect::NodeKind;

use super::{
    Trampoline,
    operation::{Operation, OperationKind},
};

/// Entries from the top of the work stack listed on each trace line.
const TRACE_STACK_WINDOW: usize = 4;

/// One step of the interpreter loop, as reported by `--trace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Transition {
    /// An operation went onto the work stack.
    Push(OperationKind),
    /// A leaf produced the current result.
    Leaf(NodeKind),
    /// An operation was popped and combined with the current result.
    Resolve(OperationKind),
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Push(kind) => write!(f, "push {}", kind),
            Transition::Leaf(kind) => write!(f, "leaf {}", kind),
            Transition::Resolve(kind) => write!(f, "resolve {}", kind),
        }
    }
}

impl Trampoline {
    pub(super) fn trace_transition(&self, transition: Transition) {
        log::trace!("{}", render_transition(transition, &self.operations));
    }
}

pub(super) fn render_transition(transition: Transition, stack: &[Operation]) -> String {
    format!(
        "{} depth={} stack: [{}]",
        transition,
        stack.len(),
        render_stack(stack)
    )
}

fn render_stack(stack: &[Operation]) -> String {
    let shown = &stack[stack.len().saturating_sub(TRACE_STACK_WINDOW)..];
    let items: Vec<String> = shown.iter().map(|op| op.kind().to_string()).collect();
    if shown.len() < stack.len() {
        format!("... {}", items.join(", "))
    } else {
        items.join(", ")
    }
}
