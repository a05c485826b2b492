use std::{fmt, rc::Rc};

use crate::runtime::{
    effect::{Applier, Node, Sequel, Transform},
    value::Value,
};

/// Pending work recorded while descending into a composite node.
pub(super) enum Operation {
    Map(Transform),
    Bind(Sequel),
    /// The function side of an `Apply` is being evaluated; `argument` runs next.
    ApplyPending { apply: Applier, argument: Rc<Node> },
    /// Both sides are known except the argument result.
    ApplyReady { apply: Applier, function: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum OperationKind {
    Map,
    Bind,
    ApplyPending,
    ApplyReady,
}

impl Operation {
    pub(super) fn kind(&self) -> OperationKind {
        match self {
            Operation::Map(_) => OperationKind::Map,
            Operation::Bind(_) => OperationKind::Bind,
            Operation::ApplyPending { .. } => OperationKind::ApplyPending,
            Operation::ApplyReady { .. } => OperationKind::ApplyReady,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
