use std::{fmt, marker::PhantomData, rc::Rc};

use crate::runtime::{
    fault::Fault,
    trampoline,
    value::{Cloned, PureValue, Value, box_value, take},
};

pub(crate) type Procedure = Rc<dyn Fn() -> Result<Value, Fault>>;
pub(crate) type Transform = Rc<dyn Fn(Value) -> Value>;
pub(crate) type Applier = Rc<dyn Fn(Value, Value) -> Value>;
pub(crate) type Continuation = Rc<dyn Fn(Value) -> Rc<Node>>;

/// What a `Bind` evaluates once its source has produced a result.
#[derive(Clone)]
pub(crate) enum Sequel {
    /// Picks the next node from the source's result.
    Continuation(Continuation),
    /// A node fixed at build time; the source's result is dropped.
    Next(Rc<Node>),
}

/// Type-erased effect tree walked by the trampoline.
///
/// Nodes are immutable once built and may be shared between parents; a shared
/// node is executed once per path that reaches it.
pub(crate) enum Node {
    Opaque(Procedure),
    Pure(Rc<dyn PureValue>),
    Map {
        transform: Transform,
        source: Rc<Node>,
    },
    /// `function` is always evaluated before `argument`.
    Apply {
        apply: Applier,
        function: Rc<Node>,
        argument: Rc<Node>,
    },
    Bind {
        sequel: Sequel,
        source: Rc<Node>,
    },
}

/// Variant tag of an effect node, readable without running anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Opaque,
    Pure,
    Map,
    Apply,
    Bind,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Node {
    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Node::Opaque(_) => NodeKind::Opaque,
            Node::Pure(_) => NodeKind::Pure,
            Node::Map { .. } => NodeKind::Map,
            Node::Apply { .. } => NodeKind::Apply,
            Node::Bind { .. } => NodeKind::Bind,
        }
    }

    fn detach_children(&mut self, into: &mut Vec<Rc<Node>>) {
        match self {
            Node::Map { source, .. } => detach(source, into),
            Node::Bind { sequel, source } => {
                detach(source, into);
                if let Sequel::Next(next) = sequel {
                    detach(next, into);
                }
            }
            Node::Apply {
                function, argument, ..
            } => {
                detach(function, into);
                detach(argument, into);
            }
            Node::Opaque(_) | Node::Pure(_) => {}
        }
    }
}

thread_local! {
    static DETACHED: Rc<Node> = Rc::new(Node::Pure(Rc::new(Cloned(()))));
}

fn detach(link: &mut Rc<Node>, into: &mut Vec<Rc<Node>>) {
    let child = DETACHED
        .try_with(|detached| {
            if Rc::ptr_eq(link, detached) {
                None
            } else {
                Some(std::mem::replace(link, Rc::clone(detached)))
            }
        })
        .ok()
        .flatten();
    if let Some(child) = child {
        into.push(child);
    }
}

// Builder nesting can be arbitrarily deep (a left-folded chain of a million
// `and_then`s, or a right-folded chain of `then`s, is a million nodes tall),
// so children are released from an explicit list instead of through recursive
// drop glue.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(child) = pending.pop() {
            if let Ok(mut node) = Rc::try_unwrap(child) {
                node.detach_children(&mut pending);
            }
        }
    }
}

/// A deferred, synchronous computation producing an `A`.
///
/// An `Effect` is both a description the [`Trampoline`](trampoline::Trampoline)
/// can inspect without executing, and a zero-argument procedure: calling
/// [`Effect::invoke`] runs it to completion. Building an effect never performs
/// side effects; running it performs all of them, every time.
///
/// ```
/// use tramp::runtime::effect::Effect;
///
/// let program = Effect::lift(20)
///     .map(|x| x * 2)
///     .and_then(|x| Effect::lift(x + 2));
///
/// assert_eq!(program.invoke(), Ok(42));
/// ```
pub struct Effect<A> {
    node: Rc<Node>,
    _result: PhantomData<fn() -> A>,
}

impl<A> Clone for Effect<A> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
            _result: PhantomData,
        }
    }
}

impl<A> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("kind", &self.node.kind())
            .finish()
    }
}

impl<A> Effect<A> {
    fn from_node(node: Node) -> Self {
        Self {
            node: Rc::new(node),
            _result: PhantomData,
        }
    }

    pub(crate) fn node(&self) -> &Rc<Node> {
        &self.node
    }

    pub(crate) fn into_node(self) -> Rc<Node> {
        self.node
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }
}

impl<A: 'static> Effect<A> {
    /// Wraps a primitive side-effecting step. The procedure runs each time the
    /// effect is evaluated.
    pub fn opaque<F>(procedure: F) -> Self
    where
        F: Fn() -> Result<A, Fault> + 'static,
    {
        Self::from_node(Node::Opaque(Rc::new(move || procedure().map(box_value))))
    }

    pub fn lift(value: A) -> Self
    where
        A: Clone,
    {
        Self::from_node(Node::Pure(Rc::new(Cloned(value))))
    }

    /// An effect that raises `fault` when evaluated.
    pub fn fail(fault: impl Into<Fault>) -> Self {
        let fault = fault.into();
        Self::opaque(move || Err(fault.clone()))
    }

    pub fn map<B, F>(self, transform: F) -> Effect<B>
    where
        B: 'static,
        F: Fn(A) -> B + 'static,
    {
        Effect::from_node(Node::Map {
            transform: Rc::new(move |value: Value| {
                box_value(transform(take::<A>(value)))
            }),
            source: self.node,
        })
    }

    /// Applies the result of `function` to the result of `argument`.
    ///
    /// Side effects of `function` always happen before those of `argument`.
    /// Callers depend on this order; do not swap it.
    pub fn apply_with<B, F>(function: Effect<F>, argument: Effect<B>) -> Self
    where
        B: 'static,
        F: FnOnce(B) -> A + 'static,
    {
        Self::from_node(Node::Apply {
            apply: Rc::new(|function: Value, argument: Value| {
                box_value(take::<F>(function)(take::<B>(argument)))
            }),
            function: function.node,
            argument: argument.node,
        })
    }

    /// Sequences `self` with a continuation that picks the next effect from
    /// its result. The continuation is not called until the effect runs.
    pub fn and_then<B, F>(self, continuation: F) -> Effect<B>
    where
        B: 'static,
        F: Fn(A) -> Effect<B> + 'static,
    {
        Effect::from_node(Node::Bind {
            sequel: Sequel::Continuation(Rc::new(move |value: Value| {
                continuation(take::<A>(value)).into_node()
            })),
            source: self.node,
        })
    }

    /// Runs `self`, discards its result, then runs `next`.
    pub fn then<B: 'static>(self, next: Effect<B>) -> Effect<B> {
        Effect::from_node(Node::Bind {
            sequel: Sequel::Next(next.node),
            source: self.node,
        })
    }

    pub fn void(self) -> Effect<()> {
        self.map(|_| ())
    }

    /// Runs the effect on a fresh trampoline.
    pub fn invoke(&self) -> Result<A, Fault> {
        trampoline::run(self)
    }

    /// Converts the effect into a plain procedure for callers that only know
    /// how to call things.
    pub fn into_procedure(self) -> impl Fn() -> Result<A, Fault> {
        move || self.invoke()
    }
}
