use std::any::{Any, type_name};

/// Type-erased result carried through the work stack.
///
/// The typed builders on [`Effect`](crate::runtime::effect::Effect) are the only
/// producers and consumers of these boxes, so every downcast in the runtime is
/// statically known to succeed.
pub type Value = Box<dyn Any>;

/// Payload of a `Pure` node.
///
/// A node can be run any number of times, so its value is read (cloned out)
/// rather than moved.
pub trait PureValue {
    fn read(&self) -> Value;
}

pub struct Cloned<T>(pub T);

impl<T: Clone + 'static> PureValue for Cloned<T> {
    fn read(&self) -> Value {
        Box::new(self.0.clone())
    }
}

#[inline]
pub fn box_value<T: 'static>(value: T) -> Value {
    Box::new(value)
}

/// Recovers a typed value from the work stack.
#[inline]
pub fn take<T: 'static>(value: Value) -> T {
    match value.downcast::<T>() {
        Ok(typed) => *typed,
        Err(_) => unreachable!("effect produced a value that is not `{}`", type_name::<T>()),
    }
}
