//! Loop combinators built from host loops.
//!
//! Each combinator returns a single opaque effect whose procedure loops with
//! `while`/`for` and runs its sub-effects on a trampoline it owns for the
//! duration of the loop. No effect tree grows with the iteration count.
//! A fault from any sub-effect stops the loop and is returned as-is.
use std::rc::Rc;

use crate::runtime::{effect::Effect, trampoline::Trampoline};

/// Runs `condition` until it yields `true`.
pub fn repeat_until(condition: Effect<bool>) -> Effect<()> {
    Effect::opaque(move || {
        let mut trampoline = Trampoline::new();
        while !trampoline.run(&condition)? {}
        Ok(())
    })
}

/// Runs `body` for as long as `condition` yields `true`.
pub fn while_do<B: 'static>(condition: Effect<bool>, body: Effect<B>) -> Effect<()> {
    Effect::opaque(move || {
        let mut trampoline = Trampoline::new();
        while trampoline.run(&condition)? {
            trampoline.run(&body)?;
        }
        Ok(())
    })
}

/// Runs `body(i)` for every `i` in `low..high`, in order.
pub fn for_range<B, F>(low: i64, high: i64, body: F) -> Effect<()>
where
    B: 'static,
    F: Fn(i64) -> Effect<B> + 'static,
{
    Effect::opaque(move || {
        let mut trampoline = Trampoline::new();
        for index in low..high {
            trampoline.run(&body(index))?;
        }
        Ok(())
    })
}

/// Runs `body(item)` for every item, in order.
pub fn for_each<T, B, F>(items: impl Into<Rc<[T]>>, body: F) -> Effect<()>
where
    T: Clone + 'static,
    B: 'static,
    F: Fn(T) -> Effect<B> + 'static,
{
    let items = items.into();
    Effect::opaque(move || {
        let mut trampoline = Trampoline::new();
        for item in items.iter() {
            trampoline.run(&body(item.clone()))?;
        }
        Ok(())
    })
}
