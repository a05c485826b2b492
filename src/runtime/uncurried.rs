//! Adapters between multi-argument foreign procedures and effect-returning
//! functions.
//!
//! `mk_effect_fnN` turns `Fn(A1, .., An) -> Effect<R>` into a procedure that
//! runs the effect immediately and returns its result, for callers that do
//! not know about effects. `run_effect_fnN` goes the other way: it defers a
//! foreign `Fn(A1, .., An) -> Result<R, Fault>` behind an opaque effect, which
//! calls it with fresh clones of the arguments every time the effect runs.
use std::rc::Rc;

use crate::runtime::{effect::Effect, fault::Fault};

macro_rules! effect_fn {
    ($mk:ident, $run:ident; $($arg:ident: $ty:ident),+) => {
        pub fn $mk<$($ty,)+ R, F>(f: F) -> impl Fn($($ty),+) -> Result<R, Fault>
        where
            R: 'static,
            F: Fn($($ty),+) -> Effect<R>,
        {
            move |$($arg: $ty),+| f($($arg),+).invoke()
        }

        pub fn $run<$($ty,)+ R, F>(f: F) -> impl Fn($($ty),+) -> Effect<R>
        where
            $($ty: Clone + 'static,)+
            R: 'static,
            F: Fn($($ty),+) -> Result<R, Fault> + 'static,
        {
            let f = Rc::new(f);
            move |$($arg: $ty),+| {
                let f = Rc::clone(&f);
                Effect::opaque(move || f($($arg.clone()),+))
            }
        }
    };
}

effect_fn!(mk_effect_fn1, run_effect_fn1; a: A);
effect_fn!(mk_effect_fn2, run_effect_fn2; a: A, b: B);
effect_fn!(mk_effect_fn3, run_effect_fn3; a: A, b: B, c: C);
effect_fn!(mk_effect_fn4, run_effect_fn4; a: A, b: B, c: C, d: D);
effect_fn!(mk_effect_fn5, run_effect_fn5; a: A, b: B, c: C, d: D, e: E);
effect_fn!(mk_effect_fn6, run_effect_fn6; a: A, b: B, c: C, d: D, e: E, g: G);
effect_fn!(mk_effect_fn7, run_effect_fn7; a: A, b: B, c: C, d: D, e: E, g: G, h: H);
effect_fn!(mk_effect_fn8, run_effect_fn8; a: A, b: B, c: C, d: D, e: E, g: G, h: H, i: I);
effect_fn!(mk_effect_fn9, run_effect_fn9; a: A, b: B, c: C, d: D, e: E, g: G, h: H, i: I, j: J);
effect_fn!(
    mk_effect_fn10, run_effect_fn10;
    a: A, b: B, c: C, d: D, e: E, g: G, h: H, i: I, j: J, k: K
);
