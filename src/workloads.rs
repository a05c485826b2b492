//! Reference workloads shared by the `tramp` binary and the benchmarks.
//!
//! Every workload counts up to `steps` through a different composition shape
//! and yields the final count, so a correct run always returns `steps`. The
//! counter is reset at the start of each run, which keeps a built workload
//! reusable across iterations.
use std::{cell::Cell, fmt, rc::Rc, str::FromStr};

use serde::Serialize;

use crate::runtime::{
    effect::Effect,
    loops::{for_range, repeat_until},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Workload {
    /// `step.and_then(|_| loop)`, built lazily one iteration at a time.
    BindLoop,
    /// `steps` maps stacked on one opaque step.
    MapChain,
    /// `steps` nested `apply_with` nodes around one opaque step.
    ApplyChain,
    /// A host `for` loop over `0..steps`.
    ForRange,
    /// A host loop re-running a condition until it holds.
    RepeatUntil,
}

impl Workload {
    pub const ALL: [Workload; 5] = [
        Workload::BindLoop,
        Workload::MapChain,
        Workload::ApplyChain,
        Workload::ForRange,
        Workload::RepeatUntil,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Workload::BindLoop => "bind-loop",
            Workload::MapChain => "map-chain",
            Workload::ApplyChain => "apply-chain",
            Workload::ForRange => "for-range",
            Workload::RepeatUntil => "repeat-until",
        }
    }

    /// Whether the static nesting of the built effect grows with `steps`.
    pub fn nests_statically(self) -> bool {
        matches!(self, Workload::MapChain | Workload::ApplyChain)
    }

    pub fn build(self, steps: u64) -> Effect<u64> {
        let counter = Rc::new(Cell::new(0u64));
        let body = match self {
            Workload::BindLoop => bind_loop(Rc::clone(&counter), steps),
            Workload::MapChain => map_chain(&counter, steps),
            Workload::ApplyChain => apply_chain(&counter, steps),
            Workload::ForRange => {
                let step = increment(&counter);
                let high = i64::try_from(steps).unwrap_or(i64::MAX);
                for_range(0, high, move |_| step.clone()).then(read(&counter))
            }
            Workload::RepeatUntil => {
                if steps == 0 {
                    read(&counter)
                } else {
                    let condition = increment(&counter).map(move |n| n >= steps);
                    repeat_until(condition).then(read(&counter))
                }
            }
        };
        reset(&counter).then(body)
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Workload {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Workload::ALL
            .into_iter()
            .find(|workload| workload.name() == name)
            .ok_or_else(|| format!("unknown workload: {}", name))
    }
}

fn reset(counter: &Rc<Cell<u64>>) -> Effect<()> {
    let counter = Rc::clone(counter);
    Effect::opaque(move || {
        counter.set(0);
        Ok(())
    })
}

fn increment(counter: &Rc<Cell<u64>>) -> Effect<u64> {
    let counter = Rc::clone(counter);
    Effect::opaque(move || {
        counter.set(counter.get() + 1);
        Ok(counter.get())
    })
}

fn read(counter: &Rc<Cell<u64>>) -> Effect<u64> {
    let counter = Rc::clone(counter);
    Effect::opaque(move || Ok(counter.get()))
}

fn bind_loop(counter: Rc<Cell<u64>>, steps: u64) -> Effect<u64> {
    if steps == 0 {
        return read(&counter);
    }
    increment(&counter).and_then(move |n| {
        if n >= steps {
            Effect::lift(n)
        } else {
            bind_loop(Rc::clone(&counter), steps)
        }
    })
}

fn map_chain(counter: &Rc<Cell<u64>>, steps: u64) -> Effect<u64> {
    let mut effect = read(counter);
    for _ in 0..steps {
        effect = effect.map(|n| n + 1);
    }
    effect
}

fn apply_chain(counter: &Rc<Cell<u64>>, steps: u64) -> Effect<u64> {
    let mut effect = read(counter);
    for _ in 0..steps {
        effect = Effect::apply_with(Effect::lift(|n: u64| n + 1), effect);
    }
    effect
}
