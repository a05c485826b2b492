pub mod runtime;
pub mod workloads;


pub use runtime::{
    effect::Effect,
    fault::Fault,
    trampoline::{RunStats, Trampoline, run},
};
