//! Effect representation and its stack-safe interpreter.
//!
//! # No-Cycle Invariant
//! Effect nodes are immutable `Rc` trees. A node may be shared by several
//! parents, but no node can reach itself: continuations build *new* nodes when
//! they run instead of pointing back at existing ones. Recursive loops such as
//! `fn forever() -> Effect<_> { step().and_then(|_| forever()) }` therefore
//! allocate one fresh node per iteration and free it once it has been
//! descended into.
//!
//! # No Memoization
//! Nothing caches the result of a node. Running a shared node twice performs
//! its side effects twice.
pub mod effect;
pub mod fault;
pub mod loops;
pub mod trampoline;
pub mod uncurried;
pub(crate) mod value;
