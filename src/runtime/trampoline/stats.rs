use std::fmt;

use serde::Serialize;

/// Counters collected over one trampoline run.
///
/// `pushed == popped + discarded` holds once a run has returned, whether it
/// produced a value or a fault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Operations pushed onto the work stack.
    pub pushed: usize,
    /// Operations popped and resolved against a result.
    pub popped: usize,
    /// Operations still pending when a fault ended the run.
    pub discarded: usize,
    /// Deepest the work stack got.
    pub max_depth: usize,
    pub opaque_calls: usize,
    pub pure_reads: usize,
    /// `Bind` operations resolved, whether by a continuation or a fixed next node.
    pub binds: usize,
}

impl RunStats {
    pub fn leaves(&self) -> usize {
        self.opaque_calls + self.pure_reads
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pushed:       {}", self.pushed)?;
        writeln!(f, "popped:       {}", self.popped)?;
        writeln!(f, "discarded:    {}", self.discarded)?;
        writeln!(f, "max depth:    {}", self.max_depth)?;
        writeln!(f, "opaque calls: {}", self.opaque_calls)?;
        writeln!(f, "pure reads:   {}", self.pure_reads)?;
        write!(f, "binds:        {}", self.binds)
    }
}
