// src/batch/phase.rs

use std::fmt;

use crate::types::Operation;

/// Position within a batch cycle.
///
/// Phases are issued in this strict order, and the next cycle always starts
/// again at [`BatchPhase::Weaken1`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchPhase {
    /// Normalise security before anything else lands.
    Weaken1,
    /// Restore value.
    Grow,
    /// Offset the security increase caused by grow.
    Weaken2,
    /// Extract value.
    Hack,
}

impl BatchPhase {
    /// All phases in issue order.
    pub const CYCLE: [BatchPhase; 4] = [
        BatchPhase::Weaken1,
        BatchPhase::Grow,
        BatchPhase::Weaken2,
        BatchPhase::Hack,
    ];

    /// Phase every cycle (including a cold start) begins with.
    pub fn initial() -> Self {
        BatchPhase::Weaken1
    }

    /// Following phase; `Hack` wraps around to `Weaken1`.
    pub fn next(self) -> Self {
        match self {
            BatchPhase::Weaken1 => BatchPhase::Grow,
            BatchPhase::Grow => BatchPhase::Weaken2,
            BatchPhase::Weaken2 => BatchPhase::Hack,
            BatchPhase::Hack => BatchPhase::Weaken1,
        }
    }

    /// Remote operation issued in this phase.
    pub fn operation(self) -> Operation {
        match self {
            BatchPhase::Weaken1 | BatchPhase::Weaken2 => Operation::Weaken,
            BatchPhase::Grow => Operation::Grow,
            BatchPhase::Hack => Operation::Hack,
        }
    }

    /// Zero-based position in [`BatchPhase::CYCLE`].
    pub fn index(self) -> usize {
        match self {
            BatchPhase::Weaken1 => 0,
            BatchPhase::Grow => 1,
            BatchPhase::Weaken2 => 2,
            BatchPhase::Hack => 3,
        }
    }
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchPhase::Weaken1 => "weaken1",
            BatchPhase::Grow => "grow",
            BatchPhase::Weaken2 => "weaken2",
            BatchPhase::Hack => "hack",
        };
        f.write_str(s)
    }
}
