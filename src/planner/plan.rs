// src/planner/plan.rs

use crate::batch::phase::BatchPhase;
use crate::batch::timing::{BatchTiming, OperationDurations};
use crate::errors::{FleetError, Result};
use crate::types::{NodeName, Operation};

/// Thread counts for the four phases of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThreadCounts {
    pub weaken: u32,
    pub grow: u32,
    pub grow_weaken: u32,
    pub hack: u32,
}

impl ThreadCounts {
    pub fn for_phase(&self, phase: BatchPhase) -> u32 {
        match phase {
            BatchPhase::Weaken1 => self.weaken,
            BatchPhase::Grow => self.grow,
            BatchPhase::Weaken2 => self.grow_weaken,
            BatchPhase::Hack => self.hack,
        }
    }

    pub fn total(&self) -> u64 {
        self.weaken as u64 + self.grow as u64 + self.grow_weaken as u64 + self.hack as u64
    }

    /// Component-wise `<=`.
    pub fn all_le(&self, other: &ThreadCounts) -> bool {
        self.weaken <= other.weaken
            && self.grow <= other.grow
            && self.grow_weaken <= other.grow_weaken
            && self.hack <= other.hack
    }
}

/// Whether a plan may be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feasibility {
    Feasible,
    /// A phase with a non-zero need was left with zero threads.
    Infeasible { phase: BatchPhase },
}

/// Immutable plan for one batch cycle against one target.
///
/// Built fresh at the start of every cycle and discarded at its end.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationPlan {
    pub target: NodeName,
    /// Threads to dispatch, after budget caps.
    pub threads: ThreadCounts,
    /// Threads the target's state calls for, before budget caps.
    pub required: ThreadCounts,
    pub durations: OperationDurations,
    /// Inter-operation delays.
    pub timing: BatchTiming,
    pub feasibility: Feasibility,
}

impl OperationPlan {
    pub fn is_feasible(&self) -> bool {
        self.feasibility == Feasibility::Feasible
    }

    /// Whether any phase was capped below its requirement.
    pub fn is_degraded(&self) -> bool {
        self.threads != self.required
    }

    pub fn threads_for(&self, phase: BatchPhase) -> u32 {
        self.threads.for_phase(phase)
    }

    /// `Ok(())` for feasible plans, `PlanningInfeasible` otherwise.
    pub fn ensure_dispatchable(&self) -> Result<()> {
        match self.feasibility {
            Feasibility::Feasible => Ok(()),
            Feasibility::Infeasible { phase } => Err(FleetError::PlanningInfeasible {
                target: self.target.clone(),
                operation: phase.operation(),
            }),
        }
    }
}

/// Per-thread resource cost of each program, plus the designated program
/// that thread budgets are expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationCosts {
    pub weaken: f64,
    pub grow: f64,
    pub hack: f64,
    pub designated: f64,
}

impl OperationCosts {
    pub fn of(&self, op: Operation) -> f64 {
        match op {
            Operation::Weaken => self.weaken,
            Operation::Grow => self.grow,
            Operation::Hack => self.hack,
        }
    }

    /// Threads of `op` that fit in `budget_threads` designated-program
    /// threads.
    pub fn cap_for(&self, op: Operation, budget_threads: u32) -> u32 {
        let cost = self.of(op);
        if cost <= 0.0 || !cost.is_finite() {
            return budget_threads;
        }
        let units = budget_threads as f64 * self.designated;
        clamp_threads((units / cost).floor())
    }
}

/// Convert a non-negative thread estimate to `u32`; negative, NaN and
/// sub-one values become 0.
pub fn clamp_threads(x: f64) -> u32 {
    if !x.is_finite() {
        if x == f64::INFINITY {
            return u32::MAX;
        }
        return 0;
    }
    if x <= 0.0 {
        0
    } else if x >= u32::MAX as f64 {
        u32::MAX
    } else {
        x as u32
    }
}
