// src/planner/mod.rs

//! Target ranking and per-target thread planning.
//!
//! - [`ranker`] estimates extraction rate and orders targets.
//! - [`capacity`] turns a target's state and a thread budget into an
//!   [`OperationPlan`].
//! - [`plan`] holds the plan value types.

pub mod capacity;
pub mod plan;
pub mod ranker;

pub use capacity::{CapacityPlanner, PlanInputs, PlannerSettings, compute_plan, restore_multiplier};
pub use plan::{Feasibility, OperationCosts, OperationPlan, ThreadCounts};
pub use ranker::{RankedTarget, TargetRanker};
