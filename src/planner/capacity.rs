// src/planner/capacity.rs

//! Thread planning for one target under a thread budget.

use std::time::Duration;

use tracing::{debug, warn};

use crate::batch::phase::BatchPhase;
use crate::batch::timing::{BatchTiming, OperationDurations};
use crate::config::ConfigFile;
use crate::errors::{FleetError, Result};
use crate::network::{Node, TargetState};
use crate::planner::plan::{
    Feasibility, OperationCosts, OperationPlan, ThreadCounts, clamp_threads,
};
use crate::substrate::{OperationEffects, Substrate};
use crate::types::Operation;

/// Tunables of the planning algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerSettings {
    /// Fraction of the target's value each hack phase aims to extract.
    pub hack_fraction: f64,
    /// Hack is planned only once `value >= prepare_value_ratio * max_value`.
    pub prepare_value_ratio: f64,
    /// Minimum spacing between completions.
    pub safety_gap: Duration,
}

impl PlannerSettings {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            hack_fraction: cfg.planner.hack_fraction,
            prepare_value_ratio: cfg.planner.prepare_value_ratio,
            safety_gap: cfg.scheduler.safety_gap,
        }
    }
}

/// Everything the planning math needs, already read from the substrate.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInputs {
    pub target: String,
    pub state: TargetState,
    pub effects: OperationEffects,
    pub durations: OperationDurations,
    /// Grow threads needed to bring the current value back to max, as
    /// estimated by the substrate.
    pub grow_estimate: f64,
    pub budget_threads: u32,
    pub costs: OperationCosts,
}

/// Multiplier needed to restore `state` to its max value. A zero value is
/// treated as 1.
pub fn restore_multiplier(state: &TargetState) -> f64 {
    if state.max_value <= 0.0 {
        return 0.0;
    }
    state.max_value / state.value.max(1.0)
}

fn threads_to_cover(amount: f64, per_thread: f64) -> u32 {
    if amount <= 0.0 || per_thread <= 0.0 || !per_thread.is_finite() {
        return 0;
    }
    clamp_threads((amount / per_thread).ceil())
}

/// Compute an [`OperationPlan`] from already-gathered inputs.
///
/// - hack: `ceil(hack_fraction / fraction_per_thread)` once the target is
///   prepared, else 0.
/// - weaken: current excess security plus the increase the hack threads add.
/// - grow: threads to restore the current value to max; 0 at or above max.
/// - grow_weaken: offsets the security increase of the grow threads.
///
/// Each count is capped independently by what the budget affords for that
/// operation. Capping is a degraded but valid outcome; a phase whose need is
/// non-zero but whose count is capped to zero makes the plan infeasible.
pub fn compute_plan(inputs: &PlanInputs, settings: &PlannerSettings) -> OperationPlan {
    let state = &inputs.state;
    let effects = &inputs.effects;
    let budget = inputs.budget_threads;
    let cap = |op: Operation| inputs.costs.cap_for(op, budget);

    let prepared =
        state.max_value > 0.0 && state.value >= state.max_value * settings.prepare_value_ratio;
    let hack_required = if prepared && effects.hack_fraction_per_thread > 0.0 {
        clamp_threads((settings.hack_fraction / effects.hack_fraction_per_thread).ceil())
    } else {
        0
    };
    let hack = hack_required.min(cap(Operation::Hack));

    let weaken_need =
        state.excess_security() + hack as f64 * effects.hack_security_per_thread.max(0.0);
    let weaken_required = threads_to_cover(weaken_need, effects.weaken_per_thread);
    let weaken = weaken_required.min(cap(Operation::Weaken));

    let grow_required = if restore_multiplier(state) > 1.0 {
        clamp_threads(inputs.grow_estimate.ceil()).max(1)
    } else {
        0
    };
    let grow = grow_required.min(cap(Operation::Grow));

    let grow_weaken_need = grow as f64 * effects.grow_security_per_thread.max(0.0);
    let grow_weaken_required = threads_to_cover(grow_weaken_need, effects.weaken_per_thread);
    let grow_weaken = grow_weaken_required.min(cap(Operation::Weaken));

    let required = ThreadCounts {
        weaken: weaken_required,
        grow: grow_required,
        grow_weaken: grow_weaken_required,
        hack: hack_required,
    };
    let threads = ThreadCounts {
        weaken,
        grow,
        grow_weaken,
        hack,
    };

    let feasibility = feasibility_of(state, &required, &threads);
    let timing = BatchTiming::compute(&inputs.durations, settings.safety_gap);

    OperationPlan {
        target: inputs.target.clone(),
        threads,
        required,
        durations: inputs.durations,
        timing,
        feasibility,
    }
}

fn feasibility_of(state: &TargetState, required: &ThreadCounts, threads: &ThreadCounts) -> Feasibility {
    // Security above minimum must be worked off even when no per-thread
    // weaken effect is known.
    if state.excess_security() > 0.0 && threads.weaken == 0 {
        return Feasibility::Infeasible {
            phase: BatchPhase::Weaken1,
        };
    }

    for phase in BatchPhase::CYCLE {
        if required.for_phase(phase) > 0 && threads.for_phase(phase) == 0 {
            return Feasibility::Infeasible { phase };
        }
    }
    Feasibility::Feasible
}

/// Plans batches by reading target state from a substrate.
pub struct CapacityPlanner<'a> {
    substrate: &'a dyn Substrate,
    settings: PlannerSettings,
}

impl<'a> CapacityPlanner<'a> {
    pub fn new(substrate: &'a dyn Substrate, settings: PlannerSettings) -> Self {
        Self {
            substrate,
            settings,
        }
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Plan one cycle against `target` with `budget_threads` threads of the
    /// designated program available.
    ///
    /// Errors only when the substrate cannot describe the target. An
    /// infeasible plan is still returned; callers check
    /// [`OperationPlan::ensure_dispatchable`].
    pub fn plan(
        &self,
        target: &Node,
        budget_threads: u32,
        costs: &OperationCosts,
    ) -> Result<OperationPlan> {
        let inputs = self.gather(target, budget_threads, costs)?;
        let plan = compute_plan(&inputs, &self.settings);

        match plan.feasibility {
            Feasibility::Feasible if plan.is_degraded() => {
                debug!(
                    target = %plan.target,
                    budget_threads,
                    required = ?plan.required,
                    threads = ?plan.threads,
                    "plan capped by budget"
                );
            }
            Feasibility::Feasible => {}
            Feasibility::Infeasible { phase } => {
                warn!(
                    target = %plan.target,
                    budget_threads,
                    phase = %phase,
                    "plan infeasible under budget"
                );
            }
        }

        Ok(plan)
    }

    fn gather(&self, target: &Node, budget_threads: u32, costs: &OperationCosts) -> Result<PlanInputs> {
        let name = target.name.as_str();
        let unknown = || FleetError::UnknownNode(target.name.clone());

        let state = self.substrate.target_state(name).unwrap_or(target.economy);
        let effects = self.substrate.operation_effects(name).ok_or_else(unknown)?;
        let durations = OperationDurations {
            weaken: self
                .substrate
                .operation_duration(Operation::Weaken, name)
                .ok_or_else(unknown)?,
            grow: self
                .substrate
                .operation_duration(Operation::Grow, name)
                .ok_or_else(unknown)?,
            hack: self
                .substrate
                .operation_duration(Operation::Hack, name)
                .ok_or_else(unknown)?,
        };

        let multiplier = restore_multiplier(&state);
        let grow_estimate = if multiplier > 1.0 {
            self.substrate
                .grow_threads_for(name, multiplier)
                .ok_or_else(unknown)?
        } else {
            0.0
        };

        Ok(PlanInputs {
            target: target.name.clone(),
            state,
            effects,
            durations,
            grow_estimate,
            budget_threads,
            costs: *costs,
        })
    }
}
