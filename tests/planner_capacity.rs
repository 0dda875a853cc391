// tests/planner_capacity.rs

mod common;
use crate::common::{FakeSubstrate, NodeBuilder, init_tracing};

use std::time::Duration;

use batchfleet::batch::{BatchPhase, OperationDurations};
use batchfleet::errors::FleetError;
use batchfleet::network::TargetState;
use batchfleet::planner::plan::clamp_threads;
use batchfleet::planner::{
    CapacityPlanner, Feasibility, OperationCosts, PlanInputs, PlannerSettings, ThreadCounts,
    compute_plan, restore_multiplier,
};
use batchfleet::substrate::OperationEffects;
use batchfleet::types::Operation;

/// Powers of two keep every division below exact.
fn settings() -> PlannerSettings {
    PlannerSettings {
        hack_fraction: 0.5,
        prepare_value_ratio: 0.9,
        safety_gap: Duration::from_millis(10),
    }
}

fn unit_costs() -> OperationCosts {
    OperationCosts {
        weaken: 1.0,
        grow: 1.0,
        hack: 1.0,
        designated: 1.0,
    }
}

fn inputs(state: TargetState, grow_estimate: f64, budget_threads: u32) -> PlanInputs {
    PlanInputs {
        target: "t".to_string(),
        state,
        effects: OperationEffects {
            hack_fraction_per_thread: 0.125,
            hack_security_per_thread: 0.5,
            grow_security_per_thread: 0.25,
            weaken_per_thread: 0.25,
        },
        durations: OperationDurations {
            weaken: Duration::from_millis(40),
            grow: Duration::from_millis(32),
            hack: Duration::from_millis(10),
        },
        grow_estimate,
        budget_threads,
        costs: unit_costs(),
    }
}

fn at_max() -> TargetState {
    TargetState {
        value: 1000.0,
        max_value: 1000.0,
        security: 1.0,
        min_security: 1.0,
    }
}

#[test]
fn prepared_target_at_max_plans_hack_and_its_weaken_only() {
    let plan = compute_plan(&inputs(at_max(), 0.0, 1000), &settings());

    // hack: 0.5 / 0.125 = 4; weaken: 4 * 0.5 / 0.25 = 8.
    assert_eq!(
        plan.threads,
        ThreadCounts {
            weaken: 8,
            grow: 0,
            grow_weaken: 0,
            hack: 4,
        }
    );
    assert!(plan.is_feasible());
    assert!(!plan.is_degraded());
    assert!(plan.ensure_dispatchable().is_ok());
}

#[test]
fn value_above_max_never_plans_grow() {
    let mut state = at_max();
    state.value = 1500.0;

    assert!(restore_multiplier(&state) < 1.0);
    let plan = compute_plan(&inputs(state, 0.0, 1000), &settings());
    assert_eq!(plan.threads.grow, 0);
    assert_eq!(plan.threads.grow_weaken, 0);
}

#[test]
fn zero_value_is_treated_as_one_for_the_multiplier() {
    let state = TargetState {
        value: 0.0,
        max_value: 1000.0,
        security: 1.0,
        min_security: 1.0,
    };
    assert_eq!(restore_multiplier(&state), 1000.0);

    let zero_max = TargetState {
        max_value: 0.0,
        ..state
    };
    assert_eq!(restore_multiplier(&zero_max), 0.0);
}

#[test]
fn unprepared_target_gets_a_preparation_cycle_without_hack() {
    let state = TargetState {
        value: 100.0,
        max_value: 1000.0,
        security: 1.0,
        min_security: 1.0,
    };
    let plan = compute_plan(&inputs(state, 12.5, 1000), &settings());

    assert_eq!(plan.threads.hack, 0);
    assert_eq!(plan.threads.weaken, 0);
    assert_eq!(plan.threads.grow, 13);
    // 13 * 0.25 / 0.25
    assert_eq!(plan.threads.grow_weaken, 13);
    assert!(plan.is_feasible());
}

#[test]
fn excess_security_is_worked_off_before_anything_else() {
    let state = TargetState {
        security: 3.0,
        ..at_max()
    };
    let plan = compute_plan(&inputs(state, 0.0, 1000), &settings());

    // (2.0 + 4 * 0.5) / 0.25
    assert_eq!(plan.threads.weaken, 16);
}

#[test]
fn budget_caps_each_operation_independently() {
    let plan = compute_plan(&inputs(at_max(), 0.0, 3), &settings());

    assert_eq!(plan.required.hack, 4);
    assert_eq!(plan.threads.hack, 3);
    assert_eq!(plan.required.weaken, 6);
    assert_eq!(plan.threads.weaken, 3);
    assert!(plan.is_feasible());
    assert!(plan.is_degraded());
}

#[test]
fn cheaper_operations_fit_more_threads_per_budget_thread() {
    let mut i = inputs(at_max(), 0.0, 2);
    i.costs = OperationCosts {
        weaken: 1.0,
        grow: 1.0,
        hack: 0.5,
        designated: 1.0,
    };
    assert_eq!(i.costs.cap_for(Operation::Hack, 2), 4);
    assert_eq!(i.costs.cap_for(Operation::Weaken, 2), 2);

    let plan = compute_plan(&i, &settings());
    assert_eq!(plan.threads.hack, 4);
}

#[test]
fn zero_budget_makes_the_plan_infeasible() {
    let plan = compute_plan(&inputs(at_max(), 0.0, 0), &settings());

    // Weaken is sized from the capped hack count, so only hack is left
    // with an unmet need.
    assert_eq!(plan.required.weaken, 0);
    assert_eq!(
        plan.feasibility,
        Feasibility::Infeasible {
            phase: BatchPhase::Hack
        }
    );
    match plan.ensure_dispatchable() {
        Err(FleetError::PlanningInfeasible { target, operation }) => {
            assert_eq!(target, "t");
            assert_eq!(operation, Operation::Hack);
        }
        other => panic!("expected PlanningInfeasible, got {other:?}"),
    }
}

#[test]
fn excess_security_without_weaken_effect_is_infeasible() {
    let state = TargetState {
        security: 5.0,
        ..at_max()
    };
    let mut i = inputs(state, 0.0, 1000);
    i.effects.weaken_per_thread = 0.0;

    let plan = compute_plan(&i, &settings());
    assert!(!plan.is_feasible());
}

#[test]
fn clamp_threads_never_goes_negative() {
    assert_eq!(clamp_threads(-3.0), 0);
    assert_eq!(clamp_threads(f64::NAN), 0);
    assert_eq!(clamp_threads(0.7), 0);
    assert_eq!(clamp_threads(7.9), 7);
    assert_eq!(clamp_threads(f64::INFINITY), u32::MAX);
}

#[test]
fn planner_handles_a_drained_target_with_finite_positive_grow() {
    init_tracing();
    let substrate = FakeSubstrate::new().with_node(NodeBuilder::target("t", 0.0, 1000.0).build());
    let target = substrate_node(&substrate, "t");
    let costs = OperationCosts {
        weaken: 1.75,
        grow: 1.75,
        hack: 1.7,
        designated: 1.75,
    };

    let planner = CapacityPlanner::new(
        &substrate,
        PlannerSettings {
            hack_fraction: 0.1,
            prepare_value_ratio: 0.9,
            safety_gap: Duration::from_millis(10),
        },
    );
    let plan = planner.plan(&target, 100_000, &costs).unwrap();

    assert!(plan.threads.grow > 0);
    assert!(plan.threads.grow < u32::MAX);
    assert_eq!(plan.threads.hack, 0);
    assert!(plan.is_feasible());
}

#[test]
fn planner_reports_unknown_targets() {
    init_tracing();
    let substrate = FakeSubstrate::new();
    let ghost = NodeBuilder::target("ghost", 10.0, 100.0).build();
    let planner = CapacityPlanner::new(&substrate, settings());

    let err = planner.plan(&ghost, 10, &unit_costs()).unwrap_err();
    assert!(matches!(err, FleetError::UnknownNode(name) if name == "ghost"));
}

fn substrate_node(substrate: &FakeSubstrate, name: &str) -> batchfleet::network::Node {
    use batchfleet::substrate::Substrate;
    substrate.describe(name).unwrap()
}
