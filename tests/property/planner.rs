use std::time::Duration;

use proptest::prelude::*;

use batchfleet::batch::OperationDurations;
use batchfleet::network::TargetState;
use batchfleet::planner::{OperationCosts, PlanInputs, PlannerSettings, compute_plan};
use batchfleet::substrate::OperationEffects;

fn state_strategy() -> impl Strategy<Value = TargetState> {
    (0.0f64..2000.0, 1.0f64..1000.0, 1.0f64..50.0, 0.0f64..20.0).prop_map(
        |(value, max_value, min_security, extra)| TargetState {
            value,
            max_value,
            security: min_security + extra,
            min_security,
        },
    )
}

fn inputs(state: TargetState, budget_threads: u32, growth: f64) -> PlanInputs {
    let multiplier = if state.max_value > 0.0 {
        state.max_value / state.value.max(1.0)
    } else {
        0.0
    };
    PlanInputs {
        target: "t".to_string(),
        state,
        effects: OperationEffects {
            hack_fraction_per_thread: 0.002,
            hack_security_per_thread: 0.002,
            grow_security_per_thread: 0.004,
            weaken_per_thread: 0.05,
        },
        durations: OperationDurations {
            weaken: Duration::from_millis(400),
            grow: Duration::from_millis(320),
            hack: Duration::from_millis(100),
        },
        grow_estimate: if multiplier > 1.0 {
            multiplier.ln() / growth.ln()
        } else {
            0.0
        },
        budget_threads,
        costs: OperationCosts {
            weaken: 1.75,
            grow: 1.75,
            hack: 1.7,
            designated: 1.75,
        },
    }
}

fn settings(hack_fraction: f64) -> PlannerSettings {
    PlannerSettings {
        hack_fraction,
        prepare_value_ratio: 0.9,
        safety_gap: Duration::from_millis(200),
    }
}

proptest! {
    #[test]
    fn thread_counts_are_monotonic_in_budget(
        state in state_strategy(),
        b1 in 0u32..5_000,
        extra in 0u32..5_000,
        hack_fraction in 0.01f64..0.9,
        growth in 1.001f64..1.1,
    ) {
        let b2 = b1 + extra;
        let s = settings(hack_fraction);
        let small = compute_plan(&inputs(state, b1, growth), &s);
        let large = compute_plan(&inputs(state, b2, growth), &s);

        prop_assert!(small.threads.all_le(&large.threads), "{:?} vs {:?}", small.threads, large.threads);
    }

    #[test]
    fn targets_at_or_above_max_never_grow(
        max_value in 1.0f64..1e9,
        over in 0.0f64..1e6,
        budget in 0u32..100_000,
    ) {
        let state = TargetState {
            value: max_value + over,
            max_value,
            security: 1.0,
            min_security: 1.0,
        };
        let plan = compute_plan(&inputs(state, budget, 1.003), &settings(0.1));

        prop_assert_eq!(plan.threads.grow, 0);
        prop_assert_eq!(plan.required.grow, 0);
    }

    #[test]
    fn dispatched_threads_never_exceed_requirements(
        state in state_strategy(),
        budget in 0u32..100_000,
    ) {
        let plan = compute_plan(&inputs(state, budget, 1.003), &settings(0.1));
        prop_assert!(plan.threads.all_le(&plan.required));
    }
}
