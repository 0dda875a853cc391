use std::collections::HashSet;

use proptest::prelude::*;

use batchfleet::fleet::{AllocationSettings, FleetAllocator};
use batchfleet::planner::RankedTarget;
use batchfleet_test_utils::NodeBuilder;

fn allocator() -> FleetAllocator {
    FleetAllocator::new(AllocationSettings {
        root: "n0".to_string(),
        home_margin: 0.9,
        designated_cost: 1.75,
    })
}

proptest! {
    #[test]
    fn no_node_or_target_is_used_twice(
        capacities in proptest::collection::vec(0.0f64..64.0, 0..12),
        target_ids in proptest::collection::vec(0usize..8, 0..12),
    ) {
        let nodes: Vec<_> = capacities
            .iter()
            .enumerate()
            .map(|(i, ram)| NodeBuilder::executor(&format!("n{}", i % 6), *ram).build())
            .collect();
        let ranked: Vec<_> = target_ids
            .iter()
            .enumerate()
            .map(|(i, id)| RankedTarget {
                node: NodeBuilder::target(&format!("t{id}"), 10.0, 10.0).build(),
                rate: i as f64,
            })
            .collect();

        let report = allocator().allocate(ranked.clone(), nodes.clone());

        let executors: HashSet<_> = report.assignments.iter().map(|a| &a.executor).collect();
        let targets: HashSet<_> = report.assignments.iter().map(|a| &a.target).collect();
        prop_assert_eq!(executors.len(), report.assignments.len());
        prop_assert_eq!(targets.len(), report.assignments.len());
        prop_assert!(report.assignments.iter().all(|a| a.budget_threads > 0));

        let again = allocator().allocate(ranked, nodes);
        prop_assert_eq!(report, again);
    }
}
