// src/fleet/pass.rs

//! One full planning pass: discover, rank, allocate.

use tracing::{debug, info};

use crate::config::{ConfigFile, ProgramsSection};
use crate::errors::{FleetError, Result};
use crate::fleet::allocator::{AllocationReport, AllocationSettings, FleetAllocator};
use crate::network::{DiscoveryPath, NetworkGraph, Node, is_executor, is_targetable};
use crate::planner::{OperationCosts, TargetRanker};
use crate::substrate::Substrate;
use crate::types::Operation;

/// Result of [`run_allocation_pass`].
#[derive(Debug, Clone)]
pub struct AllocationPass {
    pub report: AllocationReport,
    /// Routes to every node visited during discovery.
    pub paths: DiscoveryPath,
    /// Targets considered, ascending by rate.
    pub ranked: Vec<(String, f64)>,
    /// Executor candidates considered, root included if configured.
    pub executors: Vec<String>,
    pub costs: OperationCosts,
}

/// Per-thread costs of the configured programs.
pub fn operation_costs(substrate: &dyn Substrate, programs: &ProgramsSection) -> Result<OperationCosts> {
    let cost_of = |program: &str| {
        substrate
            .operation_cost(program)
            .filter(|c| *c > 0.0)
            .ok_or_else(|| FleetError::ConfigError(format!("unknown program or zero cost: '{program}'")))
    };

    Ok(OperationCosts {
        weaken: cost_of(programs.program_for(Operation::Weaken))?,
        grow: cost_of(programs.program_for(Operation::Grow))?,
        hack: cost_of(programs.program_for(Operation::Hack))?,
        designated: cost_of(programs.designated())?,
    })
}

/// Discover the network from the configured root, rank targets, and match
/// them to executors.
///
/// `home_margin` overrides the configured margin so the control plane can
/// lower it at runtime.
pub fn run_allocation_pass(
    substrate: &dyn Substrate,
    cfg: &ConfigFile,
    home_margin: f64,
) -> Result<AllocationPass> {
    let costs = operation_costs(substrate, &cfg.programs)?;
    let skill = substrate.skill_level();

    let mut graph = NetworkGraph::new(substrate, cfg.scheduler.root.clone());
    let discovered = graph.discover(|node| is_targetable(node, skill) || is_executor(node));

    let (mut executors, mut targets): (Vec<Node>, Vec<Node>) = (Vec::new(), Vec::new());
    for node in discovered {
        if is_executor(&node) {
            executors.push(node.clone());
        }
        if is_targetable(&node, skill) {
            targets.push(node);
        }
    }

    if cfg.scheduler.include_root {
        match graph.root_node() {
            Some(root) => executors.push(root),
            None => debug!(root = %cfg.scheduler.root, "root node has no description; not used as executor"),
        }
    }

    info!(
        visited = graph.paths().len(),
        targets = targets.len(),
        executors = executors.len(),
        "discovery complete"
    );

    let ranked = TargetRanker::new(substrate, cfg.planner.rank_fraction).rank(targets);
    let ranked_view = ranked.iter().map(|t| (t.node.name.clone(), t.rate)).collect();
    let executor_names = executors.iter().map(|n| n.name.clone()).collect();

    let allocator = FleetAllocator::new(AllocationSettings {
        root: cfg.scheduler.root.clone(),
        home_margin,
        designated_cost: costs.designated,
    });
    let report = allocator.allocate(ranked, executors);

    Ok(AllocationPass {
        report,
        paths: graph.paths().clone(),
        ranked: ranked_view,
        executors: executor_names,
        costs,
    })
}
