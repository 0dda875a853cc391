// src/fleet/allocator.rs

use std::collections::HashSet;

use tracing::{debug, info};

use crate::network::Node;
use crate::planner::RankedTarget;
use crate::types::NodeName;

/// One executor node working one target.
///
/// The plan itself is not stored here: the dispatch loop recomputes it at
/// the start of every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub executor: NodeName,
    pub target: NodeName,
    /// Threads of the designated program the executor could host at
    /// allocation time.
    pub budget_threads: u32,
}

/// Knobs the allocator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationSettings {
    /// Root node; its budget is scaled by `home_margin`.
    pub root: NodeName,
    pub home_margin: f64,
    /// Per-thread cost of the designated program.
    pub designated_cost: f64,
}

/// Which side ran out first during matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exhaustion {
    /// Every target found a node; these nodes were left without work.
    TargetsExhausted { idle_nodes: Vec<NodeName> },
    /// Fleet capacity ran out; these targets are unassigned.
    NodesExhausted { unmatched_targets: Vec<NodeName> },
}

/// Outcome of one `allocate` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationReport {
    pub assignments: Vec<Assignment>,
    /// Nodes skipped because they could not host a single thread.
    pub skipped_nodes: Vec<NodeName>,
    /// Nodes that had capacity but no target left.
    pub idle_nodes: Vec<NodeName>,
    /// Targets left over, best first.
    pub unmatched_targets: Vec<NodeName>,
}

impl AllocationReport {
    /// `None` when both sides were used up exactly.
    pub fn exhaustion(&self) -> Option<Exhaustion> {
        if !self.unmatched_targets.is_empty() {
            Some(Exhaustion::NodesExhausted {
                unmatched_targets: self.unmatched_targets.clone(),
            })
        } else if !self.idle_nodes.is_empty() {
            Some(Exhaustion::TargetsExhausted {
                idle_nodes: self.idle_nodes.clone(),
            })
        } else {
            None
        }
    }
}

/// Greedy one-to-one matching of ranked targets to executor nodes.
#[derive(Debug, Clone)]
pub struct FleetAllocator {
    settings: AllocationSettings,
}

impl FleetAllocator {
    pub fn new(settings: AllocationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AllocationSettings {
        &self.settings
    }

    /// Threads of the designated program `node` can host, after the root's
    /// safety margin.
    pub fn budget_for(&self, node: &Node) -> u32 {
        let threads = node.capacity.threads_for(self.settings.designated_cost);
        if node.name == self.settings.root {
            (threads as f64 * self.settings.home_margin).floor() as u32
        } else {
            threads
        }
    }

    /// Match `ranked` (ascending by rate, best last) to `candidates`.
    ///
    /// Candidates are visited by descending available capacity. Each one
    /// takes the best remaining target; nodes that cannot host a thread are
    /// skipped without consuming a target. Matching stops when either side
    /// runs out. Deterministic for equal inputs.
    pub fn allocate(
        &self,
        mut ranked: Vec<RankedTarget>,
        mut candidates: Vec<Node>,
    ) -> AllocationReport {
        candidates.sort_by(|a, b| b.capacity.available().total_cmp(&a.capacity.available()));

        let mut report = AllocationReport::default();
        let mut used_nodes: HashSet<NodeName> = HashSet::new();
        let mut used_targets: HashSet<NodeName> = HashSet::new();

        for node in candidates {
            if !used_nodes.insert(node.name.clone()) {
                debug!(node = %node.name, "duplicate candidate node; ignoring");
                continue;
            }

            let budget = self.budget_for(&node);
            if budget == 0 {
                info!(node = %node.name, "cannot run on node: 0 threads available");
                report.skipped_nodes.push(node.name);
                continue;
            }

            let target = loop {
                match ranked.pop() {
                    Some(t) if used_targets.contains(&t.node.name) => continue,
                    other => break other,
                }
            };

            let Some(target) = target else {
                report.idle_nodes.push(node.name);
                continue;
            };

            used_targets.insert(target.node.name.clone());
            info!(
                executor = %node.name,
                target = %target.node.name,
                budget_threads = budget,
                rate = target.rate,
                "assigning target to node"
            );
            report.assignments.push(Assignment {
                executor: node.name,
                target: target.node.name,
                budget_threads: budget,
            });
        }

        report.unmatched_targets = ranked
            .into_iter()
            .rev()
            .map(|t| t.node.name)
            .filter(|name| !used_targets.contains(name))
            .collect();

        match report.exhaustion() {
            Some(Exhaustion::NodesExhausted { ref unmatched_targets }) => {
                info!(remaining = ?unmatched_targets, "fleet capacity exhausted; targets still remaining");
            }
            Some(Exhaustion::TargetsExhausted { ref idle_nodes }) => {
                info!(idle = ?idle_nodes, "ran out of targets; nodes left idle");
            }
            None => {}
        }

        report
    }
}
