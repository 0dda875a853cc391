// src/planner/ranker.rs

use tracing::trace;

use crate::network::Node;
use crate::planner::plan::clamp_threads;
use crate::substrate::Substrate;
use crate::types::Operation;

/// A candidate target together with its estimated extraction rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTarget {
    pub node: Node,
    /// Estimated value extracted per millisecond of cycle time.
    pub rate: f64,
}

/// Scores targets by estimated extraction rate.
pub struct TargetRanker<'a> {
    substrate: &'a dyn Substrate,
    fraction: f64,
}

impl<'a> TargetRanker<'a> {
    /// `fraction` is the share of current value a single cycle is assumed
    /// to extract.
    pub fn new(substrate: &'a dyn Substrate, fraction: f64) -> Self {
        Self {
            substrate,
            fraction,
        }
    }

    /// Value extracted per cycle divided by cycle duration (in ms).
    ///
    /// Returns 0 when the node cannot sustain a cycle: no value, no hack
    /// effect, or an extraction that would leave nothing to grow back from.
    pub fn score(&self, node: &Node) -> f64 {
        let state = &node.economy;
        if state.max_value <= 0.0 || state.value <= 0.0 {
            return 0.0;
        }

        let Some(effects) = self.substrate.operation_effects(&node.name) else {
            return 0.0;
        };
        let per_thread = effects.hack_fraction_per_thread;
        if per_thread <= 0.0 {
            return 0.0;
        }

        let threads = clamp_threads((self.fraction / per_thread).ceil());
        if threads == 0 {
            return 0.0;
        }

        let extracted = (per_thread * threads as f64).min(1.0) * state.value;
        let remaining = state.value - extracted;
        if remaining <= 0.0 || state.max_value / remaining < 1.0 {
            return 0.0;
        }

        let cycle = Operation::ALL
            .iter()
            .filter_map(|op| self.substrate.operation_duration(*op, &node.name))
            .max()
            .unwrap_or_default();
        let cycle_ms = (cycle.as_secs_f64() * 1000.0).max(1.0);

        let rate = extracted / cycle_ms;
        trace!(node = %node.name, rate, threads, "scored target");
        rate
    }

    /// Score and order nodes ascending by rate; the best target is last.
    ///
    /// The sort is stable, so equal rates keep discovery order.
    pub fn rank(&self, nodes: Vec<Node>) -> Vec<RankedTarget> {
        let mut ranked: Vec<RankedTarget> = nodes
            .into_iter()
            .map(|node| {
                let rate = self.score(&node);
                RankedTarget { node, rate }
            })
            .collect();
        ranked.sort_by(|a, b| a.rate.total_cmp(&b.rate));
        ranked
    }
}
