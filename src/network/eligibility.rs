// src/network/eligibility.rs

//! Classification of discovered nodes into targets and executors.

use crate::network::node::Node;

/// How a node relates to the fleet as a potential target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Administrative control is held; the node can be targeted now.
    Targetable,
    /// Enough access vectors are available to gain control, but the
    /// privilege-escalation step has not run yet.
    Crackable,
    /// Owned by the fleet, valueless, above the skill level, or locked.
    Unreachable,
}

/// Classify `node` given the operator's skill level and the number of access
/// vectors the operator could open.
pub fn classify(node: &Node, skill: u32, available_vectors: u32) -> NodeStatus {
    if node.owned || node.economy.max_value <= 0.0 || skill < node.required_skill {
        return NodeStatus::Unreachable;
    }
    if node.privilege.has_admin {
        return NodeStatus::Targetable;
    }
    let openable = node.privilege.open_vectors.max(available_vectors);
    if openable >= node.privilege.required_vectors {
        NodeStatus::Crackable
    } else {
        NodeStatus::Unreachable
    }
}

/// Whether `node` can be targeted by a dispatch loop right now.
pub fn is_targetable(node: &Node, skill: u32) -> bool {
    classify(node, skill, 0) == NodeStatus::Targetable
}

/// Whether `node` may host fleet programs (excluding the root, which the
/// caller adds explicitly).
pub fn is_executor(node: &Node) -> bool {
    node.backdoor || node.owned
}
