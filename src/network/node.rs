// src/network/node.rs

//! Snapshot types describing a single compute node.

use crate::types::NodeName;

/// Resource capacity of a node, in the substrate's resource units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Capacity {
    pub total: f64,
    pub used: f64,
}

impl Capacity {
    pub fn new(total: f64, used: f64) -> Self {
        Self { total, used }
    }

    /// Capacity not currently in use. Never negative.
    pub fn available(&self) -> f64 {
        (self.total - self.used).max(0.0)
    }

    /// How many threads of a program costing `per_thread` units fit.
    pub fn threads_for(&self, per_thread: f64) -> u32 {
        if per_thread <= 0.0 || !per_thread.is_finite() {
            return 0;
        }
        let threads = (self.available() / per_thread).floor();
        if threads >= u32::MAX as f64 {
            u32::MAX
        } else {
            threads as u32
        }
    }
}

/// Administrative state of a node, owned by the privilege-escalation
/// collaborator; the scheduler only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrivilegeState {
    pub has_admin: bool,
    pub open_vectors: u32,
    pub required_vectors: u32,
}

/// Economic state of a node seen as a target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetState {
    pub value: f64,
    pub max_value: f64,
    pub security: f64,
    pub min_security: f64,
}

impl TargetState {
    /// Security above the minimum. Never negative.
    pub fn excess_security(&self) -> f64 {
        (self.security - self.min_security).max(0.0)
    }

    pub fn is_at_max_value(&self) -> bool {
        self.value >= self.max_value
    }
}

/// A compute node as last described by the substrate.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: NodeName,
    pub capacity: Capacity,
    pub privilege: PrivilegeState,
    pub economy: TargetState,
    /// Minimum operator skill level needed to operate against this node.
    pub required_skill: u32,
    /// Purchased / fleet-owned node. Never a target.
    pub owned: bool,
    /// Backdoor installed; the node may host fleet programs.
    pub backdoor: bool,
}

impl Node {
    /// A bare node with no capacity and no economic value.
    pub fn named(name: impl Into<NodeName>) -> Self {
        Self {
            name: name.into(),
            capacity: Capacity::default(),
            privilege: PrivilegeState::default(),
            economy: TargetState::default(),
            required_skill: 0,
            owned: false,
            backdoor: false,
        }
    }
}
