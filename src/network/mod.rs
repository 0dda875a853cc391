// src/network/mod.rs

//! Network discovery.
//!
//! - [`node`] holds the node snapshot types.
//! - [`graph`] walks the network from the root and records discovery paths.
//! - [`eligibility`] decides which nodes are targets and which are executors.

pub mod eligibility;
pub mod graph;
pub mod node;

pub use eligibility::{NodeStatus, classify, is_executor, is_targetable};
pub use graph::{DiscoveryPath, NetworkGraph};
pub use node::{Capacity, Node, PrivilegeState, TargetState};
