// src/substrate/backend.rs

//! The boundary between the scheduler core and the execution substrate.
//!
//! The substrate owns everything the scheduler treats as opaque: network
//! adjacency, node state, per-thread program costs, operation durations and
//! effect curves, and actually running programs. Production code plugs in a
//! real backend; the binary ships [`SimulatedSubstrate`](super::SimulatedSubstrate)
//! and tests use a deterministic fake.

use std::time::Duration;

use crate::errors::SubstrateError;
use crate::network::{Capacity, Node, PrivilegeState, TargetState};
use crate::types::{NodeName, Operation};

/// Per-thread effect coefficients of the three operations against a target.
///
/// All values are for the target's current state; they drift as the target
/// changes and are re-read every planning pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationEffects {
    /// Fraction of current value one hack thread extracts.
    pub hack_fraction_per_thread: f64,
    /// Security increase caused by one hack thread.
    pub hack_security_per_thread: f64,
    /// Security increase caused by one grow thread.
    pub grow_security_per_thread: f64,
    /// Security decrease caused by one weaken thread.
    pub weaken_per_thread: f64,
}

/// A request to start `threads` threads of `program` on `node`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub program: String,
    pub node: NodeName,
    pub threads: u32,
    pub args: Vec<String>,
}

/// Handle for a started program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunHandle {
    pub pid: u64,
    /// Threads actually placed; may be lower than requested.
    pub threads: u32,
}

/// Capabilities the scheduler core needs from the outside world.
///
/// Queries return `None` for nodes the substrate does not know about.
/// `run` is fire-and-forget: the handle only confirms placement, completion
/// is never reported back.
pub trait Substrate: Send + Sync {
    /// Names of nodes directly connected to `node`.
    fn neighbors(&self, node: &str) -> Vec<NodeName>;

    /// Full snapshot of `node`.
    fn describe(&self, node: &str) -> Option<Node>;

    /// Resource capacity of `node`.
    fn capacity(&self, node: &str) -> Option<Capacity>;

    /// Economic state of `node`.
    fn target_state(&self, node: &str) -> Option<TargetState>;

    /// Administrative state of `node`.
    fn privilege_state(&self, node: &str) -> Option<PrivilegeState>;

    /// The operator's current skill level.
    fn skill_level(&self) -> u32;

    /// Number of access vectors the operator is able to open.
    fn available_vectors(&self) -> u32;

    /// Per-thread resource cost of `program`.
    fn operation_cost(&self, program: &str) -> Option<f64>;

    /// How long `op` takes against `node` in its current state.
    fn operation_duration(&self, op: Operation, node: &str) -> Option<Duration>;

    /// Per-thread effect coefficients against `node`.
    fn operation_effects(&self, node: &str) -> Option<OperationEffects>;

    /// Grow threads needed to multiply `node`'s current value by `multiplier`.
    fn grow_threads_for(&self, node: &str, multiplier: f64) -> Option<f64>;

    /// Start a program. Returns an error if nothing could be started at all.
    fn run(&self, request: &RunRequest) -> Result<RunHandle, SubstrateError>;

    /// Stop every fleet program running on `node`.
    fn kill_all(&self, node: &str);
}
