// src/fake_substrate.rs

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use batchfleet::batch::OperationDurations;
use batchfleet::errors::SubstrateError;
use batchfleet::network::{Capacity, Node, PrivilegeState, TargetState};
use batchfleet::substrate::{OperationEffects, RunHandle, RunRequest, Substrate};
use batchfleet::types::{NodeName, Operation};

/// Per-thread value multiplier used for grow estimates.
pub const FAKE_GROWTH_RATE: f64 = 1.003;

#[derive(Debug)]
struct FakeState {
    nodes: BTreeMap<NodeName, Node>,
    links: BTreeMap<NodeName, Vec<NodeName>>,
    skill: u32,
    vectors: u32,
    costs: HashMap<String, f64>,
    durations: OperationDurations,
    effects: OperationEffects,
    rejecting: HashSet<NodeName>,
    grant_limits: HashMap<NodeName, u32>,
    runs: Vec<RunRequest>,
    kills: Vec<NodeName>,
    next_pid: u64,
}

/// Deterministic in-memory substrate for tests.
///
/// - Node state never changes on its own; runs are only recorded.
/// - Every run is granted in full unless a grant limit or rejection is set
///   for the executor.
/// - Durations and effects are the same for every target.
#[derive(Debug)]
pub struct FakeSubstrate {
    state: Mutex<FakeState>,
}

impl FakeSubstrate {
    pub fn new() -> Self {
        let costs = [("weaken.js", 1.75), ("grow.js", 1.75), ("hack.js", 1.7)]
            .into_iter()
            .map(|(name, cost)| (name.to_string(), cost))
            .collect();

        Self {
            state: Mutex::new(FakeState {
                nodes: BTreeMap::new(),
                links: BTreeMap::new(),
                skill: 100,
                vectors: 0,
                costs,
                durations: OperationDurations {
                    weaken: Duration::from_millis(40),
                    grow: Duration::from_millis(32),
                    hack: Duration::from_millis(10),
                },
                effects: OperationEffects {
                    hack_fraction_per_thread: 0.002,
                    hack_security_per_thread: 0.002,
                    grow_security_per_thread: 0.004,
                    weaken_per_thread: 0.05,
                },
                rejecting: HashSet::new(),
                grant_limits: HashMap::new(),
                runs: Vec::new(),
                kills: Vec::new(),
                next_pid: 1,
            }),
        }
    }

    pub fn with_node(self, node: Node) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.links.entry(node.name.clone()).or_default();
            state.nodes.insert(node.name.clone(), node);
        }
        self
    }

    /// Undirected link; both ends are created as bare nodes if missing.
    pub fn link(self, a: &str, b: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for (from, to) in [(a, b), (b, a)] {
                state
                    .nodes
                    .entry(from.to_string())
                    .or_insert_with(|| Node::named(from));
                let list = state.links.entry(from.to_string()).or_default();
                if !list.iter().any(|n| n == to) {
                    list.push(to.to_string());
                }
            }
        }
        self
    }

    pub fn with_skill(self, skill: u32) -> Self {
        self.state.lock().unwrap().skill = skill;
        self
    }

    pub fn with_vectors(self, vectors: u32) -> Self {
        self.state.lock().unwrap().vectors = vectors;
        self
    }

    pub fn with_program_cost(self, program: &str, cost: f64) -> Self {
        self.state
            .lock()
            .unwrap()
            .costs
            .insert(program.to_string(), cost);
        self
    }

    pub fn with_durations(self, durations: OperationDurations) -> Self {
        self.state.lock().unwrap().durations = durations;
        self
    }

    pub fn with_effects(self, effects: OperationEffects) -> Self {
        self.state.lock().unwrap().effects = effects;
        self
    }

    /// Refuse every launch on `node`.
    pub fn reject_on(&self, node: &str) {
        self.state.lock().unwrap().rejecting.insert(node.to_string());
    }

    /// Grant at most `threads` per launch on `node`.
    pub fn limit_grants(&self, node: &str, threads: u32) {
        self.state
            .lock()
            .unwrap()
            .grant_limits
            .insert(node.to_string(), threads);
    }

    pub fn set_target_state(&self, node: &str, economy: TargetState) {
        if let Some(n) = self.state.lock().unwrap().nodes.get_mut(node) {
            n.economy = economy;
        }
    }

    /// Every run request received, in order.
    pub fn runs(&self) -> Vec<RunRequest> {
        self.state.lock().unwrap().runs.clone()
    }

    /// Run requests sent to `node`.
    pub fn runs_on(&self, node: &str) -> Vec<RunRequest> {
        self.runs().into_iter().filter(|r| r.node == node).collect()
    }

    /// Nodes passed to `kill_all`, in order.
    pub fn kills(&self) -> Vec<NodeName> {
        self.state.lock().unwrap().kills.clone()
    }
}

impl Default for FakeSubstrate {
    fn default() -> Self {
        Self::new()
    }
}

impl Substrate for FakeSubstrate {
    fn neighbors(&self, node: &str) -> Vec<NodeName> {
        self.state
            .lock()
            .unwrap()
            .links
            .get(node)
            .cloned()
            .unwrap_or_default()
    }

    fn describe(&self, node: &str) -> Option<Node> {
        self.state.lock().unwrap().nodes.get(node).cloned()
    }

    fn capacity(&self, node: &str) -> Option<Capacity> {
        self.describe(node).map(|n| n.capacity)
    }

    fn target_state(&self, node: &str) -> Option<TargetState> {
        self.describe(node).map(|n| n.economy)
    }

    fn privilege_state(&self, node: &str) -> Option<PrivilegeState> {
        self.describe(node).map(|n| n.privilege)
    }

    fn skill_level(&self) -> u32 {
        self.state.lock().unwrap().skill
    }

    fn available_vectors(&self) -> u32 {
        self.state.lock().unwrap().vectors
    }

    fn operation_cost(&self, program: &str) -> Option<f64> {
        self.state.lock().unwrap().costs.get(program).copied()
    }

    fn operation_duration(&self, op: Operation, node: &str) -> Option<Duration> {
        let state = self.state.lock().unwrap();
        state.nodes.get(node)?;
        Some(state.durations.of(op))
    }

    fn operation_effects(&self, node: &str) -> Option<OperationEffects> {
        let state = self.state.lock().unwrap();
        state.nodes.get(node)?;
        Some(state.effects)
    }

    fn grow_threads_for(&self, node: &str, multiplier: f64) -> Option<f64> {
        self.state.lock().unwrap().nodes.get(node)?;
        if multiplier <= 1.0 {
            return Some(0.0);
        }
        Some(multiplier.ln() / FAKE_GROWTH_RATE.ln())
    }

    fn run(&self, request: &RunRequest) -> Result<RunHandle, SubstrateError> {
        let mut state = self.state.lock().unwrap();
        state.runs.push(request.clone());

        if !state.costs.contains_key(&request.program) {
            return Err(SubstrateError::UnknownProgram(request.program.clone()));
        }
        if state.rejecting.contains(&request.node) {
            return Err(SubstrateError::Rejected {
                program: request.program.clone(),
                node: request.node.clone(),
                reason: "rejected by test".to_string(),
            });
        }

        let granted = match state.grant_limits.get(&request.node) {
            Some(limit) => request.threads.min(*limit),
            None => request.threads,
        };

        let pid = state.next_pid;
        state.next_pid += 1;
        Ok(RunHandle {
            pid,
            threads: granted,
        })
    }

    fn kill_all(&self, node: &str) {
        self.state.lock().unwrap().kills.push(node.to_string());
    }
}
