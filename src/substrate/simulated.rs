// src/substrate/simulated.rs

//! In-memory substrate driven by a [`World`].
//!
//! Programs occupy capacity from launch until their operation's duration has
//! elapsed; the operation's effect is applied to the target at that moment.
//! Effect and duration curves are simple approximations controlled by
//! [`WorldTuning`](super::world::WorldTuning).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{debug, trace};

use crate::errors::SubstrateError;
use crate::network::{Capacity, Node, PrivilegeState, TargetState};
use crate::substrate::backend::{OperationEffects, RunHandle, RunRequest, Substrate};
use crate::substrate::world::{SimNode, World};
use crate::types::{NodeName, Operation};

#[derive(Debug)]
struct Job {
    node: NodeName,
    reserved: f64,
    abort: Option<AbortHandle>,
}

#[derive(Debug)]
struct SimState {
    world: World,
    next_pid: u64,
    jobs: HashMap<u64, Job>,
    extracted: f64,
}

/// Substrate backed by an in-memory world model.
#[derive(Debug, Clone)]
pub struct SimulatedSubstrate {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedSubstrate {
    pub fn new(world: World) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                world,
                next_pid: 1,
                jobs: HashMap::new(),
                extracted: 0.0,
            })),
        }
    }

    /// Total value extracted by completed hack operations so far.
    pub fn extracted(&self) -> f64 {
        self.lock().extracted
    }

    /// Number of programs currently holding capacity.
    pub fn running_jobs(&self) -> usize {
        self.lock().jobs.len()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_node<T>(&self, node: &str, f: impl FnOnce(&SimState, &SimNode) -> T) -> Option<T> {
        let state = self.lock();
        let sim = state.world.nodes.get(node)?;
        Some(f(&state, sim))
    }
}

fn hack_duration(sim: &SimNode) -> Duration {
    let spec = &sim.spec;
    let factor = spec.security.max(1.0) / spec.min_security.max(1.0);
    sim.base_time.mul_f64(factor.max(1.0))
}

fn duration_of(state: &SimState, sim: &SimNode, op: Operation) -> Duration {
    let hack = hack_duration(sim);
    match op {
        Operation::Hack => hack,
        Operation::Grow => hack.mul_f64(state.world.tuning.grow_ratio.max(0.0)),
        Operation::Weaken => hack.mul_f64(state.world.tuning.weaken_ratio.max(0.0)),
    }
}

fn effects_of(state: &SimState, sim: &SimNode) -> OperationEffects {
    let tuning = &state.world.tuning;
    let security_factor = ((100.0 - sim.spec.security) / 100.0).clamp(0.0, 1.0);
    OperationEffects {
        hack_fraction_per_thread: tuning.hack_fraction_per_thread * security_factor,
        hack_security_per_thread: tuning.hack_security_per_thread,
        grow_security_per_thread: tuning.grow_security_per_thread,
        weaken_per_thread: tuning.weaken_per_thread,
    }
}

fn node_of(sim: &SimNode) -> Node {
    let spec = &sim.spec;
    Node {
        name: spec.name.clone(),
        capacity: Capacity::new(spec.ram, spec.used),
        privilege: PrivilegeState {
            has_admin: spec.admin || spec.owned,
            open_vectors: spec.open_vectors,
            required_vectors: spec.required_vectors,
        },
        economy: TargetState {
            value: spec.money,
            max_value: spec.max_money,
            security: spec.security,
            min_security: spec.min_security,
        },
        required_skill: spec.required_skill,
        owned: spec.owned,
        backdoor: spec.backdoor,
    }
}

/// Apply a finished operation to `target` and release the job's capacity.
fn complete_job(state: &mut SimState, pid: u64, op: Option<Operation>, target: &str, threads: u32) {
    if let Some(job) = state.jobs.remove(&pid) {
        if let Some(host) = state.world.nodes.get_mut(&job.node) {
            host.spec.used = (host.spec.used - job.reserved).max(0.0);
        }
    } else {
        // Killed before completion.
        return;
    }

    let Some(op) = op else {
        return;
    };
    let tuning = state.world.tuning.clone();
    let Some(sim) = state.world.nodes.get_mut(target) else {
        return;
    };
    let spec = &mut sim.spec;
    let t = threads as f64;

    match op {
        Operation::Weaken => {
            spec.security = (spec.security - tuning.weaken_per_thread * t).max(spec.min_security);
        }
        Operation::Grow => {
            let grown = (spec.money + t) * spec.growth_rate.powf(t);
            spec.money = grown.min(spec.max_money);
            spec.security += tuning.grow_security_per_thread * t;
        }
        Operation::Hack => {
            let security_factor = ((100.0 - spec.security) / 100.0).clamp(0.0, 1.0);
            let fraction = (tuning.hack_fraction_per_thread * security_factor * t).min(1.0);
            let stolen = spec.money * fraction;
            spec.money -= stolen;
            spec.security += tuning.hack_security_per_thread * t;
            state.extracted += stolen;
        }
    }

    trace!(pid, operation = %op, target = %target, threads, "simulated operation completed");
}

impl Substrate for SimulatedSubstrate {
    fn neighbors(&self, node: &str) -> Vec<NodeName> {
        self.lock().world.links.get(node).cloned().unwrap_or_default()
    }

    fn describe(&self, node: &str) -> Option<Node> {
        self.with_node(node, |_, sim| node_of(sim))
    }

    fn capacity(&self, node: &str) -> Option<Capacity> {
        self.with_node(node, |_, sim| Capacity::new(sim.spec.ram, sim.spec.used))
    }

    fn target_state(&self, node: &str) -> Option<TargetState> {
        self.with_node(node, |_, sim| node_of(sim).economy)
    }

    fn privilege_state(&self, node: &str) -> Option<PrivilegeState> {
        self.with_node(node, |_, sim| node_of(sim).privilege)
    }

    fn skill_level(&self) -> u32 {
        self.lock().world.skill
    }

    fn available_vectors(&self) -> u32 {
        self.lock().world.vectors
    }

    fn operation_cost(&self, program: &str) -> Option<f64> {
        self.lock().world.programs.get(program).map(|p| p.cost)
    }

    fn operation_duration(&self, op: Operation, node: &str) -> Option<Duration> {
        self.with_node(node, |state, sim| duration_of(state, sim, op))
    }

    fn operation_effects(&self, node: &str) -> Option<OperationEffects> {
        self.with_node(node, effects_of)
    }

    fn grow_threads_for(&self, node: &str, multiplier: f64) -> Option<f64> {
        self.with_node(node, |_, sim| {
            if multiplier <= 1.0 {
                0.0
            } else {
                multiplier.ln() / sim.spec.growth_rate.ln()
            }
        })
    }

    fn run(&self, request: &RunRequest) -> Result<RunHandle, SubstrateError> {
        let mut state = self.lock();

        let program = state
            .world
            .programs
            .get(&request.program)
            .cloned()
            .ok_or_else(|| SubstrateError::UnknownProgram(request.program.clone()))?;

        let host = state
            .world
            .nodes
            .get(&request.node)
            .ok_or_else(|| SubstrateError::UnknownNode(request.node.clone()))?;

        if !(host.spec.owned || host.spec.backdoor || host.spec.admin) {
            return Err(SubstrateError::Rejected {
                program: request.program.clone(),
                node: request.node.clone(),
                reason: "no administrative access".to_string(),
            });
        }

        let fit = Capacity::new(host.spec.ram, host.spec.used).threads_for(program.cost);
        let granted = fit.min(request.threads);
        if granted == 0 {
            // A full node grants nothing; the caller decides how to proceed.
            let pid = state.next_pid;
            state.next_pid += 1;
            debug!(
                pid,
                program = %request.program,
                node = %request.node,
                requested = request.threads,
                "no free capacity; zero threads granted"
            );
            return Ok(RunHandle { pid, threads: 0 });
        }

        let target = request.args.first().cloned().unwrap_or_default();
        let duration = match program.operation {
            Some(op) => {
                let sim = state
                    .world
                    .nodes
                    .get(&target)
                    .ok_or_else(|| SubstrateError::UnknownNode(target.clone()))?;
                Some(duration_of(&state, sim, op))
            }
            None => None,
        };

        let reserved = granted as f64 * program.cost;
        if let Some(host) = state.world.nodes.get_mut(&request.node) {
            host.spec.used += reserved;
        }

        let pid = state.next_pid;
        state.next_pid += 1;
        state.jobs.insert(
            pid,
            Job {
                node: request.node.clone(),
                reserved,
                abort: None,
            },
        );

        if let Some(duration) = duration {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let shared = Arc::clone(&self.state);
                    let op = program.operation;
                    let task = handle.spawn(async move {
                        tokio::time::sleep(duration).await;
                        let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                        complete_job(&mut state, pid, op, &target, granted);
                    });
                    if let Some(job) = state.jobs.get_mut(&pid) {
                        job.abort = Some(task.abort_handle());
                    }
                }
                Err(_) => {
                    complete_job(&mut state, pid, program.operation, &target, granted);
                }
            }
        }

        debug!(
            pid,
            program = %request.program,
            node = %request.node,
            requested = request.threads,
            granted,
            "simulated program started"
        );

        Ok(RunHandle {
            pid,
            threads: granted,
        })
    }

    fn kill_all(&self, node: &str) {
        let mut state = self.lock();
        let pids: Vec<u64> = state
            .jobs
            .iter()
            .filter(|(_, job)| job.node == node)
            .map(|(pid, _)| *pid)
            .collect();

        for pid in pids.iter() {
            if let Some(job) = state.jobs.remove(pid) {
                if let Some(abort) = job.abort {
                    abort.abort();
                }
                if let Some(host) = state.world.nodes.get_mut(&job.node) {
                    host.spec.used = (host.spec.used - job.reserved).max(0.0);
                }
            }
        }

        if !pids.is_empty() {
            debug!(node = %node, killed = pids.len(), "simulated kill_all");
        }
    }
}
