// src/batch/dispatcher.rs

//! The per-assignment dispatch loop.
//!
//! Each loop owns one [`Assignment`] and nothing else. Every cycle it plans
//! from scratch, issues the four phases with the precomputed offsets, and
//! never waits for completions. All waits are cut short by the shared stop
//! signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::batch::phase::BatchPhase;
use crate::config::ProgramsSection;
use crate::engine::{ControlEvent, Generation};
use crate::errors::{FleetError, SubstrateError};
use crate::fleet::Assignment;
use crate::planner::{CapacityPlanner, OperationCosts, OperationPlan, PlannerSettings};
use crate::substrate::{RunRequest, Substrate};
use crate::types::NodeName;

/// Settings shared by every loop spawned in one allocation pass.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub programs: ProgramsSection,
    pub planner: PlannerSettings,
    pub costs: OperationCosts,
    /// Pause after a skipped cycle before planning again.
    pub retry_delay: Duration,
    pub root: NodeName,
    /// Allocation pass the loop belongs to.
    pub generation: Generation,
}

/// Result of issuing one phase.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// All requested threads were placed.
    Placed { threads: u32 },
    /// The substrate placed fewer threads than requested. The cycle goes on.
    UnderProvisioned { requested: u32, granted: u32 },
    /// The substrate refused to start the program. The cycle is abandoned.
    Rejected(SubstrateError),
    /// The phase had no threads planned.
    Skipped,
}

/// Counters reported when a loop stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub executor: NodeName,
    pub target: NodeName,
    pub cycles_completed: u64,
    pub cycles_skipped: u64,
    pub under_provisioned: u64,
    pub rejected: u64,
}

enum CycleEnd {
    Completed,
    Skipped,
    Stopped,
}

/// Drives the `Weaken1 -> Grow -> Weaken2 -> Hack` cycle for one
/// executor/target pair until stopped.
pub struct BatchScheduler {
    assignment: Assignment,
    substrate: Arc<dyn Substrate>,
    settings: DispatchSettings,
    control_tx: mpsc::Sender<ControlEvent>,
    stop_rx: watch::Receiver<bool>,
}

impl BatchScheduler {
    pub fn new(
        assignment: Assignment,
        substrate: Arc<dyn Substrate>,
        settings: DispatchSettings,
        control_tx: mpsc::Sender<ControlEvent>,
        stop_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            assignment,
            substrate,
            settings,
            control_tx,
            stop_rx,
        }
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Run the loop on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<LoopSummary> {
        tokio::spawn(self.run())
    }

    /// Cycle until the stop signal is raised (or its sender dropped).
    pub async fn run(mut self) -> LoopSummary {
        let mut summary = LoopSummary {
            executor: self.assignment.executor.clone(),
            target: self.assignment.target.clone(),
            ..LoopSummary::default()
        };

        info!(
            executor = %self.assignment.executor,
            target = %self.assignment.target,
            budget_threads = self.assignment.budget_threads,
            generation = self.settings.generation,
            "dispatch loop started"
        );

        loop {
            match self.run_cycle(&mut summary).await {
                CycleEnd::Completed => summary.cycles_completed += 1,
                CycleEnd::Skipped => {
                    summary.cycles_skipped += 1;
                    if !self.pause(self.settings.retry_delay).await {
                        break;
                    }
                }
                CycleEnd::Stopped => break,
            }
        }

        info!(
            executor = %summary.executor,
            target = %summary.target,
            completed = summary.cycles_completed,
            skipped = summary.cycles_skipped,
            "dispatch loop stopped"
        );
        summary
    }

    async fn run_cycle(&mut self, summary: &mut LoopSummary) -> CycleEnd {
        let Some(plan) = self.plan_cycle() else {
            return CycleEnd::Skipped;
        };

        if !self.pause(plan.timing.initial_delay()).await {
            return CycleEnd::Stopped;
        }

        for phase in BatchPhase::CYCLE {
            match self.dispatch_phase(&plan, phase) {
                DispatchOutcome::Rejected(_) => {
                    summary.rejected += 1;
                    self.report_rejection();
                    return CycleEnd::Skipped;
                }
                DispatchOutcome::UnderProvisioned { .. } => summary.under_provisioned += 1,
                DispatchOutcome::Placed { .. } | DispatchOutcome::Skipped => {}
            }

            if !self.pause(plan.timing.wait_after(phase)).await {
                return CycleEnd::Stopped;
            }
        }

        CycleEnd::Completed
    }

    /// Fresh plan for this cycle, or `None` if it must be skipped.
    fn plan_cycle(&self) -> Option<OperationPlan> {
        let target_name = &self.assignment.target;
        let planner = CapacityPlanner::new(self.substrate.as_ref(), self.settings.planner);
        let planned = self
            .substrate
            .describe(target_name)
            .ok_or_else(|| FleetError::from(SubstrateError::UnknownNode(target_name.clone())))
            .and_then(|target| {
                planner.plan(&target, self.assignment.budget_threads, &self.settings.costs)
            })
            .and_then(|plan| {
                plan.ensure_dispatchable()?;
                Ok(plan)
            });

        match planned {
            Ok(plan) => {
                debug!(
                    executor = %self.assignment.executor,
                    target = %plan.target,
                    threads = ?plan.threads,
                    cycle = ?plan.timing.cycle_length(),
                    "cycle planned"
                );
                Some(plan)
            }
            Err(err) => {
                warn!(
                    executor = %self.assignment.executor,
                    target = %target_name,
                    error = %err,
                    "skipping cycle"
                );
                None
            }
        }
    }

    /// Issue one phase against the substrate. Fire-and-forget.
    pub fn dispatch_phase(&self, plan: &OperationPlan, phase: BatchPhase) -> DispatchOutcome {
        let requested = plan.threads_for(phase);
        if requested == 0 {
            debug!(target = %plan.target, phase = %phase, "no threads planned; phase skipped");
            return DispatchOutcome::Skipped;
        }

        let request = RunRequest {
            program: self.settings.programs.program_for(phase.operation()).to_string(),
            node: self.assignment.executor.clone(),
            threads: requested,
            args: vec![plan.target.clone()],
        };

        match self.substrate.run(&request) {
            Ok(handle) if handle.threads < requested => {
                warn!(
                    executor = %request.node,
                    target = %plan.target,
                    phase = %phase,
                    requested,
                    granted = handle.threads,
                    "dispatch under-provisioned; continuing with granted threads"
                );
                DispatchOutcome::UnderProvisioned {
                    requested,
                    granted: handle.threads,
                }
            }
            Ok(handle) => {
                debug!(
                    executor = %request.node,
                    target = %plan.target,
                    phase = %phase,
                    threads = handle.threads,
                    pid = handle.pid,
                    "phase dispatched"
                );
                DispatchOutcome::Placed {
                    threads: handle.threads,
                }
            }
            Err(err) => {
                warn!(
                    executor = %request.node,
                    target = %plan.target,
                    phase = %phase,
                    error = %err,
                    "substrate rejected launch; abandoning cycle"
                );
                DispatchOutcome::Rejected(err)
            }
        }
    }

    fn report_rejection(&self) {
        if self.assignment.executor != self.settings.root {
            return;
        }
        let event = ControlEvent::RootLaunchRejected {
            node: self.assignment.executor.clone(),
            generation: self.settings.generation,
        };
        if let Err(err) = self.control_tx.try_send(event) {
            debug!(error = %err, "could not report root rejection");
        }
    }

    /// Sleep for `duration` unless stopped first. Returns `false` once the
    /// loop must stop, including when the stop sender is gone.
    async fn pause(&mut self, duration: Duration) -> bool {
        let stop_rx = &mut self.stop_rx;
        let slept = tokio::select! {
            biased;
            _ = async {
                let _ = stop_rx.wait_for(|stopped| *stopped).await;
            } => false,
            _ = tokio::time::sleep(duration) => true,
        };
        slept && !*self.stop_rx.borrow() && self.stop_rx.has_changed().is_ok()
    }
}
