// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::batch::{BatchScheduler, DispatchSettings, LoopSummary};
use crate::config::ConfigFile;
use crate::fleet::run_allocation_pass;
use crate::planner::PlannerSettings;
use crate::substrate::Substrate;
use crate::types::NodeName;

use super::core::CoreRuntime;
use super::{ControlEvent, CoreCommand, ReallocationRequest};

/// Counters folded from every dispatch loop the runtime has stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetTotals {
    pub loops: u64,
    pub cycles_completed: u64,
    pub cycles_skipped: u64,
    pub under_provisioned: u64,
    pub rejected: u64,
}

impl FleetTotals {
    pub fn absorb(&mut self, summary: &LoopSummary) {
        self.loops += 1;
        self.cycles_completed += summary.cycles_completed;
        self.cycles_skipped += summary.cycles_skipped;
        self.under_provisioned += summary.under_provisioned;
        self.rejected += summary.rejected;
    }
}

/// Loops spawned by one allocation pass.
struct RunningFleet {
    generation: u64,
    stop_tx: watch::Sender<bool>,
    loops: Vec<JoinHandle<LoopSummary>>,
    executors: Vec<NodeName>,
}

/// Drives the control plane in response to `ControlEvent`s and owns the
/// dispatch loops.
///
/// All semantics live in `CoreRuntime`; this shell reads events from the
/// channel and the reallocation ticker, and performs the IO the core asks
/// for.
pub struct Runtime {
    core: CoreRuntime,
    cfg: ConfigFile,
    substrate: Arc<dyn Substrate>,
    event_tx: mpsc::Sender<ControlEvent>,
    event_rx: mpsc::Receiver<ControlEvent>,
    fleet: Option<RunningFleet>,
    totals: FleetTotals,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("generation", &self.fleet.as_ref().map(|fl| fl.generation))
            .field("totals", &self.totals)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// `event_tx` must be the sender paired with `event_rx`; dispatch loops
    /// use it to report root rejections. Holding it keeps the channel open,
    /// so the runtime only exits on `ShutdownRequested`.
    pub fn new(
        core: CoreRuntime,
        cfg: ConfigFile,
        substrate: Arc<dyn Substrate>,
        event_tx: mpsc::Sender<ControlEvent>,
        event_rx: mpsc::Receiver<ControlEvent>,
    ) -> Self {
        Self {
            core,
            cfg,
            substrate,
            event_tx,
            event_rx,
            fleet: None,
            totals: FleetTotals::default(),
        }
    }

    /// Main event loop.
    ///
    /// - The ticker emits `ReallocationDue` immediately and then every
    ///   `reallocation_interval`.
    /// - Events are fed into the core and the returned commands executed.
    ///
    /// Returns the totals of every loop that was stopped.
    pub async fn run(mut self) -> crate::errors::Result<FleetTotals> {
        info!(root = %self.cfg.scheduler.root, "batchfleet runtime started");

        let mut ticker = tokio::time::interval(self.cfg.scheduler.reallocation_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                _ = ticker.tick() => ControlEvent::ReallocationDue,
                Some(event) = self.event_rx.recv() => event,
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command).await;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        self.stop_all().await;
        info!(
            loops = self.totals.loops,
            completed = self.totals.cycles_completed,
            skipped = self.totals.cycles_skipped,
            "runtime exiting"
        );
        Ok(self.totals)
    }

    async fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::Reallocate(request) => self.reallocate(request).await,
            CoreCommand::StopAll => self.stop_all().await,
            CoreCommand::RequestExit => info!("core issued RequestExit command"),
        }
    }

    /// Stop the current loops, then discover, rank, allocate and spawn.
    ///
    /// A failed pass leaves the fleet idle until the next one.
    async fn reallocate(&mut self, request: ReallocationRequest) {
        self.stop_all().await;

        let pass = match run_allocation_pass(self.substrate.as_ref(), &self.cfg, request.home_margin)
        {
            Ok(pass) => pass,
            Err(err) => {
                warn!(generation = request.generation, error = %err, "allocation pass failed");
                return;
            }
        };

        let planner = PlannerSettings {
            hack_fraction: request.hack_fraction,
            ..PlannerSettings::from_config(&self.cfg)
        };
        let settings = DispatchSettings {
            programs: self.cfg.programs.clone(),
            planner,
            costs: pass.costs,
            retry_delay: self.cfg.scheduler.retry_delay,
            root: self.cfg.scheduler.root.clone(),
            generation: request.generation,
        };

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut loops = Vec::with_capacity(pass.report.assignments.len());
        let mut executors = Vec::with_capacity(pass.report.assignments.len());

        for assignment in pass.report.assignments {
            executors.push(assignment.executor.clone());
            let scheduler = BatchScheduler::new(
                assignment,
                Arc::clone(&self.substrate),
                settings.clone(),
                self.event_tx.clone(),
                stop_rx.clone(),
            );
            loops.push(scheduler.spawn());
        }

        info!(
            generation = request.generation,
            loops = loops.len(),
            home_margin = request.home_margin,
            "fleet reallocated"
        );

        self.fleet = Some(RunningFleet {
            generation: request.generation,
            stop_tx,
            loops,
            executors,
        });
    }

    /// Raise the stop signal, wait for every loop, and clear their executors.
    async fn stop_all(&mut self) {
        let Some(fleet) = self.fleet.take() else {
            return;
        };

        debug!(generation = fleet.generation, loops = fleet.loops.len(), "stopping dispatch loops");
        fleet.stop_tx.send_replace(true);

        for handle in fleet.loops {
            match handle.await {
                Ok(summary) => {
                    info!(
                        generation = fleet.generation,
                        executor = %summary.executor,
                        target = %summary.target,
                        completed = summary.cycles_completed,
                        skipped = summary.cycles_skipped,
                        under_provisioned = summary.under_provisioned,
                        rejected = summary.rejected,
                        "dispatch loop summary"
                    );
                    self.totals.absorb(&summary);
                }
                Err(err) => warn!(error = %err, "dispatch loop ended abnormally"),
            }
        }

        for node in &fleet.executors {
            self.substrate.kill_all(node);
        }
    }
}
