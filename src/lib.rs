// src/lib.rs

pub mod batch;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fleet;
pub mod logging;
pub mod network;
pub mod planner;
pub mod substrate;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::engine::{ControlEvent, CoreRuntime, Runtime, TunableSettings};
use crate::fleet::{AllocationPass, run_allocation_pass};
use crate::network::classify;
use crate::substrate::{SimulatedSubstrate, Substrate, load_world};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config and world loading
/// - the simulated substrate
/// - the control-plane core and its async shell
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(&args.config)?;
    let world = load_world(&args.world)?;
    let substrate: Arc<dyn Substrate> = Arc::new(SimulatedSubstrate::new(world));

    if args.dry_run {
        let pass = run_allocation_pass(substrate.as_ref(), &cfg, cfg.scheduler.home_margin)?;
        print_dry_run(&cfg, &pass, substrate.as_ref());
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<ControlEvent>(64);

    // Ctrl-C → graceful shutdown.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(ControlEvent::ShutdownRequested).await;
        });
    }

    let core = CoreRuntime::new(TunableSettings::from_config(&cfg));
    let runtime = Runtime::new(core, cfg, substrate, tx, rx);
    let totals = runtime.run().await?;
    info!(
        loops = totals.loops,
        completed = totals.cycles_completed,
        skipped = totals.cycles_skipped,
        rejected = totals.rejected,
        "fleet stopped"
    );
    Ok(())
}

/// Dry-run output: discovery, ranking and assignments.
fn print_dry_run(cfg: &ConfigFile, pass: &AllocationPass, substrate: &dyn Substrate) {
    let skill = substrate.skill_level();
    let vectors = substrate.available_vectors();

    println!("batchfleet dry-run");
    println!("  scheduler.root = {}", cfg.scheduler.root);
    println!("  scheduler.home_margin = {}", cfg.scheduler.home_margin);
    println!("  scheduler.safety_gap = {:?}", cfg.scheduler.safety_gap);
    println!("  planner.hack_fraction = {}", cfg.planner.hack_fraction);
    println!("  programs.designated = {}", cfg.programs.designated());
    println!();

    println!("discovered ({}):", pass.paths.len());
    for (name, route) in pass.paths.iter() {
        match substrate.describe(name) {
            Some(node) if name != cfg.scheduler.root => {
                let status = classify(&node, skill, vectors);
                println!("  - {route} [{status:?}]");
            }
            _ => println!("  - {route}"),
        }
    }
    println!();

    println!("targets by rate ({}):", pass.ranked.len());
    for (name, rate) in pass.ranked.iter().rev() {
        println!("  - {name}: {rate:.4}/ms");
    }
    println!();

    println!("assignments ({}):", pass.report.assignments.len());
    for a in &pass.report.assignments {
        println!("  - {} -> {} ({} threads)", a.executor, a.target, a.budget_threads);
    }
    if !pass.report.skipped_nodes.is_empty() {
        println!("  skipped (no capacity): {:?}", pass.report.skipped_nodes);
    }
    if let Some(exhaustion) = pass.report.exhaustion() {
        println!("  {exhaustion:?}");
    }

    debug!("dry-run complete (no dispatch)");
}
