// tests/runtime_control.rs

mod common;
use crate::common::{ConfigFileBuilder, init_tracing, small_fleet, wait_until, with_timeout};

use std::sync::Arc;

use tokio::sync::mpsc;

use batchfleet::batch::LoopSummary;
use batchfleet::engine::{ControlEvent, CoreRuntime, FleetTotals, Runtime, TunableSettings};
use batchfleet::substrate::Substrate;

#[tokio::test]
async fn runtime_allocates_reallocates_and_shuts_down() {
    init_tracing();
    let fake = Arc::new(small_fleet());
    let substrate: Arc<dyn Substrate> = fake.clone();
    let cfg = ConfigFileBuilder::new()
        .include_root(false)
        .reallocation_interval("60m")
        .build();

    let (tx, rx) = mpsc::channel(16);
    let core = CoreRuntime::new(TunableSettings::from_config(&cfg));
    let runtime = Runtime::new(core, cfg, substrate, tx.clone(), rx);
    let handle = tokio::spawn(runtime.run());

    // The first tick allocates immediately.
    wait_until(|| !fake.runs_on("exec1").is_empty()).await;
    assert!(fake.kills().is_empty());

    tx.send(ControlEvent::ForceReallocate).await.unwrap();
    wait_until(|| fake.kills().len() >= 2).await;

    let kills = fake.kills();
    assert!(kills.contains(&"exec1".to_string()));
    assert!(kills.contains(&"exec2".to_string()));

    tx.send(ControlEvent::ShutdownRequested).await.unwrap();
    let totals = with_timeout(handle).await.unwrap().unwrap();

    // Two loops per generation, two generations.
    assert_eq!(totals.loops, 4);
    assert_eq!(fake.kills().len(), 4);
    assert_eq!(totals.rejected, 0);
}

#[tokio::test]
async fn shutdown_before_any_work_exits_cleanly() {
    init_tracing();
    let fake = Arc::new(small_fleet());
    let substrate: Arc<dyn Substrate> = fake.clone();
    let cfg = ConfigFileBuilder::new().build();

    let (tx, rx) = mpsc::channel(16);
    tx.send(ControlEvent::ShutdownRequested).await.unwrap();

    let core = CoreRuntime::new(TunableSettings::from_config(&cfg));
    let runtime = Runtime::new(core, cfg, substrate, tx.clone(), rx);
    let totals = with_timeout(runtime.run()).await.unwrap();

    // Either the first tick or the shutdown wins; nothing keeps running.
    assert!(totals.loops <= 2);
}

#[test]
fn totals_fold_loop_summaries() {
    let mut totals = FleetTotals::default();
    for (completed, rejected) in [(3, 0), (1, 2)] {
        totals.absorb(&LoopSummary {
            executor: "exec1".to_string(),
            target: "t-rich".to_string(),
            cycles_completed: completed,
            cycles_skipped: rejected,
            under_provisioned: 1,
            rejected,
        });
    }

    assert_eq!(
        totals,
        FleetTotals {
            loops: 2,
            cycles_completed: 4,
            cycles_skipped: 2,
            under_provisioned: 2,
            rejected: 2,
        }
    );
}
