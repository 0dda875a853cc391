#![allow(dead_code)]

pub use batchfleet_test_utils::{
    ConfigFileBuilder, FakeSubstrate, NodeBuilder, init_tracing, with_timeout,
};

use std::time::Duration;

/// Small network used across tests:
///
/// ```text
/// home ── exec1 ── t-rich
///   │        └──── t-poor
///   └──── exec2
/// ```
///
/// `home` and the executors are fleet-owned; both targets are administered
/// and at minimum security. `t-rich` is prepared (value at 95% of max).
pub fn small_fleet() -> FakeSubstrate {
    FakeSubstrate::new()
        .with_node(NodeBuilder::executor("home", 64.0).build())
        .with_node(NodeBuilder::executor("exec1", 32.0).build())
        .with_node(NodeBuilder::executor("exec2", 16.0).build())
        .with_node(NodeBuilder::target("t-rich", 950.0, 1000.0).build())
        .with_node(NodeBuilder::target("t-poor", 10.0, 50.0).build())
        .link("home", "exec1")
        .link("home", "exec2")
        .link("exec1", "t-rich")
        .link("exec1", "t-poor")
}

/// Poll `cond` every few milliseconds until it holds or 5 seconds pass.
pub async fn wait_until<F>(mut cond: F)
where
    F: FnMut() -> bool,
{
    with_timeout(async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
}

/// Names of the programs sent to `node`, in order.
pub fn programs_on(substrate: &FakeSubstrate, node: &str) -> Vec<String> {
    substrate
        .runs_on(node)
        .into_iter()
        .map(|r| r.program)
        .collect()
}

