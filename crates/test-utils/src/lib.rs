// src/lib.rs

pub mod builders;
pub mod fake_substrate;

pub use builders::{ConfigFileBuilder, NodeBuilder};
pub use fake_substrate::FakeSubstrate;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use batchfleet::logging::LOG_ENV_VAR;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound on any single async test body.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-writer subscriber once per test binary.
///
/// Reads `BATCHFLEET_LOG` like the binary does, falling back to warnings
/// only so passing runs stay quiet.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = std::env::var(LOG_ENV_VAR)
            .ok()
            .and_then(|v| EnvFilter::try_new(v).ok())
            .unwrap_or_else(|| EnvFilter::new("warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .try_init();
    });
}

/// Await `f`, panicking if it outlives [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test body exceeded {TEST_TIMEOUT:?}"),
    }
}
