// src/batch/mod.rs

//! Batch timing and the per-assignment dispatch loop.
//!
//! - [`phase`] is the four-state cycle.
//! - [`timing`] computes issue offsets from operation durations.
//! - [`dispatcher`] runs the cycle against the substrate.

pub mod dispatcher;
pub mod phase;
pub mod timing;

pub use dispatcher::{BatchScheduler, DispatchOutcome, DispatchSettings, LoopSummary};
pub use phase::BatchPhase;
pub use timing::{BatchTiming, OperationDurations};
