// src/engine/mod.rs

//! Control plane for batchfleet.
//!
//! This module ties together:
//! - periodic and forced reallocation passes
//! - runtime settings updates (home margin, hack fraction)
//! - self-correction when launches on the root are rejected
//! - shutdown
//!
//! The pure core state machine lives in [`core`]; the async/IO shell that
//! owns the dispatch loops is implemented in [`runtime`].

use crate::types::NodeName;

/// Counter identifying one allocation pass and the loops it spawned.
pub type Generation = u64;

/// Partial update of the runtime-tunable settings. `None` leaves a value as
/// it is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsUpdate {
    pub home_margin: Option<f64>,
    pub hack_fraction: Option<f64>,
}

/// Typed control-plane messages consumed by the core.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// The periodic reallocation interval elapsed.
    ReallocationDue,
    /// Reallocate now, regardless of the interval.
    ForceReallocate,
    /// Change tunables; applied from the next allocation pass on.
    UpdateSettings(SettingsUpdate),
    /// A dispatch loop running on the root had a launch rejected.
    RootLaunchRejected {
        node: NodeName,
        generation: Generation,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Settings the core hands to the shell for one allocation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReallocationRequest {
    pub generation: Generation,
    pub home_margin: f64,
    pub hack_fraction: f64,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::{CoreRuntime, TunableSettings};
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::{FleetTotals, Runtime};
