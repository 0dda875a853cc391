// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, info, warn};

use crate::engine::core::TunableSettings;
use crate::engine::{Generation, ReallocationRequest, SettingsUpdate};

/// Lowest value the root margin is ever lowered to.
pub const MIN_HOME_MARGIN: f64 = 0.1;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreCommand {
    /// Stop the running loops, clear the executors, and run a fresh pass.
    Reallocate(ReallocationRequest),
    /// Stop every running dispatch loop.
    StopAll,
    /// Request that the process exits.
    RequestExit,
}

/// Decision returned by the core after handling a single `ControlEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn keep_running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Start a new generation and ask the shell to reallocate.
pub fn handle_reallocation(
    settings: &TunableSettings,
    generation: &mut Generation,
    forced: bool,
) -> CoreStep {
    *generation += 1;
    info!(generation = *generation, forced, "reallocation requested");

    CoreStep::keep_running(vec![CoreCommand::Reallocate(ReallocationRequest {
        generation: *generation,
        home_margin: settings.home_margin,
        hack_fraction: settings.hack_fraction,
    })])
}

/// Apply a settings update. Out-of-range values are ignored with a warning.
pub fn handle_settings_update(settings: &mut TunableSettings, update: SettingsUpdate) -> CoreStep {
    if let Some(margin) = update.home_margin {
        if margin > 0.0 && margin <= 1.0 {
            info!(old = settings.home_margin, new = margin, "home margin updated");
            settings.home_margin = margin;
        } else {
            warn!(value = margin, "ignoring home margin outside (0, 1]");
        }
    }

    if let Some(fraction) = update.hack_fraction {
        if fraction > 0.0 && fraction < 1.0 {
            info!(old = settings.hack_fraction, new = fraction, "hack fraction updated");
            settings.hack_fraction = fraction;
        } else {
            warn!(value = fraction, "ignoring hack fraction outside (0, 1)");
        }
    }

    CoreStep::keep_running(Vec::new())
}

/// Lower the root margin by one step, at most once per generation.
///
/// Rejections reported by loops of an older generation are stale and
/// ignored.
pub fn handle_root_rejection(
    settings: &mut TunableSettings,
    current: Generation,
    lowered_in: &mut Option<Generation>,
    node: &str,
    generation: Generation,
) -> CoreStep {
    if generation != current {
        debug!(node, generation, current, "ignoring stale root rejection");
        return CoreStep::keep_running(Vec::new());
    }
    if *lowered_in == Some(current) {
        return CoreStep::keep_running(Vec::new());
    }

    let lowered = (settings.home_margin - settings.margin_step).max(MIN_HOME_MARGIN);
    if lowered < settings.home_margin {
        warn!(
            node,
            old = settings.home_margin,
            new = lowered,
            "launch rejected on root; lowering home margin for the next pass"
        );
        settings.home_margin = lowered;
    }
    *lowered_in = Some(current);

    CoreStep::keep_running(Vec::new())
}

/// Stop everything and exit.
pub fn handle_shutdown() -> CoreStep {
    info!("shutdown requested");
    CoreStep {
        commands: vec![CoreCommand::StopAll, CoreCommand::RequestExit],
        keep_running: false,
    }
}
