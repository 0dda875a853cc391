// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`ControlEvent`]s and produces:
//! - updated tunables and generation counter
//! - a list of commands describing what the IO shell should do next
//!
//! It has no channels, no Tokio types, and does not touch the substrate, so
//! it is tested directly.

use crate::config::ConfigFile;
use crate::engine::event_handlers::{
    CoreStep, handle_reallocation, handle_root_rejection, handle_settings_update, handle_shutdown,
};
use crate::engine::{ControlEvent, Generation};

/// Settings that may change while the fleet is running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunableSettings {
    pub home_margin: f64,
    pub hack_fraction: f64,
    /// Amount the home margin drops after a root rejection.
    pub margin_step: f64,
}

impl TunableSettings {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            home_margin: cfg.scheduler.home_margin,
            hack_fraction: cfg.planner.hack_fraction,
            margin_step: cfg.scheduler.margin_step,
        }
    }
}

/// Pure core runtime state.
#[derive(Debug, Clone)]
pub struct CoreRuntime {
    settings: TunableSettings,
    generation: Generation,
    margin_lowered_in: Option<Generation>,
}

impl CoreRuntime {
    pub fn new(settings: TunableSettings) -> Self {
        Self {
            settings,
            generation: 0,
            margin_lowered_in: None,
        }
    }

    pub fn settings(&self) -> &TunableSettings {
        &self.settings
    }

    /// Generation of the most recent reallocation; 0 before the first one.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Handle a single control event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: ControlEvent) -> CoreStep {
        match event {
            ControlEvent::ReallocationDue => {
                handle_reallocation(&self.settings, &mut self.generation, false)
            }
            ControlEvent::ForceReallocate => {
                handle_reallocation(&self.settings, &mut self.generation, true)
            }
            ControlEvent::UpdateSettings(update) => {
                handle_settings_update(&mut self.settings, update)
            }
            ControlEvent::RootLaunchRejected { node, generation } => handle_root_rejection(
                &mut self.settings,
                self.generation,
                &mut self.margin_lowered_in,
                &node,
                generation,
            ),
            ControlEvent::ShutdownRequested => handle_shutdown(),
        }
    }
}
