// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::{NodeName, Operation};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [scheduler]
/// root = "home"
/// home_margin = 0.9
/// safety_gap = "200ms"
/// reallocation_interval = "60m"
///
/// [planner]
/// hack_fraction = 0.1
///
/// [programs]
/// weaken = "weaken.js"
/// grow = "grow.js"
/// hack = "hack.js"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Fleet-wide scheduling knobs from `[scheduler]`.
    #[serde(default)]
    pub scheduler: RawSchedulerSection,

    /// Thread planning and ranking knobs from `[planner]`.
    #[serde(default)]
    pub planner: PlannerSection,

    /// Program names used for each operation from `[programs]`.
    #[serde(default)]
    pub programs: ProgramsSection,
}

/// `[scheduler]` section exactly as written in TOML (durations as strings).
#[derive(Debug, Clone, Deserialize)]
pub struct RawSchedulerSection {
    /// Node discovery starts from; never returned as a discovery result.
    #[serde(default = "default_root")]
    pub root: NodeName,

    /// Fraction of the root's thread budget the allocator may use.
    #[serde(default = "default_home_margin")]
    pub home_margin: f64,

    /// Whether the root node itself is a candidate executor.
    #[serde(default = "default_include_root")]
    pub include_root: bool,

    /// Minimum spacing between two operation completions.
    #[serde(default = "default_safety_gap")]
    pub safety_gap: String,

    /// How often a full allocation pass runs.
    #[serde(default = "default_reallocation_interval")]
    pub reallocation_interval: String,

    /// Pause before retrying a skipped cycle.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: String,

    /// Amount `home_margin` is lowered by when a launch on the root is rejected.
    #[serde(default = "default_margin_step")]
    pub margin_step: f64,
}

fn default_root() -> NodeName {
    "home".to_string()
}

fn default_home_margin() -> f64 {
    0.9
}

fn default_include_root() -> bool {
    true
}

fn default_safety_gap() -> String {
    "200ms".to_string()
}

fn default_reallocation_interval() -> String {
    "60m".to_string()
}

fn default_retry_delay() -> String {
    "1s".to_string()
}

fn default_margin_step() -> f64 {
    0.01
}

impl Default for RawSchedulerSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            home_margin: default_home_margin(),
            include_root: default_include_root(),
            safety_gap: default_safety_gap(),
            reallocation_interval: default_reallocation_interval(),
            retry_delay: default_retry_delay(),
            margin_step: default_margin_step(),
        }
    }
}

/// Validated `[scheduler]` section with parsed durations.
#[derive(Debug, Clone)]
pub struct SchedulerSection {
    pub root: NodeName,
    pub home_margin: f64,
    pub include_root: bool,
    pub safety_gap: Duration,
    pub reallocation_interval: Duration,
    pub retry_delay: Duration,
    pub margin_step: f64,
}

/// `[planner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerSection {
    /// Fraction of the target's value each hack phase aims to extract.
    #[serde(default = "default_hack_fraction")]
    pub hack_fraction: f64,

    /// Fraction used when estimating extraction rate for ranking.
    #[serde(default = "default_rank_fraction")]
    pub rank_fraction: f64,

    /// A target is hacked only once its value reaches this share of max.
    #[serde(default = "default_prepare_value_ratio")]
    pub prepare_value_ratio: f64,
}

fn default_hack_fraction() -> f64 {
    0.1
}

fn default_rank_fraction() -> f64 {
    0.1
}

fn default_prepare_value_ratio() -> f64 {
    0.9
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            hack_fraction: default_hack_fraction(),
            rank_fraction: default_rank_fraction(),
            prepare_value_ratio: default_prepare_value_ratio(),
        }
    }
}

/// `[programs]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramsSection {
    #[serde(default = "default_weaken_program")]
    pub weaken: String,

    #[serde(default = "default_grow_program")]
    pub grow: String,

    #[serde(default = "default_hack_program")]
    pub hack: String,

    /// Program whose per-thread cost defines a node's thread budget.
    ///
    /// If `None`, the weaken program is used.
    #[serde(default)]
    pub designated: Option<String>,
}

fn default_weaken_program() -> String {
    "weaken.js".to_string()
}

fn default_grow_program() -> String {
    "grow.js".to_string()
}

fn default_hack_program() -> String {
    "hack.js".to_string()
}

impl Default for ProgramsSection {
    fn default() -> Self {
        Self {
            weaken: default_weaken_program(),
            grow: default_grow_program(),
            hack: default_hack_program(),
            designated: None,
        }
    }
}

impl ProgramsSection {
    /// Program that performs the given operation.
    pub fn program_for(&self, op: Operation) -> &str {
        match op {
            Operation::Weaken => &self.weaken,
            Operation::Grow => &self.grow,
            Operation::Hack => &self.hack,
        }
    }

    /// Effective designated program used for budget computation.
    pub fn designated(&self) -> &str {
        self.designated.as_deref().unwrap_or(&self.weaken)
    }
}

/// Validated configuration. Construct through `ConfigFile::try_from`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub scheduler: SchedulerSection,
    pub planner: PlannerSection,
    pub programs: ProgramsSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        scheduler: SchedulerSection,
        planner: PlannerSection,
        programs: ProgramsSection,
    ) -> Self {
        Self {
            scheduler,
            planner,
            programs,
        }
    }
}
