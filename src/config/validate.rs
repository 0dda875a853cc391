// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, PlannerSection, ProgramsSection, RawConfigFile, SchedulerSection};
use crate::errors::{FleetError, Result};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::FleetError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let scheduler = validate_scheduler(&raw)?;
        validate_planner(&raw.planner)?;
        validate_programs(&raw.programs)?;
        Ok(ConfigFile::new_unchecked(scheduler, raw.planner, raw.programs))
    }
}

/// Validate an already-typed config (e.g. one built in code).
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_fraction("scheduler.home_margin", cfg.scheduler.home_margin, true)?;
    ensure_positive_duration("scheduler.safety_gap", cfg.scheduler.safety_gap)?;
    validate_planner(&cfg.planner)?;
    validate_programs(&cfg.programs)
}

fn validate_scheduler(raw: &RawConfigFile) -> Result<SchedulerSection> {
    let section = &raw.scheduler;

    if section.root.trim().is_empty() {
        return Err(FleetError::ConfigError(
            "[scheduler].root must not be empty".to_string(),
        ));
    }

    ensure_fraction("scheduler.home_margin", section.home_margin, true)?;

    if !(section.margin_step >= 0.0 && section.margin_step < 1.0) {
        return Err(FleetError::ConfigError(format!(
            "[scheduler].margin_step must be in [0, 1) (got {})",
            section.margin_step
        )));
    }

    let safety_gap = duration_field("scheduler.safety_gap", &section.safety_gap)?;
    ensure_positive_duration("scheduler.safety_gap", safety_gap)?;

    let reallocation_interval = duration_field(
        "scheduler.reallocation_interval",
        &section.reallocation_interval,
    )?;
    ensure_positive_duration("scheduler.reallocation_interval", reallocation_interval)?;

    let retry_delay = duration_field("scheduler.retry_delay", &section.retry_delay)?;

    Ok(SchedulerSection {
        root: section.root.trim().to_string(),
        home_margin: section.home_margin,
        include_root: section.include_root,
        safety_gap,
        reallocation_interval,
        retry_delay,
        margin_step: section.margin_step,
    })
}

fn validate_planner(planner: &PlannerSection) -> Result<()> {
    ensure_fraction("planner.hack_fraction", planner.hack_fraction, false)?;
    ensure_fraction("planner.rank_fraction", planner.rank_fraction, false)?;
    ensure_fraction("planner.prepare_value_ratio", planner.prepare_value_ratio, true)?;
    Ok(())
}

fn validate_programs(programs: &ProgramsSection) -> Result<()> {
    let named = [
        ("programs.weaken", programs.weaken.as_str()),
        ("programs.grow", programs.grow.as_str()),
        ("programs.hack", programs.hack.as_str()),
        ("programs.designated", programs.designated()),
    ];
    for (key, name) in named {
        if name.trim().is_empty() {
            return Err(FleetError::ConfigError(format!("[{key}] must not be empty")));
        }
    }
    Ok(())
}

fn duration_field(key: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| FleetError::ConfigError(format!("[{key}] is not a valid duration: {e}")))
}

fn ensure_positive_duration(key: &str, value: Duration) -> Result<()> {
    if value.is_zero() {
        return Err(FleetError::ConfigError(format!("[{key}] must be > 0")));
    }
    Ok(())
}

/// `value` must be in `(0, 1)`, or `(0, 1]` when `inclusive_one` is set.
fn ensure_fraction(key: &str, value: f64, inclusive_one: bool) -> Result<()> {
    let upper_ok = if inclusive_one { value <= 1.0 } else { value < 1.0 };
    if !(value > 0.0 && upper_ok) {
        let range = if inclusive_one { "(0, 1]" } else { "(0, 1)" };
        return Err(FleetError::ConfigError(format!(
            "[{key}] must be in {range} (got {value})"
        )));
    }
    Ok(())
}
