// src/types.rs

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Canonical node identity used throughout the crate.
pub type NodeName = String;

/// The three remote operation types a batch is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Lowers the target's security level.
    Weaken,
    /// Restores the target's value towards its maximum.
    Grow,
    /// Extracts a fraction of the target's current value.
    Hack,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Weaken, Operation::Grow, Operation::Hack];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Weaken => "weaken",
            Operation::Grow => "grow",
            Operation::Hack => "hack",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weaken" => Ok(Operation::Weaken),
            "grow" => Ok(Operation::Grow),
            "hack" => Ok(Operation::Hack),
            other => Err(format!(
                "invalid operation: {other} (expected \"weaken\", \"grow\" or \"hack\")"
            )),
        }
    }
}

/// Parse a duration string such as `"200ms"`, `"3s"`, `"60m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
