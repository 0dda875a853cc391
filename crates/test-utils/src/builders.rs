// src/builders.rs

#![allow(dead_code)]

use batchfleet::config::{ConfigFile, RawConfigFile};
use batchfleet::network::{Capacity, Node, PrivilegeState, TargetState};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults with a 10ms safety gap and retry delay
/// so dispatch tests stay fast.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.scheduler.safety_gap = "10ms".to_string();
        config.scheduler.retry_delay = "10ms".to_string();
        Self { config }
    }

    pub fn root(mut self, root: &str) -> Self {
        self.config.scheduler.root = root.to_string();
        self
    }

    pub fn home_margin(mut self, margin: f64) -> Self {
        self.config.scheduler.home_margin = margin;
        self
    }

    pub fn margin_step(mut self, step: f64) -> Self {
        self.config.scheduler.margin_step = step;
        self
    }

    pub fn include_root(mut self, include: bool) -> Self {
        self.config.scheduler.include_root = include;
        self
    }

    pub fn safety_gap(mut self, gap: &str) -> Self {
        self.config.scheduler.safety_gap = gap.to_string();
        self
    }

    pub fn reallocation_interval(mut self, interval: &str) -> Self {
        self.config.scheduler.reallocation_interval = interval.to_string();
        self
    }

    pub fn retry_delay(mut self, delay: &str) -> Self {
        self.config.scheduler.retry_delay = delay.to_string();
        self
    }

    pub fn hack_fraction(mut self, fraction: f64) -> Self {
        self.config.planner.hack_fraction = fraction;
        self
    }

    pub fn prepare_value_ratio(mut self, ratio: f64) -> Self {
        self.config.planner.prepare_value_ratio = ratio;
        self
    }

    pub fn designated(mut self, program: &str) -> Self {
        self.config.programs.designated = Some(program.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Node`.
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            node: Node::named(name),
        }
    }

    /// Fleet-owned executor with `ram` units free.
    pub fn executor(name: &str, ram: f64) -> Self {
        Self::new(name).ram(ram, 0.0).owned()
    }

    /// Administered target with the given value, at minimum security.
    pub fn target(name: &str, value: f64, max_value: f64) -> Self {
        Self::new(name).admin().economy(value, max_value, 1.0, 1.0)
    }

    pub fn ram(mut self, total: f64, used: f64) -> Self {
        self.node.capacity = Capacity::new(total, used);
        self
    }

    pub fn admin(mut self) -> Self {
        self.node.privilege.has_admin = true;
        self
    }

    pub fn vectors(mut self, open: u32, required: u32) -> Self {
        self.node.privilege = PrivilegeState {
            has_admin: self.node.privilege.has_admin,
            open_vectors: open,
            required_vectors: required,
        };
        self
    }

    pub fn economy(mut self, value: f64, max_value: f64, security: f64, min_security: f64) -> Self {
        self.node.economy = TargetState {
            value,
            max_value,
            security,
            min_security,
        };
        self
    }

    pub fn required_skill(mut self, skill: u32) -> Self {
        self.node.required_skill = skill;
        self
    }

    pub fn owned(mut self) -> Self {
        self.node.owned = true;
        self.node.privilege.has_admin = true;
        self
    }

    pub fn backdoor(mut self) -> Self {
        self.node.backdoor = true;
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}
