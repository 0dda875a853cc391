// src/substrate/world.rs

//! TOML description of a simulated network.
//!
//! ```toml
//! skill = 50
//! vectors = 2
//!
//! [programs."weaken.js"]
//! cost = 1.75
//! operation = "weaken"
//!
//! [[node]]
//! name = "home"
//! links = ["n00dles"]
//! ram = 64.0
//! owned = true
//!
//! [[node]]
//! name = "n00dles"
//! ram = 4.0
//! admin = true
//! money = 70000.0
//! max_money = 1750000.0
//! security = 1.0
//! min_security = 1.0
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use petgraph::algo::connected_components;
use petgraph::graphmap::UnGraphMap;
use serde::Deserialize;
use tracing::warn;

use crate::errors::{FleetError, Result};
use crate::types::{NodeName, Operation, parse_duration};

/// Raw world file.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldFile {
    #[serde(default = "default_skill")]
    pub skill: u32,

    #[serde(default)]
    pub vectors: u32,

    #[serde(default)]
    pub programs: BTreeMap<String, WorldProgram>,

    #[serde(default)]
    pub tuning: WorldTuning,

    #[serde(default, rename = "node")]
    pub nodes: Vec<WorldNode>,
}

fn default_skill() -> u32 {
    1
}

/// `[programs."<name>"]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldProgram {
    /// Resource units per thread.
    pub cost: f64,
    /// Operation this program performs against its first argument, if any.
    #[serde(default)]
    pub operation: Option<Operation>,
}

/// `[tuning]`: coefficients of the simulated effect curves.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldTuning {
    #[serde(default = "default_hack_fraction_per_thread")]
    pub hack_fraction_per_thread: f64,
    #[serde(default = "default_hack_security")]
    pub hack_security_per_thread: f64,
    #[serde(default = "default_grow_security")]
    pub grow_security_per_thread: f64,
    #[serde(default = "default_weaken_per_thread")]
    pub weaken_per_thread: f64,
    /// Grow duration as a multiple of hack duration.
    #[serde(default = "default_grow_ratio")]
    pub grow_ratio: f64,
    /// Weaken duration as a multiple of hack duration.
    #[serde(default = "default_weaken_ratio")]
    pub weaken_ratio: f64,
}

fn default_hack_fraction_per_thread() -> f64 {
    0.002
}

fn default_hack_security() -> f64 {
    0.002
}

fn default_grow_security() -> f64 {
    0.004
}

fn default_weaken_per_thread() -> f64 {
    0.05
}

fn default_grow_ratio() -> f64 {
    3.2
}

fn default_weaken_ratio() -> f64 {
    4.0
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            hack_fraction_per_thread: default_hack_fraction_per_thread(),
            hack_security_per_thread: default_hack_security(),
            grow_security_per_thread: default_grow_security(),
            weaken_per_thread: default_weaken_per_thread(),
            grow_ratio: default_grow_ratio(),
            weaken_ratio: default_weaken_ratio(),
        }
    }
}

/// `[[node]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldNode {
    pub name: NodeName,
    #[serde(default)]
    pub links: Vec<NodeName>,
    #[serde(default)]
    pub ram: f64,
    #[serde(default)]
    pub used: f64,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub open_vectors: u32,
    #[serde(default)]
    pub required_vectors: u32,
    #[serde(default)]
    pub required_skill: u32,
    #[serde(default)]
    pub money: f64,
    #[serde(default)]
    pub max_money: f64,
    #[serde(default = "default_security")]
    pub security: f64,
    #[serde(default = "default_security")]
    pub min_security: f64,
    /// Per-thread value multiplier of grow.
    #[serde(default = "default_growth_rate")]
    pub growth_rate: f64,
    /// Hack duration at minimum security.
    #[serde(default = "default_base_time")]
    pub base_time: String,
    #[serde(default)]
    pub owned: bool,
    #[serde(default)]
    pub backdoor: bool,
}

fn default_security() -> f64 {
    1.0
}

fn default_growth_rate() -> f64 {
    1.003
}

fn default_base_time() -> String {
    "1s".to_string()
}

/// Mutable per-node state of the simulation.
#[derive(Debug, Clone)]
pub struct SimNode {
    pub spec: WorldNode,
    pub base_time: Duration,
}

/// Validated world: nodes keyed by name with symmetric adjacency.
#[derive(Debug, Clone)]
pub struct World {
    pub skill: u32,
    pub vectors: u32,
    pub programs: BTreeMap<String, WorldProgram>,
    pub tuning: WorldTuning,
    pub nodes: BTreeMap<NodeName, SimNode>,
    /// Neighbour lists in declaration order, made symmetric.
    pub links: BTreeMap<NodeName, Vec<NodeName>>,
}

/// Load and validate a world file.
pub fn load_world(path: impl AsRef<Path>) -> Result<World> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_world(&contents)
}

/// Parse and validate a world from TOML text.
pub fn parse_world(contents: &str) -> Result<World> {
    let raw: WorldFile = toml::from_str(contents)?;
    World::try_from(raw)
}

impl TryFrom<WorldFile> for World {
    type Error = FleetError;

    fn try_from(raw: WorldFile) -> std::result::Result<Self, Self::Error> {
        if raw.nodes.is_empty() {
            return Err(FleetError::ConfigError(
                "world must contain at least one [[node]]".to_string(),
            ));
        }

        for (name, program) in raw.programs.iter() {
            if !(program.cost > 0.0) {
                return Err(FleetError::ConfigError(format!(
                    "program '{name}' must have a cost > 0 (got {})",
                    program.cost
                )));
            }
        }

        let mut nodes = BTreeMap::new();
        for node in raw.nodes.iter() {
            if nodes.contains_key(&node.name) {
                return Err(FleetError::ConfigError(format!(
                    "node '{}' is declared twice",
                    node.name
                )));
            }
            if !(node.growth_rate > 1.0) {
                return Err(FleetError::ConfigError(format!(
                    "node '{}' must have growth_rate > 1 (got {})",
                    node.name, node.growth_rate
                )));
            }
            let base_time = parse_duration(&node.base_time).map_err(|e| {
                FleetError::ConfigError(format!("node '{}' base_time: {e}", node.name))
            })?;
            nodes.insert(
                node.name.clone(),
                SimNode {
                    spec: node.clone(),
                    base_time,
                },
            );
        }

        let links = symmetric_links(&raw.nodes, &nodes)?;
        warn_on_islands(&links);

        Ok(World {
            skill: raw.skill,
            vectors: raw.vectors,
            programs: raw.programs,
            tuning: raw.tuning,
            nodes,
            links,
        })
    }
}

fn symmetric_links(
    declared: &[WorldNode],
    nodes: &BTreeMap<NodeName, SimNode>,
) -> Result<BTreeMap<NodeName, Vec<NodeName>>> {
    let mut links: BTreeMap<NodeName, Vec<NodeName>> =
        nodes.keys().map(|n| (n.clone(), Vec::new())).collect();

    for node in declared {
        for other in node.links.iter() {
            if !nodes.contains_key(other) {
                return Err(FleetError::ConfigError(format!(
                    "node '{}' links to unknown node '{}'",
                    node.name, other
                )));
            }
            if other == &node.name {
                return Err(FleetError::ConfigError(format!(
                    "node '{}' cannot link to itself",
                    node.name
                )));
            }
            push_unique(&mut links, &node.name, other);
            push_unique(&mut links, other, &node.name);
        }
    }

    Ok(links)
}

fn push_unique(links: &mut BTreeMap<NodeName, Vec<NodeName>>, from: &str, to: &str) {
    if let Some(list) = links.get_mut(from) {
        if !list.iter().any(|n| n == to) {
            list.push(to.to_string());
        }
    }
}

fn warn_on_islands(links: &BTreeMap<NodeName, Vec<NodeName>>) {
    let mut graph: UnGraphMap<&str, ()> = UnGraphMap::new();
    for (name, neighbours) in links.iter() {
        graph.add_node(name.as_str());
        for other in neighbours {
            graph.add_edge(name.as_str(), other.as_str(), ());
        }
    }

    let components = connected_components(&graph);
    if components > 1 {
        warn!(
            components,
            "world network is not connected; some nodes are unreachable from any root"
        );
    }
}
