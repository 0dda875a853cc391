// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Only configuration and wiring failures are fatal. Everything the
//! scheduler core runs into at dispatch time (infeasible plans, rejected
//! launches, short thread grants) degrades to "do less work this cycle" and
//! is reported through these variants or through plain values.

use thiserror::Error;

use crate::types::{NodeName, Operation};

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Node not found: {0}")]
    UnknownNode(NodeName),

    #[error("Plan for '{target}' is infeasible: {operation} threads resolved to zero under budget")]
    PlanningInfeasible {
        target: NodeName,
        operation: Operation,
    },

    #[error(transparent)]
    Substrate(#[from] SubstrateError),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors reported by an execution substrate when it cannot start a program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubstrateError {
    #[error("substrate rejected '{program}' on '{node}': {reason}")]
    Rejected {
        program: String,
        node: NodeName,
        reason: String,
    },

    #[error("unknown node '{0}'")]
    UnknownNode(NodeName),

    #[error("unknown program '{0}'")]
    UnknownProgram(String),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FleetError>;
