// src/substrate/mod.rs

//! Execution substrate layer.
//!
//! - [`backend`] defines the [`Substrate`] trait the scheduler core talks to.
//! - [`world`] loads a TOML description of a simulated network.
//! - [`simulated`] provides [`SimulatedSubstrate`], the substrate the binary
//!   runs against.

pub mod backend;
pub mod simulated;
pub mod world;

pub use backend::{OperationEffects, RunHandle, RunRequest, Substrate};
pub use simulated::SimulatedSubstrate;
pub use world::{World, load_world, parse_world};
