// src/fleet/mod.rs

//! Fleet-wide allocation of executor capacity to ranked targets.

pub mod allocator;
pub mod pass;

pub use allocator::{AllocationReport, AllocationSettings, Assignment, Exhaustion, FleetAllocator};
pub use pass::{AllocationPass, operation_costs, run_allocation_pass};
