//! Hierarchical to-do lists for canopy.
//!
//! Users own lists, lists own tasks, and tasks nest under other tasks up to
//! a bounded depth. The module follows hexagonal architecture:
//!
//! - Domain records and validated scalars in [`domain`]
//! - The task hierarchy engine in [`hierarchy`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod hierarchy;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
