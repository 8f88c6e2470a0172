//! Canopy: a hierarchical to-do engine.
//!
//! Users own lists, lists own tasks, and tasks nest under other tasks up to
//! a configurable depth. The crate enforces the tree rules (no cycles, a
//! bounded depth, parent and child in the same list), cascades completion
//! down and re-opening up, and applies every multi-row change atomically.
//!
//! # Architecture
//!
//! The [`todo`] context follows hexagonal architecture:
//!
//! - **Domain**: validated records and identifiers
//! - **Hierarchy**: the tree algorithms over an in-memory task forest
//! - **Ports**: storage, credential hashing, and caller resolution traits
//! - **Adapters**: in-memory and `PostgreSQL` stores, Argon2 hashing, and
//!   in-memory sessions
//! - **Services**: account and list/task use-cases
//!
//! # Modules
//!
//! - [`config`]: environment-driven configuration
//! - [`telemetry`]: tracing subscriber setup
//! - [`todo`]: the to-do bounded context

pub mod config;
pub mod telemetry;
pub mod todo;
