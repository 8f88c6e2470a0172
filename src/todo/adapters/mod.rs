//! Adapter implementations for todo ports.

pub mod hashing;
pub mod memory;
pub mod postgres;
