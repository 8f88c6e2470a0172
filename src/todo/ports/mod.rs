//! Port contracts for the todo context.
//!
//! Ports define infrastructure-agnostic interfaces used by todo services.

pub mod access;
pub mod credentials;
pub mod store;

pub use access::{CallerResolver, SessionToken, Unauthenticated, UserIdentity};
pub use credentials::{CredentialError, CredentialHasher};
pub use store::{ListSnapshot, TaskChangeSet, TodoStore, TodoStoreError, TodoStoreResult};
