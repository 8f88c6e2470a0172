//! Credential hashing capability.

use crate::todo::domain::CredentialHash;
use thiserror::Error;

/// Errors returned by credential hashers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// Producing a hash failed.
    #[error("failed to hash credential: {0}")]
    Hash(String),

    /// The stored hash could not be parsed.
    #[error("stored credential hash is malformed: {0}")]
    MalformedHash(String),
}

/// Turns secrets into opaque verifiers and checks secrets against them.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a secret.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Hash`] when hashing fails.
    fn hash(&self, secret: &str) -> Result<CredentialHash, CredentialError>;

    /// Returns `true` when `secret` matches `hash`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::MalformedHash`] when the stored hash cannot
    /// be parsed.
    fn verify(&self, secret: &str, hash: &CredentialHash) -> Result<bool, CredentialError>;
}
