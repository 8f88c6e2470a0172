//! Argon2id credential hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::todo::{
    domain::CredentialHash,
    ports::{CredentialError, CredentialHasher},
};

/// [`CredentialHasher`] producing PHC-formatted Argon2id hashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2CredentialHasher;

impl Argon2CredentialHasher {
    /// Creates a hasher with the library's default Argon2id parameters.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, secret: &str) -> Result<CredentialHash, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|err| CredentialError::Hash(err.to_string()))?;
        Ok(CredentialHash::new(hash.to_string()))
    }

    fn verify(&self, secret: &str, hash: &CredentialHash) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(hash.as_str())
            .map_err(|err| CredentialError::MalformedHash(err.to_string()))?;
        match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialError::MalformedHash(err.to_string())),
        }
    }
}
