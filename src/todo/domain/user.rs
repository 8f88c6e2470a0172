//! User accounts and their validated credentials.

use super::{TodoDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum username length, counted in characters after trimming.
const MIN_USERNAME_CHARS: usize = 3;

/// Maximum username length, counted in characters after trimming.
pub const MAX_USERNAME_CHARS: usize = 80;

/// Maximum email length, counted in characters after normalization.
pub const MAX_EMAIL_CHARS: usize = 120;

/// Unique login name for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a validated, trimmed username.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::InvalidUsername`] when the trimmed value is
    /// shorter than three characters and [`TodoDomainError::TooLong`] when it
    /// exceeds [`MAX_USERNAME_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, TodoDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let length = trimmed.chars().count();
        if length < MIN_USERNAME_CHARS {
            return Err(TodoDomainError::InvalidUsername(raw));
        }
        if length > MAX_USERNAME_CHARS {
            return Err(TodoDomainError::TooLong {
                field: "username",
                max: MAX_USERNAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the username as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized (trimmed, lower-cased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a normalized email address.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::InvalidEmail`] when the value has no `@`
    /// and [`TodoDomainError::TooLong`] when it exceeds [`MAX_EMAIL_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, TodoDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_lowercase();
        if !normalized.contains('@') {
            return Err(TodoDomainError::InvalidEmail(raw));
        }
        if normalized.chars().count() > MAX_EMAIL_CHARS {
            return Err(TodoDomainError::TooLong {
                field: "email",
                max: MAX_EMAIL_CHARS,
            });
        }
        Ok(Self(normalized))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque credential verifier produced by a
/// [`CredentialHasher`](crate::todo::ports::CredentialHasher).
///
/// The domain never inspects the value; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wraps an encoded credential hash.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(..)")
    }
}

/// User account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: EmailAddress,
    credential: CredentialHash,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted user identifier.
    pub id: UserId,
    /// Persisted username.
    pub username: Username,
    /// Persisted email address.
    pub email: EmailAddress,
    /// Persisted credential hash.
    pub credential: CredentialHash,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user account.
    #[must_use]
    pub fn new(
        username: Username,
        email: EmailAddress,
        credential: CredentialHash,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            credential,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            username: data.username,
            email: data.email,
            credential: data.credential,
            created_at: data.created_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the stored credential hash.
    #[must_use]
    pub const fn credential(&self) -> &CredentialHash {
        &self.credential
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
