//! Access layer port: resolving callers to user identities.

use crate::todo::domain::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Authenticated caller, as resolved by the access layer.
///
/// Services take an identity rather than a raw user id so ownership checks
/// always run against a resolved caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserIdentity {
    user_id: UserId,
    username: String,
}

impl UserIdentity {
    /// Creates an identity for a resolved user.
    #[must_use]
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Returned when a request carries no valid credentials.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("caller is not authenticated")]
pub struct Unauthenticated;

/// Opaque session token handed to a signed-in caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Creates a new random token.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a token from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves an incoming request of type `R` to the calling user.
#[async_trait]
pub trait CallerResolver<R>: Send + Sync
where
    R: Sync + ?Sized,
{
    /// Resolves the caller of `request`.
    ///
    /// # Errors
    ///
    /// Returns [`Unauthenticated`] when the request carries no valid
    /// credentials.
    async fn resolve_caller(&self, request: &R) -> Result<UserIdentity, Unauthenticated>;
}
