//! Account registration, authentication, and removal.

use super::{AccountError, AccountResult, RegisterUserRequest, UserView};
use crate::todo::{
    domain::{EmailAddress, TodoDomainError, User, UserId, Username},
    ports::{CredentialHasher, TodoStore, UserIdentity},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Minimum number of characters in a password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Account use-cases backed by the entity store and a credential hasher.
#[derive(Clone)]
pub struct AccountService<S, H, C>
where
    S: TodoStore,
    H: CredentialHasher,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    hasher: Arc<H>,
    clock: Arc<C>,
}

impl<S, H, C> AccountService<S, H, C>
where
    S: TodoStore,
    H: CredentialHasher,
    C: Clock + Send + Sync,
{
    /// Creates a new account service.
    #[must_use]
    pub const fn new(store: Arc<S>, hasher: Arc<H>, clock: Arc<C>) -> Self {
        Self {
            store,
            hasher,
            clock,
        }
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] for a short username, malformed
    /// email, or weak password, and [`AccountError::UsernameTaken`] or
    /// [`AccountError::EmailTaken`] for duplicates.
    pub async fn register(&self, request: RegisterUserRequest) -> AccountResult<UserView> {
        let username = Username::new(request.username)?;
        let email = EmailAddress::new(request.email)?;
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(TodoDomainError::WeakPassword.into());
        }

        let credential = self.hasher.hash(&request.password)?;
        let user = User::new(username, email, credential, &*self.clock);
        self.store.store_user(&user).await?;
        info!(user_id = %user.id(), username = %user.username(), "registered user");
        Ok(UserView::from(&user))
    }

    /// Resolves a username or email plus password to an identity.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] when no account matches
    /// or the password is wrong.
    pub async fn authenticate(&self, login: &str, password: &str) -> AccountResult<UserIdentity> {
        let trimmed = login.trim();
        let lookup = if trimmed.contains('@') {
            trimmed.to_lowercase()
        } else {
            trimmed.to_owned()
        };
        let Some(user) = self.store.find_user_by_login(&lookup).await? else {
            warn!("login attempt for unknown account");
            return Err(AccountError::InvalidCredentials);
        };
        if !self.hasher.verify(password, user.credential())? {
            warn!(user_id = %user.id(), "login attempt with wrong password");
            return Err(AccountError::InvalidCredentials);
        }
        Ok(UserIdentity::new(user.id(), user.username().as_str()))
    }

    /// Returns the public details of an account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::UserNotFound`] when the account does not
    /// exist.
    pub async fn user(&self, id: UserId) -> AccountResult<UserView> {
        self.store
            .find_user(id)
            .await?
            .map(|user| UserView::from(&user))
            .ok_or(AccountError::UserNotFound(id))
    }

    /// Deletes the caller's account with all of its lists and tasks.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::UserNotFound`] when the account is already
    /// gone.
    pub async fn delete_account(&self, caller: &UserIdentity) -> AccountResult<()> {
        self.store.delete_user(caller.user_id()).await?;
        info!(user_id = %caller.user_id(), "deleted account");
        Ok(())
    }
}
