//! In-memory session registry acting as the access layer.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::todo::ports::{CallerResolver, SessionToken, Unauthenticated, UserIdentity};

/// Maps opaque session tokens to signed-in users.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionToken, UserIdentity>>>,
}

impl InMemorySessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `identity` and returns its token.
    ///
    /// # Errors
    ///
    /// Returns [`Unauthenticated`] when the registry lock is poisoned.
    pub fn open(&self, identity: UserIdentity) -> Result<SessionToken, Unauthenticated> {
        let token = SessionToken::new();
        let mut sessions = self.sessions.write().map_err(|_| Unauthenticated)?;
        sessions.insert(token, identity);
        Ok(token)
    }

    /// Closes a session. Returns `true` when the token was open.
    pub fn close(&self, token: SessionToken) -> bool {
        self.sessions
            .write()
            .is_ok_and(|mut sessions| sessions.remove(&token).is_some())
    }
}

#[async_trait]
impl CallerResolver<SessionToken> for InMemorySessionRegistry {
    async fn resolve_caller(&self, request: &SessionToken) -> Result<UserIdentity, Unauthenticated> {
        let sessions = self.sessions.read().map_err(|_| Unauthenticated)?;
        sessions.get(request).cloned().ok_or(Unauthenticated)
    }
}
