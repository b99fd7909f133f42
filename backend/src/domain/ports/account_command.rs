//! Driving ports for accounts and identity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, LoginCredentials, Player, Principal, Registration, SessionToken};

/// A signed-in account and its bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: SessionToken,
    pub user: Player,
}

/// Driving port for registration and session lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account and sign it in. Duplicate handles are a `conflict`.
    async fn register(&self, registration: &Registration) -> Result<AuthSession, Error>;

    /// Check credentials and issue a new token; failures are `unauthorized`.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error>;

    /// Revoke a token. Unknown tokens succeed.
    async fn logout(&self, token: &SessionToken) -> Result<(), Error>;
}

/// Identity capability consumed by the tournament surface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check credentials without issuing a session.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error>;

    /// Resolve a token to its principal, `None` when unknown.
    async fn resolve_principal(&self, token: &SessionToken) -> Result<Option<Principal>, Error>;

    /// Account owning a token; `unauthorized` when unknown.
    async fn current_user(&self, token: &SessionToken) -> Result<Player, Error>;
}
