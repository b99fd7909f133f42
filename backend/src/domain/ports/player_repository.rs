//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::{DisplayName, Handle, Player, PlayerId, Role};

use super::define_port_error;

define_port_error! {
    /// Errors raised by player repository adapters.
    pub enum PlayerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "player repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "player repository query failed: {message}",
        /// Another account already owns the handle.
        DuplicateHandle { handle: String } =>
            "handle '{handle}' is already registered",
    }
}

/// Account values to insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub handle: Handle,
    pub display_name: DisplayName,
    pub role: Role,
    /// Output of [`crate::domain::PasswordHasher::hash`].
    pub password_hash: String,
}

/// An account together with its stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub player: Player,
    pub password_hash: String,
}

/// Port for creating and reading accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Insert an account, failing with `DuplicateHandle` when taken.
    async fn create(&self, player: &NewPlayer) -> Result<Player, PlayerRepositoryError>;

    /// Find an account by id.
    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, PlayerRepositoryError>;

    /// Find an account and its hash by normalised handle.
    async fn find_credentials(
        &self,
        handle: &str,
    ) -> Result<Option<StoredCredentials>, PlayerRepositoryError>;

    /// Every account ordered by id.
    async fn list(&self) -> Result<Vec<Player>, PlayerRepositoryError>;

    /// Delete every account; sessions, matches and confirmations cascade.
    async fn reset(&self) -> Result<(), PlayerRepositoryError>;
}
