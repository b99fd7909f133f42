//! Port for bearer session persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Player, PlayerId, SessionToken};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session repository adapters.
    pub enum SessionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "session repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "session repository query failed: {message}",
    }
}

/// Port for issuing, resolving and revoking session tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session for `player_id`.
    async fn create(
        &self,
        token: &SessionToken,
        player_id: PlayerId,
        created_at: DateTime<Utc>,
    ) -> Result<(), SessionRepositoryError>;

    /// Resolve the account owning `token`.
    async fn find_player(
        &self,
        token: &SessionToken,
    ) -> Result<Option<Player>, SessionRepositoryError>;

    /// Remove a session; unknown tokens are ignored.
    async fn delete(&self, token: &SessionToken) -> Result<(), SessionRepositoryError>;
}
