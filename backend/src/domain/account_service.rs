//! Account and identity domain service.
//!
//! Registration, login and logout plus the principal lookups consumed by the
//! tournament surface. PBKDF2 work runs on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountCommand, AuthSession, IdentityProvider, NewPlayer, PlayerRepository,
    PlayerRepositoryError, SessionRepository, SessionRepositoryError, StoredCredentials,
};
use crate::domain::{
    Error, LoginCredentials, PasswordHasher, Player, Principal, Registration, SessionToken,
};

const INVALID_CREDENTIALS: &str = "invalid handle or password";

pub(crate) fn map_player_error(error: PlayerRepositoryError) -> Error {
    match error {
        PlayerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("player repository unavailable: {message}"))
        }
        PlayerRepositoryError::Query { message } => {
            Error::internal(format!("player repository error: {message}"))
        }
        PlayerRepositoryError::DuplicateHandle { handle } => {
            Error::conflict(format!("handle '{handle}' is already registered"))
        }
    }
}

fn map_session_error(error: SessionRepositoryError) -> Error {
    match error {
        SessionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("session repository unavailable: {message}"))
        }
        SessionRepositoryError::Query { message } => {
            Error::internal(format!("session repository error: {message}"))
        }
    }
}

/// Hash a password without stalling the async workers.
pub(crate) async fn hash_password(hasher: PasswordHasher, password: &str) -> Result<String, Error> {
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))
}

async fn verify_password(
    hasher: PasswordHasher,
    password: &str,
    stored: String,
) -> Result<bool, Error> {
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
        .await
        .map_err(|err| Error::internal(format!("password check task failed: {err}")))
}

/// Account service implementing the account and identity driving ports.
#[derive(Clone)]
pub struct AccountService<P, S> {
    player_repo: Arc<P>,
    session_repo: Arc<S>,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
}

impl<P, S> AccountService<P, S> {
    /// Create a new service over the player and session repositories.
    pub fn new(
        player_repo: Arc<P>,
        session_repo: Arc<S>,
        hasher: PasswordHasher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            player_repo,
            session_repo,
            hasher,
            clock,
        }
    }
}

impl<P, S> AccountService<P, S>
where
    P: PlayerRepository,
    S: SessionRepository,
{
    async fn check_credentials(&self, credentials: &LoginCredentials) -> Result<Player, Error> {
        let Some(StoredCredentials {
            player,
            password_hash,
        }) = self
            .player_repo
            .find_credentials(credentials.handle())
            .await
            .map_err(map_player_error)?
        else {
            debug!(handle = credentials.handle(), "login for unknown handle");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        if verify_password(self.hasher, credentials.password(), password_hash).await? {
            Ok(player)
        } else {
            debug!(player_id = %player.id, "password mismatch");
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }

    async fn open_session(&self, user: Player) -> Result<AuthSession, Error> {
        let token = SessionToken::generate();
        self.session_repo
            .create(&token, user.id, self.clock.utc())
            .await
            .map_err(map_session_error)?;
        Ok(AuthSession { token, user })
    }
}

#[async_trait]
impl<P, S> AccountCommand for AccountService<P, S>
where
    P: PlayerRepository,
    S: SessionRepository,
{
    async fn register(&self, registration: &Registration) -> Result<AuthSession, Error> {
        let password_hash = hash_password(self.hasher, registration.password()).await?;
        let user = self
            .player_repo
            .create(&NewPlayer {
                handle: registration.handle().clone(),
                display_name: registration.display_name().clone(),
                role: registration.role(),
                password_hash,
            })
            .await
            .map_err(map_player_error)?;
        info!(player_id = %user.id, handle = %user.handle, role = %user.role, "account registered");
        self.open_session(user).await
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error> {
        let user = self.check_credentials(credentials).await?;
        self.open_session(user).await
    }

    async fn logout(&self, token: &SessionToken) -> Result<(), Error> {
        self.session_repo
            .delete(token)
            .await
            .map_err(map_session_error)
    }
}

#[async_trait]
impl<P, S> IdentityProvider for AccountService<P, S>
where
    P: PlayerRepository,
    S: SessionRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error> {
        let player = self.check_credentials(credentials).await?;
        Ok(Principal::from(&player))
    }

    async fn resolve_principal(&self, token: &SessionToken) -> Result<Option<Principal>, Error> {
        let player = self
            .session_repo
            .find_player(token)
            .await
            .map_err(map_session_error)?;
        Ok(player.as_ref().map(Principal::from))
    }

    async fn current_user(&self, token: &SessionToken) -> Result<Player, Error> {
        self.session_repo
            .find_player(token)
            .await
            .map_err(map_session_error)?
            .ok_or_else(|| Error::unauthorized("session token is invalid or expired"))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
