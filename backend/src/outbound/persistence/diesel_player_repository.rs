//! PostgreSQL-backed `PlayerRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{
    NewPlayer, PlayerRepository, PlayerRepositoryError, StoredCredentials,
};
use crate::domain::{Player, PlayerId};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{InvalidRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `PlayerRepository` port.
#[derive(Clone)]
pub struct DieselPlayerRepository {
    pool: DbPool,
}

impl DieselPlayerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PlayerRepositoryError {
    map_basic_pool_error(error, PlayerRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PlayerRepositoryError {
    map_basic_diesel_error(
        error,
        PlayerRepositoryError::query,
        PlayerRepositoryError::connection,
    )
}

fn to_player(row: UserRow) -> Result<Player, PlayerRepositoryError> {
    Player::try_from(row).map_err(|err: InvalidRow| {
        warn!(id = err.id, reason = %err.reason, "invalid user row");
        PlayerRepositoryError::query(err.to_string())
    })
}

#[async_trait]
impl PlayerRepository for DieselPlayerRepository {
    async fn create(&self, player: &NewPlayer) -> Result<Player, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            handle: player.handle.as_ref(),
            display_name: player.display_name.as_ref(),
            role: player.role.as_str(),
            password_hash: player.password_hash.as_str(),
        };

        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    PlayerRepositoryError::duplicate_handle(player.handle.as_ref())
                } else {
                    map_diesel_error(err)
                }
            })?;
        to_player(inserted)
    }

    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_player).transpose()
    }

    async fn find_credentials(
        &self,
        handle: &str,
    ) -> Result<Option<StoredCredentials>, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::handle.eq(handle))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            let password_hash = row.password_hash.clone();
            to_player(row).map(|player| StoredCredentials {
                player,
                password_hash,
            })
        })
        .transpose()
    }

    async fn list(&self) -> Result<Vec<Player>, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by(users::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_player).collect()
    }

    async fn reset(&self) -> Result<(), PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(users::table)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
