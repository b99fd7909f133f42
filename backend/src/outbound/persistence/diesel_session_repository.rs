//! PostgreSQL-backed `SessionRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SessionRepository, SessionRepositoryError};
use crate::domain::{Player, PlayerId, SessionToken};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewSessionRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{sessions, users};

/// Diesel-backed implementation of the `SessionRepository` port.
#[derive(Clone)]
pub struct DieselSessionRepository {
    pool: DbPool,
}

impl DieselSessionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SessionRepositoryError {
    map_basic_pool_error(error, SessionRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SessionRepositoryError {
    map_basic_diesel_error(
        error,
        SessionRepositoryError::query,
        SessionRepositoryError::connection,
    )
}

#[async_trait]
impl SessionRepository for DieselSessionRepository {
    async fn create(
        &self,
        token: &SessionToken,
        player_id: PlayerId,
        created_at: DateTime<Utc>,
    ) -> Result<(), SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(sessions::table)
            .values(&NewSessionRow {
                token: token.as_str(),
                user_id: player_id.get(),
                created_at,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_player(
        &self,
        token: &SessionToken,
    ) -> Result<Option<Player>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = sessions::table
            .inner_join(users::table)
            .filter(sessions::token.eq(token.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            Player::try_from(row).map_err(|err| SessionRepositoryError::query(err.to_string()))
        })
        .transpose()
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(sessions::table.filter(sessions::token.eq(token.as_str())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
