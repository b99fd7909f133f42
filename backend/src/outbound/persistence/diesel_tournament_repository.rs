//! PostgreSQL-backed `TournamentRepository` implementation using Diesel ORM.
//!
//! Reads run in a read-only `REPEATABLE READ` transaction so every table is
//! observed at the same MVCC snapshot. Score submissions lock the match row
//! with `SELECT ... FOR UPDATE`, so concurrent reports for one match are
//! applied one after another and the consensus check always sees the latest
//! confirmations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{
    FixtureInsertOutcome, TournamentRepository, TournamentRepositoryError,
};
use crate::domain::{
    FixtureSchedule, Match, Player, ScoreConfirmation, ScoreSubmission, SubmissionOutcome,
    SubmissionRejection, TournamentSnapshot, apply_submission,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    ConfirmationRow, InvalidRow, MatchRow, NewConfirmationRow, NewMatchRow, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{matches, score_confirmations, users};

/// Diesel-backed implementation of the `TournamentRepository` port.
#[derive(Clone)]
pub struct DieselTournamentRepository {
    pool: DbPool,
}

impl DieselTournamentRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use scorekeeper::outbound::persistence::{DbPool, DieselTournamentRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/scorekeeper")).await?;
    /// let repository = DieselTournamentRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TournamentRepositoryError {
    map_basic_pool_error(error, TournamentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TournamentRepositoryError {
    map_basic_diesel_error(
        error,
        TournamentRepositoryError::query,
        TournamentRepositoryError::connection,
    )
}

fn map_invalid_row(error: InvalidRow) -> TournamentRepositoryError {
    warn!(table = error.table, id = error.id, reason = %error.reason, "invalid row");
    TournamentRepositoryError::query(error.to_string())
}

fn convert_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, TournamentRepositoryError>
where
    T: TryFrom<R, Error = InvalidRow>,
{
    rows.into_iter()
        .map(T::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_invalid_row)
}

/// Failure inside a write transaction; any variant rolls back.
enum WriteError {
    Diesel(diesel::result::Error),
    Repository(TournamentRepositoryError),
}

impl From<diesel::result::Error> for WriteError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl From<TournamentRepositoryError> for WriteError {
    fn from(value: TournamentRepositoryError) -> Self {
        Self::Repository(value)
    }
}

fn map_write_error(error: WriteError) -> TournamentRepositoryError {
    match error {
        WriteError::Diesel(err) => map_diesel_error(err),
        WriteError::Repository(err) => err,
    }
}

fn to_new_match_row(
    fixture: &crate::domain::Fixture,
) -> Result<NewMatchRow, TournamentRepositoryError> {
    let ordinal = |value: u32| {
        i32::try_from(value)
            .map_err(|_| TournamentRepositoryError::query(format!("ordinal {value} exceeds i32")))
    };
    Ok(NewMatchRow {
        round_number: ordinal(fixture.round_number)?,
        table_number: ordinal(fixture.table_number)?,
        player1_id: fixture.player1.get(),
        player2_id: fixture.player2.get(),
    })
}

#[async_trait]
impl TournamentRepository for DieselTournamentRepository {
    async fn snapshot(&self) -> Result<TournamentSnapshot, TournamentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (user_rows, match_rows, confirmation_rows) = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                async move {
                    let user_rows: Vec<UserRow> = users::table
                        .select(UserRow::as_select())
                        .order_by(users::id)
                        .load(conn)
                        .await?;
                    let match_rows: Vec<MatchRow> = matches::table
                        .select(MatchRow::as_select())
                        .order_by((matches::round_number, matches::table_number, matches::id))
                        .load(conn)
                        .await?;
                    let confirmation_rows: Vec<ConfirmationRow> = score_confirmations::table
                        .select(ConfirmationRow::as_select())
                        .order_by((score_confirmations::match_id, score_confirmations::player_id))
                        .load(conn)
                        .await?;
                    Ok((user_rows, match_rows, confirmation_rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(TournamentSnapshot {
            players: convert_rows::<_, Player>(user_rows)?,
            matches: convert_rows::<_, Match>(match_rows)?,
            confirmations: convert_rows::<_, ScoreConfirmation>(confirmation_rows)?,
        })
    }

    async fn record_confirmation(
        &self,
        submission: &ScoreSubmission,
        at: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, TournamentRepositoryError> {
        let submission = *submission;
        let match_id = submission.match_id.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Result<SubmissionOutcome, WriteError> = conn
            .transaction(|conn| {
                async move {
                    let row: Option<MatchRow> = matches::table
                        .find(match_id)
                        .select(MatchRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Err(TournamentRepositoryError::match_not_found(
                            submission.match_id,
                        )
                        .into());
                    };
                    let mut game = Match::try_from(row).map_err(map_invalid_row)?;

                    let rows: Vec<ConfirmationRow> = score_confirmations::table
                        .filter(score_confirmations::match_id.eq(match_id))
                        .select(ConfirmationRow::as_select())
                        .order_by(score_confirmations::player_id)
                        .load(conn)
                        .await?;
                    let mut reports: Vec<ScoreConfirmation> = convert_rows(rows)?;

                    let outcome = apply_submission(&mut game, &mut reports, &submission, at)
                        .map_err(TournamentRepositoryError::rejected)?;

                    diesel::insert_into(score_confirmations::table)
                        .values(&NewConfirmationRow::from(&outcome.confirmation))
                        .on_conflict((score_confirmations::match_id, score_confirmations::player_id))
                        .do_update()
                        .set((
                            score_confirmations::score1.eq(excluded(score_confirmations::score1)),
                            score_confirmations::score2.eq(excluded(score_confirmations::score2)),
                            score_confirmations::updated_at
                                .eq(excluded(score_confirmations::updated_at)),
                        ))
                        .execute(conn)
                        .await?;

                    if let Some(result) = outcome.newly_confirmed {
                        let updated = diesel::update(
                            matches::table
                                .find(match_id)
                                .filter(matches::confirmed_score1.is_null()),
                        )
                        .set((
                            matches::confirmed_score1
                                .eq(Some(i32::from(result.score.score1.get()))),
                            matches::confirmed_score2
                                .eq(Some(i32::from(result.score.score2.get()))),
                            matches::confirmed_at.eq(result.confirmed_at),
                        ))
                        .execute(conn)
                        .await?;
                        if updated != 1 {
                            return Err(TournamentRepositoryError::rejected(
                                SubmissionRejection::AlreadyConfirmed {
                                    match_id: submission.match_id,
                                },
                            )
                            .into());
                        }
                    }

                    Ok(outcome)
                }
                .scope_boxed()
            })
            .await;

        result.map_err(map_write_error)
    }

    async fn insert_fixtures_if_empty(
        &self,
        schedule: &FixtureSchedule,
    ) -> Result<FixtureInsertOutcome, TournamentRepositoryError> {
        let rows = schedule
            .fixtures()
            .map(to_new_match_row)
            .collect::<Result<Vec<_>, _>>()?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                // Serialise concurrent generators: the emptiness check and the
                // insert must see the same table state.
                diesel::sql_query("LOCK TABLE matches IN SHARE ROW EXCLUSIVE MODE")
                    .execute(conn)
                    .await?;
                let existing: i64 = matches::table.count().get_result(conn).await?;
                if existing > 0 {
                    return Ok(FixtureInsertOutcome::AlreadyPresent);
                }
                if rows.is_empty() {
                    return Ok(FixtureInsertOutcome::Inserted { matches: 0 });
                }

                let inserted = diesel::insert_into(matches::table)
                    .values(&rows)
                    .execute(conn)
                    .await?;
                Ok(FixtureInsertOutcome::Inserted { matches: inserted })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn count_matches(&self) -> Result<usize, TournamentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = matches::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        usize::try_from(count)
            .map_err(|_| TournamentRepositoryError::query(format!("invalid match count {count}")))
    }
}
