//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live here so
//! every adapter validates rows the same way.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    ConfirmedResult, DisplayName, Handle, Match, MatchDraft, MatchId, Player, PlayerId,
    ScoreConfirmation, ScorePair,
};

use super::schema::{matches, score_confirmations, sessions, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub handle: String,
    pub display_name: String,
    pub role: String,
    pub password_hash: String,
}

/// Insertable struct for creating new accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub handle: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
}

/// Insertable struct for sessions.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub token: &'a str,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the matches table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = matches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MatchRow {
    pub id: i64,
    pub round_number: i32,
    pub table_number: i32,
    pub player1_id: i64,
    pub player2_id: i64,
    pub confirmed_score1: Option<i32>,
    pub confirmed_score2: Option<i32>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// Insertable struct for scheduled matches.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = matches)]
pub(crate) struct NewMatchRow {
    pub round_number: i32,
    pub table_number: i32,
    pub player1_id: i64,
    pub player2_id: i64,
}

/// Row struct for reading from the score_confirmations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = score_confirmations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConfirmationRow {
    pub match_id: i64,
    pub player_id: i64,
    pub score1: i32,
    pub score2: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for the confirmation upsert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = score_confirmations)]
pub(crate) struct NewConfirmationRow {
    pub match_id: i64,
    pub player_id: i64,
    pub score1: i32,
    pub score2: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row that violates a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{table} row {id} is invalid: {reason}")]
pub(crate) struct InvalidRow {
    pub table: &'static str,
    pub id: i64,
    pub reason: String,
}

impl InvalidRow {
    fn new(table: &'static str, id: i64, reason: impl ToString) -> Self {
        Self {
            table,
            id,
            reason: reason.to_string(),
        }
    }
}

fn player_id(table: &'static str, row_id: i64, raw: i64) -> Result<PlayerId, InvalidRow> {
    PlayerId::new(raw).map_err(|err| InvalidRow::new(table, row_id, err))
}

fn score_pair(table: &'static str, row_id: i64, a: i32, b: i32) -> Result<ScorePair, InvalidRow> {
    ScorePair::try_from_raw(i64::from(a), i64::from(b))
        .map_err(|err| InvalidRow::new(table, row_id, err))
}

fn ordinal(table: &'static str, row_id: i64, raw: i32) -> Result<u32, InvalidRow> {
    u32::try_from(raw).map_err(|err| InvalidRow::new(table, row_id, err))
}

impl TryFrom<UserRow> for Player {
    type Error = InvalidRow;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(Self {
            id: player_id("users", id, row.id)?,
            handle: Handle::new(&row.handle).map_err(|err| InvalidRow::new("users", id, err))?,
            display_name: DisplayName::new(&row.display_name)
                .map_err(|err| InvalidRow::new("users", id, err))?,
            role: row
                .role
                .parse()
                .map_err(|err| InvalidRow::new("users", id, err))?,
        })
    }
}

impl TryFrom<MatchRow> for Match {
    type Error = InvalidRow;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "matches";
        let confirmed = match (row.confirmed_score1, row.confirmed_score2) {
            (Some(a), Some(b)) => Some(ConfirmedResult {
                score: score_pair(TABLE, row.id, a, b)?,
                confirmed_at: row.confirmed_at,
            }),
            (None, None) => None,
            _ => {
                return Err(InvalidRow::new(
                    TABLE,
                    row.id,
                    "only one confirmed score is set",
                ));
            }
        };

        Match::new(MatchDraft {
            id: MatchId::new(row.id),
            round_number: ordinal(TABLE, row.id, row.round_number)?,
            table_number: ordinal(TABLE, row.id, row.table_number)?,
            player1: player_id(TABLE, row.id, row.player1_id)?,
            player2: player_id(TABLE, row.id, row.player2_id)?,
            confirmed,
        })
        .map_err(|err| InvalidRow::new(TABLE, row.id, err))
    }
}

impl TryFrom<ConfirmationRow> for ScoreConfirmation {
    type Error = InvalidRow;

    fn try_from(row: ConfirmationRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "score_confirmations";
        Ok(Self {
            match_id: MatchId::new(row.match_id),
            player_id: player_id(TABLE, row.match_id, row.player_id)?,
            score: score_pair(TABLE, row.match_id, row.score1, row.score2)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&ScoreConfirmation> for NewConfirmationRow {
    fn from(value: &ScoreConfirmation) -> Self {
        Self {
            match_id: value.match_id.get(),
            player_id: value.player_id.get(),
            score1: i32::from(value.score.score1.get()),
            score2: i32::from(value.score.score2.get()),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Row-to-domain conversion coverage.
    use rstest::rstest;

    use super::*;
    use crate::domain::Role;

    fn user_row(role: &str) -> UserRow {
        UserRow {
            id: 7,
            handle: "alice".to_owned(),
            display_name: "Alice Mercer".to_owned(),
            role: role.to_owned(),
            password_hash: "salt$00".to_owned(),
        }
    }

    fn match_row(score1: Option<i32>, score2: Option<i32>) -> MatchRow {
        MatchRow {
            id: 3,
            round_number: 2,
            table_number: 1,
            player1_id: 1,
            player2_id: 2,
            confirmed_score1: score1,
            confirmed_score2: score2,
            confirmed_at: None,
        }
    }

    #[rstest]
    #[case("player", Role::Player)]
    #[case("viewer", Role::Viewer)]
    fn user_rows_convert(#[case] raw: &str, #[case] expected: Role) {
        let player = Player::try_from(user_row(raw)).expect("valid row");
        assert_eq!(player.role, expected);
        assert_eq!(player.id.get(), 7);
    }

    #[rstest]
    fn unknown_roles_are_invalid() {
        let err = Player::try_from(user_row("admin")).expect_err("unknown role");
        assert_eq!(err.table, "users");
    }

    #[rstest]
    #[case(None, None, false)]
    #[case(Some(2), Some(1), true)]
    fn match_rows_convert(
        #[case] score1: Option<i32>,
        #[case] score2: Option<i32>,
        #[case] confirmed: bool,
    ) {
        let game = Match::try_from(match_row(score1, score2)).expect("valid row");
        assert_eq!(game.is_confirmed(), confirmed);
        assert_eq!(game.round_number(), 2);
    }

    #[rstest]
    #[case(Some(2), None)]
    #[case(Some(-1), Some(0))]
    fn half_confirmed_or_negative_rows_are_invalid(
        #[case] score1: Option<i32>,
        #[case] score2: Option<i32>,
    ) {
        assert!(Match::try_from(match_row(score1, score2)).is_err());
    }
}
