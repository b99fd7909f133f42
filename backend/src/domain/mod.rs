//! Domain primitives, rules and services.
//!
//! Purpose: define the strongly typed tournament model and the pure rules
//! that act on it (fixtures, consensus, points, standings), plus the services
//! that drive them through ports. Keep types immutable where possible and
//! document invariants and serde contracts in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - Match / ScoreConfirmation: scheduled pairings and score reports.
//! - StandingRow, RoundPoints, RoundStandings: derived tables.
//! - TournamentSnapshot and the view types built from it.
//! - TournamentService, AccountService, DemoSeedService: port drivers.

pub mod account_service;
pub mod auth;
pub mod demo_seed;
pub mod error;
pub mod fixtures;
pub mod matches;
pub mod player;
pub mod ports;
pub mod scoring;
pub mod standings;
pub mod tournament_service;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::account_service::AccountService;
pub use self::auth::{
    AuthValidationError, DEFAULT_PASSWORD_ITERATIONS, LoginCredentials, PASSWORD_MAX,
    PASSWORD_MIN, PasswordHasher, Principal, Registration, SessionToken, bearer_token,
};
pub use self::demo_seed::{DEMO_ROSTER, DemoAccount, DemoSeedService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::fixtures::{Fixture, FixtureError, FixtureSchedule, round_robin};
pub use self::matches::{
    Consensus, ConfirmedResult, Match, MatchDraft, MatchId, MatchStatus, MatchValidationError,
    ScoreConfirmation, ScoreSubmission, SubmissionOutcome, SubmissionRejection, apply_submission,
    distinct_reports, resolve_consensus,
};
pub use self::player::{
    DISPLAY_NAME_MAX, DISPLAY_NAME_MIN, DisplayName, HANDLE_MAX, HANDLE_MIN, Handle, Player,
    PlayerId, PlayerLite, PlayerValidationError, Role, normalize_handle,
};
pub use self::scoring::{
    DRAW_POINTS, LOSS_POINTS, MatchOutcome, SCORE_MAX, Score, ScorePair, ScoreValidationError,
    WIN_POINTS, points,
};
pub use self::standings::{
    PlayerRoundPoints, RoundPoints, RoundStandings, StandingRow, compute_standings, current_round,
    round_is_complete, round_points, rounds_present, standings_by_round,
};
pub use self::tournament_service::TournamentService;
pub use self::views::{LiveSnapshot, MatchView, OwnConfirmation, RoundView, TournamentSnapshot};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use scorekeeper::domain::{DomainResult, Error};
///
/// fn guard(is_player: bool) -> DomainResult<()> {
///     if is_player {
///         Ok(())
///     } else {
///         Err(Error::forbidden("only players may submit scores"))
///     }
/// }
///
/// assert!(guard(true).is_ok());
/// ```
pub type DomainResult<T> = Result<T, Error>;
