//! Port for the shared match and confirmation store.
//!
//! Every method is one unit of work: adapters either apply all of its effects
//! or none of them, and reads observe a consistent snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    FixtureSchedule, MatchId, ScoreSubmission, SubmissionOutcome, SubmissionRejection,
    TournamentSnapshot,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by tournament repository adapters.
    pub enum TournamentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "tournament repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "tournament repository query failed: {message}",
        /// The referenced match does not exist.
        MatchNotFound { match_id: MatchId } =>
            "match {match_id} not found",
        /// The match refused the submission.
        Rejected { rejection: SubmissionRejection } =>
            "{rejection}",
    }
}

/// Result of an attempt to store a fixture schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureInsertOutcome {
    /// The store was empty and the schedule was written.
    Inserted {
        /// Number of matches created.
        matches: usize,
    },
    /// Matches already existed; nothing was written.
    AlreadyPresent,
}

/// Port for reading and mutating the match set.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Read players, matches and confirmations in one consistent snapshot.
    async fn snapshot(&self) -> Result<TournamentSnapshot, TournamentRepositoryError>;

    /// Upsert the submitter's report and run the consensus check atomically.
    ///
    /// Concurrent submissions to the same match are serialised by the
    /// adapter.
    async fn record_confirmation(
        &self,
        submission: &ScoreSubmission,
        at: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, TournamentRepositoryError>;

    /// Persist `schedule` only when no match exists yet.
    async fn insert_fixtures_if_empty(
        &self,
        schedule: &FixtureSchedule,
    ) -> Result<FixtureInsertOutcome, TournamentRepositoryError>;

    /// Number of stored matches.
    async fn count_matches(&self) -> Result<usize, TournamentRepositoryError>;
}
