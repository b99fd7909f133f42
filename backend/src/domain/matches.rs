//! Matches, score confirmations and the consensus rule.
//!
//! Both participants of a match report a score independently. A match becomes
//! confirmed only when every stored report is identical; until then it is
//! pending (fewer than two distinct reports) or disputed (two or more distinct
//! reports). Confirmed scores are write-once.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, ScorePair};

/// Stable match identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(i64);

impl MatchId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw numeric value, as stored.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors raised when building a [`Match`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchValidationError {
    /// Rounds are numbered from 1.
    #[error("round number must be at least 1")]
    InvalidRound,
    /// Tables are numbered from 1.
    #[error("table number must be at least 1")]
    InvalidTable,
    /// A player cannot face themselves.
    #[error("match players must be distinct (player {0} listed twice)")]
    SamePlayer(PlayerId),
}

/// Final result recorded once both reports agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedResult {
    /// Agreed score.
    pub score: ScorePair,
    /// When consensus was reached, if recorded.
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// Draft values for building a [`Match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchDraft {
    /// Store identifier.
    pub id: MatchId,
    /// 1-based round number.
    pub round_number: u32,
    /// 1-based table number.
    pub table_number: u32,
    /// First listed player.
    pub player1: PlayerId,
    /// Second listed player.
    pub player2: PlayerId,
    /// Confirmed result, when already agreed.
    pub confirmed: Option<ConfirmedResult>,
}

/// A scheduled pairing between two distinct players.
///
/// ## Invariants
/// - `round_number` and `table_number` are at least 1.
/// - `player1 != player2`.
/// - Once `confirmed` is set it is never replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    id: MatchId,
    round_number: u32,
    table_number: u32,
    player1: PlayerId,
    player2: PlayerId,
    confirmed: Option<ConfirmedResult>,
}

impl Match {
    /// Validate a draft into a match.
    pub fn new(draft: MatchDraft) -> Result<Self, MatchValidationError> {
        let MatchDraft {
            id,
            round_number,
            table_number,
            player1,
            player2,
            confirmed,
        } = draft;
        if round_number == 0 {
            return Err(MatchValidationError::InvalidRound);
        }
        if table_number == 0 {
            return Err(MatchValidationError::InvalidTable);
        }
        if player1 == player2 {
            return Err(MatchValidationError::SamePlayer(player1));
        }
        Ok(Self {
            id,
            round_number,
            table_number,
            player1,
            player2,
            confirmed,
        })
    }

    /// Store identifier.
    pub fn id(&self) -> MatchId {
        self.id
    }

    /// 1-based round number.
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// 1-based table number.
    pub fn table_number(&self) -> u32 {
        self.table_number
    }

    /// First listed player.
    pub fn player1(&self) -> PlayerId {
        self.player1
    }

    /// Second listed player.
    pub fn player2(&self) -> PlayerId {
        self.player2
    }

    /// Agreed result, if any.
    pub fn confirmed(&self) -> Option<&ConfirmedResult> {
        self.confirmed.as_ref()
    }

    /// Agreed score, if any.
    pub fn confirmed_score(&self) -> Option<ScorePair> {
        self.confirmed.map(|result| result.score)
    }

    /// Whether the result is final.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed.is_some()
    }

    /// Whether `player` is one of the two participants.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1 == player || self.player2 == player
    }

    /// Check that `player` may still submit a report for this match.
    pub fn ensure_accepts_report_from(&self, player: PlayerId) -> Result<(), SubmissionRejection> {
        if !self.involves(player) {
            return Err(SubmissionRejection::NotParticipant {
                match_id: self.id,
                player_id: player,
            });
        }
        if self.is_confirmed() {
            return Err(SubmissionRejection::AlreadyConfirmed { match_id: self.id });
        }
        Ok(())
    }

    /// Record the agreed score. Fails if a result is already stored.
    pub fn confirm(
        &mut self,
        score: ScorePair,
        confirmed_at: DateTime<Utc>,
    ) -> Result<ConfirmedResult, SubmissionRejection> {
        if self.is_confirmed() {
            return Err(SubmissionRejection::AlreadyConfirmed { match_id: self.id });
        }
        let result = ConfirmedResult {
            score,
            confirmed_at: Some(confirmed_at),
        };
        self.confirmed = Some(result);
        Ok(result)
    }
}

/// Reported match state derived from the stored confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Awaiting reports, or only one distinct report so far.
    Pending,
    /// Two or more distinct reports and no agreement yet.
    Disputed,
    /// Final result recorded.
    Confirmed,
}

impl MatchStatus {
    /// Derive the status of `game` from its confirmations.
    pub fn derive(game: &Match, confirmations: &[ScoreConfirmation]) -> Self {
        if game.is_confirmed() {
            return Self::Confirmed;
        }
        if distinct_reports(confirmations) > 1 {
            Self::Disputed
        } else {
            Self::Pending
        }
    }
}

/// Number of distinct score pairs among `confirmations`.
pub fn distinct_reports(confirmations: &[ScoreConfirmation]) -> usize {
    confirmations
        .iter()
        .map(|confirmation| confirmation.score)
        .collect::<HashSet<_>>()
        .len()
}

/// A participant's stored score report.
///
/// At most one exists per (match, player); resubmission replaces the score
/// and refreshes `updated_at` while keeping `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreConfirmation {
    /// Match being reported.
    pub match_id: MatchId,
    /// Reporting participant.
    pub player_id: PlayerId,
    /// Reported score as (player1, player2).
    pub score: ScorePair,
    /// First submission time.
    pub created_at: DateTime<Utc>,
    /// Latest submission time.
    pub updated_at: DateTime<Utc>,
}

/// A participant's request to record a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    /// Target match.
    pub match_id: MatchId,
    /// Submitting participant.
    pub player_id: PlayerId,
    /// Reported score as (player1, player2).
    pub score: ScorePair,
}

/// Reasons a submission is refused by the match itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionRejection {
    /// The submitter does not play in this match.
    #[error("player {player_id} is not assigned to match {match_id}")]
    NotParticipant {
        /// Match reported against.
        match_id: MatchId,
        /// Rejected submitter.
        player_id: PlayerId,
    },
    /// The match already has a final result.
    #[error("scores are already confirmed for match {match_id}")]
    AlreadyConfirmed {
        /// Finalised match.
        match_id: MatchId,
    },
}

/// Outcome of comparing a match's confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consensus {
    /// Fewer than two reports exist.
    AwaitingReports,
    /// Every report carries this score.
    Agreed(ScorePair),
    /// At least two reports differ.
    Disagreed,
}

/// Compare the report of the lowest player id against every other report.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use scorekeeper::domain::{
///     resolve_consensus, Consensus, MatchId, PlayerId, ScoreConfirmation, ScorePair,
/// };
///
/// let now = Utc::now();
/// let report = |player: i64, a: i64, b: i64| ScoreConfirmation {
///     match_id: MatchId::new(1),
///     player_id: PlayerId::new(player).unwrap(),
///     score: ScorePair::try_from_raw(a, b).unwrap(),
///     created_at: now,
///     updated_at: now,
/// };
///
/// let agreed = resolve_consensus(&[report(2, 2, 1), report(1, 2, 1)]);
/// assert_eq!(agreed, Consensus::Agreed(ScorePair::try_from_raw(2, 1).unwrap()));
/// assert_eq!(resolve_consensus(&[report(1, 2, 1)]), Consensus::AwaitingReports);
/// ```
pub fn resolve_consensus(confirmations: &[ScoreConfirmation]) -> Consensus {
    if confirmations.len() < 2 {
        return Consensus::AwaitingReports;
    }
    let Some(reference) = confirmations
        .iter()
        .min_by_key(|confirmation| confirmation.player_id)
    else {
        return Consensus::AwaitingReports;
    };
    if confirmations
        .iter()
        .all(|confirmation| confirmation.score == reference.score)
    {
        Consensus::Agreed(reference.score)
    } else {
        Consensus::Disagreed
    }
}

/// Effect of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// The submitter's stored report after the upsert.
    pub confirmation: ScoreConfirmation,
    /// Result recorded by this submission, when it produced consensus.
    pub newly_confirmed: Option<ConfirmedResult>,
}

/// Apply a submission to a match and its confirmations in memory.
///
/// Adapters call this inside their unit of work so the precondition checks,
/// the upsert and the consensus transition commit together or not at all.
pub fn apply_submission(
    game: &mut Match,
    confirmations: &mut Vec<ScoreConfirmation>,
    submission: &ScoreSubmission,
    now: DateTime<Utc>,
) -> Result<SubmissionOutcome, SubmissionRejection> {
    game.ensure_accepts_report_from(submission.player_id)?;

    let confirmation = upsert_confirmation(confirmations, submission, now);

    let newly_confirmed = match resolve_consensus(confirmations) {
        Consensus::Agreed(score) => Some(game.confirm(score, now)?),
        Consensus::AwaitingReports | Consensus::Disagreed => None,
    };

    Ok(SubmissionOutcome {
        confirmation,
        newly_confirmed,
    })
}

fn upsert_confirmation(
    confirmations: &mut Vec<ScoreConfirmation>,
    submission: &ScoreSubmission,
    now: DateTime<Utc>,
) -> ScoreConfirmation {
    if let Some(existing) = confirmations
        .iter_mut()
        .find(|confirmation| confirmation.player_id == submission.player_id)
    {
        existing.score = submission.score;
        existing.updated_at = now;
        return *existing;
    }

    let created = ScoreConfirmation {
        match_id: submission.match_id,
        player_id: submission.player_id,
        score: submission.score,
        created_at: now,
        updated_at: now,
    };
    confirmations.push(created);
    created
}
