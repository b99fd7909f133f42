//! Tournament domain service.
//!
//! Implements the fixture and score-report commands plus every read view on
//! top of a [`TournamentRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    FixtureInsertOutcome, GenerateFixturesRequest, GenerateFixturesResponse,
    SubmitConfirmationRequest, TournamentCommand, TournamentQuery, TournamentRepository,
    TournamentRepositoryError,
};
use crate::domain::{
    Error, FixtureSchedule, LiveSnapshot, MatchView, Player, PlayerId, Principal, Role,
    RoundPoints, RoundStandings, RoundView, ScorePair, ScoreSubmission, StandingRow,
    SubmissionRejection, TournamentSnapshot,
};

fn map_repository_error(error: TournamentRepositoryError) -> Error {
    match error {
        TournamentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("tournament repository unavailable: {message}"))
        }
        TournamentRepositoryError::Query { message } => {
            Error::internal(format!("tournament repository error: {message}"))
        }
        TournamentRepositoryError::MatchNotFound { match_id } => {
            Error::not_found(format!("match {match_id} not found"))
        }
        TournamentRepositoryError::Rejected { rejection } => match rejection {
            SubmissionRejection::NotParticipant { .. } => Error::forbidden(rejection.to_string()),
            SubmissionRejection::AlreadyConfirmed { .. } => Error::conflict(rejection.to_string()),
        },
    }
}

/// Pick the schedule participants for a fixture request.
///
/// Without explicit ids every player-role account is used in id order.
fn select_participants(
    players: &[Player],
    requested: Option<&[PlayerId]>,
) -> Result<Vec<PlayerId>, Error> {
    let Some(requested) = requested else {
        let mut ids: Vec<PlayerId> = players
            .iter()
            .filter(|player| player.competes())
            .map(|player| player.id)
            .collect();
        ids.sort_unstable();
        return Ok(ids);
    };

    let directory: HashMap<PlayerId, &Player> =
        players.iter().map(|player| (player.id, player)).collect();
    for id in requested {
        let player = directory
            .get(id)
            .ok_or_else(|| Error::not_found(format!("player {id} not found")))?;
        if !player.competes() {
            return Err(Error::invalid_request(format!(
                "player {id} has role '{}' and cannot be scheduled",
                player.role
            )));
        }
    }
    Ok(requested.to_vec())
}

/// Tournament service implementing the command and query driving ports.
#[derive(Clone)]
pub struct TournamentService<R> {
    tournament_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> TournamentService<R> {
    /// Create a new service over the tournament repository.
    pub fn new(tournament_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tournament_repo,
            clock,
        }
    }
}

impl<R> TournamentService<R>
where
    R: TournamentRepository,
{
    async fn snapshot(&self) -> Result<TournamentSnapshot, Error> {
        self.tournament_repo
            .snapshot()
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R> TournamentCommand for TournamentService<R>
where
    R: TournamentRepository,
{
    async fn generate_fixtures(
        &self,
        request: GenerateFixturesRequest,
    ) -> Result<GenerateFixturesResponse, Error> {
        let before = self.snapshot().await?;
        let participants = select_participants(&before.players, request.player_ids.as_deref())?;
        let schedule = FixtureSchedule::for_players(&participants)
            .map_err(|err| Error::invalid_request(format!("invalid fixture roster: {err}")))?;

        let outcome = self
            .tournament_repo
            .insert_fixtures_if_empty(&schedule)
            .await
            .map_err(map_repository_error)?;

        let created = match outcome {
            FixtureInsertOutcome::Inserted { matches } => {
                info!(
                    players = participants.len(),
                    rounds = schedule.round_count(),
                    matches,
                    "fixtures generated"
                );
                matches > 0
            }
            FixtureInsertOutcome::AlreadyPresent => false,
        };

        let after = self.snapshot().await?;
        Ok(GenerateFixturesResponse {
            created,
            rounds: after.rounds(None),
        })
    }

    async fn submit_confirmation(
        &self,
        request: SubmitConfirmationRequest,
    ) -> Result<MatchView, Error> {
        let SubmitConfirmationRequest {
            match_id,
            principal,
            score1,
            score2,
        } = request;
        if principal.role != Role::Player {
            return Err(Error::forbidden("only players may submit scores"));
        }
        let score = ScorePair::try_from_raw(score1, score2)
            .map_err(|err| Error::invalid_request(format!("invalid score: {err}")))?;

        let submission = ScoreSubmission {
            match_id,
            player_id: principal.id,
            score,
        };
        let outcome = self
            .tournament_repo
            .record_confirmation(&submission, self.clock.utc())
            .await
            .map_err(map_repository_error)?;

        if let Some(result) = outcome.newly_confirmed {
            info!(%match_id, score = %result.score, "match confirmed");
        }

        self.snapshot()
            .await?
            .match_view(match_id, Some(principal.id))
            .ok_or_else(|| Error::internal(format!("match {match_id} vanished after update")))
    }
}

#[async_trait]
impl<R> TournamentQuery for TournamentService<R>
where
    R: TournamentRepository,
{
    async fn rounds(&self, viewer: Option<Principal>) -> Result<Vec<RoundView>, Error> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.rounds(viewer.map(|principal| principal.id)))
    }

    async fn standings(&self, up_to_round: Option<u32>) -> Result<Vec<StandingRow>, Error> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.standings(up_to_round))
    }

    async fn round_points(&self) -> Result<Vec<RoundPoints>, Error> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.round_points())
    }

    async fn standings_by_round(&self) -> Result<Vec<RoundStandings>, Error> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.standings_by_round())
    }

    async fn live_snapshot(&self, viewer: Option<Principal>) -> Result<LiveSnapshot, Error> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.live(viewer.map(|principal| principal.id), self.clock.utc()))
    }
}

#[cfg(test)]
#[path = "tournament_service_tests.rs"]
mod tests;
