//! Driving port for tournament mutations: fixtures and score reports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, MatchId, MatchView, PlayerId, Principal, RoundView};

/// Request to generate the round-robin schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateFixturesRequest {
    /// Participants in schedule order; all player-role accounts by id when
    /// omitted.
    pub player_ids: Option<Vec<PlayerId>>,
}

/// Response from fixture generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateFixturesResponse {
    /// `false` when matches already existed and nothing was written.
    pub created: bool,
    /// The stored schedule after the call.
    pub rounds: Vec<RoundView>,
}

/// A participant's score report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitConfirmationRequest {
    /// Match being reported.
    pub match_id: MatchId,
    /// Authenticated submitter.
    pub principal: Principal,
    /// Raw score of player1, validated by the service.
    pub score1: i64,
    /// Raw score of player2, validated by the service.
    pub score2: i64,
}

/// Driving port for tournament write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TournamentCommand: Send + Sync {
    /// Create the schedule once; later calls report the existing rounds.
    ///
    /// Fails with `not_found` for unknown ids and `invalid_request` for
    /// viewers or duplicated ids.
    async fn generate_fixtures(
        &self,
        request: GenerateFixturesRequest,
    ) -> Result<GenerateFixturesResponse, Error>;

    /// Record a report and return the match as the submitter now sees it.
    ///
    /// Fails with `forbidden` when the principal is not a player or not a
    /// participant, `not_found` for unknown matches, `conflict` when the
    /// match is already confirmed and `invalid_request` for out-of-range
    /// scores.
    async fn submit_confirmation(
        &self,
        request: SubmitConfirmationRequest,
    ) -> Result<MatchView, Error>;
}
