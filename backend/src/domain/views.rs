//! Read models assembled from a consistent tournament snapshot.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::standings::{
    RoundPoints, RoundStandings, StandingRow, compute_standings, current_round, round_is_complete,
    round_points, standings_by_round,
};
use crate::domain::{
    Match, MatchId, MatchStatus, Player, PlayerId, PlayerLite, ScoreConfirmation,
};

/// Everything the read side needs, captured in one unit of work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TournamentSnapshot {
    /// All registered accounts, players and viewers alike.
    pub players: Vec<Player>,
    /// Every scheduled match.
    pub matches: Vec<Match>,
    /// Every stored score report.
    pub confirmations: Vec<ScoreConfirmation>,
}

/// The viewer's own stored report for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnConfirmation {
    /// Reported score of player1.
    pub score1: u16,
    /// Reported score of player2.
    pub score2: u16,
    /// Latest submission time.
    pub updated_at: DateTime<Utc>,
}

/// Match as presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchView {
    /// Store identifier.
    pub id: MatchId,
    /// 1-based round number.
    pub round_number: u32,
    /// 1-based table number.
    pub table_number: u32,
    /// First listed player.
    pub player1: PlayerLite,
    /// Second listed player.
    pub player2: PlayerLite,
    /// Pending or confirmed.
    pub status: MatchStatus,
    /// Agreed score of player1, once confirmed.
    pub confirmed_score1: Option<u16>,
    /// Agreed score of player2, once confirmed.
    pub confirmed_score2: Option<u16>,
    /// When consensus was reached.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Number of stored reports.
    pub confirmations: usize,
    /// Present only when a viewer was supplied and has reported.
    pub my_confirmation: Option<OwnConfirmation>,
}

/// Matches of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    /// 1-based round number.
    pub round_number: u32,
    /// Whether every match of the round is confirmed.
    pub is_complete: bool,
    /// Ordered by table then id.
    pub matches: Vec<MatchView>,
}

/// Combined payload for live displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    /// Clock reading when the payload was built.
    pub generated_at: DateTime<Utc>,
    /// Lowest round still pending, else the last round.
    pub current_round: Option<u32>,
    /// Every round in ascending order.
    pub rounds: Vec<RoundView>,
    /// Cumulative standings over all rounds.
    pub standings: Vec<StandingRow>,
}

impl TournamentSnapshot {
    fn directory(&self) -> HashMap<PlayerId, &Player> {
        self.players.iter().map(|player| (player.id, player)).collect()
    }

    /// Stored reports for one match.
    pub fn confirmations_for(&self, match_id: MatchId) -> Vec<ScoreConfirmation> {
        self.confirmations
            .iter()
            .filter(|confirmation| confirmation.match_id == match_id)
            .copied()
            .collect()
    }

    /// Look up a match by id.
    pub fn find_match(&self, match_id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|game| game.id() == match_id)
    }

    /// Look up an account by id.
    pub fn find_player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    /// Build the client view of `match_id`.
    ///
    /// Returns `None` when the match is unknown or references a missing
    /// player.
    pub fn match_view(&self, match_id: MatchId, viewer: Option<PlayerId>) -> Option<MatchView> {
        let game = self.find_match(match_id)?;
        build_match_view(game, &self.directory(), &self.confirmations_for(match_id), viewer)
    }

    /// Matches grouped by round, in (round, table, id) order.
    pub fn rounds(&self, viewer: Option<PlayerId>) -> Vec<RoundView> {
        let directory = self.directory();
        let mut by_match: HashMap<MatchId, Vec<ScoreConfirmation>> = HashMap::new();
        for confirmation in &self.confirmations {
            by_match
                .entry(confirmation.match_id)
                .or_default()
                .push(*confirmation);
        }

        let mut ordered: Vec<&Match> = self.matches.iter().collect();
        ordered.sort_by_key(|game| (game.round_number(), game.table_number(), game.id()));

        let mut grouped: BTreeMap<u32, Vec<MatchView>> = BTreeMap::new();
        for game in ordered {
            let reports = by_match.get(&game.id()).map(Vec::as_slice).unwrap_or_default();
            let views = grouped.entry(game.round_number()).or_default();
            match build_match_view(game, &directory, reports, viewer) {
                Some(view) => views.push(view),
                None => warn!(
                    match_id = %game.id(),
                    "match references an unknown player; omitted from rounds"
                ),
            }
        }

        grouped
            .into_iter()
            .map(|(round_number, matches)| RoundView {
                round_number,
                is_complete: round_is_complete(&self.matches, round_number),
                matches,
            })
            .collect()
    }

    /// Ranked standings, optionally folded only up to `up_to_round`.
    pub fn standings(&self, up_to_round: Option<u32>) -> Vec<StandingRow> {
        compute_standings(&self.players, &self.matches, up_to_round)
    }

    /// Per-round points tables.
    pub fn round_points(&self) -> Vec<RoundPoints> {
        round_points(&self.players, &self.matches)
    }

    /// Standings as of the end of each round.
    pub fn standings_by_round(&self) -> Vec<RoundStandings> {
        standings_by_round(&self.players, &self.matches)
    }

    /// Lowest round still open, see [`current_round`].
    pub fn current_round(&self) -> Option<u32> {
        current_round(&self.matches)
    }

    /// Rounds, current round and cumulative standings in one payload.
    pub fn live(&self, viewer: Option<PlayerId>, generated_at: DateTime<Utc>) -> LiveSnapshot {
        LiveSnapshot {
            generated_at,
            current_round: self.current_round(),
            rounds: self.rounds(viewer),
            standings: self.standings(None),
        }
    }
}

fn build_match_view(
    game: &Match,
    directory: &HashMap<PlayerId, &Player>,
    confirmations: &[ScoreConfirmation],
    viewer: Option<PlayerId>,
) -> Option<MatchView> {
    let player1 = directory.get(&game.player1())?.lite();
    let player2 = directory.get(&game.player2())?.lite();
    let confirmed = game.confirmed();

    let my_confirmation = viewer.and_then(|viewer| {
        confirmations
            .iter()
            .find(|confirmation| confirmation.player_id == viewer)
            .map(|confirmation| OwnConfirmation {
                score1: confirmation.score.score1.get(),
                score2: confirmation.score.score2.get(),
                updated_at: confirmation.updated_at,
            })
    });

    Some(MatchView {
        id: game.id(),
        round_number: game.round_number(),
        table_number: game.table_number(),
        player1,
        player2,
        status: MatchStatus::derive(game, confirmations),
        confirmed_score1: confirmed.map(|result| result.score.score1.get()),
        confirmed_score2: confirmed.map(|result| result.score.score2.get()),
        confirmed_at: confirmed.and_then(|result| result.confirmed_at),
        confirmations: confirmations.len(),
        my_confirmation,
    })
}

#[cfg(test)]
mod tests;
