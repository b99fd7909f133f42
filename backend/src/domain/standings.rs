//! Standings aggregation over confirmed matches.
//!
//! Standings are a pure fold: every call recomputes from the roster and the
//! match set, so callers only need a consistent snapshot of both.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{DisplayName, Handle, Match, Player, PlayerId};

/// One ranked line of the standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    /// 1-based rank.
    pub position: u32,
    /// Player identifier.
    pub player_id: PlayerId,
    /// Player handle.
    pub handle: Handle,
    /// Player display name.
    pub display_name: DisplayName,
    /// Confirmed matches folded.
    pub played: u32,
    /// Matches won.
    pub wins: u32,
    /// Matches drawn.
    pub draws: u32,
    /// Matches lost.
    pub losses: u32,
    /// Goals scored.
    pub goals_for: u32,
    /// Goals conceded.
    pub goals_against: u32,
    /// `goals_for - goals_against`.
    pub goal_difference: i64,
    /// Points earned in exactly the filter round; zero without a filter.
    pub round_points: u32,
    /// Cumulative points up to and including the filter round.
    pub points: u32,
}

#[derive(Debug, Clone, Default)]
struct Tally {
    played: u32,
    wins: u32,
    draws: u32,
    losses: u32,
    goals_for: u32,
    goals_against: u32,
    points: u32,
    round_points: u32,
}

impl Tally {
    fn record(&mut self, scored: u16, conceded: u16, points: u32, counts_for_round: bool) {
        self.played += 1;
        self.goals_for += u32::from(scored);
        self.goals_against += u32::from(conceded);
        self.points += points;
        if counts_for_round {
            self.round_points += points;
        }
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => self.wins += 1,
            std::cmp::Ordering::Less => self.losses += 1,
            std::cmp::Ordering::Equal => self.draws += 1,
        }
    }

    fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }
}

/// Confirmed matches sorted by (round, id), optionally limited to a round.
fn folded_matches(matches: &[Match], up_to_round: Option<u32>) -> Vec<&Match> {
    let mut folded: Vec<&Match> = matches
        .iter()
        .filter(|game| game.is_confirmed())
        .filter(|game| up_to_round.is_none_or(|limit| game.round_number() <= limit))
        .collect();
    folded.sort_by_key(|game| (game.round_number(), game.id()));
    folded
}

/// Rank the roster by points, goal difference, goals for, then name.
///
/// Only accounts with the player role appear; every one of them appears even
/// with no confirmed matches. With `up_to_round`, only matches in rounds up to
/// and including it are folded, and `round_points` sums exactly that round.
pub fn compute_standings(
    roster: &[Player],
    matches: &[Match],
    up_to_round: Option<u32>,
) -> Vec<StandingRow> {
    let competitors: Vec<&Player> = roster.iter().filter(|player| player.competes()).collect();
    let mut tallies: HashMap<PlayerId, Tally> = competitors
        .iter()
        .map(|player| (player.id, Tally::default()))
        .collect();

    for game in folded_matches(matches, up_to_round) {
        let Some(score) = game.confirmed_score() else {
            continue;
        };
        if !(tallies.contains_key(&game.player1()) && tallies.contains_key(&game.player2())) {
            warn!(
                match_id = %game.id(),
                "confirmed match references a player outside the roster; skipped"
            );
            continue;
        }
        let (points1, points2) = score.points();
        let counts_for_round = up_to_round == Some(game.round_number());
        let (score1, score2) = (score.score1.get(), score.score2.get());

        if let Some(tally) = tallies.get_mut(&game.player1()) {
            tally.record(score1, score2, points1, counts_for_round);
        }
        if let Some(tally) = tallies.get_mut(&game.player2()) {
            tally.record(score2, score1, points2, counts_for_round);
        }
    }

    let mut ranked: Vec<(&Player, Tally)> = competitors
        .into_iter()
        .map(|player| {
            let tally = tallies.remove(&player.id).unwrap_or_default();
            (player, tally)
        })
        .collect();
    ranked.sort_by_cached_key(|(player, tally)| {
        (
            Reverse(tally.points),
            Reverse(tally.goal_difference()),
            Reverse(tally.goals_for),
            player.display_name.sort_key(),
            player.id,
        )
    });

    ranked
        .into_iter()
        .zip(1_u32..)
        .map(|((player, tally), position)| StandingRow {
            position,
            player_id: player.id,
            handle: player.handle.clone(),
            display_name: player.display_name.clone(),
            played: tally.played,
            wins: tally.wins,
            draws: tally.draws,
            losses: tally.losses,
            goals_for: tally.goals_for,
            goals_against: tally.goals_against,
            goal_difference: tally.goal_difference(),
            round_points: tally.round_points,
            points: tally.points,
        })
        .collect()
}

/// Points a player earned inside one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRoundPoints {
    /// Player identifier.
    pub player_id: PlayerId,
    /// Player display name.
    pub display_name: DisplayName,
    /// Points earned in the round.
    pub points: u32,
}

/// Per-round points table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPoints {
    /// Round number.
    pub round_number: u32,
    /// Every roster player, sorted by points then name.
    pub points: Vec<PlayerRoundPoints>,
}

/// Distinct round numbers that contain at least one match, ascending.
pub fn rounds_present(matches: &[Match]) -> BTreeSet<u32> {
    matches.iter().map(Match::round_number).collect()
}

/// Points earned strictly within each round, for every round with a match.
pub fn round_points(roster: &[Player], matches: &[Match]) -> Vec<RoundPoints> {
    let competitors: Vec<&Player> = roster.iter().filter(|player| player.competes()).collect();

    rounds_present(matches)
        .into_iter()
        .map(|round_number| {
            let mut totals: HashMap<PlayerId, u32> =
                competitors.iter().map(|player| (player.id, 0)).collect();

            let confirmed = matches
                .iter()
                .filter(|game| game.round_number() == round_number)
                .filter_map(|game| game.confirmed_score().map(|score| (game, score)));
            for (game, score) in confirmed {
                let (points1, points2) = score.points();
                if let Some(total) = totals.get_mut(&game.player1()) {
                    *total += points1;
                }
                if let Some(total) = totals.get_mut(&game.player2()) {
                    *total += points2;
                }
            }

            let mut points: Vec<(PlayerRoundPoints, String)> = competitors
                .iter()
                .map(|player| {
                    let earned = totals.get(&player.id).copied().unwrap_or_default();
                    (
                        PlayerRoundPoints {
                            player_id: player.id,
                            display_name: player.display_name.clone(),
                            points: earned,
                        },
                        player.display_name.sort_key(),
                    )
                })
                .collect();
            points.sort_by(|(left, left_key), (right, right_key)| {
                right
                    .points
                    .cmp(&left.points)
                    .then_with(|| left_key.cmp(right_key))
                    .then_with(|| left.player_id.cmp(&right.player_id))
            });

            RoundPoints {
                round_number,
                points: points.into_iter().map(|(row, _)| row).collect(),
            }
        })
        .collect()
}

/// Lowest round with an unconfirmed match, else the highest round, else
/// `None` when no matches exist.
///
/// # Examples
/// ```
/// use scorekeeper::domain::current_round;
///
/// assert_eq!(current_round(&[]), None);
/// ```
pub fn current_round(matches: &[Match]) -> Option<u32> {
    matches
        .iter()
        .filter(|game| !game.is_confirmed())
        .map(Match::round_number)
        .min()
        .or_else(|| matches.iter().map(Match::round_number).max())
}

/// Whether every match in `round_number` is confirmed.
pub fn round_is_complete(matches: &[Match], round_number: u32) -> bool {
    matches
        .iter()
        .filter(|game| game.round_number() == round_number)
        .all(Match::is_confirmed)
}

/// Standings as they stood at the end of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStandings {
    /// Round number.
    pub round_number: u32,
    /// Whether every match of the round is confirmed.
    pub is_complete: bool,
    /// Standings folded up to and including this round.
    pub standings: Vec<StandingRow>,
}

/// One standings snapshot per round that has at least one match.
pub fn standings_by_round(roster: &[Player], matches: &[Match]) -> Vec<RoundStandings> {
    rounds_present(matches)
        .into_iter()
        .map(|round_number| RoundStandings {
            round_number,
            is_complete: round_is_complete(matches, round_number),
            standings: compute_standings(roster, matches, Some(round_number)),
        })
        .collect()
}
