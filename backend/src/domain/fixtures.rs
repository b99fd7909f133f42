//! Round-robin fixture generation using the circle method.
//!
//! The first participant stays fixed while the others rotate one step per
//! round. Odd rosters are padded with a bye slot; pairings against the bye are
//! dropped, so each player sits out exactly one round.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::PlayerId;

/// Errors raised when a roster cannot be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixtureError {
    /// The same player appears twice in the roster.
    #[error("player {0} appears more than once in the roster")]
    DuplicatePlayer(PlayerId),
}

/// Generate round-robin pairings for an ordered roster.
///
/// Returns `count - 1` rounds for an even roster and `count` rounds for an
/// odd one. On even round indices the first pairing of the round is emitted
/// as (right, left); every other pairing keeps (left, right) order.
///
/// # Examples
/// ```
/// use scorekeeper::domain::round_robin;
///
/// let rounds = round_robin(&['a', 'b', 'c', 'd']);
/// assert_eq!(rounds.len(), 3);
/// assert_eq!(rounds[0], vec![('d', 'a'), ('b', 'c')]);
/// assert_eq!(rounds[1], vec![('a', 'c'), ('d', 'b')]);
/// assert_eq!(rounds[2], vec![('b', 'a'), ('c', 'd')]);
/// ```
pub fn round_robin<T: Copy>(participants: &[T]) -> Vec<Vec<(T, T)>> {
    let mut slots: Vec<Option<T>> = participants.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }

    let count = slots.len();
    let half = count / 2;
    let mut rounds = Vec::with_capacity(count.saturating_sub(1));

    for round_index in 0..count.saturating_sub(1) {
        let pairs: Vec<(T, T)> = slots
            .iter()
            .zip(slots.iter().rev())
            .take(half)
            .enumerate()
            .filter_map(|(position, (left, right))| {
                let (left, right) = ((*left)?, (*right)?);
                if round_index % 2 == 0 && position == 0 {
                    Some((right, left))
                } else {
                    Some((left, right))
                }
            })
            .collect();
        rounds.push(pairs);

        if let Some((_, rotating)) = slots.split_first_mut() {
            rotating.rotate_right(1);
        }
    }

    rounds
}

/// One scheduled match before it is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// 1-based round number.
    pub round_number: u32,
    /// 1-based table number, unique within the round.
    pub table_number: u32,
    /// First listed player.
    pub player1: PlayerId,
    /// Second listed player.
    pub player2: PlayerId,
}

/// A full tournament schedule, grouped by round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FixtureSchedule {
    rounds: Vec<Vec<Fixture>>,
}

impl FixtureSchedule {
    /// Build the schedule for a roster of distinct players.
    ///
    /// Round and table numbers start at 1 and follow emission order.
    pub fn for_players(players: &[PlayerId]) -> Result<Self, FixtureError> {
        let mut seen = HashSet::with_capacity(players.len());
        for player in players {
            if !seen.insert(*player) {
                return Err(FixtureError::DuplicatePlayer(*player));
            }
        }

        let rounds = round_robin(players)
            .into_iter()
            .zip(1_u32..)
            .map(|(pairs, round_number)| {
                pairs
                    .into_iter()
                    .zip(1_u32..)
                    .map(|((player1, player2), table_number)| Fixture {
                        round_number,
                        table_number,
                        player1,
                        player2,
                    })
                    .collect()
            })
            .collect();

        Ok(Self { rounds })
    }

    /// Fixtures grouped by round, in round order.
    pub fn rounds(&self) -> &[Vec<Fixture>] {
        &self.rounds
    }

    /// Number of generated rounds, including rounds without matches.
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Every fixture in (round, table) order.
    pub fn fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.rounds.iter().flatten()
    }

    /// Total number of matches across all rounds.
    pub fn match_count(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }

    /// Whether the schedule contains no matches at all.
    pub fn is_empty(&self) -> bool {
        self.match_count() == 0
    }
}

#[cfg(test)]
mod tests;
