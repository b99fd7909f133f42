//! Driving port for tournament reads.
//!
//! Every call recomputes from a fresh snapshot of the store.

use async_trait::async_trait;

use crate::domain::{
    Error, LiveSnapshot, Principal, RoundPoints, RoundStandings, RoundView, StandingRow,
};

/// Driving port for rounds, standings and live views.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TournamentQuery: Send + Sync {
    /// Every round with its matches, including the viewer's own reports.
    async fn rounds(&self, viewer: Option<Principal>) -> Result<Vec<RoundView>, Error>;

    /// Ranked standings, optionally folded only up to `up_to_round`.
    async fn standings(&self, up_to_round: Option<u32>) -> Result<Vec<StandingRow>, Error>;

    /// Points earned inside each round.
    async fn round_points(&self) -> Result<Vec<RoundPoints>, Error>;

    /// Standings as of the end of each round.
    async fn standings_by_round(&self) -> Result<Vec<RoundStandings>, Error>;

    /// Rounds, current round and standings stamped with the current time.
    async fn live_snapshot(&self, viewer: Option<Principal>) -> Result<LiveSnapshot, Error>;
}
