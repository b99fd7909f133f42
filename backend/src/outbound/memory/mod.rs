//! In-process store implementing every driven port.
//!
//! A single async mutex guards all state and acts as the unit of work: each
//! port method holds the lock for its whole duration, mutates a scratch copy
//! and writes it back only on success. Used by the CLI when no database is
//! configured and by the integration tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{
    FixtureInsertOutcome, NewPlayer, PlayerRepository, PlayerRepositoryError, SessionRepository,
    SessionRepositoryError, StoredCredentials, TournamentRepository, TournamentRepositoryError,
};
use crate::domain::{
    FixtureSchedule, Match, MatchDraft, MatchId, Player, PlayerId, ScoreConfirmation,
    ScoreSubmission, SessionToken, SubmissionOutcome, TournamentSnapshot, apply_submission,
};

#[derive(Debug)]
struct State {
    players: Vec<StoredCredentials>,
    sessions: HashMap<String, PlayerId>,
    matches: Vec<Match>,
    confirmations: Vec<ScoreConfirmation>,
    next_player_id: i64,
    next_match_id: i64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            sessions: HashMap::new(),
            matches: Vec::new(),
            confirmations: Vec::new(),
            next_player_id: 1,
            next_match_id: 1,
        }
    }
}

impl State {
    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players
            .iter()
            .map(|stored| &stored.player)
            .find(|player| player.id == id)
    }
}

/// Mutex-guarded in-memory tournament store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentRepository for MemoryStore {
    async fn snapshot(&self) -> Result<TournamentSnapshot, TournamentRepositoryError> {
        let state = self.state.lock().await;
        Ok(TournamentSnapshot {
            players: state
                .players
                .iter()
                .map(|stored| stored.player.clone())
                .collect(),
            matches: state.matches.clone(),
            confirmations: state.confirmations.clone(),
        })
    }

    async fn record_confirmation(
        &self,
        submission: &ScoreSubmission,
        at: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, TournamentRepositoryError> {
        let mut state = self.state.lock().await;
        let index = state
            .matches
            .iter()
            .position(|game| game.id() == submission.match_id)
            .ok_or_else(|| TournamentRepositoryError::match_not_found(submission.match_id))?;

        let mut game = state.matches[index].clone();
        let mut reports: Vec<ScoreConfirmation> = state
            .confirmations
            .iter()
            .filter(|confirmation| confirmation.match_id == submission.match_id)
            .copied()
            .collect();

        let outcome = apply_submission(&mut game, &mut reports, submission, at).map_err(|err| {
            debug!(match_id = %submission.match_id, error = %err, "submission rejected");
            TournamentRepositoryError::rejected(err)
        })?;

        state.matches[index] = game;
        state
            .confirmations
            .retain(|confirmation| confirmation.match_id != submission.match_id);
        state.confirmations.extend(reports);
        Ok(outcome)
    }

    async fn insert_fixtures_if_empty(
        &self,
        schedule: &FixtureSchedule,
    ) -> Result<FixtureInsertOutcome, TournamentRepositoryError> {
        let mut state = self.state.lock().await;
        if !state.matches.is_empty() {
            return Ok(FixtureInsertOutcome::AlreadyPresent);
        }

        let mut next_id = state.next_match_id;
        let mut created = Vec::with_capacity(schedule.match_count());
        for fixture in schedule.fixtures() {
            for player in [fixture.player1, fixture.player2] {
                if state.player(player).is_none() {
                    return Err(TournamentRepositoryError::query(format!(
                        "fixture references unknown player {player}"
                    )));
                }
            }
            let game = Match::new(MatchDraft {
                id: MatchId::new(next_id),
                round_number: fixture.round_number,
                table_number: fixture.table_number,
                player1: fixture.player1,
                player2: fixture.player2,
                confirmed: None,
            })
            .map_err(|err| TournamentRepositoryError::query(err.to_string()))?;
            created.push(game);
            next_id += 1;
        }

        let matches = created.len();
        state.next_match_id = next_id;
        state.matches = created;
        Ok(FixtureInsertOutcome::Inserted { matches })
    }

    async fn count_matches(&self) -> Result<usize, TournamentRepositoryError> {
        Ok(self.state.lock().await.matches.len())
    }
}

#[async_trait]
impl PlayerRepository for MemoryStore {
    async fn create(&self, player: &NewPlayer) -> Result<Player, PlayerRepositoryError> {
        let mut state = self.state.lock().await;
        if state
            .players
            .iter()
            .any(|stored| stored.player.handle == player.handle)
        {
            return Err(PlayerRepositoryError::duplicate_handle(player.handle.as_ref()));
        }

        let id = PlayerId::new(state.next_player_id)
            .map_err(|err| PlayerRepositoryError::query(err.to_string()))?;
        let created = Player {
            id,
            handle: player.handle.clone(),
            display_name: player.display_name.clone(),
            role: player.role,
        };
        state.next_player_id += 1;
        state.players.push(StoredCredentials {
            player: created.clone(),
            password_hash: player.password_hash.clone(),
        });
        Ok(created)
    }

    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, PlayerRepositoryError> {
        Ok(self.state.lock().await.player(id).cloned())
    }

    async fn find_credentials(
        &self,
        handle: &str,
    ) -> Result<Option<StoredCredentials>, PlayerRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .players
            .iter()
            .find(|stored| stored.player.handle.as_ref() == handle)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Player>, PlayerRepositoryError> {
        let state = self.state.lock().await;
        let mut players: Vec<Player> = state
            .players
            .iter()
            .map(|stored| stored.player.clone())
            .collect();
        players.sort_by_key(|player| player.id);
        Ok(players)
    }

    async fn reset(&self) -> Result<(), PlayerRepositoryError> {
        let mut state = self.state.lock().await;
        state.players.clear();
        state.sessions.clear();
        state.matches.clear();
        state.confirmations.clear();
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(
        &self,
        token: &SessionToken,
        player_id: PlayerId,
        _created_at: DateTime<Utc>,
    ) -> Result<(), SessionRepositoryError> {
        let mut state = self.state.lock().await;
        if state.player(player_id).is_none() {
            return Err(SessionRepositoryError::query(format!(
                "session references unknown player {player_id}"
            )));
        }
        state.sessions.insert(token.as_str().to_owned(), player_id);
        Ok(())
    }

    async fn find_player(
        &self,
        token: &SessionToken,
    ) -> Result<Option<Player>, SessionRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .get(token.as_str())
            .and_then(|player_id| state.player(*player_id))
            .cloned())
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), SessionRepositoryError> {
        self.state.lock().await.sessions.remove(token.as_str());
        Ok(())
    }
}
