//! Demo roster seeding.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::account_service::{hash_password, map_player_error};
use crate::domain::ports::{
    DemoSeedCommand, FixtureInsertOutcome, NewPlayer, PlayerRepository, SeedDemoRequest,
    SeedDemoResponse, TournamentRepository, TournamentRepositoryError,
};
use crate::domain::{DisplayName, Error, FixtureSchedule, Handle, PasswordHasher, Player, Role};

/// One account of the demo roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoAccount {
    /// Login handle.
    pub handle: &'static str,
    /// Name shown in listings.
    pub display_name: &'static str,
    /// Plaintext demo password.
    pub password: &'static str,
    /// Account role.
    pub role: Role,
}

/// Accounts created by [`DemoSeedService`], in registration order.
pub const DEMO_ROSTER: [DemoAccount; 5] = [
    DemoAccount {
        handle: "alice",
        display_name: "Alice Mercer",
        password: "pass123",
        role: Role::Player,
    },
    DemoAccount {
        handle: "bob",
        display_name: "Bob Singh",
        password: "pass123",
        role: Role::Player,
    },
    DemoAccount {
        handle: "carla",
        display_name: "Carla Diaz",
        password: "pass123",
        role: Role::Player,
    },
    DemoAccount {
        handle: "diego",
        display_name: "Diego Kim",
        password: "pass123",
        role: Role::Player,
    },
    DemoAccount {
        handle: "viewer",
        display_name: "Live Viewer",
        password: "viewer123",
        role: Role::Viewer,
    },
];

fn map_tournament_error(error: TournamentRepositoryError) -> Error {
    match error {
        TournamentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("tournament repository unavailable: {message}"))
        }
        other => Error::internal(format!("tournament repository error: {other}")),
    }
}

fn count_players(players: &[Player]) -> usize {
    players.iter().filter(|player| player.competes()).count()
}

/// Seeds the demo roster and its round-robin schedule.
#[derive(Clone)]
pub struct DemoSeedService<P, T> {
    player_repo: Arc<P>,
    tournament_repo: Arc<T>,
    hasher: PasswordHasher,
}

impl<P, T> DemoSeedService<P, T> {
    /// Create a new seeding service.
    pub fn new(player_repo: Arc<P>, tournament_repo: Arc<T>, hasher: PasswordHasher) -> Self {
        Self {
            player_repo,
            tournament_repo,
            hasher,
        }
    }
}

impl<P, T> DemoSeedService<P, T>
where
    P: PlayerRepository,
    T: TournamentRepository,
{
    async fn register(&self, account: &DemoAccount) -> Result<Player, Error> {
        let new_player = NewPlayer {
            handle: Handle::new(account.handle)
                .map_err(|err| Error::internal(format!("demo handle rejected: {err}")))?,
            display_name: DisplayName::new(account.display_name)
                .map_err(|err| Error::internal(format!("demo display name rejected: {err}")))?,
            role: account.role,
            password_hash: hash_password(self.hasher, account.password).await?,
        };
        self.player_repo
            .create(&new_player)
            .await
            .map_err(map_player_error)
    }
}

#[async_trait]
impl<P, T> DemoSeedCommand for DemoSeedService<P, T>
where
    P: PlayerRepository,
    T: TournamentRepository,
{
    async fn seed_demo(&self, request: SeedDemoRequest) -> Result<SeedDemoResponse, Error> {
        if request.force {
            self.player_repo.reset().await.map_err(map_player_error)?;
            info!("tournament data cleared");
        }

        let existing = self.player_repo.list().await.map_err(map_player_error)?;
        if !existing.is_empty() {
            let matches = self
                .tournament_repo
                .count_matches()
                .await
                .map_err(map_tournament_error)?;
            return Ok(SeedDemoResponse {
                seeded: false,
                players: count_players(&existing),
                matches,
            });
        }

        let mut created = Vec::with_capacity(DEMO_ROSTER.len());
        for account in &DEMO_ROSTER {
            created.push(self.register(account).await?);
        }

        let mut ids: Vec<_> = created
            .iter()
            .filter(|player| player.competes())
            .map(|player| player.id)
            .collect();
        ids.sort_unstable();
        let schedule = FixtureSchedule::for_players(&ids)
            .map_err(|err| Error::internal(format!("demo schedule rejected: {err}")))?;
        let matches = match self
            .tournament_repo
            .insert_fixtures_if_empty(&schedule)
            .await
            .map_err(map_tournament_error)?
        {
            FixtureInsertOutcome::Inserted { matches } => matches,
            FixtureInsertOutcome::AlreadyPresent => self
                .tournament_repo
                .count_matches()
                .await
                .map_err(map_tournament_error)?,
        };

        info!(players = ids.len(), matches, "demo tournament seeded");
        Ok(SeedDemoResponse {
            seeded: true,
            players: ids.len(),
            matches,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::*;
    use crate::domain::PlayerId;
    use crate::domain::ports::{MockPlayerRepository, MockTournamentRepository};
    use crate::domain::test_support::demo_roster;

    fn service(
        players: MockPlayerRepository,
        tournament: MockTournamentRepository,
    ) -> DemoSeedService<MockPlayerRepository, MockTournamentRepository> {
        DemoSeedService::new(Arc::new(players), Arc::new(tournament), PasswordHasher::new(4))
    }

    #[tokio::test]
    async fn seeds_roster_and_schedule_when_empty() {
        let next_id = Arc::new(AtomicI64::new(1));
        let mut players = MockPlayerRepository::new();
        players.expect_reset().times(0);
        players.expect_list().times(1).return_once(|| Ok(Vec::new()));
        players.expect_create().times(5).returning(move |new_player| {
            let id = next_id.fetch_add(1, Ordering::SeqCst);
            Ok(Player {
                id: PlayerId::new(id).expect("positive id"),
                handle: new_player.handle.clone(),
                display_name: new_player.display_name.clone(),
                role: new_player.role,
            })
        });
        let mut tournament = MockTournamentRepository::new();
        tournament
            .expect_insert_fixtures_if_empty()
            .withf(|schedule| schedule.round_count() == 3 && schedule.match_count() == 6)
            .times(1)
            .return_once(|schedule| {
                Ok(FixtureInsertOutcome::Inserted {
                    matches: schedule.match_count(),
                })
            });

        let response = service(players, tournament)
            .seed_demo(SeedDemoRequest::default())
            .await
            .expect("seeded");

        assert_eq!(
            response,
            SeedDemoResponse {
                seeded: true,
                players: 4,
                matches: 6,
            }
        );
    }

    #[tokio::test]
    async fn existing_accounts_skip_seeding() {
        let mut players = MockPlayerRepository::new();
        players
            .expect_list()
            .times(1)
            .return_once(|| Ok(demo_roster()));
        players.expect_create().times(0);
        let mut tournament = MockTournamentRepository::new();
        tournament
            .expect_count_matches()
            .times(1)
            .return_once(|| Ok(6));
        tournament.expect_insert_fixtures_if_empty().times(0);

        let response = service(players, tournament)
            .seed_demo(SeedDemoRequest::default())
            .await
            .expect("skipped");

        assert_eq!(
            response,
            SeedDemoResponse {
                seeded: false,
                players: 4,
                matches: 6,
            }
        );
    }

    #[tokio::test]
    async fn force_clears_before_checking() {
        let mut players = MockPlayerRepository::new();
        let mut sequence = mockall::Sequence::new();
        players
            .expect_reset()
            .times(1)
            .in_sequence(&mut sequence)
            .return_once(|| Ok(()));
        players
            .expect_list()
            .times(1)
            .in_sequence(&mut sequence)
            .return_once(|| Ok(demo_roster()));
        let mut tournament = MockTournamentRepository::new();
        tournament
            .expect_count_matches()
            .times(1)
            .return_once(|| Ok(0));

        let response = service(players, tournament)
            .seed_demo(SeedDemoRequest { force: true })
            .await
            .expect("force path");

        assert!(!response.seeded);
    }
}
