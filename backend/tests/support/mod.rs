//! Shared harness wiring the services over an in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use scorekeeper::domain::ports::{
    AccountCommand, DemoSeedCommand, SeedDemoRequest, TournamentQuery,
};
use scorekeeper::domain::{
    AccountService, DemoSeedService, LoginCredentials, MatchView, PasswordHasher, Principal,
    SessionToken, TournamentService,
};
use scorekeeper::outbound::memory::MemoryStore;

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn tournament_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub struct Harness {
    pub tournament: TournamentService<MemoryStore>,
    pub accounts: AccountService<MemoryStore, MemoryStore>,
}

impl Harness {
    pub async fn login(&self, handle: &str, password: &str) -> (SessionToken, Principal) {
        let credentials =
            LoginCredentials::try_from_parts(handle, password).expect("valid credentials");
        let session = self.accounts.login(&credentials).await.expect("login succeeds");
        (session.token, Principal::from(&session.user))
    }

    /// First match of round 1 involving `handle`.
    pub async fn round_one_match_of(&self, handle: &str) -> MatchView {
        let rounds = self.tournament.rounds(None).await.expect("rounds load");
        rounds
            .into_iter()
            .find(|round| round.round_number == 1)
            .expect("round 1 exists")
            .matches
            .into_iter()
            .find(|game| {
                game.player1.handle.as_ref() == handle || game.player2.handle.as_ref() == handle
            })
            .expect("player has a round 1 match")
    }
}

/// Services over a store seeded with the demo roster and schedule.
#[fixture]
pub async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let hasher = PasswordHasher::new(1_000);
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(tournament_day()));

    DemoSeedService::new(Arc::clone(&store), Arc::clone(&store), hasher)
        .seed_demo(SeedDemoRequest::default())
        .await
        .expect("demo seed");

    Harness {
        tournament: TournamentService::new(Arc::clone(&store), Arc::clone(&clock)),
        accounts: AccountService::new(Arc::clone(&store), store, hasher, clock),
    }
}
