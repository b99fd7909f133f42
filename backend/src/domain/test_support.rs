//! Shared builders for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    ConfirmedResult, DisplayName, Handle, Match, MatchDraft, MatchId, Player, PlayerId, Principal,
    Role, ScorePair,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn player_id(raw: i64) -> PlayerId {
    PlayerId::new(raw).expect("positive id")
}

pub(crate) fn account(id: i64, handle: &str, name: &str, role: Role) -> Player {
    Player {
        id: player_id(id),
        handle: Handle::new(handle).expect("valid handle"),
        display_name: DisplayName::new(name).expect("valid display name"),
        role,
    }
}

pub(crate) fn principal(id: i64, role: Role) -> Principal {
    Principal {
        id: player_id(id),
        role,
    }
}

pub(crate) fn open_match(id: i64, round: u32, table: u32, p1: i64, p2: i64) -> Match {
    Match::new(MatchDraft {
        id: MatchId::new(id),
        round_number: round,
        table_number: table,
        player1: player_id(p1),
        player2: player_id(p2),
        confirmed: None,
    })
    .expect("valid match")
}

pub(crate) fn confirmed_match(id: i64, round: u32, table: u32, p1: i64, p2: i64, a: i64, b: i64) -> Match {
    Match::new(MatchDraft {
        id: MatchId::new(id),
        round_number: round,
        table_number: table,
        player1: player_id(p1),
        player2: player_id(p2),
        confirmed: Some(ConfirmedResult {
            score: ScorePair::try_from_raw(a, b).expect("valid scores"),
            confirmed_at: Some(fixture_timestamp()),
        }),
    })
    .expect("valid match")
}

/// Four players and one viewer, ids 1..=5.
pub(crate) fn demo_roster() -> Vec<Player> {
    vec![
        account(1, "alice", "Alice Mercer", Role::Player),
        account(2, "bob", "Bob Singh", Role::Player),
        account(3, "carla", "Carla Diaz", Role::Player),
        account(4, "diego", "Diego Kim", Role::Player),
        account(5, "viewer", "Live Viewer", Role::Viewer),
    ]
}
