//! Coverage for snapshot-derived read models.

use chrono::{DateTime, Duration, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{
    ConfirmedResult, DisplayName, Handle, MatchDraft, Role, ScorePair,
};

fn player_id(raw: i64) -> PlayerId {
    PlayerId::new(raw).expect("positive id")
}

fn pair(a: i64, b: i64) -> ScorePair {
    ScorePair::try_from_raw(a, b).expect("valid scores")
}

fn account(id: i64, handle: &str, name: &str) -> Player {
    Player {
        id: player_id(id),
        handle: Handle::new(handle).expect("valid handle"),
        display_name: DisplayName::new(name).expect("valid display name"),
        role: Role::Player,
    }
}

#[fixture]
fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-14T10:00:00Z")
        .expect("RFC3339 fixture timestamp")
        .with_timezone(&Utc)
}

fn game(id: i64, round: u32, table: u32, p1: i64, p2: i64, confirmed: Option<ConfirmedResult>) -> Match {
    Match::new(MatchDraft {
        id: MatchId::new(id),
        round_number: round,
        table_number: table,
        player1: player_id(p1),
        player2: player_id(p2),
        confirmed,
    })
    .expect("valid match")
}

fn report(match_id: i64, player: i64, score: ScorePair, at: DateTime<Utc>) -> ScoreConfirmation {
    ScoreConfirmation {
        match_id: MatchId::new(match_id),
        player_id: player_id(player),
        score,
        created_at: at,
        updated_at: at,
    }
}

#[fixture]
fn snapshot(now: DateTime<Utc>) -> TournamentSnapshot {
    let confirmed = ConfirmedResult {
        score: pair(2, 1),
        confirmed_at: Some(now),
    };
    TournamentSnapshot {
        players: vec![
            account(1, "alice", "Alice Mercer"),
            account(2, "bob", "Bob Singh"),
            account(3, "carla", "Carla Diaz"),
            account(4, "diego", "Diego Kim"),
        ],
        matches: vec![
            game(4, 2, 2, 2, 4, None),
            game(2, 1, 2, 3, 4, None),
            game(1, 1, 1, 1, 2, Some(confirmed)),
            game(3, 2, 1, 1, 3, None),
        ],
        confirmations: vec![
            report(1, 1, pair(2, 1), now),
            report(1, 2, pair(2, 1), now),
            report(2, 3, pair(1, 0), now),
            report(2, 4, pair(0, 1), now + Duration::minutes(1)),
            report(3, 3, pair(4, 4), now),
        ],
    }
}

#[rstest]
fn rounds_are_grouped_and_ordered(snapshot: TournamentSnapshot) {
    let rounds = snapshot.rounds(None);

    let layout: Vec<(u32, bool, Vec<i64>)> = rounds
        .iter()
        .map(|round| {
            (
                round.round_number,
                round.is_complete,
                round.matches.iter().map(|view| view.id.get()).collect(),
            )
        })
        .collect();
    assert_eq!(
        layout,
        vec![(1, false, vec![1, 2]), (2, false, vec![3, 4])]
    );
}

#[rstest]
fn match_view_reports_status_and_counts(snapshot: TournamentSnapshot, now: DateTime<Utc>) {
    let confirmed = snapshot
        .match_view(MatchId::new(1), None)
        .expect("match 1 exists");
    assert_eq!(confirmed.status, MatchStatus::Confirmed);
    assert_eq!(
        (confirmed.confirmed_score1, confirmed.confirmed_score2),
        (Some(2), Some(1))
    );
    assert_eq!(confirmed.confirmed_at, Some(now));
    assert_eq!(confirmed.confirmations, 2);
    assert_eq!(confirmed.player1.handle.as_ref(), "alice");

    let disputed = snapshot
        .match_view(MatchId::new(2), None)
        .expect("match 2 exists");
    assert_eq!(disputed.status, MatchStatus::Disputed);
    assert_eq!(disputed.confirmed_score1, None);

    let pending = snapshot
        .match_view(MatchId::new(3), None)
        .expect("match 3 exists");
    assert_eq!(pending.status, MatchStatus::Pending);
    assert_eq!(pending.confirmations, 1);
}

#[rstest]
fn own_confirmation_only_for_the_viewer(snapshot: TournamentSnapshot, now: DateTime<Utc>) {
    let as_diego = snapshot
        .match_view(MatchId::new(2), Some(player_id(4)))
        .expect("match 2 exists");
    assert_eq!(
        as_diego.my_confirmation,
        Some(OwnConfirmation {
            score1: 0,
            score2: 1,
            updated_at: now + Duration::minutes(1),
        })
    );

    let as_alice = snapshot
        .match_view(MatchId::new(2), Some(player_id(1)))
        .expect("match 2 exists");
    assert_eq!(as_alice.my_confirmation, None);

    let anonymous = snapshot
        .match_view(MatchId::new(2), None)
        .expect("match 2 exists");
    assert_eq!(anonymous.my_confirmation, None);
}

#[rstest]
fn unknown_match_has_no_view(snapshot: TournamentSnapshot) {
    assert!(snapshot.match_view(MatchId::new(99), None).is_none());
}

#[rstest]
fn matches_with_missing_players_are_omitted(mut snapshot: TournamentSnapshot) {
    snapshot.players.retain(|player| player.id != player_id(4));

    let rounds = snapshot.rounds(None);

    let ids: Vec<i64> = rounds
        .iter()
        .flat_map(|round| round.matches.iter().map(|view| view.id.get()))
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[rstest]
fn live_snapshot_combines_views(snapshot: TournamentSnapshot, now: DateTime<Utc>) {
    let live = snapshot.live(Some(player_id(1)), now);

    assert_eq!(live.generated_at, now);
    assert_eq!(live.current_round, Some(1));
    assert_eq!(live.rounds, snapshot.rounds(Some(player_id(1))));
    assert_eq!(live.standings, snapshot.standings(None));
    assert_eq!(live.standings[0].player_id, player_id(1));
}

#[rstest]
fn serialised_views_use_snake_case(snapshot: TournamentSnapshot) {
    let view = snapshot
        .match_view(MatchId::new(2), None)
        .expect("match 2 exists");

    let value = serde_json::to_value(&view).expect("serialise view");

    assert_eq!(value["status"], "disputed");
    assert_eq!(value["round_number"], 1);
    assert_eq!(value["player1"]["display_name"], "Carla Diaz");
    assert!(value["my_confirmation"].is_null());
}
