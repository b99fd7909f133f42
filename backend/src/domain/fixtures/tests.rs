//! Regression coverage for the circle-method scheduler.

use std::collections::{BTreeSet, HashMap};

use rstest::rstest;

use super::*;

fn ids(count: i64) -> Vec<PlayerId> {
    (1..=count)
        .map(|raw| PlayerId::new(raw).expect("positive id"))
        .collect()
}

fn unordered(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a < b { (a, b) } else { (b, a) }
}

#[rstest]
#[case(2)]
#[case(4)]
#[case(6)]
#[case(10)]
fn even_rosters_meet_everyone_once(#[case] count: i64) {
    let players = ids(count);
    let rounds = round_robin(&players);
    let size = players.len();

    assert_eq!(rounds.len(), size - 1);
    assert!(rounds.iter().all(|round| round.len() == size / 2));

    let mut pairs = BTreeSet::new();
    for (a, b) in rounds.iter().flatten() {
        assert_ne!(a, b);
        assert!(pairs.insert(unordered(*a, *b)), "pair met twice");
    }
    assert_eq!(pairs.len(), size * (size - 1) / 2);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(5)]
#[case(9)]
fn odd_rosters_give_each_player_one_bye(#[case] count: i64) {
    let players = ids(count);
    let rounds = round_robin(&players);
    let size = players.len();

    assert_eq!(rounds.len(), size);
    assert!(rounds.iter().all(|round| round.len() == (size - 1) / 2));

    let mut byes: HashMap<PlayerId, usize> = HashMap::new();
    for round in &rounds {
        let playing: BTreeSet<PlayerId> = round.iter().flat_map(|(a, b)| [*a, *b]).collect();
        for player in &players {
            if !playing.contains(player) {
                *byes.entry(*player).or_default() += 1;
            }
        }
    }
    assert!(players.iter().all(|player| byes.get(player) == Some(&1)));

    let pairs: BTreeSet<_> = rounds
        .iter()
        .flatten()
        .map(|(a, b)| unordered(*a, *b))
        .collect();
    assert_eq!(pairs.len(), size * (size - 1) / 2);
}

#[rstest]
fn empty_roster_has_no_rounds() {
    assert!(round_robin::<PlayerId>(&[]).is_empty());
}

#[rstest]
fn four_players_follow_rotation_and_reversal() {
    let rounds = round_robin(&['A', 'B', 'C', 'D']);
    assert_eq!(
        rounds,
        vec![
            vec![('D', 'A'), ('B', 'C')],
            vec![('A', 'C'), ('D', 'B')],
            vec![('B', 'A'), ('C', 'D')],
        ]
    );
}

#[rstest]
fn three_players_drop_bye_pairings() {
    let rounds = round_robin(&['A', 'B', 'C']);
    assert_eq!(
        rounds,
        vec![vec![('B', 'C')], vec![('A', 'C')], vec![('B', 'A')]]
    );
}

#[rstest]
fn schedule_numbers_rounds_and_tables_from_one() {
    let schedule = FixtureSchedule::for_players(&ids(4)).expect("distinct roster");
    assert_eq!(schedule.round_count(), 3);
    assert_eq!(schedule.match_count(), 6);

    for (round_index, round) in schedule.rounds().iter().enumerate() {
        let tables: Vec<u32> = round.iter().map(|fixture| fixture.table_number).collect();
        assert_eq!(tables, vec![1, 2]);
        assert!(round.iter().all(|fixture| {
            usize::try_from(fixture.round_number).expect("small round") == round_index + 1
        }));
    }

    let first = schedule.fixtures().next().expect("first fixture");
    assert_eq!(first.player1, PlayerId::new(4).expect("valid id"));
    assert_eq!(first.player2, PlayerId::new(1).expect("valid id"));
}

#[rstest]
fn schedule_rejects_duplicate_players() {
    let mut roster = ids(3);
    roster.push(PlayerId::new(2).expect("valid id"));
    let err = FixtureSchedule::for_players(&roster).expect_err("duplicates rejected");
    assert_eq!(
        err,
        FixtureError::DuplicatePlayer(PlayerId::new(2).expect("valid id"))
    );
}

#[rstest]
fn single_player_schedule_is_empty() {
    let schedule = FixtureSchedule::for_players(&ids(1)).expect("valid roster");
    assert_eq!(schedule.round_count(), 1);
    assert!(schedule.is_empty());
}
