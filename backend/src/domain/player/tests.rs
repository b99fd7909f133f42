//! Regression coverage for player value objects.

use super::*;
use rstest::rstest;

#[rstest]
#[case("alice", "alice")]
#[case("  Bob_Singh ", "bob_singh")]
#[case("c.d-e", "c.d-e")]
fn handle_normalises_to_trimmed_lowercase(#[case] raw: &str, #[case] expected: &str) {
    let handle = Handle::new(raw).expect("valid handle");
    assert_eq!(handle.as_ref(), expected);
}

#[rstest]
#[case("ab")]
#[case("   ")]
#[case("a-really-long-handle-that-exceeds-limits")]
fn handle_rejects_bad_lengths(#[case] raw: &str) {
    let err = Handle::new(raw).expect_err("length must be rejected");
    assert!(matches!(err, PlayerValidationError::HandleLength { .. }));
}

#[rstest]
#[case("bad handle")]
#[case("emoji🙂")]
#[case("semi;colon")]
fn handle_rejects_invalid_characters(#[case] raw: &str) {
    let err = Handle::new(raw).expect_err("characters must be rejected");
    assert_eq!(err, PlayerValidationError::HandleInvalidCharacters);
}

#[rstest]
fn display_name_trims_whitespace() {
    let name = DisplayName::new("  Carla Diaz ").expect("valid name");
    assert_eq!(name.as_ref(), "Carla Diaz");
    assert_eq!(name.sort_key(), "carla diaz");
}

#[rstest]
#[case("A")]
#[case("  ")]
fn display_name_rejects_short_values(#[case] raw: &str) {
    assert!(DisplayName::new(raw).is_err());
}

#[rstest]
fn display_name_rejects_long_values() {
    let raw = "x".repeat(DISPLAY_NAME_MAX + 1);
    assert!(DisplayName::new(raw).is_err());
}

#[rstest]
#[case(0)]
#[case(-4)]
fn player_id_rejects_non_positive_values(#[case] raw: i64) {
    assert_eq!(PlayerId::new(raw), Err(PlayerValidationError::NonPositiveId));
}

#[rstest]
#[case("player", Role::Player)]
#[case("viewer", Role::Viewer)]
fn role_round_trips_through_strings(#[case] raw: &str, #[case] role: Role) {
    assert_eq!(raw.parse::<Role>(), Ok(role));
    assert_eq!(role.as_str(), raw);
}

#[rstest]
fn role_rejects_unknown_values() {
    assert!(matches!(
        "admin".parse::<Role>(),
        Err(PlayerValidationError::UnknownRole(_))
    ));
}

#[rstest]
fn only_player_role_competes() {
    let mut player = Player {
        id: PlayerId::new(1).expect("valid id"),
        handle: Handle::new("alice").expect("valid handle"),
        display_name: DisplayName::new("Alice Mercer").expect("valid name"),
        role: Role::Player,
    };
    assert!(player.competes());
    player.role = Role::Viewer;
    assert!(!player.competes());
}
