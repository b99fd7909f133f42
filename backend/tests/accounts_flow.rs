//! Account and session behaviour over the in-memory store.

use rstest::rstest;
use scorekeeper::domain::ports::{AccountCommand, IdentityProvider, TournamentQuery};
use scorekeeper::domain::{
    ErrorCode, LoginCredentials, Registration, Role, SessionToken, bearer_token,
};

mod support;

use support::{Harness, harness};

fn registration(handle: &str, role: Option<Role>) -> Registration {
    Registration::try_from_parts(handle, "Erin Walsh", "s3cret!", role).expect("valid registration")
}

#[rstest]
#[tokio::test]
async fn registration_opens_a_session(#[future] harness: Harness) {
    let harness = harness.await;

    let session = harness
        .accounts
        .register(&registration("  Erin ", None))
        .await
        .expect("registration succeeds");

    assert_eq!(session.user.handle.as_ref(), "erin");
    assert_eq!(session.user.role, Role::Player);
    let principal = harness
        .accounts
        .resolve_principal(&session.token)
        .await
        .expect("lookup succeeds")
        .expect("session is live");
    assert_eq!(principal.id, session.user.id);

    let standings = harness.tournament.standings(None).await.expect("standings");
    assert!(standings.iter().any(|row| row.player_id == session.user.id && row.played == 0));
}

#[rstest]
#[tokio::test]
async fn duplicate_handles_conflict(#[future] harness: Harness) {
    let harness = harness.await;

    let err = harness
        .accounts
        .register(&registration("ALICE", None))
        .await
        .expect_err("handle already taken");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case("alice", "wrong-pass")]
#[case("nobody", "pass123")]
#[tokio::test]
async fn bad_credentials_are_unauthorized(
    #[future] harness: Harness,
    #[case] handle: &str,
    #[case] password: &str,
) {
    let harness = harness.await;
    let credentials = LoginCredentials::try_from_parts(handle, password).expect("well formed");

    let login = harness
        .accounts
        .login(&credentials)
        .await
        .expect_err("login must fail");
    let authenticate = harness
        .accounts
        .authenticate(&credentials)
        .await
        .expect_err("authentication must fail");

    assert_eq!(login.code(), ErrorCode::Unauthorized);
    assert_eq!(login.message(), authenticate.message());
}

#[rstest]
#[tokio::test]
async fn logout_revokes_the_token(#[future] harness: Harness) {
    let harness = harness.await;
    let (token, principal) = harness.login("viewer", "viewer123").await;
    assert_eq!(principal.role, Role::Viewer);

    harness.accounts.logout(&token).await.expect("logout succeeds");
    harness.accounts.logout(&token).await.expect("logout is idempotent");

    assert!(
        harness
            .accounts
            .resolve_principal(&token)
            .await
            .expect("lookup succeeds")
            .is_none()
    );
    let err = harness
        .accounts
        .current_user(&token)
        .await
        .expect_err("token revoked");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn bearer_header_resolves_to_the_account(#[future] harness: Harness) {
    let harness = harness.await;
    let (token, principal) = harness.login("carla", "pass123").await;
    let header = format!("bearer {}", token.as_str());

    let raw = bearer_token(&header).expect("bearer prefix accepted");
    let user = harness
        .accounts
        .current_user(&SessionToken::from_raw(raw))
        .await
        .expect("session is live");

    assert_eq!(user.id, principal.id);
    assert_eq!(user.display_name.as_ref(), "Carla Diaz");
}
