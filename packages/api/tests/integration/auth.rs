use api::ApiError;
use common::role::Role;

use crate::harness::{PASSWORD, TestApp};

#[tokio::test]
async fn login_builds_session_context_from_profile() {
    let app = TestApp::spawn().await;

    let session = app.client().login("team1", PASSWORD).await.unwrap();
    let ctx = session.context();

    assert_eq!(ctx.username, "team1");
    assert_eq!(ctx.user_id.as_deref(), Some("team-1"));
    assert_eq!(ctx.team_name, "Rustaceans");
    assert_eq!(ctx.role, Role::User);
    assert_eq!(ctx.token(), "tok-team1");
    assert!(!ctx.is_admin());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;

    let err = app.client().login("team1", "nope").await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn admin_role_is_carried_into_context() {
    let app = TestApp::spawn().await;
    app.with_state(|s| s.role = "ROLE_ADMIN");

    let session = app.login("root").await;

    assert!(session.context().is_admin());
}

#[tokio::test]
async fn logout_hands_back_a_usable_client() {
    let app = TestApp::spawn().await;
    let session = app.login("team1").await;

    let client = session.logout();
    let again = client.login("team1", PASSWORD).await.unwrap();

    assert_eq!(again.context().username, "team1");
}
