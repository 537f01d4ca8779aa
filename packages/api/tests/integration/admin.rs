use api::ApiError;
use chrono::{TimeDelta, Utc};
use common::hackathon::StartHackathonRequest;
use common::problem::CreateProblemRequest;

use crate::harness::TestApp;

#[tokio::test]
async fn start_hackathon_sends_every_team_id() {
    let app = TestApp::spawn().await;
    let session = app.login("root").await;
    let req = StartHackathonRequest {
        hackathon_name: "Spring Hack".into(),
        team_ids: vec!["team-1".into(), "team-2".into()],
        duration_hours: 24,
    };

    session.start_hackathon(&req).await.unwrap();

    let (path, query) = app.with_state(|s| s.received.last().cloned().unwrap());
    assert_eq!(path, "/api/hackathon/start");
    let teams: Vec<_> = query
        .iter()
        .filter(|(k, _)| k == "teamIds")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(teams, ["team-1", "team-2"]);
    assert!(query.contains(&("durationInHours".into(), "24".into())));
}

#[tokio::test]
async fn invalid_start_request_never_reaches_server() {
    let app = TestApp::spawn().await;
    let session = app.login("root").await;
    let req = StartHackathonRequest {
        hackathon_name: "   ".into(),
        team_ids: vec!["team-1".into()],
        duration_hours: 24,
    };

    let err = session.start_hackathon(&req).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(ref v) if v.field == "hackathonName"));
    assert!(app.with_state(|s| s.received.is_empty()));
}

#[tokio::test]
async fn close_with_and_without_hackathon_id() {
    let app = TestApp::spawn().await;
    app.with_state(|s| s.hackathon_active = true);
    let session = app.login("root").await;

    session.close_hackathon(Some("h2")).await.unwrap();
    session.close_hackathon(None).await.unwrap();

    let received = app.with_state(|s| s.received.clone());
    assert_eq!(received[0].1, vec![("hackathonId".to_string(), "h2".to_string())]);
    assert!(received[1].1.is_empty());
    assert!(!session.hackathon_status().await.unwrap().is_active);
}

#[tokio::test]
async fn teams_excludes_admins() {
    let app = TestApp::spawn().await;
    let session = app.login("root").await;

    let teams = session.teams().await.unwrap();

    let names: Vec<_> = teams.iter().map(|t| t.username.as_str()).collect();
    assert_eq!(names, ["team1", "team2"]);
}

#[tokio::test]
async fn history_is_sorted_newest_first() {
    let app = TestApp::spawn().await;
    let session = app.login("root").await;

    let history = session.history().await.unwrap();

    assert_eq!(history[0].hackathon_id, "h2");
    assert_eq!(history[1].teams[0].team_name, "Rustaceans");
    assert!(history[1].teams[0].has_solution);
}

#[tokio::test]
async fn forbidden_maps_to_its_own_error() {
    let app = TestApp::spawn().await;
    let session = app.login("root").await;

    let err = session.delete_user("admin-1").await.unwrap_err();

    assert!(matches!(err, ApiError::Forbidden));
    session.delete_user("team-2").await.unwrap();
}

#[tokio::test]
async fn create_problem_validates_then_posts() {
    let app = TestApp::spawn().await;
    let session = app.login("root").await;
    let now = Utc::now();
    let mut req = CreateProblemRequest {
        title: "Smart parking".into(),
        description: "Build a parking finder".into(),
        track: "IoT".into(),
        requirements: "Rust".into(),
        release_date: now,
        deadline: Some(now + TimeDelta::days(1)),
    };

    let created = session.create_problem(&req).await.unwrap();
    assert_eq!(created.id.as_deref(), Some("p-new"));
    assert_eq!(created.title, "Smart parking");

    req.title.clear();
    let err = session.create_problem(&req).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn assign_problem_and_solutions_status() {
    let app = TestApp::spawn().await;
    app.with_state(|s| s.all_submitted = true);
    let session = app.login("root").await;

    session.assign_problem("team-1", "p1").await.unwrap();
    let (path, _) = app.with_state(|s| s.received.last().cloned().unwrap());
    assert_eq!(path, "/api/users/team-1/problem/p1");

    assert!(session.solutions_status().await.unwrap().all_submitted);
}
