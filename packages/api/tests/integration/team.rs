use api::{ApiError, HackathonApi};
use common::retry::RetryPolicy;
use common::validation::SolutionForm;

use crate::harness::{TestApp, participation};

fn query_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn fetch_participations_reads_profile_list() {
    let app = TestApp::spawn().await;
    app.with_state(|s| {
        s.participations = vec![
            participation("h1", "2024-05-01T10:00:00Z", "2024-05-01T12:00:00Z", true),
            participation("h0", "garbage", "2024-01-01T12:00:00Z", false),
        ]
    });
    let session = app.login("team1").await;

    let list = session.fetch_participations().await.unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list[0].hackathon_id, "h1");
    assert!(list[0].window().is_ok());
    assert!(list[1].window().is_err());
}

#[tokio::test]
async fn submit_solution_sends_links_and_updates_server_state() {
    let app = TestApp::spawn().await;
    app.with_state(|s| {
        s.participations = vec![participation(
            "h1",
            "2024-05-01T10:00:00Z",
            "2099-05-01T12:00:00Z",
            true,
        )]
    });
    let session = app.login("team1").await;
    let solution = SolutionForm::new("https://github.com/team/repo", "https://demo.example.com")
        .validate()
        .unwrap();

    HackathonApi::submit_solution(&session, "h1", &solution)
        .await
        .unwrap();

    let (path, query) = app.with_state(|s| s.received.last().cloned().unwrap());
    assert_eq!(path, "/api/hackathon/submit/team-1");
    assert_eq!(
        query_value(&query, "githubUrl"),
        Some("https://github.com/team/repo")
    );
    assert_eq!(
        query_value(&query, "hostedUrl"),
        Some("https://demo.example.com/")
    );
    assert_eq!(query_value(&query, "hackathonId"), Some("h1"));

    let list = session.fetch_participations().await.unwrap();
    assert!(list[0].has_solution());
}

#[tokio::test]
async fn submit_without_hosted_url_omits_parameter() {
    let app = TestApp::spawn().await;
    let session = app.login("team1").await;
    let solution = SolutionForm::new("https://github.com/team/repo", "")
        .validate()
        .unwrap();

    session.submit_solution("h1", &solution).await.unwrap();

    let (_, query) = app.with_state(|s| s.received.last().cloned().unwrap());
    assert_eq!(query_value(&query, "hostedUrl"), None);
}

#[tokio::test]
async fn select_problem_posts_to_team_path() {
    let app = TestApp::spawn().await;
    let session = app.login("team1").await;

    session.select_problem("p1").await.unwrap();

    let (path, _) = app.with_state(|s| s.received.last().cloned().unwrap());
    assert_eq!(path, "/api/hackathon/problems/p1/team-1");
}

#[tokio::test]
async fn transient_get_failures_are_retried() {
    let app = TestApp::spawn().await;
    app.with_state(|s| s.problems_failures = 2);
    let retry = RetryPolicy {
        max_retries: 3,
        base_delay_ms: 1,
        max_delay_ms: 5,
    };
    let session = app
        .client_with_retry(retry)
        .login("team1", crate::harness::PASSWORD)
        .await
        .unwrap();

    let problems = session.problems().await.unwrap();

    assert_eq!(problems.len(), 1);
    assert_eq!(app.with_state(|s| s.problems_calls), 3);
}

#[tokio::test]
async fn retries_stop_when_budget_is_exhausted() {
    let app = TestApp::spawn().await;
    app.with_state(|s| s.problems_failures = 10);
    let retry = RetryPolicy {
        max_retries: 2,
        base_delay_ms: 1,
        max_delay_ms: 5,
    };
    let session = app
        .client_with_retry(retry)
        .login("team1", crate::harness::PASSWORD)
        .await
        .unwrap();

    let err = session.problems().await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 503, .. }));
    assert!(err.is_transient());
    assert_eq!(app.with_state(|s| s.problems_calls), 3);
}
