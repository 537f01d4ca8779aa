use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use api::{ApiClient, Session};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use common::retry::RetryPolicy;
use serde_json::{Value, json};

pub const PASSWORD: &str = "pass1234";

/// Mutable backend state the stub routes read and write.
#[derive(Default)]
pub struct StubState {
    pub participations: Vec<Value>,
    pub role: &'static str,
    /// Number of upcoming `GET /hackathon/problems` calls that answer 503.
    pub problems_failures: u32,
    pub problems_calls: u32,
    pub all_submitted: bool,
    pub hackathon_active: bool,
    /// Query strings received by POST endpoints, in arrival order.
    pub received: Vec<(String, Vec<(String, String)>)>,
}

type Shared = Arc<Mutex<StubState>>;

/// A stub backend listening on a random local port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState {
            role: "ROLE_USER",
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/users/profile", get(profile))
            .route("/api/users", get(users))
            .route("/api/users/{id}", delete(delete_user))
            .route("/api/users/{user_id}/problem/{problem_id}", post(record))
            .route("/api/hackathon/problems", get(problems).post(create_problem))
            .route("/api/hackathon/problems/{problem_id}/{team_id}", post(record))
            .route("/api/hackathon/submit/{team_id}", post(submit))
            .route("/api/hackathon/start", post(record))
            .route("/api/hackathon/close", post(close))
            .route("/api/hackathon/status", get(status))
            .route("/api/hackathon/solutions/status", get(solutions_status))
            .route("/api/hackathon/all", get(history))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn client(&self) -> ApiClient {
        self.client_with_retry(RetryPolicy::NONE)
    }

    pub fn client_with_retry(&self, retry: RetryPolicy) -> ApiClient {
        ApiClient::with_http(
            reqwest::Client::new(),
            &format!("http://{}/api", self.addr),
            retry,
        )
        .expect("valid base url")
    }

    pub async fn login(&self, username: &str) -> Session {
        self.client()
            .login(username, PASSWORD)
            .await
            .expect("login failed")
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut StubState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

pub fn participation(id: &str, start: &str, end: &str, active: bool) -> Value {
    json!({
        "hackathonId": id,
        "hackathonName": format!("Hackathon {id}"),
        "startTime": start,
        "endTime": end,
        "active": active,
        "solution": null,
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer tok-"))
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Bad credentials"})))
            .into_response();
    }
    let username = body["username"].as_str().unwrap_or_default();
    Json(json!({
        "token": format!("tok-{username}"),
        "username": username,
        "message": "ok",
    }))
    .into_response()
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let state = state.lock().unwrap();
    Json(json!({
        "id": "team-1",
        "teamName": "Rustaceans",
        "username": "team1",
        "email": "team1@example.com",
        "teamMembers": [
            {"name": "Ada", "email": "ada@example.com", "college": "MIT", "leader": true}
        ],
        "role": state.role,
        "hackathonParticipations": state.participations,
    }))
    .into_response()
}

async fn users() -> Json<Value> {
    Json(json!([
        {"id": "team-1", "teamName": "Rustaceans", "username": "team1", "role": "ROLE_USER"},
        {"id": "admin-1", "teamName": "", "username": "root", "role": "ROLE_ADMIN"},
        {"id": "team-2", "teamName": "Gophers", "username": "team2", "role": "ROLE_USER"},
    ]))
}

async fn delete_user(Path(id): Path<String>, headers: HeaderMap) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    if id == "admin-1" {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn problems(State(state): State<Shared>) -> Response {
    let mut state = state.lock().unwrap();
    state.problems_calls += 1;
    if state.problems_failures > 0 {
        state.problems_failures -= 1;
        return (StatusCode::SERVICE_UNAVAILABLE, "try later").into_response();
    }
    Json(json!([
        {"id": "p1", "title": "Smart parking", "description": "d", "track": "IoT", "requirements": ""}
    ]))
    .into_response()
}

async fn create_problem(Json(body): Json<Value>) -> Json<Value> {
    let mut problem = body;
    problem["id"] = json!("p-new");
    Json(problem)
}

async fn record(
    State(state): State<Shared>,
    Query(query): Query<Vec<(String, String)>>,
    uri: axum::http::Uri,
) -> StatusCode {
    state
        .lock()
        .unwrap()
        .received
        .push((uri.path().to_string(), query));
    StatusCode::OK
}

async fn submit(
    State(state): State<Shared>,
    Path(team_id): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    let lookup = |key: &str| {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    let hackathon_id = lookup("hackathonId");
    let github = lookup("githubUrl");
    let hosted = lookup("hostedUrl");
    for p in state.participations.iter_mut() {
        if Some(p["hackathonId"].as_str().unwrap_or_default().to_string()) == hackathon_id {
            p["solution"] = json!({
                "githubUrl": github,
                "hostedUrl": hosted,
                "submissionTime": "2024-05-01T11:00:00Z",
            });
        }
    }
    state
        .received
        .push((format!("/api/hackathon/submit/{team_id}"), query));
    StatusCode::OK
}

async fn close(
    State(state): State<Shared>,
    Query(query): Query<Vec<(String, String)>>,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    state.hackathon_active = false;
    state.received.push(("/api/hackathon/close".into(), query));
    StatusCode::OK
}

async fn status(State(state): State<Shared>) -> Json<Value> {
    let state = state.lock().unwrap();
    Json(json!({
        "isActive": state.hackathon_active,
        "name": "Spring Hack",
        "startTime": "2024-05-01T10:00:00Z",
        "duration": 24,
    }))
}

async fn solutions_status(State(state): State<Shared>) -> Json<Value> {
    Json(json!({ "allSubmitted": state.lock().unwrap().all_submitted }))
}

async fn history() -> Json<Value> {
    Json(json!([
        {"hackathonId": "h1", "hackathonName": "Winter", "startTime": "2024-01-01T00:00:00Z",
         "endTime": "2024-01-02T00:00:00Z", "active": false,
         "teams": [{"teamName": "Rustaceans", "memberNames": ["Ada"], "hasSolution": true}]},
        {"hackathonId": "h2", "hackathonName": "Spring", "startTime": "2024-05-01T00:00:00Z",
         "endTime": "2024-05-02T00:00:00Z", "active": true, "teams": []},
    ]))
}
