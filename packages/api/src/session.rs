use common::hackathon::{
    HackathonRecord, HackathonStatus, SolutionsStatus, StartHackathonRequest, sort_history,
};
use common::participation::Participation;
use common::problem::{CreateProblemRequest, Problem};
use common::role::Role;
use common::user::UserProfile;
use common::validation::{ValidatedSolution, validate_create_problem, validate_start_hackathon};
use reqwest::Method;
use tracing::info;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};

/// Identity of the signed-in principal.
///
/// Created only by [`ApiClient::login`] and dropped by [`Session::logout`]; nothing
/// else holds the token.
#[derive(Debug, Clone)]
pub struct SessionContext {
    token: String,
    pub username: String,
    pub user_id: Option<String>,
    pub team_name: String,
    pub role: Role,
}

impl SessionContext {
    pub fn new(token: String, profile: UserProfile) -> Self {
        Self {
            token,
            username: profile.username,
            user_id: profile.id,
            team_name: profile.team_name,
            role: profile.role,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    fn require_user_id(&self) -> Result<&str> {
        self.user_id
            .as_deref()
            .ok_or_else(|| ApiError::Decode("profile carries no user id".into()))
    }
}

/// An authenticated client: the backend handle plus the session context.
#[derive(Debug, Clone)]
pub struct Session {
    client: ApiClient,
    context: SessionContext,
}

impl Session {
    pub fn new(client: ApiClient, context: SessionContext) -> Self {
        Self { client, context }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// End the session, returning the unauthenticated client.
    pub fn logout(self) -> ApiClient {
        info!(username = %self.context.username, "Logged out");
        self.client
    }

    fn token(&self) -> Option<&str> {
        Some(self.context.token())
    }

    // -----------------------------------------------------------------------
    // Team operations
    // -----------------------------------------------------------------------

    pub async fn profile(&self) -> Result<UserProfile> {
        self.client.get_json("users/profile", self.token()).await
    }

    pub async fn participations(&self) -> Result<Vec<Participation>> {
        Ok(self.profile().await?.hackathon_participations)
    }

    pub async fn problems(&self) -> Result<Vec<Problem>> {
        self.client.get_json("hackathon/problems", self.token()).await
    }

    pub async fn problem(&self, id: &str) -> Result<Problem> {
        self.client
            .get_json(&format!("hackathon/problems/{id}"), self.token())
            .await
    }

    pub async fn select_problem(&self, problem_id: &str) -> Result<()> {
        let team_id = self.context.require_user_id()?;
        self.client
            .send_empty(
                Method::POST,
                &format!("hackathon/problems/{problem_id}/{team_id}"),
                self.token(),
            )
            .await?;
        info!(problem_id, team_id, "Problem selected");
        Ok(())
    }

    pub async fn submit_solution(
        &self,
        hackathon_id: &str,
        solution: &ValidatedSolution,
    ) -> Result<()> {
        let team_id = self.context.require_user_id()?;
        let mut query = vec![
            ("githubUrl", solution.github_url.as_str()),
            ("hackathonId", hackathon_id),
        ];
        if let Some(hosted) = &solution.hosted_url {
            query.push(("hostedUrl", hosted.as_str()));
        }
        self.client
            .send_query(
                Method::POST,
                &format!("hackathon/submit/{team_id}"),
                &query,
                self.token(),
            )
            .await?;
        info!(hackathon_id, team_id, "Solution submitted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Admin operations
    // -----------------------------------------------------------------------

    pub async fn users(&self) -> Result<Vec<UserProfile>> {
        self.client.get_json("users", self.token()).await
    }

    /// Accounts with the team role, as offered when starting a hackathon.
    pub async fn teams(&self) -> Result<Vec<UserProfile>> {
        let mut users = self.users().await?;
        users.retain(|u| u.role == Role::User);
        Ok(users)
    }

    pub async fn user(&self, id: &str) -> Result<UserProfile> {
        self.client
            .get_json(&format!("users/{id}"), self.token())
            .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        self.client
            .send_empty(Method::DELETE, &format!("users/{id}"), self.token())
            .await
    }

    pub async fn assign_problem(&self, user_id: &str, problem_id: &str) -> Result<()> {
        self.client
            .send_empty(
                Method::POST,
                &format!("users/{user_id}/problem/{problem_id}"),
                self.token(),
            )
            .await
    }

    pub async fn create_problem(&self, req: &CreateProblemRequest) -> Result<Problem> {
        validate_create_problem(req)?;
        self.client
            .send_json(Method::POST, "hackathon/problems", req, self.token())
            .await
    }

    pub async fn delete_problem(&self, id: &str) -> Result<()> {
        self.client
            .send_empty(Method::DELETE, &format!("hackathon/problems/{id}"), self.token())
            .await
    }

    pub async fn start_hackathon(&self, req: &StartHackathonRequest) -> Result<()> {
        validate_start_hackathon(req)?;
        let duration = req.duration_hours.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("hackathonName", req.hackathon_name.as_str()),
            ("durationInHours", duration.as_str()),
        ];
        query.extend(req.team_ids.iter().map(|id| ("teamIds", id.as_str())));
        self.client
            .send_query(Method::POST, "hackathon/start", &query, self.token())
            .await?;
        info!(
            name = %req.hackathon_name,
            teams = req.team_ids.len(),
            hours = req.duration_hours,
            "Hackathon started"
        );
        Ok(())
    }

    pub async fn hackathon_status(&self) -> Result<HackathonStatus> {
        self.client.get_json("hackathon/status", self.token()).await
    }

    pub async fn solutions_status(&self) -> Result<SolutionsStatus> {
        self.client
            .get_json("hackathon/solutions/status", self.token())
            .await
    }

    /// Force-close a hackathon. Without an id the backend closes the running one.
    pub async fn close_hackathon(&self, hackathon_id: Option<&str>) -> Result<()> {
        let query: Vec<(&str, &str)> = hackathon_id
            .map(|id| vec![("hackathonId", id)])
            .unwrap_or_default();
        self.client
            .send_query(Method::POST, "hackathon/close", &query, self.token())
            .await?;
        info!(hackathon_id = ?hackathon_id, "Hackathon closed");
        Ok(())
    }

    /// All hackathons, newest first.
    pub async fn history(&self) -> Result<Vec<HackathonRecord>> {
        let mut records: Vec<HackathonRecord> =
            self.client.get_json("hackathon/all", self.token()).await?;
        sort_history(&mut records);
        Ok(records)
    }
}
