use serde::{Deserialize, Serialize};

use crate::participation::Participation;
use crate::role::Role;

/// One person on a registered team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub leader: bool,
}

/// A team account as returned by `/users/profile` and `/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub team_name: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub assigned_problem_id: Option<String>,
    #[serde(default)]
    pub solution_submitted: Option<bool>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub hackathon_participations: Vec<Participation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub team_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub team_members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
    #[serde(default)]
    pub message: String,
}
