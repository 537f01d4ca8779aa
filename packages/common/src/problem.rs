use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A problem statement teams can pick for a hackathon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub track: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
}

/// Payload for `POST /hackathon/problems`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProblemRequest {
    pub title: String,
    pub description: String,
    pub track: String,
    pub requirements: String,
    pub release_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}
