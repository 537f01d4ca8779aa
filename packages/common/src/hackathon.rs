use serde::{Deserialize, Serialize};

/// Response of `GET /hackathon/status`: the most recently started event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HackathonStatus {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Duration in hours.
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Response of `GET /hackathon/solutions/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionsStatus {
    pub all_submitted: bool,
}

/// One team's row in a hackathon history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    pub team_name: String,
    #[serde(default)]
    pub member_names: Vec<String>,
    #[serde(default)]
    pub has_solution: bool,
}

/// One event in `GET /hackathon/all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HackathonRecord {
    pub hackathon_id: String,
    pub hackathon_name: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub teams: Vec<TeamInfo>,
}

/// Parameters for `POST /hackathon/start`.
#[derive(Debug, Clone, PartialEq)]
pub struct StartHackathonRequest {
    pub hackathon_name: String,
    pub team_ids: Vec<String>,
    pub duration_hours: u32,
}

/// Sort history newest-first by start time. Records with unparsable starts sink to
/// the bottom in their original order.
pub fn sort_history(records: &mut [HackathonRecord]) {
    records.sort_by_cached_key(|r| {
        std::cmp::Reverse(crate::time::parse_instant(&r.start_time).ok())
    });
}
