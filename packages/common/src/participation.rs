use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::parse_instant;

/// A team's record of involvement in one hackathon event, as reported by the backend.
///
/// Timestamps are kept as the raw wire strings so that one malformed record never
/// fails deserialization of the whole list. Use [`Participation::start`] and
/// [`Participation::end`] to get instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub hackathon_id: String,
    #[serde(default)]
    pub hackathon_name: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    /// Server-asserted flag. Treated as a hint: elapsed time or a solution ends the
    /// participation regardless of this value.
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_problem: Option<SelectedProblem>,
    #[serde(default)]
    pub solution: Option<Solution>,
}

/// The problem a team picked (or was assigned) for a participation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedProblem {
    pub id: String,
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

/// A team's submission for a participation.
///
/// The backend sends `{"githubUrl": null, ...}` for participations that were created
/// but never submitted to; [`Participation::has_solution`] treats that shape as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub github_url: Option<String>,
    #[serde(default)]
    pub hosted_url: Option<String>,
    #[serde(default)]
    pub submission_time: Option<String>,
}

/// Why a participation's timestamps could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("unparsable {field} timestamp {value:?}")]
    Unparsable { field: &'static str, value: String },

    #[error("end {end} is not after start {start}")]
    EndNotAfterStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Parsed start/end window of a participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Participation {
    pub fn start(&self) -> Result<DateTime<Utc>, TimestampError> {
        parse_field("start", &self.start_time)
    }

    pub fn end(&self) -> Result<DateTime<Utc>, TimestampError> {
        parse_field("end", &self.end_time)
    }

    /// Both timestamps, checked for `end > start`.
    pub fn window(&self) -> Result<Window, TimestampError> {
        let start = self.start()?;
        let end = self.end()?;
        if end <= start {
            return Err(TimestampError::EndNotAfterStart { start, end });
        }
        Ok(Window { start, end })
    }

    /// Returns true if a solution with a repository link has been recorded.
    pub fn has_solution(&self) -> bool {
        self.solution
            .as_ref()
            .and_then(|s| s.github_url.as_deref())
            .is_some_and(|url| !url.trim().is_empty())
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<DateTime<Utc>, TimestampError> {
    parse_instant(value).map_err(|_| TimestampError::Unparsable {
        field,
        value: value.to_string(),
    })
}
