use thiserror::Error;
use url::Url;

use crate::hackathon::StartHackathonRequest;
use crate::problem::CreateProblemRequest;

/// A field-level rejection of client input. Raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Wire name of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Solution form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionField {
    GithubUrl,
    HostedUrl,
}

impl SolutionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GithubUrl => "githubUrl",
            Self::HostedUrl => "hostedUrl",
        }
    }
}

/// Raw user input for a solution submission.
///
/// Validation borrows the form, so on any failure the caller still holds the
/// entered values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionForm {
    pub github_url: String,
    pub hosted_url: String,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSolution {
    pub github_url: Url,
    pub hosted_url: Option<Url>,
}

impl SolutionForm {
    pub fn new(github_url: impl Into<String>, hosted_url: impl Into<String>) -> Self {
        Self {
            github_url: github_url.into(),
            hosted_url: hosted_url.into(),
        }
    }

    pub fn validate(&self) -> Result<ValidatedSolution, ValidationError> {
        let github = self.github_url.trim();
        if github.is_empty() {
            return Err(ValidationError::new(
                SolutionField::GithubUrl.as_str(),
                "repository URL is required",
            ));
        }
        let github_url = parse_web_url(SolutionField::GithubUrl, github)?;

        let hosted = self.hosted_url.trim();
        let hosted_url = if hosted.is_empty() {
            None
        } else {
            Some(parse_web_url(SolutionField::HostedUrl, hosted)?)
        };

        Ok(ValidatedSolution {
            github_url,
            hosted_url,
        })
    }
}

fn parse_web_url(field: SolutionField, raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw)
        .map_err(|e| ValidationError::new(field.as_str(), format!("invalid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::new(
            field.as_str(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::new(field.as_str(), "URL has no host"));
    }
    Ok(url)
}

pub fn validate_create_problem(req: &CreateProblemRequest) -> Result<(), ValidationError> {
    let title = req.title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(ValidationError::new("title", "must be 1-256 characters"));
    }
    if req.description.trim().is_empty() {
        return Err(ValidationError::new("description", "must be non-empty"));
    }
    if req.track.trim().is_empty() {
        return Err(ValidationError::new("track", "must be non-empty"));
    }
    if let Some(deadline) = req.deadline
        && deadline <= req.release_date
    {
        return Err(ValidationError::new(
            "deadline",
            "must be after releaseDate",
        ));
    }
    Ok(())
}

pub fn validate_start_hackathon(req: &StartHackathonRequest) -> Result<(), ValidationError> {
    if req.hackathon_name.trim().is_empty() {
        return Err(ValidationError::new("hackathonName", "must be non-empty"));
    }
    if req.team_ids.is_empty() {
        return Err(ValidationError::new("teamIds", "select at least one team"));
    }
    if req.duration_hours == 0 {
        return Err(ValidationError::new(
            "durationInHours",
            "must be at least one hour",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};

    #[test]
    fn test_solution_requires_repository() {
        let form = SolutionForm::new("  ", "https://demo.example.com");
        let err = form.validate().unwrap_err();
        assert_eq!(err.field, "githubUrl");
    }

    #[test]
    fn test_solution_accepts_repo_only() {
        let v = SolutionForm::new("https://github.com/team/repo", "")
            .validate()
            .unwrap();
        assert_eq!(v.github_url.as_str(), "https://github.com/team/repo");
        assert!(v.hosted_url.is_none());
    }

    #[test]
    fn test_solution_rejects_bad_hosted_url() {
        let err = SolutionForm::new("https://github.com/team/repo", "not a url")
            .validate()
            .unwrap_err();
        assert_eq!(err.field, "hostedUrl");
    }

    #[test]
    fn test_solution_rejects_non_web_scheme() {
        let err = SolutionForm::new("ftp://github.com/team/repo", "")
            .validate()
            .unwrap_err();
        assert_eq!(err.field, "githubUrl");
        assert!(err.message.contains("ftp"));
    }

    #[test]
    fn test_solution_form_survives_failed_validation() {
        let form = SolutionForm::new("https://github.com/team/repo", "bogus");
        assert!(form.validate().is_err());
        assert_eq!(form.github_url, "https://github.com/team/repo");
        assert_eq!(form.hosted_url, "bogus");
    }

    #[test]
    fn test_start_hackathon_validation() {
        let mut req = StartHackathonRequest {
            hackathon_name: "Spring".into(),
            team_ids: vec!["t1".into()],
            duration_hours: 24,
        };
        assert!(validate_start_hackathon(&req).is_ok());

        req.duration_hours = 0;
        assert_eq!(
            validate_start_hackathon(&req).unwrap_err().field,
            "durationInHours"
        );

        req.duration_hours = 1;
        req.team_ids.clear();
        assert_eq!(validate_start_hackathon(&req).unwrap_err().field, "teamIds");
    }

    #[test]
    fn test_create_problem_deadline_after_release() {
        let now = Utc::now();
        let mut req = CreateProblemRequest {
            title: "Smart parking".into(),
            description: "Build it".into(),
            track: "IoT".into(),
            requirements: String::new(),
            release_date: now,
            deadline: Some(now - TimeDelta::hours(1)),
        };
        assert_eq!(validate_create_problem(&req).unwrap_err().field, "deadline");

        req.deadline = Some(now + TimeDelta::days(2));
        assert!(validate_create_problem(&req).is_ok());
    }
}
