use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The slice of a student's record that the match scorer reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub cgpa: Option<f64>,
    pub branch: String,
    pub skills: Option<String>,
    pub projects: Option<String>,
    pub internships: Option<String>,
    pub hackathons: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Shortlisted,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown application status '{0}' (expected applied, shortlisted, rejected or accepted)")]
pub struct ParseStatusError(pub String);

impl FromStr for ApplicationStatus {
    type Err = ParseStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseStatusError(value.to_string()))
    }
}

/// An application row: the scored profile plus fields carried through for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub application_id: Option<Uuid>,
    pub full_name: String,
    pub profile: CandidateProfile,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub applicant: Applicant,
    pub match_score: f64,
}

#[derive(Debug, Clone)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub eligibility: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn eligibility_text(&self) -> &str {
        self.eligibility.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct JobSummary {
    pub posting: JobPosting,
    pub applicant_count: i64,
}

#[derive(Debug, Clone)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("job title must not be empty")]
pub struct EmptyTitleError;

/// A posting as a recruiter submits it; company and owner come from the recruiter.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub location: Option<String>,
    pub eligibility: Option<String>,
    pub description: Option<String>,
}

impl NewJob {
    /// Blank optional fields are stored as NULL.
    pub fn new(
        title: &str,
        location: Option<&str>,
        eligibility: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self, EmptyTitleError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EmptyTitleError);
        }

        let non_blank = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            title: title.to_string(),
            location: non_blank(location),
            eligibility: non_blank(eligibility),
            description: non_blank(description),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecruiterSummary {
    pub id: Uuid,
    pub email: String,
    pub company: String,
    pub is_approved: bool,
    pub job_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "Shortlisted".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::Shortlisted)
        );
        assert_eq!(
            " accepted ".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::Accepted)
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "hired".parse::<ApplicationStatus>().unwrap_err();
        assert_eq!(err, ParseStatusError("hired".to_string()));
        assert!(err.to_string().contains("hired"));
    }

    #[test]
    fn status_display_matches_stored_value() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.to_string().parse::<ApplicationStatus>(), Ok(status));
        }
    }

    #[test]
    fn missing_eligibility_reads_as_empty() {
        let job = JobPosting {
            id: Uuid::new_v4(),
            title: "Graduate Engineer".to_string(),
            company: "Northwind".to_string(),
            location: None,
            eligibility: None,
            created_at: Utc::now(),
        };
        assert_eq!(job.eligibility_text(), "");
    }

    #[test]
    fn new_job_trims_and_drops_blank_fields() {
        let job = NewJob::new(
            "  Data Engineer Intern ",
            Some("Bengaluru"),
            Some("   "),
            None,
        )
        .unwrap();
        assert_eq!(job.title, "Data Engineer Intern");
        assert_eq!(job.location.as_deref(), Some("Bengaluru"));
        assert_eq!(job.eligibility, None);
        assert_eq!(job.description, None);
    }

    #[test]
    fn new_job_requires_a_title() {
        assert_eq!(NewJob::new(" ", None, None, None), Err(EmptyTitleError));
    }
}
