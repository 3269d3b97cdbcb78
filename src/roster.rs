use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::models::{Applicant, ApplicationStatus, CandidateProfile};

pub const CGPA_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

/// One applicant read from a roster CSV, with the roll number used to upsert students.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub roll_no: Option<String>,
    pub applicant: Applicant,
}

#[derive(serde::Deserialize)]
struct RosterRow {
    full_name: String,
    #[serde(default)]
    roll_no: Option<String>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    cgpa: Option<f64>,
    #[serde(default)]
    skills: Option<String>,
    #[serde(default)]
    projects: Option<String>,
    #[serde(default)]
    internships: Option<String>,
    #[serde(default)]
    hackathons: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    applied_at: Option<DateTime<Utc>>,
}

pub fn read_roster_path(path: &Path) -> anyhow::Result<Vec<RosterEntry>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open roster {}", path.display()))?;
    read_roster(file).with_context(|| format!("failed to read roster {}", path.display()))
}

pub fn read_roster<R: Read>(input: R) -> anyhow::Result<Vec<RosterEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut entries = Vec::new();

    for (index, result) in reader.deserialize::<RosterRow>().enumerate() {
        let row = result?;
        let status = match row.status.as_deref() {
            Some(value) => value
                .parse::<ApplicationStatus>()
                .with_context(|| format!("roster row {}", index + 1))?,
            None => ApplicationStatus::Applied,
        };
        if let Some(cgpa) = row.cgpa.filter(|cgpa| !CGPA_RANGE.contains(cgpa)) {
            anyhow::bail!("roster row {}: cgpa {cgpa} is outside 0-10", index + 1);
        }

        entries.push(RosterEntry {
            roll_no: row.roll_no,
            applicant: Applicant {
                application_id: None,
                full_name: row.full_name,
                profile: CandidateProfile {
                    cgpa: row.cgpa,
                    branch: row.branch.unwrap_or_default(),
                    skills: row.skills,
                    projects: row.projects,
                    internships: row.internships,
                    hackathons: row.hackathons,
                },
                status,
                applied_at: row.applied_at,
            },
        });
    }

    Ok(entries)
}

/// Roll numbers are the upsert key, so a roster without them cannot be
/// imported idempotently.
pub fn require_roll_numbers(entries: &[RosterEntry]) -> anyhow::Result<Vec<&str>> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            entry
                .roll_no
                .as_deref()
                .filter(|roll_no| !roll_no.is_empty())
                .with_context(|| format!("roster row {} has no roll_no", index + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = "\
full_name,roll_no,branch,cgpa,skills,projects,internships,hackathons
Asha Rao,CS21001,CSE,8.4,\"python, sql\",Inventory tracker in Django,,
Bilal Khan,IT21044,IT,,java,,,Runner-up at DevFest 2024
";

    #[test]
    fn reads_profiles_and_defaults_status() {
        let entries = read_roster(ROSTER.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let asha = &entries[0];
        assert_eq!(asha.roll_no.as_deref(), Some("CS21001"));
        assert_eq!(asha.applicant.profile.cgpa, Some(8.4));
        assert_eq!(asha.applicant.profile.skills.as_deref(), Some("python, sql"));
        assert_eq!(asha.applicant.profile.internships, None);
        assert_eq!(asha.applicant.status, ApplicationStatus::Applied);

        let bilal = &entries[1];
        assert_eq!(bilal.applicant.profile.cgpa, None);
        assert_eq!(bilal.applicant.profile.branch, "IT");
    }

    #[test]
    fn unreadable_cgpa_becomes_missing() {
        let csv = "full_name,cgpa\nChen Li,n/a\n";
        let entries = read_roster(csv.as_bytes()).unwrap();
        assert_eq!(entries[0].applicant.profile.cgpa, None);
    }

    #[test]
    fn explicit_status_and_timestamp_are_kept() {
        let csv = "full_name,status,applied_at\nDevi Nair,Shortlisted,2026-02-03T10:15:00Z\n";
        let entries = read_roster(csv.as_bytes()).unwrap();
        let applicant = &entries[0].applicant;
        assert_eq!(applicant.status, ApplicationStatus::Shortlisted);
        assert_eq!(
            applicant.applied_at.map(|ts| ts.to_rfc3339()),
            Some("2026-02-03T10:15:00+00:00".to_string())
        );
    }

    #[test]
    fn out_of_range_cgpa_names_the_row() {
        let csv = "full_name,cgpa\nEla,9.1\nFarah,11\n";
        let err = read_roster(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("roster row 2"));

        let csv = "full_name,cgpa\nGita,1e308\n";
        assert!(read_roster(csv.as_bytes()).is_err());

        let csv = "full_name,cgpa\nHana,-0.5\n";
        assert!(read_roster(csv.as_bytes()).is_err());
    }

    #[test]
    fn boundary_cgpa_values_are_accepted() {
        let csv = "full_name,cgpa\nIra,0\nJaya,10\n";
        let entries = read_roster(csv.as_bytes()).unwrap();
        assert_eq!(entries[0].applicant.profile.cgpa, Some(0.0));
        assert_eq!(entries[1].applicant.profile.cgpa, Some(10.0));
    }

    #[test]
    fn roll_numbers_are_required_for_import() {
        let entries = read_roster(ROSTER.as_bytes()).unwrap();
        assert_eq!(
            require_roll_numbers(&entries).unwrap(),
            vec!["CS21001", "IT21044"]
        );

        let csv = "full_name,roll_no\nKavya,CS21090\nLeela,\n";
        let entries = read_roster(csv.as_bytes()).unwrap();
        let err = require_roll_numbers(&entries).unwrap_err();
        assert!(err.to_string().contains("roster row 2 has no roll_no"));
    }

    #[test]
    fn unknown_status_names_the_row() {
        let csv = "full_name,status\nEla,applied\nFarah,hired\n";
        let err = read_roster(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("roster row 2"));
    }
}
