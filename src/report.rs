use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::criteria::JobRequirements;
use crate::models::{ApplicationStatus, JobPosting, MatchResult, StatusCount};
use crate::scoring;

/// Flat view of a ranked applicant, used for CSV and JSON output.
#[derive(Debug, Serialize)]
pub struct ShortlistRow<'a> {
    pub rank: usize,
    pub full_name: &'a str,
    pub match_score: f64,
    pub cgpa: Option<f64>,
    pub branch: &'a str,
    pub skills: Option<&'a str>,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
    pub application_id: Option<Uuid>,
}

pub fn shortlist_rows(results: &[MatchResult], limit: usize) -> Vec<ShortlistRow<'_>> {
    results
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, result)| {
            let applicant = &result.applicant;
            ShortlistRow {
                rank: index + 1,
                full_name: &applicant.full_name,
                match_score: result.match_score,
                cgpa: applicant.profile.cgpa,
                branch: &applicant.profile.branch,
                skills: applicant.profile.skills.as_deref(),
                status: applicant.status,
                applied_at: applicant.applied_at,
                application_id: applicant.application_id,
            }
        })
        .collect()
}

pub fn render_text(results: &[MatchResult], limit: usize) -> String {
    let mut output = String::new();

    for row in shortlist_rows(results, limit) {
        let _ = writeln!(
            output,
            "{:>3}. {} score {:.1} (cgpa {}, {}, skills: {}) [{}]",
            row.rank,
            row.full_name,
            row.match_score,
            format_cgpa(row.cgpa),
            display_or_dash(row.branch),
            display_or_dash(row.skills.unwrap_or_default()),
            row.status
        );
    }

    output
}

pub fn write_csv<W: std::io::Write>(
    results: &[MatchResult],
    limit: usize,
    out: W,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in shortlist_rows(results, limit) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: std::io::Write>(
    results: &[MatchResult],
    limit: usize,
    out: W,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(out, &shortlist_rows(results, limit))?;
    Ok(())
}

pub fn summarize_statuses(results: &[MatchResult]) -> Vec<StatusCount> {
    let mut map: HashMap<ApplicationStatus, i64> = HashMap::new();

    for result in results {
        *map.entry(result.applicant.status).or_insert(0) += 1;
    }

    let mut counts: Vec<StatusCount> = ApplicationStatus::ALL
        .into_iter()
        .filter_map(|status| {
            map.get(&status)
                .map(|count| StatusCount { status, count: *count })
        })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn build_report(
    job: &JobPosting,
    requirements: &JobRequirements,
    results: &[MatchResult],
    generated_at: DateTime<Utc>,
) -> String {
    let statuses = summarize_statuses(results);
    let mut output = String::new();

    let _ = writeln!(output, "# Shortlist: {} at {}", job.title, job.company);
    let _ = writeln!(
        output,
        "Generated {} for {} applicants",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        results.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Eligibility");

    if job.eligibility_text().trim().is_empty() {
        let _ = writeln!(output, "No eligibility criteria posted.");
    } else {
        for line in job.eligibility_text().trim().lines() {
            let _ = writeln!(output, "> {}", line.trim_end());
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "- Minimum CGPA: {}",
        requirements
            .min_cgpa
            .map(|value| format!("{value}"))
            .unwrap_or_else(|| "not stated".to_string())
    );
    if requirements.keywords.is_empty() {
        let _ = writeln!(output, "- Keywords: none recognised");
    } else {
        let keywords: Vec<&str> = requirements.keywords.iter().map(String::as_str).collect();
        let _ = writeln!(output, "- Keywords: {}", keywords.join(", "));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Ranked Applicants");

    if results.is_empty() {
        let _ = writeln!(output, "No applicants for this job yet.");
    } else {
        let _ = writeln!(
            output,
            "| # | Name | Score | CGPA | Skills | Experience | CGPA pts | Status |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|---|---|---|");
        for (index, result) in results.iter().enumerate() {
            let applicant = &result.applicant;
            let parts = scoring::breakdown(requirements, &applicant.profile);
            let _ = writeln!(
                output,
                "| {} | {} | {:.1} | {} | {:.0} | {:.0} | {:.1} | {} |",
                index + 1,
                table_cell(&applicant.full_name),
                result.match_score,
                format_cgpa(applicant.profile.cgpa),
                parts.skills,
                parts.experience,
                parts.cgpa,
                applicant.status
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Status Mix");

    if statuses.is_empty() {
        let _ = writeln!(output, "No applications recorded.");
    } else {
        for status in statuses.iter() {
            let _ = writeln!(output, "- {}: {}", status.status, status.count);
        }
    }

    output
}

fn format_cgpa(cgpa: Option<f64>) -> String {
    cgpa.map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

/// Keeps free text inside one markdown table cell.
fn table_cell(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim().replace('|', "\\|"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
