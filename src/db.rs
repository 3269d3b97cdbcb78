use anyhow::Context;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::models::{
    Applicant, ApplicationStatus, CandidateProfile, JobPosting, JobSummary, NewJob,
    RecruiterSummary, StatusCount,
};
use crate::roster::{self, RosterEntry};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let company_id = Uuid::parse_str("6f1c2b9e-4d0a-4c51-9a43-0d2a9f3b7e11")?;
    let recruiter_id = Uuid::parse_str("b2e4d6a8-1c3e-4f5a-8b7c-9d0e1f2a3b4c")?;

    sqlx::query(
        r#"
        INSERT INTO placement.companies (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(company_id)
    .bind("Northwind Analytics")
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO placement.recruiters (id, email, company_id, is_approved)
        VALUES ($1, $2, $3, TRUE)
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(recruiter_id)
    .bind("campus.hiring@northwind.example")
    .bind(company_id)
    .execute(pool)
    .await?;

    let jobs = vec![
        (
            Uuid::parse_str("0a6e7f3c-2b1d-4e8f-9c5a-3d4b5c6e7f80")?,
            "Data Engineer Intern",
            "Bengaluru",
            "CGPA > 7.5, Branch: CSE/IT, Skills: Python, SQL",
            "Build ingestion pipelines for the analytics warehouse.",
        ),
        (
            Uuid::parse_str("1b7f8a4d-3c2e-4f9a-8d6b-4e5c6d7f8a91")?,
            "Backend Developer",
            "Pune",
            "CGPA > 7.0, Skills: Java / Spring and PostgreSQL",
            "Own REST services for the customer billing platform.",
        ),
    ];

    for (id, title, location, eligibility, description) in &jobs {
        sqlx::query(
            r#"
            INSERT INTO placement.jobs
            (id, recruiter_id, company_id, title, location, eligibility, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(recruiter_id)
        .bind(company_id)
        .bind(title)
        .bind(location)
        .bind(eligibility)
        .bind(description)
        .execute(pool)
        .await?;
    }

    let students = vec![
        (
            "CS21001",
            "Asha Rao",
            "CSE",
            Some(8.4),
            Some("python, sql, airflow"),
            Some("Inventory forecasting service in Django"),
            Some("Summer analyst at a logistics startup"),
            None,
        ),
        (
            "IT21044",
            "Bilal Khan",
            "IT",
            Some(7.2),
            Some("java, spring, postgresql"),
            Some("Ticket booking backend with Spring Boot"),
            None,
            Some("Runner-up at DevFest 2024"),
        ),
        (
            "EC21017",
            "Kiara Patel",
            "ECE",
            Some(9.1),
            Some("embedded c, python"),
            None,
            None,
            None,
        ),
        ("ME21090", "Jules Moreno", "MECH", None, None, None, None, None),
    ];

    let mut tx = pool.begin().await?;

    for (roll_no, full_name, branch, cgpa, skills, projects, internships, hackathons) in students
    {
        let student_id = upsert_student(
            &mut tx,
            roll_no,
            full_name,
            &CandidateProfile {
                cgpa,
                branch: branch.to_string(),
                skills: skills.map(str::to_string),
                projects: projects.map(str::to_string),
                internships: internships.map(str::to_string),
                hackathons: hackathons.map(str::to_string),
            },
        )
        .await?;

        for (job_id, ..) in &jobs {
            insert_application(&mut tx, *job_id, student_id, ApplicationStatus::Applied, None)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// `None` when the recruiter does not exist.
pub async fn recruiter_approval(pool: &PgPool, recruiter_id: Uuid) -> anyhow::Result<Option<bool>> {
    let row = sqlx::query("SELECT is_approved FROM placement.recruiters WHERE id = $1")
        .bind(recruiter_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| row.get("is_approved")))
}

pub async fn fetch_jobs(
    pool: &PgPool,
    recruiter_id: Option<Uuid>,
) -> anyhow::Result<Vec<JobSummary>> {
    let mut query = String::from(
        "SELECT j.id, j.title, c.name AS company, j.location, j.eligibility, j.created_at, \
         (SELECT COUNT(*) FROM placement.applications a WHERE a.job_id = j.id) AS applicants \
         FROM placement.jobs j \
         JOIN placement.companies c ON c.id = j.company_id",
    );

    if recruiter_id.is_some() {
        query.push_str(" WHERE j.recruiter_id = $1");
    }
    query.push_str(" ORDER BY j.created_at DESC");

    let mut rows = sqlx::query(&query);
    if let Some(value) = recruiter_id {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut jobs = Vec::new();

    for row in records {
        jobs.push(JobSummary {
            posting: job_from_row(&row),
            applicant_count: row.get("applicants"),
        });
    }

    Ok(jobs)
}

/// Jobs owned by another recruiter are invisible when `recruiter_id` is given.
pub async fn fetch_job(
    pool: &PgPool,
    job_id: Uuid,
    recruiter_id: Option<Uuid>,
) -> anyhow::Result<Option<JobPosting>> {
    let row = sqlx::query(
        r#"
        SELECT j.id, j.title, c.name AS company, j.location, j.eligibility, j.created_at
        FROM placement.jobs j
        JOIN placement.companies c ON c.id = j.company_id
        WHERE j.id = $1 AND ($2::uuid IS NULL OR j.recruiter_id = $2)
        "#,
    )
    .bind(job_id)
    .bind(recruiter_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(job_from_row))
}

/// Applicants in application order, the order ties are left in after ranking.
pub async fn fetch_applicants(pool: &PgPool, job_id: Uuid) -> anyhow::Result<Vec<Applicant>> {
    let records = sqlx::query(
        r#"
        SELECT a.id AS application_id, s.full_name, s.cgpa, s.branch, s.skills,
               s.projects, s.internships, s.hackathons, a.status, a.applied_at
        FROM placement.applications a
        JOIN placement.students s ON s.id = a.student_id
        WHERE a.job_id = $1
        ORDER BY a.applied_at, a.id
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    let mut applicants = Vec::new();

    for row in records {
        let status: String = row.get("status");
        applicants.push(Applicant {
            application_id: Some(row.get("application_id")),
            full_name: row.get("full_name"),
            profile: CandidateProfile {
                cgpa: row.get("cgpa"),
                branch: row.get("branch"),
                skills: row.get("skills"),
                projects: row.get("projects"),
                internships: row.get("internships"),
                hackathons: row.get("hackathons"),
            },
            status: status.parse()?,
            applied_at: Some(row.get("applied_at")),
        });
    }

    Ok(applicants)
}

/// Returns how many new applications were created; re-imports are no-ops.
/// Every row needs a roll number, and the whole roster lands or none of it does.
pub async fn import_roster(
    pool: &PgPool,
    job_id: Uuid,
    entries: &[RosterEntry],
) -> anyhow::Result<usize> {
    let roll_numbers = roster::require_roll_numbers(entries)?;
    let mut tx = pool.begin().await?;
    let mut inserted = 0usize;

    for (roll_no, entry) in roll_numbers.into_iter().zip(entries) {
        let applicant = &entry.applicant;

        let student_id =
            upsert_student(&mut tx, roll_no, &applicant.full_name, &applicant.profile).await?;

        if insert_application(&mut tx, job_id, student_id, applicant.status, applicant.applied_at)
            .await?
        {
            inserted += 1;
        }
    }

    tx.commit().await?;
    Ok(inserted)
}

pub async fn fetch_recruiters(pool: &PgPool) -> anyhow::Result<Vec<RecruiterSummary>> {
    let records = sqlx::query(
        r#"
        SELECT r.id, r.email, c.name AS company, r.is_approved,
               (SELECT COUNT(*) FROM placement.jobs j WHERE j.recruiter_id = r.id) AS jobs
        FROM placement.recruiters r
        JOIN placement.companies c ON c.id = r.company_id
        ORDER BY r.is_approved, r.email
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut recruiters = Vec::new();

    for row in records {
        recruiters.push(RecruiterSummary {
            id: row.get("id"),
            email: row.get("email"),
            company: row.get("company"),
            is_approved: row.get("is_approved"),
            job_count: row.get("jobs"),
        });
    }

    Ok(recruiters)
}

/// Approves or blocks a recruiter; `false` when no such recruiter exists.
pub async fn set_recruiter_approval(
    pool: &PgPool,
    recruiter_id: Uuid,
    approved: bool,
) -> anyhow::Result<bool> {
    let result = sqlx::query("UPDATE placement.recruiters SET is_approved = $2 WHERE id = $1")
        .bind(recruiter_id)
        .bind(approved)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Posts under the recruiter's own company. Approval is checked by the caller.
pub async fn insert_job(pool: &PgPool, recruiter_id: Uuid, job: &NewJob) -> anyhow::Result<Uuid> {
    let job_id: Uuid = sqlx::query(
        r#"
        INSERT INTO placement.jobs
        (id, recruiter_id, company_id, title, location, eligibility, description)
        SELECT $1, r.id, r.company_id, $3, $4, $5, $6
        FROM placement.recruiters r
        WHERE r.id = $2
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(recruiter_id)
    .bind(&job.title)
    .bind(&job.location)
    .bind(&job.eligibility)
    .bind(&job.description)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("recruiter {recruiter_id} does not exist"))?
    .get("id");

    Ok(job_id)
}

/// Applications go with the job (ON DELETE CASCADE). Other recruiters' jobs are untouched.
pub async fn delete_job(pool: &PgPool, job_id: Uuid, recruiter_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM placement.jobs WHERE id = $1 AND recruiter_id = $2")
        .bind(job_id)
        .bind(recruiter_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Only applications on the acting recruiter's jobs are touched when one is given.
pub async fn update_status(
    pool: &PgPool,
    application_id: Uuid,
    status: ApplicationStatus,
    recruiter_id: Option<Uuid>,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE placement.applications a
        SET status = $2
        FROM placement.jobs j
        WHERE a.id = $1
          AND j.id = a.job_id
          AND ($3::uuid IS NULL OR j.recruiter_id = $3)
        "#,
    )
    .bind(application_id)
    .bind(status.as_str())
    .bind(recruiter_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn status_counts(
    pool: &PgPool,
    job_id: Option<Uuid>,
    recruiter_id: Option<Uuid>,
) -> anyhow::Result<Vec<StatusCount>> {
    let records = sqlx::query(
        r#"
        SELECT a.status, COUNT(*) AS count
        FROM placement.applications a
        JOIN placement.jobs j ON j.id = a.job_id
        WHERE ($1::uuid IS NULL OR a.job_id = $1)
          AND ($2::uuid IS NULL OR j.recruiter_id = $2)
        GROUP BY a.status
        ORDER BY count DESC, a.status
        "#,
    )
    .bind(job_id)
    .bind(recruiter_id)
    .fetch_all(pool)
    .await?;

    let mut counts = Vec::new();

    for row in records {
        let status: String = row.get("status");
        counts.push(StatusCount {
            status: status.parse()?,
            count: row.get("count"),
        });
    }

    Ok(counts)
}

async fn upsert_student(
    conn: &mut PgConnection,
    roll_no: &str,
    full_name: &str,
    profile: &CandidateProfile,
) -> anyhow::Result<Uuid> {
    let student_id: Uuid = sqlx::query(
        r#"
        INSERT INTO placement.students
        (id, roll_no, full_name, branch, cgpa, skills, projects, internships, hackathons)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (roll_no) DO UPDATE
        SET full_name = EXCLUDED.full_name,
            branch = EXCLUDED.branch,
            cgpa = EXCLUDED.cgpa,
            skills = EXCLUDED.skills,
            projects = EXCLUDED.projects,
            internships = EXCLUDED.internships,
            hackathons = EXCLUDED.hackathons
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(roll_no)
    .bind(full_name)
    .bind(&profile.branch)
    .bind(profile.cgpa)
    .bind(&profile.skills)
    .bind(&profile.projects)
    .bind(&profile.internships)
    .bind(&profile.hackathons)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("failed to upsert student {roll_no}"))?
    .get("id");

    Ok(student_id)
}

async fn insert_application(
    conn: &mut PgConnection,
    job_id: Uuid,
    student_id: Uuid,
    status: ApplicationStatus,
    applied_at: Option<chrono::DateTime<chrono::Utc>>,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO placement.applications (id, job_id, student_id, status, applied_at)
        VALUES ($1, $2, $3, $4, COALESCE($5, now()))
        ON CONFLICT (job_id, student_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job_id)
    .bind(student_id)
    .bind(status.as_str())
    .bind(applied_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn job_from_row(row: &PgRow) -> JobPosting {
    JobPosting {
        id: row.get("id"),
        title: row.get("title"),
        company: row.get("company"),
        location: row.get("location"),
        eligibility: row.get("eligibility"),
        created_at: row.get("created_at"),
    }
}
