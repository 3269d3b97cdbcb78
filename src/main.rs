use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use placement_shortlist::config::Config;
use placement_shortlist::context::AppContext;
use placement_shortlist::models::{ApplicationStatus, MatchResult, NewJob};
use placement_shortlist::scoring::MatchScorer;
use placement_shortlist::{db, report, roster};

#[derive(Parser)]
#[command(name = "placement-shortlist")]
#[command(about = "Rank campus placement applicants against a job's eligibility criteria", long_about = None)]
struct Cli {
    /// Act as this recruiter: restricts jobs and status changes to their postings
    #[arg(long, global = true)]
    recruiter: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a CSV roster against eligibility text without a database
    Rank {
        #[arg(long)]
        eligibility: String,
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 25)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that read or write the placement database.
#[derive(Subcommand)]
enum StoreCommand {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// List job postings with applicant counts
    Jobs,
    /// Post a job under the acting recruiter's company (approved recruiters only)
    PostJob {
        #[arg(long)]
        title: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        eligibility: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete one of the acting recruiter's jobs and its applications
    DeleteJob {
        #[arg(long)]
        job: Uuid,
    },
    /// List recruiter accounts and their approval state
    Recruiters,
    /// Approve a recruiter account, or block it with --block
    ApproveRecruiter {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        block: bool,
    },
    /// Import a CSV roster of applicants for a job
    Import {
        #[arg(long)]
        job: Uuid,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Rank a job's applicants by match score
    Shortlist {
        #[arg(long)]
        job: Uuid,
        #[arg(long, default_value_t = 25)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Move an application to a new status
    SetStatus {
        #[arg(long)]
        application: Uuid,
        #[arg(long)]
        status: ApplicationStatus,
    },
    /// Show the application status distribution
    Stats {
        #[arg(long)]
        job: Option<Uuid>,
    },
    /// Generate a markdown shortlist report for a job
    Report {
        #[arg(long)]
        job: Uuid,
        #[arg(long, default_value = "shortlist.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let scorer: MatchScorer = MatchScorer::default();

    match cli.command {
        Commands::Rank {
            eligibility,
            csv,
            limit,
            format,
        } => rank_roster(&scorer, &eligibility, &csv, limit, format),
        Commands::Store(command) => {
            let ctx = AppContext::connect(&config, cli.recruiter).await?;
            run(command, &ctx, &scorer).await
        }
    }
}

async fn run(command: StoreCommand, ctx: &AppContext, scorer: &MatchScorer) -> anyhow::Result<()> {
    match command {
        StoreCommand::InitDb => {
            db::init_db(&ctx.pool).await?;
            println!("Schema ready.");
        }
        StoreCommand::Seed => {
            db::seed(&ctx.pool).await?;
            println!("Seed data inserted.");
        }
        StoreCommand::Jobs => {
            ctx.check_recruiter().await?;
            let jobs = db::fetch_jobs(&ctx.pool, ctx.recruiter_id).await?;

            if jobs.is_empty() {
                println!("No job postings found.");
                return Ok(());
            }

            for job in jobs.iter() {
                println!(
                    "- {} {} at {} ({}) posted {}: {} applicants",
                    job.posting.id,
                    job.posting.title,
                    job.posting.company,
                    job.posting.location.as_deref().unwrap_or("location not set"),
                    job.posting.created_at.format("%Y-%m-%d"),
                    job.applicant_count
                );
            }
        }
        StoreCommand::PostJob {
            title,
            location,
            eligibility,
            description,
        } => {
            let recruiter_id = ctx.require_approved_recruiter().await?;
            let job = NewJob::new(
                &title,
                location.as_deref(),
                eligibility.as_deref(),
                description.as_deref(),
            )?;
            let job_id = db::insert_job(&ctx.pool, recruiter_id, &job).await?;
            info!(%job_id, %recruiter_id, "job posted");
            println!("Posted {} as job {job_id}.", job.title);
        }
        StoreCommand::DeleteJob { job } => {
            let recruiter_id = ctx.require_recruiter().await?;

            if !db::delete_job(&ctx.pool, job, recruiter_id).await? {
                anyhow::bail!("job {job} not found");
            }
            info!(%job, %recruiter_id, "job deleted");
            println!("Job {job} and its applications were deleted.");
        }
        StoreCommand::Recruiters => {
            let recruiters = db::fetch_recruiters(&ctx.pool).await?;

            if recruiters.is_empty() {
                println!("No recruiters registered.");
                return Ok(());
            }

            for recruiter in recruiters.iter() {
                println!(
                    "- {} {} ({}): {}, {} jobs",
                    recruiter.id,
                    recruiter.email,
                    recruiter.company,
                    if recruiter.is_approved { "approved" } else { "pending" },
                    recruiter.job_count
                );
            }
        }
        StoreCommand::ApproveRecruiter { id, block } => {
            let approved = !block;

            if !db::set_recruiter_approval(&ctx.pool, id, approved).await? {
                anyhow::bail!("recruiter {id} not found");
            }
            info!(recruiter_id = %id, approved, "recruiter approval changed");
            println!(
                "Recruiter {id} is now {}.",
                if approved { "approved" } else { "blocked" }
            );
        }
        StoreCommand::Import { job, csv } => {
            ctx.check_recruiter().await?;
            db::fetch_job(&ctx.pool, job, ctx.recruiter_id)
                .await?
                .with_context(|| format!("job {job} not found"))?;

            let entries = roster::read_roster_path(&csv)?;
            let inserted = db::import_roster(&ctx.pool, job, &entries).await?;
            info!(%job, rows = entries.len(), inserted, "roster imported");
            println!(
                "Added {inserted} applications from {} ({} rows).",
                csv.display(),
                entries.len()
            );
        }
        StoreCommand::Shortlist { job, limit, format } => {
            ctx.check_recruiter().await?;
            let posting = db::fetch_job(&ctx.pool, job, ctx.recruiter_id)
                .await?
                .with_context(|| format!("job {job} not found"))?;
            let applicants = db::fetch_applicants(&ctx.pool, job).await?;
            debug!(
                requirements = ?scorer.requirements(posting.eligibility_text()),
                "parsed eligibility"
            );

            let results = scorer.rank(posting.eligibility_text(), applicants);
            if results.is_empty() {
                println!("No applicants for {} yet.", posting.title);
                return Ok(());
            }

            info!(%job, applicants = results.len(), "ranked applicants");
            print_results(&results, limit, format)?;
        }
        StoreCommand::SetStatus {
            application,
            status,
        } => {
            ctx.check_recruiter().await?;
            let updated =
                db::update_status(&ctx.pool, application, status, ctx.recruiter_id).await?;

            if !updated {
                anyhow::bail!("application {application} not found");
            }
            info!(%application, %status, "application status updated");
            println!("Application {application} is now {status}.");
        }
        StoreCommand::Stats { job } => {
            ctx.check_recruiter().await?;
            let counts = db::status_counts(&ctx.pool, job, ctx.recruiter_id).await?;

            if counts.is_empty() {
                println!("No applications submitted yet.");
                return Ok(());
            }

            let total: i64 = counts.iter().map(|entry| entry.count).sum();
            println!("Application status distribution ({total} total):");
            for entry in counts.iter() {
                println!(
                    "- {}: {} ({:.1}%)",
                    entry.status,
                    entry.count,
                    entry.count as f64 * 100.0 / total as f64
                );
            }
        }
        StoreCommand::Report { job, out } => {
            ctx.check_recruiter().await?;
            let posting = db::fetch_job(&ctx.pool, job, ctx.recruiter_id)
                .await?
                .with_context(|| format!("job {job} not found"))?;
            let applicants = db::fetch_applicants(&ctx.pool, job).await?;

            let requirements = scorer.requirements(posting.eligibility_text());
            let results = scorer.rank(posting.eligibility_text(), applicants);
            let report =
                report::build_report(&posting, &requirements, &results, chrono::Utc::now());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn rank_roster(
    scorer: &MatchScorer,
    eligibility: &str,
    csv: &Path,
    limit: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let entries = roster::read_roster_path(csv)?;
    info!(applicants = entries.len(), "loaded roster {}", csv.display());
    debug!(requirements = ?scorer.requirements(eligibility), "parsed eligibility");

    let applicants = entries.into_iter().map(|entry| entry.applicant).collect();
    let results = scorer.rank(eligibility, applicants);
    print_results(&results, limit, format)
}

fn print_results(results: &[MatchResult], limit: usize, format: OutputFormat) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Text => {
            writeln!(out, "Applicants by match score:")?;
            write!(out, "{}", report::render_text(results, limit))?;
        }
        OutputFormat::Json => {
            report::write_json(results, limit, &mut out)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => report::write_csv(results, limit, &mut out)?,
    }

    Ok(())
}
