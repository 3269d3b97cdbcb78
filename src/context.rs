use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::db;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("this command needs --recruiter")]
    NoRecruiter,
    #[error("recruiter {0} does not exist")]
    UnknownRecruiter(Uuid),
    #[error("recruiter {0} is pending admin approval and cannot post jobs")]
    PendingApproval(Uuid),
}

/// Decides whether a recruiter may publish, given their stored approval flag
/// (`None` when no such recruiter exists).
pub fn posting_access(
    recruiter_id: Option<Uuid>,
    approval: Option<bool>,
) -> Result<Uuid, AccessError> {
    let recruiter_id = recruiter_id.ok_or(AccessError::NoRecruiter)?;

    match approval {
        Some(true) => Ok(recruiter_id),
        Some(false) => Err(AccessError::PendingApproval(recruiter_id)),
        None => Err(AccessError::UnknownRecruiter(recruiter_id)),
    }
}

/// Everything a store-backed command needs: the pool and who is acting.
/// Passed explicitly instead of living in process-wide state.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub pool: PgPool,
    pub recruiter_id: Option<Uuid>,
}

impl AppContext {
    pub async fn connect(config: &Config, recruiter_id: Option<Uuid>) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(config.database_url()?)
            .await
            .context("failed to connect to Postgres")?;

        info!(max_connections = config.max_connections, "connected to Postgres");

        Ok(Self { pool, recruiter_id })
    }

    /// Unknown recruiters are an error; unapproved ones may still read but are warned.
    pub async fn check_recruiter(&self) -> anyhow::Result<()> {
        let Some(recruiter_id) = self.recruiter_id else {
            return Ok(());
        };

        match db::recruiter_approval(&self.pool, recruiter_id).await? {
            Some(true) => Ok(()),
            Some(false) => {
                warn!(%recruiter_id, "recruiter account is pending admin approval");
                Ok(())
            }
            None => Err(AccessError::UnknownRecruiter(recruiter_id).into()),
        }
    }

    /// The acting recruiter, who must exist. Approval is not required.
    pub async fn require_recruiter(&self) -> anyhow::Result<Uuid> {
        let recruiter_id = self.recruiter_id.ok_or(AccessError::NoRecruiter)?;
        self.check_recruiter().await?;
        Ok(recruiter_id)
    }

    /// The acting recruiter, who must exist and be approved.
    pub async fn require_approved_recruiter(&self) -> anyhow::Result<Uuid> {
        let recruiter_id = self.recruiter_id.ok_or(AccessError::NoRecruiter)?;
        let approval = db::recruiter_approval(&self.pool, recruiter_id).await?;
        Ok(posting_access(Some(recruiter_id), approval)?)
    }
}
