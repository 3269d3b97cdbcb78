//! Applicant shortlisting for a campus placement portal.
//!
//! The core is [`scoring`]: a total, side-effect free match score computed from a
//! job's free-text eligibility and a candidate profile. Everything else is the
//! recruiter-facing shell around it (Postgres access, CSV rosters, reports).

pub mod config;
pub mod context;
pub mod criteria;
pub mod db;
pub mod models;
pub mod report;
pub mod roster;
pub mod scoring;
