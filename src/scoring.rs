use crate::criteria::{candidate_skills, JobRequirements, KeywordExtractor, RequirementExtractor};
use crate::models::{Applicant, CandidateProfile, MatchResult};

pub const CGPA_MET_BONUS: f64 = 10.0;
pub const CGPA_MARGIN_WEIGHT: f64 = 5.0;
pub const SKILL_MATCH_POINTS: f64 = 5.0;
pub const EXPERIENCE_POINTS: f64 = 5.0;
pub const NARRATIVE_MIN_CHARS: usize = 10;

/// Per-term contributions behind a match score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub cgpa: f64,
    pub skills: f64,
    pub experience: f64,
    pub total: f64,
}

/// Ranks applicants against a job using a pluggable requirement extractor.
#[derive(Debug, Clone, Default)]
pub struct MatchScorer<E = KeywordExtractor> {
    extractor: E,
}

impl<E: RequirementExtractor> MatchScorer<E> {
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    pub fn requirements(&self, eligibility: &str) -> JobRequirements {
        self.extractor.extract(eligibility)
    }

    pub fn score(&self, eligibility: &str, candidate: &CandidateProfile) -> f64 {
        breakdown(&self.requirements(eligibility), candidate).total
    }

    /// Highest score first; equal scores keep their input order.
    pub fn rank(&self, eligibility: &str, applicants: Vec<Applicant>) -> Vec<MatchResult> {
        let requirements = self.requirements(eligibility);
        let mut results: Vec<MatchResult> = applicants
            .into_iter()
            .map(|applicant| MatchResult {
                match_score: breakdown(&requirements, &applicant.profile).total,
                applicant,
            })
            .collect();

        results.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
        results
    }
}

pub fn score(eligibility: &str, candidate: &CandidateProfile) -> f64 {
    MatchScorer::<KeywordExtractor>::default().score(eligibility, candidate)
}

pub fn rank_applicants(eligibility: &str, applicants: Vec<Applicant>) -> Vec<MatchResult> {
    MatchScorer::<KeywordExtractor>::default().rank(eligibility, applicants)
}

pub fn breakdown(requirements: &JobRequirements, candidate: &CandidateProfile) -> ScoreBreakdown {
    let cgpa = cgpa_term(requirements.min_cgpa, candidate.cgpa);
    let skills = skill_term(requirements, candidate.skills.as_deref());
    let narratives = [
        candidate.projects.as_deref(),
        candidate.internships.as_deref(),
        candidate.hackathons.as_deref(),
    ];
    let present = narratives
        .into_iter()
        .filter(|field| has_narrative(*field))
        .count();
    let experience = present as f64 * EXPERIENCE_POINTS;

    ScoreBreakdown {
        cgpa,
        skills,
        experience,
        total: round_one_decimal(cgpa + skills + experience),
    }
}

/// The fixed bonus and the proportional margin are independent, so a candidate
/// above the threshold is credited for the margin twice over.
pub fn cgpa_term(required: Option<f64>, cgpa: Option<f64>) -> f64 {
    let (Some(required), Some(cgpa)) = (required, cgpa.filter(|c| c.is_finite() && *c > 0.0))
    else {
        return 0.0;
    };

    let bonus = if cgpa >= required { CGPA_MET_BONUS } else { 0.0 };
    bonus + ((cgpa - required) * CGPA_MARGIN_WEIGHT).max(0.0)
}

pub fn skill_term(requirements: &JobRequirements, skills: Option<&str>) -> f64 {
    let offered = candidate_skills(skills);
    let matched = requirements.keywords.intersection(&offered).count();
    matched as f64 * SKILL_MATCH_POINTS
}

pub fn has_narrative(field: Option<&str>) -> bool {
    field.is_some_and(|text| text.trim().chars().count() > NARRATIVE_MIN_CHARS)
}

/// Exact halves go to the even digit: 11.25 -> 11.2.
fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse::<f64>().unwrap_or(value)
}
