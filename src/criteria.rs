use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

// Only a strict `>` is recognised; `>=`, `<` and ranges fall through as "no threshold".
static RE_CGPA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CGPA\s*>\s*(\d+(?:\.\d+)?)").unwrap());
static RE_DELIMITER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i),|/|\band\b").unwrap());

/// What a job's eligibility text asks for, as far as the heuristic can tell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobRequirements {
    pub min_cgpa: Option<f64>,
    pub keywords: BTreeSet<String>,
}

/// Turns free-text eligibility into structured requirements. Never fails:
/// text it cannot interpret yields empty requirements.
pub trait RequirementExtractor {
    fn extract(&self, eligibility: &str) -> JobRequirements;
}

/// Regex and delimiter heuristic used by the shortlisting tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl RequirementExtractor for KeywordExtractor {
    fn extract(&self, eligibility: &str) -> JobRequirements {
        JobRequirements {
            min_cgpa: min_cgpa(eligibility),
            keywords: required_keywords(eligibility),
        }
    }
}

pub fn extract_requirements(eligibility: &str) -> JobRequirements {
    KeywordExtractor.extract(eligibility)
}

pub fn min_cgpa(eligibility: &str) -> Option<f64> {
    RE_CGPA
        .captures(eligibility)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Splits on commas, slashes and the word "and", drops any `Label:` prefix,
/// then keeps tokens longer than two characters with no digits.
pub fn required_keywords(eligibility: &str) -> BTreeSet<String> {
    RE_DELIMITER
        .split(eligibility)
        .filter_map(|piece| {
            let lowered = piece.to_lowercase();
            let token = lowered.rsplit(':').next().unwrap_or_default().trim();
            let keep = token.chars().count() > 2 && !token.chars().any(|c| c.is_numeric());
            keep.then(|| token.to_string())
        })
        .collect()
}

pub fn candidate_skills(skills: Option<&str>) -> BTreeSet<String> {
    skills
        .unwrap_or_default()
        .split(',')
        .map(|skill| skill.trim().to_lowercase())
        .filter(|skill| !skill.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn extracts_threshold_and_keywords_from_typical_posting() {
        let requirements =
            extract_requirements("CGPA > 7.5, Branch: CSE/IT, Skills: Python, SQL");
        assert_eq!(requirements.min_cgpa, Some(7.5));
        assert_eq!(requirements.keywords, set(&["cse", "python", "sql"]));
    }

    #[test]
    fn threshold_match_is_case_insensitive_and_spacing_tolerant() {
        assert_eq!(min_cgpa("cgpa>8"), Some(8.0));
        assert_eq!(min_cgpa("Minimum Cgpa   >   6.25 required"), Some(6.25));
    }

    #[test]
    fn other_comparison_operators_are_not_recognised() {
        assert_eq!(min_cgpa("CGPA >= 7.0"), None);
        assert_eq!(min_cgpa("CGPA < 9"), None);
        assert_eq!(min_cgpa("CGPA: 7.0"), None);
    }

    #[test]
    fn first_threshold_wins_when_several_are_present() {
        assert_eq!(min_cgpa("CGPA > 6.5 for CSE, CGPA > 8 for ECE"), Some(6.5));
    }

    #[test]
    fn word_and_splits_only_as_a_whole_word() {
        let keywords = required_keywords("Rust AND Go, Android and Pandas");
        assert_eq!(keywords, set(&["rust", "android", "pandas"]));
    }

    #[test]
    fn short_and_numeric_tokens_are_discarded() {
        let keywords = required_keywords("C, Go, AI/ML, 60% in 12th, Docker");
        assert_eq!(keywords, set(&["docker"]));
    }

    #[test]
    fn empty_and_unicode_text_yield_no_requirements() {
        assert_eq!(extract_requirements(""), JobRequirements::default());
        let requirements = extract_requirements("ज्ञान, 数据分析 / ok");
        assert_eq!(requirements.min_cgpa, None);
        assert_eq!(requirements.keywords, set(&["ज्ञान", "数据分析"]));
    }

    #[test]
    fn candidate_skills_split_on_commas_only() {
        assert_eq!(
            candidate_skills(Some(" Python, SQL ,machine learning/ai,,")),
            set(&["python", "sql", "machine learning/ai"])
        );
        assert!(candidate_skills(None).is_empty());
        assert!(candidate_skills(Some("")).is_empty());
    }
}
