use placement_shortlist::criteria::extract_requirements;
use placement_shortlist::models::{ApplicationStatus, CandidateProfile};
use placement_shortlist::report;
use placement_shortlist::roster::read_roster;
use placement_shortlist::scoring::{rank_applicants, score};

const ELIGIBILITY: &str = "CGPA > 7.5, Branch: CSE/IT, Skills: Python, SQL";

const ROSTER: &str = "\
full_name,roll_no,branch,cgpa,skills,projects,internships,hackathons,status
Kiara Patel,EC21017,ECE,6.0,\"embedded c, python\",,,,applied
Asha Rao,CS21001,CSE,8.0,\"python, sql, java\",,,,shortlisted
Jules Moreno,ME21090,MECH,,,,,,applied
Bilal Khan,IT21044,IT,8.0,,Ticket booking backend with Spring Boot,,,applied
";

#[test]
fn roster_ranks_by_score_with_stable_ties() {
    let applicants = read_roster(ROSTER.as_bytes())
        .unwrap()
        .into_iter()
        .map(|entry| entry.applicant)
        .collect();
    let ranked = rank_applicants(ELIGIBILITY, applicants);

    let order: Vec<(&str, f64)> = ranked
        .iter()
        .map(|r| (r.applicant.full_name.as_str(), r.match_score))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Asha Rao", 22.5),
            ("Bilal Khan", 17.5),
            ("Kiara Patel", 5.0),
            ("Jules Moreno", 0.0),
        ]
    );
    assert_eq!(ranked[0].applicant.status, ApplicationStatus::Shortlisted);
}

#[test]
fn ranked_roster_renders_to_csv() {
    let applicants = read_roster(ROSTER.as_bytes())
        .unwrap()
        .into_iter()
        .map(|entry| entry.applicant)
        .collect();
    let ranked = rank_applicants(ELIGIBILITY, applicants);

    let mut buffer = Vec::new();
    report::write_csv(&ranked, 2, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();

    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("1,Asha Rao,22.5"));
    assert!(text.contains("2,Bilal Khan,17.5"));
}

#[test]
fn empty_eligibility_only_rewards_experience() {
    let candidate = CandidateProfile {
        cgpa: Some(9.9),
        branch: "CSE".to_string(),
        skills: Some("python, sql".to_string()),
        internships: Some("Backend intern at a payments company".to_string()),
        ..CandidateProfile::default()
    };

    assert_eq!(score("", &candidate), 5.0);
    assert_eq!(extract_requirements("").keywords.len(), 0);
}
