//! Explanation Generator — renders upstream results as one prose paragraph.
//!
//! Formatting only. Scores, statuses and the experience reason are taken as given.

use crate::screening::models::{
    CandidateProfile, Decision, ExperienceAssessment, RequirementSpec, SkillMatchResult,
};

const STRONG_MATCH_THRESHOLD: u8 = 80;
const PARTIAL_MATCH_THRESHOLD: u8 = 50;
const MAX_MATCHED_NAMED: usize = 4;
const MAX_MISSING_NAMED: usize = 3;

pub const VAGUE_REQUIREMENT_DISCLAIMER: &str = "The job description is vague or missing \
    technical requirements, so automated evaluation is unreliable.";

/// Builds the reasoning summary for a completed screening.
pub fn generate(
    _profile: &CandidateProfile,
    requirement: &RequirementSpec,
    skills: &SkillMatchResult,
    experience: &ExperienceAssessment,
    _decision: &Decision,
) -> String {
    let mut reasons = vec![skill_commentary(skills), experience.reason.clone()];

    if requirement.required_skills().is_empty() {
        reasons.push(VAGUE_REQUIREMENT_DISCLAIMER.to_string());
    }

    reasons.join(" ")
}

fn skill_commentary(skills: &SkillMatchResult) -> String {
    let missing = name_up_to(&skills.missing, MAX_MISSING_NAMED);

    if skills.score >= STRONG_MATCH_THRESHOLD {
        format!(
            "Strong skill alignment. Candidate matches most required skills such as {}.",
            name_up_to(&skills.matched, MAX_MATCHED_NAMED)
        )
    } else if skills.score >= PARTIAL_MATCH_THRESHOLD {
        format!(
            "Partial skill match. Candidate matches {} required skills but is missing {}.",
            skills.matched.len(),
            missing
        )
    } else {
        format!("Weak skill match. Candidate is missing many core skills like {missing}.")
    }
}

fn name_up_to<'a>(skills: impl IntoIterator<Item = &'a String>, limit: usize) -> String {
    skills
        .into_iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::models::{
        Clarity, ExperienceStatus, ExtractionSource, Recommendation,
    };
    use std::collections::BTreeSet;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn render(score: u8, matched: &[&str], missing: &[&str], required: &[&str]) -> String {
        let profile = CandidateProfile::new(matched.iter().copied(), 2, vec![], ExtractionSource::Primary);
        let requirement = RequirementSpec::new(
            required.iter().copied(),
            None,
            Clarity::Clear,
            ExtractionSource::Primary,
        );
        let skills = SkillMatchResult {
            score,
            matched: set(matched),
            missing: set(missing),
            extra: BTreeSet::new(),
        };
        let experience = ExperienceAssessment {
            score: 100,
            status: ExperienceStatus::PerfectFit,
            reason: "Candidate experience (2 years) matches JD range (1-3 years).".to_string(),
        };
        let decision = Decision {
            final_score: 0.0,
            match_score: 0.0,
            recommendation: Recommendation::Reject,
            requires_human: false,
            confidence: 0.75,
        };
        generate(&profile, &requirement, &skills, &experience, &decision)
    }

    #[test]
    fn test_strong_match_names_at_most_four_skills() {
        let text = render(100, &["a", "b", "c", "d", "e"], &[], &["a", "b", "c", "d", "e"]);
        assert!(text.starts_with("Strong skill alignment."));
        assert!(text.contains("such as a, b, c, d."));
        assert!(!text.contains(", e"));
    }

    #[test]
    fn test_partial_match_reports_count_and_missing() {
        let text = render(67, &["python", "sql"], &["django"], &["python", "sql", "django"]);
        assert!(text.contains("Partial skill match. Candidate matches 2 required skills"));
        assert!(text.contains("missing django."));
    }

    #[test]
    fn test_weak_match_names_at_most_three_missing() {
        let text = render(0, &[], &["a", "b", "c", "d"], &["a", "b", "c", "d"]);
        assert!(text.contains("like a, b, c."));
        assert!(!text.contains(", d"));
    }

    #[test]
    fn test_experience_reason_is_passed_through_verbatim() {
        let text = render(100, &["rust"], &[], &["rust"]);
        assert!(text.ends_with("Candidate experience (2 years) matches JD range (1-3 years)."));
    }

    #[test]
    fn test_empty_requirement_appends_disclaimer() {
        let text = render(0, &[], &[], &[]);
        assert!(text.ends_with(VAGUE_REQUIREMENT_DISCLAIMER));
    }

    #[test]
    fn test_band_edges() {
        assert!(render(80, &["a"], &[], &["a"]).starts_with("Strong"));
        assert!(render(79, &["a"], &["b"], &["a", "b"]).starts_with("Partial"));
        assert!(render(50, &["a"], &["b"], &["a", "b"]).starts_with("Partial"));
        assert!(render(49, &["a"], &["b"], &["a", "b"]).starts_with("Weak"));
    }
}
