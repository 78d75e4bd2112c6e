//! Skill Matcher — set comparison between a candidate's skills and the required skills.
//!
//! Exact, case-normalised matching only. There is no partial credit: a skill is either in
//! both sets or it is not.

use std::collections::BTreeSet;

use crate::screening::models::{CandidateProfile, RequirementSpec, SkillMatchResult};

/// Compares skill sets and returns the coverage score.
///
/// `score = round(100 × |matched| / |required|)`, and 0 when nothing is required. The empty
/// case is a defined result, not an error; the orchestrator routes vague requirements
/// separately.
pub fn evaluate(profile: &CandidateProfile, requirement: &RequirementSpec) -> SkillMatchResult {
    let candidate = profile.skills();
    let required = requirement.required_skills();

    let matched: BTreeSet<String> = required.intersection(candidate).cloned().collect();
    let missing = required.difference(candidate).cloned().collect();
    let extra = candidate.difference(required).cloned().collect();

    let score = coverage_score(matched.len(), required.len());

    SkillMatchResult {
        score,
        matched,
        missing,
        extra,
    }
}

fn coverage_score(matched: usize, required: usize) -> u8 {
    if required == 0 {
        return 0;
    }
    ((matched as f64 / required as f64) * 100.0).round() as u8
}
