//! Decision Engine — weighted final score and threshold policy.

use crate::screening::models::{
    Decision, ExperienceAssessment, Recommendation, RequirementSpec, SkillMatchResult,
};

/// Skills are weighted above experience.
pub const SKILL_WEIGHT: f64 = 0.6;
pub const EXPERIENCE_WEIGHT: f64 = 0.4;

pub const PROCEED_THRESHOLD: f64 = 80.0;
pub const REVIEW_THRESHOLD: f64 = 60.0;

const PROCEED_CONFIDENCE: f64 = 0.9;
const REVIEW_CONFIDENCE: f64 = 0.6;
const REJECT_CONFIDENCE: f64 = 0.75;
/// Confidence reported when the requirement carries no skills to score against.
pub const VAGUE_CONFIDENCE: f64 = 0.3;

/// Combines the stage scores into a `Decision`.
///
/// An empty skill requirement short-circuits to a fixed manual-review decision, since any
/// weighted score over it would be meaningless.
pub fn decide(
    skills: &SkillMatchResult,
    experience: &ExperienceAssessment,
    requirement: &RequirementSpec,
) -> Decision {
    if requirement.required_skills().is_empty() {
        return Decision {
            final_score: 0.0,
            match_score: 0.0,
            recommendation: Recommendation::ManualReview,
            requires_human: true,
            confidence: VAGUE_CONFIDENCE,
        };
    }

    let final_score = round2(
        SKILL_WEIGHT * f64::from(skills.score) + EXPERIENCE_WEIGHT * f64::from(experience.score),
    );
    let (recommendation, requires_human, confidence) = classify(final_score);

    Decision {
        final_score,
        match_score: round2(final_score / 100.0),
        recommendation,
        requires_human,
        confidence,
    }
}

/// Threshold policy: `[80, ∞)` proceed, `[60, 80)` review, below 60 reject.
pub fn classify(final_score: f64) -> (Recommendation, bool, f64) {
    if final_score >= PROCEED_THRESHOLD {
        (Recommendation::Proceed, false, PROCEED_CONFIDENCE)
    } else if final_score >= REVIEW_THRESHOLD {
        (Recommendation::ManualReview, true, REVIEW_CONFIDENCE)
    } else {
        (Recommendation::Reject, false, REJECT_CONFIDENCE)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::models::{Clarity, ExperienceStatus, ExtractionSource};
    use std::collections::BTreeSet;

    fn skill_result(score: u8) -> SkillMatchResult {
        SkillMatchResult {
            score,
            matched: BTreeSet::new(),
            missing: BTreeSet::new(),
            extra: BTreeSet::new(),
        }
    }

    fn experience(score: u8) -> ExperienceAssessment {
        ExperienceAssessment {
            score,
            status: ExperienceStatus::PerfectFit,
            reason: String::new(),
        }
    }

    fn requirement(skills: &[&str]) -> RequirementSpec {
        RequirementSpec::new(
            skills.iter().copied(),
            None,
            Clarity::Clear,
            ExtractionSource::Primary,
        )
    }

    #[test]
    fn test_strong_candidate_proceeds() {
        let d = decide(&skill_result(67), &experience(100), &requirement(&["python"]));
        assert_eq!(d.final_score, 80.2);
        assert_eq!(d.match_score, 0.8);
        assert_eq!(d.recommendation, Recommendation::Proceed);
        assert!(!d.requires_human);
        assert_eq!(d.confidence, 0.9);
    }

    #[test]
    fn test_middle_band_requires_review() {
        let d = decide(&skill_result(50), &experience(100), &requirement(&["go"]));
        assert_eq!(d.final_score, 70.0);
        assert_eq!(d.recommendation, Recommendation::ManualReview);
        assert!(d.requires_human);
        assert_eq!(d.confidence, 0.6);
    }

    #[test]
    fn test_low_score_rejects_without_human() {
        let d = decide(&skill_result(0), &experience(30), &requirement(&["go"]));
        assert_eq!(d.final_score, 12.0);
        assert_eq!(d.recommendation, Recommendation::Reject);
        assert!(!d.requires_human);
        assert_eq!(d.confidence, 0.75);
    }

    #[test]
    fn test_empty_requirement_short_circuits() {
        let d = decide(&skill_result(100), &experience(100), &requirement(&[]));
        assert_eq!(d.final_score, 0.0);
        assert_eq!(d.match_score, 0.0);
        assert_eq!(d.recommendation, Recommendation::ManualReview);
        assert!(d.requires_human);
        assert_eq!(d.confidence, 0.3);
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(classify(80.0).0, Recommendation::Proceed);
        assert_eq!(classify(79.99).0, Recommendation::ManualReview);
        assert_eq!(classify(60.0).0, Recommendation::ManualReview);
        assert_eq!(classify(59.99).0, Recommendation::Reject);
        assert_eq!(classify(100.0).0, Recommendation::Proceed);
        assert_eq!(classify(0.0).0, Recommendation::Reject);
    }

    #[test]
    fn test_final_and_match_scores_follow_weighting() {
        let req = requirement(&["rust"]);
        for skill in (0..=100u8).step_by(7) {
            for exp in [30u8, 50, 70, 100] {
                let d = decide(&skill_result(skill), &experience(exp), &req);
                let expected = round2(0.6 * f64::from(skill) + 0.4 * f64::from(exp));
                assert_eq!(d.final_score, expected);
                assert_eq!(d.match_score, round2(d.final_score / 100.0));
                assert!((0.0..=100.0).contains(&d.final_score));
            }
        }
    }

    #[test]
    fn test_no_scored_decision_is_low_confidence_and_flagged() {
        // The orchestrator's post-decision guard (confidence < 0.4 with a human flag) cannot
        // fire for a scored requirement under the current thresholds.
        let req = requirement(&["rust"]);
        for skill in 0..=100u8 {
            for exp in [30u8, 50, 70, 100] {
                let d = decide(&skill_result(skill), &experience(exp), &req);
                assert!(!(d.confidence < 0.4 && d.requires_human));
            }
        }
    }
}
