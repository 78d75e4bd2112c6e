//! Experience Evaluator — places a candidate's years against the required range.

use crate::screening::models::{
    CandidateProfile, ExperienceAssessment, ExperienceStatus, RequirementSpec,
};

const UNKNOWN_SCORE: u8 = 50;
const FIT_SCORE: u8 = 100;
const JUNIOR_FIT_SCORE: u8 = 70;
const UNDER_QUALIFIED_SCORE: u8 = 30;
const OVER_QUALIFIED_SCORE: u8 = 70;

/// Applies the experience decision table. Exactly one arm fires per input:
///
/// | requirement            | candidate          | status          | score |
/// |------------------------|--------------------|-----------------|-------|
/// | none                   | any                | Unknown         | 50    |
/// | `min..=max`            | inside, 0 years    | JuniorFit       | 70    |
/// | `min..=max`            | inside             | PerfectFit      | 100   |
/// | any                    | below `min`        | UnderQualified  | 30    |
/// | `min..=max`            | above `max`        | OverQualified   | 70    |
/// | `min+`                 | at or above `min`  | Qualified       | 100   |
pub fn evaluate(profile: &CandidateProfile, requirement: &RequirementSpec) -> ExperienceAssessment {
    let years = profile.experience_years();

    let Some(range) = requirement.experience_required() else {
        return ExperienceAssessment {
            score: UNKNOWN_SCORE,
            status: ExperienceStatus::Unknown,
            reason: "Job description does not clearly define experience requirement.".to_string(),
        };
    };
    let min = range.min();

    match range.max() {
        Some(max) if (min..=max).contains(&years) => {
            if years == 0 {
                ExperienceAssessment {
                    score: JUNIOR_FIT_SCORE,
                    status: ExperienceStatus::JuniorFit,
                    reason: format!(
                        "Candidate is a fresher (0 years), which falls within the JD range \
                         ({min}-{max} years). Suitable for a junior role, but human review is \
                         recommended."
                    ),
                }
            } else {
                ExperienceAssessment {
                    score: FIT_SCORE,
                    status: ExperienceStatus::PerfectFit,
                    reason: format!(
                        "Candidate experience ({years} years) matches JD range ({min}-{max} years)."
                    ),
                }
            }
        }
        Some(_) if years < min => ExperienceAssessment {
            score: UNDER_QUALIFIED_SCORE,
            status: ExperienceStatus::UnderQualified,
            reason: format!("Candidate has {years} years, JD requires minimum {min} years."),
        },
        Some(max) => ExperienceAssessment {
            score: OVER_QUALIFIED_SCORE,
            status: ExperienceStatus::OverQualified,
            reason: format!("Candidate has {years} years, JD expects up to {max} years."),
        },
        None if years >= min => ExperienceAssessment {
            score: FIT_SCORE,
            status: ExperienceStatus::Qualified,
            reason: format!("Candidate has {years} years which meets minimum {min}+ years."),
        },
        None => ExperienceAssessment {
            score: UNDER_QUALIFIED_SCORE,
            status: ExperienceStatus::UnderQualified,
            reason: format!("Candidate has {years} years, JD requires {min}+ years."),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::models::{Clarity, ExperienceRange, ExtractionSource};

    fn assess(years: u32, range: Option<(u32, Option<u32>)>) -> ExperienceAssessment {
        let profile = CandidateProfile::new(["rust"], years, vec![], ExtractionSource::Primary);
        let range = range.map(|(min, max)| ExperienceRange::new(min, max).unwrap());
        let requirement =
            RequirementSpec::new(["rust"], range, Clarity::Clear, ExtractionSource::Primary);
        evaluate(&profile, &requirement)
    }

    #[test]
    fn test_missing_requirement_is_neutral_unknown() {
        let a = assess(7, None);
        assert_eq!(a.status, ExperienceStatus::Unknown);
        assert_eq!(a.score, 50);
    }

    #[test]
    fn test_inside_range_is_perfect_fit() {
        let a = assess(3, Some((2, Some(5))));
        assert_eq!(a.status, ExperienceStatus::PerfectFit);
        assert_eq!(a.score, 100);
        assert!(a.reason.contains("3 years"));
        assert!(a.reason.contains("2-5"));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert_eq!(assess(2, Some((2, Some(5)))).status, ExperienceStatus::PerfectFit);
        assert_eq!(assess(5, Some((2, Some(5)))).status, ExperienceStatus::PerfectFit);
    }

    #[test]
    fn test_fresher_inside_junior_range_is_junior_fit() {
        let a = assess(0, Some((0, Some(2))));
        assert_eq!(a.status, ExperienceStatus::JuniorFit);
        assert_eq!(a.score, 70);
        assert!(a.reason.contains("human review"));
    }

    #[test]
    fn test_below_min_is_under_qualified_regardless_of_gap() {
        let near = assess(1, Some((2, Some(5))));
        let far = assess(0, Some((10, Some(15))));
        assert_eq!(near.status, ExperienceStatus::UnderQualified);
        assert_eq!(far.status, ExperienceStatus::UnderQualified);
        assert_eq!(near.score, 30);
        assert_eq!(far.score, 30);
        assert!(near.reason.contains("minimum 2"));
    }

    #[test]
    fn test_above_max_is_over_qualified() {
        let a = assess(9, Some((2, Some(5))));
        assert_eq!(a.status, ExperienceStatus::OverQualified);
        assert_eq!(a.score, 70);
        assert!(a.reason.contains("up to 5"));
    }

    #[test]
    fn test_open_ended_requirement() {
        let met = assess(4, Some((4, None)));
        assert_eq!(met.status, ExperienceStatus::Qualified);
        assert_eq!(met.score, 100);
        assert!(met.reason.contains("4+"));

        let short = assess(3, Some((4, None)));
        assert_eq!(short.status, ExperienceStatus::UnderQualified);
        assert!(short.reason.contains("4+"));
    }

    #[test]
    fn test_fresher_against_open_ended_zero_is_qualified() {
        let a = assess(0, Some((0, None)));
        assert_eq!(a.status, ExperienceStatus::Qualified);
    }

    #[test]
    fn test_table_fires_exactly_one_arm_for_every_shape() {
        let shapes = [
            None,
            Some((0, Some(0))),
            Some((0, Some(2))),
            Some((2, Some(5))),
            Some((3, None)),
            Some((0, None)),
        ];
        for shape in shapes {
            for years in 0..12 {
                let a = assess(years, shape);
                let expected = match shape {
                    None => ExperienceStatus::Unknown,
                    Some((min, Some(max))) if years >= min && years <= max && years == 0 => {
                        ExperienceStatus::JuniorFit
                    }
                    Some((min, Some(max))) if years >= min && years <= max => {
                        ExperienceStatus::PerfectFit
                    }
                    Some((min, _)) if years < min => ExperienceStatus::UnderQualified,
                    Some((_, Some(_))) => ExperienceStatus::OverQualified,
                    Some((_, None)) => ExperienceStatus::Qualified,
                };
                assert_eq!(a.status, expected, "years={years} shape={shape:?}");
            }
        }
    }
}
