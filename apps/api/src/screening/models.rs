//! Screening data model.
//!
//! Every record is built once by the stage that owns it and handed forward by value or shared
//! reference. Profiles and requirements normalise their skill sets at construction so matching
//! never has to think about case or stray whitespace.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("experience range is inverted: max {max} is below min {min}")]
    InvertedRange { min: u32, max: u32 },
}

// ────────────────────────────────────────────────────────────────────────────
// Provenance
// ────────────────────────────────────────────────────────────────────────────

/// Which extraction strategy produced a profile or requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Primary,
    Fallback,
}

/// Which regime produced a terminal screening result. Auditors use this to tell
/// model-derived, rule-derived and failed runs apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Primary,
    Fallback,
    Error,
}

impl DataSource {
    /// `Fallback` if either side of the comparison was rule-derived.
    pub fn combine(candidate: ExtractionSource, requirement: ExtractionSource) -> Self {
        match (candidate, requirement) {
            (ExtractionSource::Primary, ExtractionSource::Primary) => DataSource::Primary,
            _ => DataSource::Fallback,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extracted records
// ────────────────────────────────────────────────────────────────────────────

/// Structured view of a resume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateProfile {
    skills: BTreeSet<String>,
    experience_years: u32,
    projects: Vec<String>,
    source: ExtractionSource,
}

impl CandidateProfile {
    pub fn new<I, S>(
        skills: I,
        experience_years: u32,
        projects: Vec<String>,
        source: ExtractionSource,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            skills: normalize_skills(skills),
            experience_years,
            projects,
            source,
        }
    }

    pub fn skills(&self) -> &BTreeSet<String> {
        &self.skills
    }

    pub fn experience_years(&self) -> u32 {
        self.experience_years
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    pub fn source(&self) -> ExtractionSource {
        self.source
    }
}

/// Required years of experience. `max = None` means open-ended ("N+ years").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExperienceRange {
    min: u32,
    max: Option<u32>,
}

impl ExperienceRange {
    pub fn new(min: u32, max: Option<u32>) -> Result<Self, ModelError> {
        match max {
            Some(max) if max < min => Err(ModelError::InvertedRange { min, max }),
            _ => Ok(Self { min, max }),
        }
    }

    pub fn at_least(min: u32) -> Self {
        Self { min, max: None }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> Option<u32> {
        self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clarity {
    Clear,
    Vague,
}

/// Structured view of a job description.
///
/// A requirement with no skills is always `Vague`, whatever the extractor claimed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementSpec {
    required_skills: BTreeSet<String>,
    experience_required: Option<ExperienceRange>,
    clarity: Clarity,
    source: ExtractionSource,
}

impl RequirementSpec {
    pub fn new<I, S>(
        required_skills: I,
        experience_required: Option<ExperienceRange>,
        clarity: Clarity,
        source: ExtractionSource,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let required_skills = normalize_skills(required_skills);
        let clarity = if required_skills.is_empty() {
            Clarity::Vague
        } else {
            clarity
        };
        Self {
            required_skills,
            experience_required,
            clarity,
            source,
        }
    }

    pub fn required_skills(&self) -> &BTreeSet<String> {
        &self.required_skills
    }

    pub fn experience_required(&self) -> Option<ExperienceRange> {
        self.experience_required
    }

    pub fn clarity(&self) -> Clarity {
        self.clarity
    }

    pub fn source(&self) -> ExtractionSource {
        self.source
    }

    pub fn is_vague(&self) -> bool {
        self.required_skills.is_empty() || self.clarity == Clarity::Vague
    }
}

fn normalize_skills<I, S>(skills: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    skills
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Stage outputs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillMatchResult {
    /// 0 – 100
    pub score: u8,
    pub matched: BTreeSet<String>,
    pub missing: BTreeSet<String>,
    pub extra: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExperienceStatus {
    Unknown,
    PerfectFit,
    JuniorFit,
    UnderQualified,
    OverQualified,
    Qualified,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceAssessment {
    /// 0 – 100
    pub score: u8,
    pub status: ExperienceStatus,
    /// Passed through verbatim into the reasoning summary.
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Proceed to interview")]
    Proceed,
    #[serde(rename = "Manual Review Required")]
    ManualReview,
    #[serde(rename = "Reject")]
    Reject,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Proceed => "Proceed to interview",
            Recommendation::ManualReview => "Manual Review Required",
            Recommendation::Reject => "Reject",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    /// 0.0 – 100.0, two decimals
    pub final_score: f64,
    /// `final_score / 100`, two decimals
    pub match_score: f64,
    pub recommendation: Recommendation,
    pub requires_human: bool,
    pub confidence: f64,
}

/// Terminal output of one screening invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub match_score: f64,
    pub recommendation: Recommendation,
    pub requires_human: bool,
    pub confidence: f64,
    pub reasoning_summary: String,
    pub data_source: DataSource,
}
