//! Extraction Layer — turns resume and job-description text into structured records.
//!
//! Two tiers. The primary tier asks an external service for JSON and validates it against a
//! fixed schema; its outcome is an explicit `PrimaryOutcome`. Any `Failure`, or a primary
//! result that is semantically empty, hands the text to the deterministic `fallback` module.
//! Callers always get a usable record back.

pub mod fallback;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extraction::prompts::{
    CANDIDATE_PROMPT_TEMPLATE, EXTRACTION_SYSTEM, REQUIREMENT_PROMPT_TEMPLATE,
};
use crate::llm_client::prompts::NO_INFERENCE_INSTRUCTION;
use crate::llm_client::{LlmClient, LlmError};
use crate::screening::models::{
    CandidateProfile, Clarity, ExperienceRange, ExtractionSource, ModelError, RequirementSpec,
};

// ────────────────────────────────────────────────────────────────────────────
// Primary service seam
// ────────────────────────────────────────────────────────────────────────────

/// The primary extraction service. Implementations return the raw JSON text and must not
/// keep per-call state, so one handle can serve concurrent screenings.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn extract_candidate(&self, resume_text: &str) -> Result<String, LlmError>;
    async fn extract_requirement(&self, jd_text: &str) -> Result<String, LlmError>;
}

/// Primary service backed by the language model.
pub struct LlmExtractionService {
    llm: LlmClient,
}

impl LlmExtractionService {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ExtractionService for LlmExtractionService {
    async fn extract_candidate(&self, resume_text: &str) -> Result<String, LlmError> {
        let prompt = CANDIDATE_PROMPT_TEMPLATE
            .replace("{no_inference}", NO_INFERENCE_INSTRUCTION)
            .replace("{resume_text}", resume_text);
        self.llm.call_json_text(&prompt, EXTRACTION_SYSTEM).await
    }

    async fn extract_requirement(&self, jd_text: &str) -> Result<String, LlmError> {
        let prompt = REQUIREMENT_PROMPT_TEMPLATE
            .replace("{no_inference}", NO_INFERENCE_INSTRUCTION)
            .replace("{jd_text}", jd_text);
        self.llm.call_json_text(&prompt, EXTRACTION_SYSTEM).await
    }
}

/// Stand-in used when the model is switched off (`USE_LLM=false`). Always fails, so every
/// extraction runs the fallback.
pub struct DisabledExtractionService;

#[async_trait]
impl ExtractionService for DisabledExtractionService {
    async fn extract_candidate(&self, _resume_text: &str) -> Result<String, LlmError> {
        Err(LlmError::Disabled)
    }

    async fn extract_requirement(&self, _jd_text: &str) -> Result<String, LlmError> {
        Err(LlmError::Disabled)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Primary outcome
// ────────────────────────────────────────────────────────────────────────────

/// Result of the primary tier. `Failure` is never propagated past the Extraction Layer.
#[derive(Debug)]
pub enum PrimaryOutcome<T> {
    Primary(T),
    Failure(PrimaryFailure),
}

#[derive(Debug, Error)]
pub enum PrimaryFailure {
    #[error("primary service failed: {0}")]
    Service(#[from] LlmError),

    #[error("response does not match the extraction schema: {0}")]
    Schema(String),

    #[error("response is unusable: {0}")]
    Unusable(&'static str),
}

impl From<serde_json::Error> for PrimaryFailure {
    fn from(e: serde_json::Error) -> Self {
        PrimaryFailure::Schema(e.to_string())
    }
}

impl From<ModelError> for PrimaryFailure {
    fn from(e: ModelError) -> Self {
        PrimaryFailure::Schema(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    experience_years: Option<f64>,
    #[serde(default)]
    projects: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRequirement {
    #[serde(default)]
    required_skills: Vec<String>,
    #[serde(default)]
    experience_required: Option<RawRange>,
    #[serde(default)]
    jd_clarity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRange {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

/// Validates a candidate response. A profile without skills is unusable.
pub fn parse_candidate(raw: &str) -> PrimaryOutcome<CandidateProfile> {
    let parsed = serde_json::from_str::<RawCandidate>(raw)
        .map_err(PrimaryFailure::from)
        .and_then(|raw| {
            let years = whole_years(raw.experience_years.unwrap_or(0.0), "experience_years")?;
            let profile =
                CandidateProfile::new(raw.skills, years, raw.projects, ExtractionSource::Primary);
            if profile.skills().is_empty() {
                return Err(PrimaryFailure::Unusable("no skills extracted from resume"));
            }
            Ok(profile)
        });

    match parsed {
        Ok(profile) => PrimaryOutcome::Primary(profile),
        Err(cause) => PrimaryOutcome::Failure(cause),
    }
}

/// Validates a requirement response. An empty skill list is accepted and marks the
/// requirement vague; an inverted or negative experience range is rejected.
pub fn parse_requirement(raw: &str) -> PrimaryOutcome<RequirementSpec> {
    let parsed = serde_json::from_str::<RawRequirement>(raw)
        .map_err(PrimaryFailure::from)
        .and_then(|raw| {
            let experience = match raw.experience_required {
                Some(RawRange { min: Some(min), max }) => {
                    let min = whole_years(min, "experience_required.min")?;
                    let max = max
                        .map(|max| whole_years(max, "experience_required.max"))
                        .transpose()?;
                    Some(ExperienceRange::new(min, max)?)
                }
                _ => None,
            };
            let clarity = match raw.jd_clarity.as_deref().map(str::trim) {
                None => Clarity::Clear,
                Some(c) if c.eq_ignore_ascii_case("clear") => Clarity::Clear,
                Some(c) if c.eq_ignore_ascii_case("vague") => Clarity::Vague,
                Some(other) => {
                    return Err(PrimaryFailure::Schema(format!(
                        "jd_clarity must be \"clear\" or \"vague\", got {other:?}"
                    )))
                }
            };
            Ok(RequirementSpec::new(
                raw.required_skills,
                experience,
                clarity,
                ExtractionSource::Primary,
            ))
        });

    match parsed {
        Ok(requirement) => PrimaryOutcome::Primary(requirement),
        Err(cause) => PrimaryOutcome::Failure(cause),
    }
}

fn whole_years(value: f64, field: &'static str) -> Result<u32, PrimaryFailure> {
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(PrimaryFailure::Schema(format!(
            "{field} must be a non-negative number of years, got {value}"
        )));
    }
    Ok(value.floor() as u32)
}

// ────────────────────────────────────────────────────────────────────────────
// Extractor
// ────────────────────────────────────────────────────────────────────────────

/// Runs the primary tier and falls back on failure. Cheap to clone; holds no per-call state.
#[derive(Clone)]
pub struct Extractor {
    service: Arc<dyn ExtractionService>,
}

impl Extractor {
    pub fn new(service: Arc<dyn ExtractionService>) -> Self {
        Self { service }
    }

    pub async fn candidate(&self, resume_text: &str) -> CandidateProfile {
        let outcome = match self.service.extract_candidate(resume_text).await {
            Ok(raw) => parse_candidate(&raw),
            Err(e) => PrimaryOutcome::Failure(e.into()),
        };

        let profile = match outcome {
            PrimaryOutcome::Primary(profile) => profile,
            PrimaryOutcome::Failure(cause) => {
                warn!("Candidate extraction falling back to rules: {cause}");
                fallback::candidate_profile(resume_text)
            }
        };
        debug!(
            source = ?profile.source(),
            skills = profile.skills().len(),
            experience_years = profile.experience_years(),
            projects = profile.projects().len(),
            "Candidate profile extracted"
        );
        profile
    }

    pub async fn requirement(&self, jd_text: &str) -> RequirementSpec {
        let outcome = match self.service.extract_requirement(jd_text).await {
            Ok(raw) => parse_requirement(&raw),
            Err(e) => PrimaryOutcome::Failure(e.into()),
        };

        let requirement = match outcome {
            PrimaryOutcome::Primary(requirement) => {
                if requirement.required_skills().is_empty() {
                    info!("Primary extraction found no required skills; requirement is vague");
                }
                requirement
            }
            PrimaryOutcome::Failure(cause) => {
                warn!("Requirement extraction falling back to rules: {cause}");
                fallback::requirement_spec(jd_text)
            }
        };
        debug!(
            source = ?requirement.source(),
            required_skills = requirement.required_skills().len(),
            experience = ?requirement.experience_required(),
            clarity = ?requirement.clarity(),
            "Requirement extracted"
        );
        requirement
    }
}
