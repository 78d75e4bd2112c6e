//! Screening orchestrator — an explicit finite-state machine.
//!
//! ```text
//! LoadDocuments ──> ExtractResume ──> ExtractRequirement ──> MatchSkills ──> EvaluateExperience
//!       │                                    │                                      │
//!       v                                    v                                      v
//!   ErrorExit                            VagueExit <──────────────────────────── Decide
//!                                                                                   │
//!                                                                                   v
//!                                                                                Explain
//! ```
//!
//! Every exit (`Explain`, `VagueExit`, `ErrorExit`) leads to `Done`, which carries the single
//! `ScreeningResult` for the invocation. Each state owns exactly the data produced so far; no
//! state is revisited and nothing is shared between invocations.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::documents::DocumentSource;
use crate::extraction::Extractor;
use crate::screening::decision::{self, VAGUE_CONFIDENCE};
use crate::screening::models::{
    CandidateProfile, DataSource, Decision, ExperienceAssessment, Recommendation,
    RequirementSpec, ScreeningResult, SkillMatchResult,
};
use crate::screening::{experience, explanation, skill_match};

pub const VAGUE_REQUIREMENT_MESSAGE: &str = "Job description is too vague to make an automated \
    decision. Missing clear technical requirements.";

/// Below this confidence a decision that already asks for a human is escalated to the vague
/// exit. The current threshold table never produces such a decision.
pub const ESCALATION_CONFIDENCE: f64 = 0.4;

#[derive(Debug, Clone, Deserialize)]
pub struct ScreeningRequest {
    pub resume_path: PathBuf,
    pub jd_path: PathBuf,
}

/// State labels, used for tracing and for the static transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    LoadDocuments,
    ExtractResume,
    ExtractRequirement,
    MatchSkills,
    EvaluateExperience,
    Decide,
    Explain,
    VagueExit,
    ErrorExit,
    Done,
}

impl Stage {
    /// Every legal successor of a stage.
    pub fn successors(self) -> &'static [Stage] {
        match self {
            Stage::LoadDocuments => &[Stage::ExtractResume, Stage::ErrorExit],
            Stage::ExtractResume => &[Stage::ExtractRequirement],
            Stage::ExtractRequirement => &[Stage::MatchSkills, Stage::VagueExit],
            Stage::MatchSkills => &[Stage::EvaluateExperience],
            Stage::EvaluateExperience => &[Stage::Decide],
            Stage::Decide => &[Stage::Explain, Stage::VagueExit],
            Stage::Explain | Stage::VagueExit | Stage::ErrorExit => &[Stage::Done],
            Stage::Done => &[],
        }
    }
}

/// Everything the scoring stages have produced for a clear requirement.
struct Assessment {
    profile: CandidateProfile,
    requirement: RequirementSpec,
    skills: SkillMatchResult,
    experience: ExperienceAssessment,
}

impl Assessment {
    fn data_source(&self) -> DataSource {
        DataSource::combine(self.profile.source(), self.requirement.source())
    }
}

enum State {
    LoadDocuments(ScreeningRequest),
    ExtractResume {
        resume_text: String,
        jd_text: String,
    },
    ExtractRequirement {
        profile: CandidateProfile,
        jd_text: String,
    },
    MatchSkills {
        profile: CandidateProfile,
        requirement: RequirementSpec,
    },
    EvaluateExperience {
        profile: CandidateProfile,
        requirement: RequirementSpec,
        skills: SkillMatchResult,
    },
    Decide(Assessment),
    Explain(Assessment, Decision),
    VagueExit(DataSource),
    ErrorExit(String),
    Done(ScreeningResult),
}

impl State {
    fn stage(&self) -> Stage {
        match self {
            State::LoadDocuments(_) => Stage::LoadDocuments,
            State::ExtractResume { .. } => Stage::ExtractResume,
            State::ExtractRequirement { .. } => Stage::ExtractRequirement,
            State::MatchSkills { .. } => Stage::MatchSkills,
            State::EvaluateExperience { .. } => Stage::EvaluateExperience,
            State::Decide(_) => Stage::Decide,
            State::Explain(..) => Stage::Explain,
            State::VagueExit(_) => Stage::VagueExit,
            State::ErrorExit(_) => Stage::ErrorExit,
            State::Done(_) => Stage::Done,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Routing guards
// ────────────────────────────────────────────────────────────────────────────

/// `ExtractRequirement → VagueExit` when there is nothing concrete to score against.
pub fn requirement_is_vague(requirement: &RequirementSpec) -> bool {
    requirement.is_vague()
}

/// `Decide → VagueExit` for decisions that are both low-confidence and flagged for a human.
/// Kept for threshold tuning; unreachable with the current decision table.
pub fn decision_needs_escalation(decision: &Decision) -> bool {
    decision.confidence < ESCALATION_CONFIDENCE && decision.requires_human
}

// ────────────────────────────────────────────────────────────────────────────
// Terminal records
// ────────────────────────────────────────────────────────────────────────────

pub fn error_result(message: impl Into<String>) -> ScreeningResult {
    ScreeningResult {
        match_score: 0.0,
        recommendation: Recommendation::ManualReview,
        requires_human: true,
        confidence: 0.0,
        reasoning_summary: message.into(),
        data_source: DataSource::Error,
    }
}

pub fn vague_result(data_source: DataSource) -> ScreeningResult {
    ScreeningResult {
        match_score: 0.0,
        recommendation: Recommendation::ManualReview,
        requires_human: true,
        confidence: VAGUE_CONFIDENCE,
        reasoning_summary: VAGUE_REQUIREMENT_MESSAGE.to_string(),
        data_source,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Screener
// ────────────────────────────────────────────────────────────────────────────

/// Runs screenings. Holds only injected, stateless collaborators, so clones can serve
/// independent invocations in parallel.
#[derive(Clone)]
pub struct Screener {
    documents: Arc<dyn DocumentSource>,
    extractor: Extractor,
}

impl Screener {
    pub fn new(documents: Arc<dyn DocumentSource>, extractor: Extractor) -> Self {
        Self {
            documents,
            extractor,
        }
    }

    pub async fn run(&self, request: ScreeningRequest) -> ScreeningResult {
        self.run_traced(request).await.0
    }

    /// Runs to completion and also returns the stages visited, in order.
    pub async fn run_traced(&self, request: ScreeningRequest) -> (ScreeningResult, Vec<Stage>) {
        let mut state = State::LoadDocuments(request);
        let mut trace = vec![Stage::LoadDocuments];

        loop {
            if let State::Done(result) = state {
                info!(
                    recommendation = %result.recommendation,
                    match_score = result.match_score,
                    data_source = ?result.data_source,
                    "Screening complete"
                );
                return (result, trace);
            }

            let from = state.stage();
            state = self.step(state).await;
            let to = state.stage();
            debug_assert!(
                from.successors().contains(&to),
                "transition {from:?} -> {to:?} is missing from Stage::successors"
            );
            debug!(?from, ?to, "Screening transition");
            trace.push(to);
        }
    }

    async fn step(&self, state: State) -> State {
        match state {
            State::LoadDocuments(request) => {
                let resume_text = match self
                    .documents
                    .load_candidate_text(&request.resume_path)
                    .await
                {
                    Ok(text) => text,
                    Err(e) => return State::ErrorExit(e.to_string()),
                };
                match self.documents.load_requirement_text(&request.jd_path).await {
                    Ok(jd_text) => State::ExtractResume {
                        resume_text,
                        jd_text,
                    },
                    Err(e) => State::ErrorExit(e.to_string()),
                }
            }

            State::ExtractResume {
                resume_text,
                jd_text,
            } => State::ExtractRequirement {
                profile: self.extractor.candidate(&resume_text).await,
                jd_text,
            },

            State::ExtractRequirement { profile, jd_text } => {
                let requirement = self.extractor.requirement(&jd_text).await;
                if requirement_is_vague(&requirement) {
                    State::VagueExit(DataSource::combine(profile.source(), requirement.source()))
                } else {
                    State::MatchSkills {
                        profile,
                        requirement,
                    }
                }
            }

            State::MatchSkills {
                profile,
                requirement,
            } => {
                let skills = skill_match::evaluate(&profile, &requirement);
                State::EvaluateExperience {
                    profile,
                    requirement,
                    skills,
                }
            }

            State::EvaluateExperience {
                profile,
                requirement,
                skills,
            } => {
                let experience = experience::evaluate(&profile, &requirement);
                State::Decide(Assessment {
                    profile,
                    requirement,
                    skills,
                    experience,
                })
            }

            State::Decide(assessment) => {
                let decision = decision::decide(
                    &assessment.skills,
                    &assessment.experience,
                    &assessment.requirement,
                );
                if decision_needs_escalation(&decision) {
                    State::VagueExit(assessment.data_source())
                } else {
                    State::Explain(assessment, decision)
                }
            }

            State::Explain(assessment, decision) => {
                let reasoning_summary = explanation::generate(
                    &assessment.profile,
                    &assessment.requirement,
                    &assessment.skills,
                    &assessment.experience,
                    &decision,
                );
                State::Done(ScreeningResult {
                    match_score: decision.match_score,
                    recommendation: decision.recommendation,
                    requires_human: decision.requires_human,
                    confidence: decision.confidence,
                    reasoning_summary,
                    data_source: assessment.data_source(),
                })
            }

            State::VagueExit(data_source) => State::Done(vague_result(data_source)),

            State::ErrorExit(message) => State::Done(error_result(message)),

            done @ State::Done(_) => done,
        }
    }
}
