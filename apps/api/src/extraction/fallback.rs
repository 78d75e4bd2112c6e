//! Deterministic fallback extraction.
//!
//! Keyword and pattern matching over a fixed vocabulary. Every function here is a pure
//! function of its input text: this is the correctness backstop when the primary service is
//! unavailable or returns something unusable.
//!
//! Changing `SKILL_VOCABULARY`, `SKILL_ALIASES` or any of the patterns changes screening
//! outcomes; bump `FALLBACK_VOCABULARY_VERSION` when you do.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::screening::models::{
    CandidateProfile, Clarity, ExperienceRange, ExtractionSource, RequirementSpec,
};

pub const FALLBACK_VOCABULARY_VERSION: u32 = 1;

/// Lowercase skill terms recognised by the fallback.
pub const SKILL_VOCABULARY: &[&str] = &[
    // Programming languages
    "python", "java", "javascript", "typescript", "c++", "c#", "go", "golang",
    "rust", "ruby", "php", "swift", "kotlin", "scala", "r", "matlab", "perl",
    // Web frameworks
    "django", "flask", "fastapi", "express", "expressjs", "react", "reactjs",
    "angular", "vue", "vuejs", "nextjs", "next.js", "nuxt", "svelte",
    "spring", "spring boot", "springboot", "rails", "ruby on rails",
    "laravel", "asp.net", "dotnet", ".net",
    // Databases
    "sql", "mysql", "postgresql", "postgres", "mongodb", "redis", "elasticsearch",
    "cassandra", "dynamodb", "sqlite", "oracle", "mariadb", "neo4j", "graphql",
    // Cloud and DevOps
    "aws", "azure", "gcp", "google cloud", "docker", "kubernetes", "k8s",
    "terraform", "ansible", "jenkins", "gitlab", "github actions", "ci/cd",
    "linux", "unix", "bash", "shell scripting",
    // Data and ML
    "machine learning", "ml", "deep learning", "tensorflow", "pytorch", "keras",
    "pandas", "numpy", "scikit-learn", "sklearn", "spark", "hadoop", "kafka",
    "airflow", "data engineering", "etl", "data pipeline",
    // APIs and protocols
    "rest", "rest api", "restful", "grpc", "websocket", "microservices",
    "api design", "api development",
    // Tools and practices
    "git", "github", "bitbucket", "jira", "agile", "scrum",
    "tdd", "unit testing", "pytest", "jest", "mocha", "selenium",
    // Other
    "html", "css", "sass", "tailwind", "bootstrap", "webpack", "node.js", "nodejs",
    "npm", "yarn", "celery", "rabbitmq", "nginx", "apache",
];

/// Variant spellings folded onto one canonical skill.
pub const SKILL_ALIASES: &[(&str, &str)] = &[
    ("reactjs", "react"),
    ("vuejs", "vue"),
    ("expressjs", "express"),
    ("nodejs", "node.js"),
    ("golang", "go"),
    ("postgres", "postgresql"),
    ("springboot", "spring boot"),
];

/// One compiled matcher per vocabulary term. A term matches only when it is not embedded in
/// a longer alphanumeric token, so `sql` does not fire on `mysql` and `.net` does not fire on
/// `asp.net`.
static SKILL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    SKILL_VOCABULARY
        .iter()
        .map(|skill| {
            let pattern = format!(
                r"(?:^|[^a-z0-9_]){}(?:[^a-z0-9_]|$)",
                regex::escape(skill)
            );
            (*skill, Regex::new(&pattern).expect("skill pattern is valid"))
        })
        .collect()
});

/// Resume experience patterns, tried in order. The first pattern that matches anywhere wins.
static EXPERIENCE_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(\d+)\+?\s*(?:years?|yrs?)\s*(?:of\s*)?(?:experience|exp)?")
            .expect("experience pattern is valid"),
        Regex::new(r"(?:experience|exp)[:\s]*(\d+)\+?\s*(?:years?|yrs?)")
            .expect("experience pattern is valid"),
        Regex::new(r"(\d+)\s*-\s*(\d+)\s*(?:years?|yrs?)").expect("experience pattern is valid"),
    ]
});

static YEAR_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(20\d{2})\b").expect("year pattern is valid"));

static REQUIREMENT_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\s*(?:-|–|to)\s*(\d+)\s*(?:years?|yrs?)").expect("range pattern is valid")
});

static REQUIREMENT_MIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\+?\s*(?:years?|yrs?)").expect("minimum pattern is valid"));

/// Largest span between year mentions accepted as career length.
const MAX_YEAR_SPAN: u32 = 30;

// ────────────────────────────────────────────────────────────────────────────
// Record builders
// ────────────────────────────────────────────────────────────────────────────

/// Builds a candidate profile from resume text. Projects are never inferred.
pub fn candidate_profile(resume_text: &str) -> CandidateProfile {
    let skills = extract_skills(resume_text);
    let years = extract_experience_years(resume_text);
    debug!(
        skills = skills.len(),
        experience_years = years,
        "Fallback extracted candidate profile"
    );
    CandidateProfile::new(skills, years, Vec::new(), ExtractionSource::Fallback)
}

/// Builds a requirement from job-description text. Clear iff at least one skill was found.
pub fn requirement_spec(jd_text: &str) -> RequirementSpec {
    let skills = extract_skills(jd_text);
    let clarity = if skills.is_empty() {
        Clarity::Vague
    } else {
        Clarity::Clear
    };
    let experience = extract_experience_requirement(jd_text);
    debug!(
        skills = skills.len(),
        ?experience,
        ?clarity,
        "Fallback extracted requirement"
    );
    RequirementSpec::new(skills, experience, clarity, ExtractionSource::Fallback)
}

// ────────────────────────────────────────────────────────────────────────────
// Extractors
// ────────────────────────────────────────────────────────────────────────────

/// Returns recognised skills, canonicalised, sorted and de-duplicated.
pub fn extract_skills(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let text = text.to_lowercase();

    SKILL_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&text))
        .map(|(skill, _)| canonical_skill(skill).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn canonical_skill(skill: &str) -> &str {
    SKILL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == skill)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(skill)
}

/// Estimates years of experience from resume text; 0 when nothing usable is found.
pub fn extract_experience_years(text: &str) -> u32 {
    let text = text.to_lowercase();

    for pattern in EXPERIENCE_PATTERNS.iter() {
        if let Some(years) = pattern
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            return years;
        }
    }

    year_mention_span(&text).unwrap_or(0)
}

/// Span between the earliest and latest `20xx` mention, if it looks like a career length.
fn year_mention_span(text: &str) -> Option<u32> {
    let years: Vec<u32> = YEAR_MENTION
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();
    if years.len() < 2 {
        return None;
    }
    let first = years.iter().min()?;
    let last = years.iter().max()?;
    let span = last - first;
    (1..=MAX_YEAR_SPAN).contains(&span).then_some(span)
}

/// Finds the experience requirement in job-description text.
///
/// `"2-4 years"` and `"2 to 4 years"` give a closed range, `"3+ years"` an open one. An
/// inverted range is discarded rather than guessed at.
pub fn extract_experience_requirement(text: &str) -> Option<ExperienceRange> {
    let text = text.to_lowercase();

    if let Some(caps) = REQUIREMENT_RANGE.captures(&text) {
        let min = caps[1].parse::<u32>().ok()?;
        let max = caps[2].parse::<u32>().ok()?;
        return ExperienceRange::new(min, Some(max)).ok();
    }

    REQUIREMENT_MIN
        .captures(&text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(ExperienceRange::at_least)
}
