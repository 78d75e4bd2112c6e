// LLM prompt constants for the Extraction module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for both extraction calls.
pub const EXTRACTION_SYSTEM: &str = "You are an AI recruiter assistant. \
    Extract structured data from hiring documents. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object.";

/// Resume extraction prompt. Replace `{no_inference}` and `{resume_text}` before sending.
pub const CANDIDATE_PROMPT_TEMPLATE: &str = r#"Extract structured data from the resume below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "skills": ["python", "fastapi"],
  "experience_years": 2,
  "projects": ["project1", "project2"]
}

Rules:
- skills: technical skills, lowercase, one entry per skill.
- experience_years: total years of professional experience as a whole number. Use 0 for none.
- projects: project names in the order they appear.
{no_inference}

Resume:
{resume_text}"#;

/// Job-description extraction prompt. Replace `{no_inference}` and `{jd_text}` before sending.
pub const REQUIREMENT_PROMPT_TEMPLATE: &str = r#"Extract structured data from the job description below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "required_skills": ["python", "fastapi"],
  "experience_required": {"min": 2, "max": 4},
  "jd_clarity": "clear"
}

Rules:
- required_skills: technical skills the role requires, lowercase.
- experience_required: null if no experience is stated. For "N+ years" set max to null.
- jd_clarity: "vague" if the description has no concrete technical requirements, else "clear".
{no_inference}

Job Description:
{jd_text}"#;
