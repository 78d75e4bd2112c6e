// Shared prompt fragments. Each module that calls the LLM keeps its own prompts.rs
// alongside it; only cross-cutting instructions live here.

/// Instruction appended to every extraction prompt so the model does not pad its answer.
pub const NO_INFERENCE_INSTRUCTION: &str = "\
    Only report what the text states. Do NOT infer skills from job titles or company names. \
    If a field is not present in the text, use an empty list or null.";
