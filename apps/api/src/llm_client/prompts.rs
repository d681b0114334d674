// Prompt templates for every completion the pipeline issues.
// `{resume_text}` and `{summary}` are substituted verbatim.

pub const SUMMARY_PROMPT: &str =
    "Summarize this resume highlighting skills, education, and experience:\n\n{resume_text}";

pub const SKILL_GAP_PROMPT: &str = "Analyze this resume and highlight missing skills, \
certifications, and experiences for better job opportunities:\n\n{resume_text}";

pub const ROADMAP_PROMPT: &str = "Based on this resume, suggest a future roadmap to improve \
this person's career prospects (Skills to learn, certifications needed, industry exposure):\
\n\n{resume_text}";

pub const KEYWORD_PROMPT: &str = "Based on this resume summary, suggest the best job titles \
and keywords for searching jobs. Give a comma-separated list only, no explanation.\
\n\nSummary: {summary}";

pub fn summary_prompt(resume_text: &str) -> String {
    SUMMARY_PROMPT.replace("{resume_text}", resume_text)
}

pub fn skill_gap_prompt(resume_text: &str) -> String {
    SKILL_GAP_PROMPT.replace("{resume_text}", resume_text)
}

pub fn roadmap_prompt(resume_text: &str) -> String {
    ROADMAP_PROMPT.replace("{resume_text}", resume_text)
}

pub fn keyword_prompt(summary: &str) -> String {
    KEYWORD_PROMPT.replace("{summary}", summary)
}
