// Assessment prompt templates sent to the reasoning service.

pub const ASSESSMENT_TOOL_NAME: &str = "record_assessment";

pub const ASSESSMENT_TOOL_DESCRIPTION: &str = "\
Record the structured resume assessment. Every field in the input schema is required.";

pub const ASSESSMENT_SYSTEM: &str = "\
You are an experienced technical recruiter and applicant tracking system (ATS) analyst. \
You evaluate resumes strictly against a single target job role. \
Only report skills and experience that appear in the resume text. \
Do NOT invent employers, degrees, or years of experience.";

pub const ASSESSMENT_PROMPT_TEMPLATE: &str = r#"Assess the following resume for the role of {role}.

Score the resume and tailor every improvement for the {role} role specifically:
- ats_score reflects how well this resume would pass ATS screening for {role}.
- improvements are concrete edits that would raise that score, each prefixed with the
  resume section it applies to (for example "Skills:", "Experience:", "Projects:",
  "Education:", "Summary:").
- If no education is listed, set education_summary to "Not found".

RESUME TEXT:
{resume_text}
"#;

pub fn build_assessment_prompt(role: &str, resume_text: &str) -> String {
    ASSESSMENT_PROMPT_TEMPLATE
        .replace("{role}", role)
        .replace("{resume_text}", resume_text)
}
