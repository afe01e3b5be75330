use serde::{Deserialize, Serialize};

/// Sentinel used for `education_summary` when no education section is detected.
pub const EDUCATION_NOT_FOUND: &str = "Not found";

/// Catch-all bucket for improvements without a section tag.
pub const GENERAL_SECTION: &str = "General";

/// A validated resume/role match assessment.
///
/// Instances only exist once every field has passed validation: `summary` is non-blank,
/// `ats_score` is within 0..=100 and `experience_years` is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub skills: Vec<String>,
    pub experience_years: f64,
    pub summary: String,
    pub ats_score: u32,
    pub education_summary: String,
    pub improvements: Vec<String>,
}

/// Where an assessment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Model,
    Heuristic,
}

/// An assessment plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentResult {
    pub assessment: Assessment,
    pub provenance: Provenance,
    /// Set when the heuristic was substituted for the reasoning service.
    pub fallback_reason: Option<String>,
}

/// Improvements sharing a section tag, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImprovementGroup {
    pub section: String,
    pub items: Vec<String>,
}

/// Buckets improvements by a leading `Section:` tag.
///
/// The tag convention is requested from the reasoning service but not guaranteed, so
/// anything that does not look like a short tag lands in [`GENERAL_SECTION`].
pub fn group_improvements(improvements: &[String]) -> Vec<ImprovementGroup> {
    let mut groups: Vec<ImprovementGroup> = Vec::new();

    for raw in improvements {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let (section, item) = split_section_tag(raw).unwrap_or((GENERAL_SECTION, raw));

        match groups.iter_mut().find(|g| g.section == section) {
            Some(group) => group.items.push(item.to_string()),
            None => groups.push(ImprovementGroup {
                section: section.to_string(),
                items: vec![item.to_string()],
            }),
        }
    }

    groups
}

fn split_section_tag(text: &str) -> Option<(&str, &str)> {
    let (tag, rest) = text.split_once(':')?;
    let tag = tag.trim();
    let rest = rest.trim();
    let looks_like_tag = !tag.is_empty()
        && tag.len() <= 30
        && tag.split_whitespace().count() <= 3
        && !tag.to_ascii_lowercase().starts_with("http");
    (looks_like_tag && !rest.is_empty()).then_some((tag, rest))
}
