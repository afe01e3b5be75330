//! Heuristic Assessor: deterministic fallback derived from raw text and a role label.
//!
//! Pure function of its inputs: no I/O, no clock, no randomness. It is both the offline
//! mode and the guaranteed fallback, so its output must always be a valid `Assessment`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::assessment::{Assessment, EDUCATION_NOT_FOUND};
use crate::models::document::ExtractedText;
use crate::models::role::RoleLabel;

/// Known skills, in reporting order.
pub const SKILL_VOCABULARY: &[&str] = &[
    "python",
    "java",
    "c++",
    "sql",
    "excel",
    "tensorflow",
    "pandas",
    "numpy",
    "docker",
    "aws",
];

const EDUCATION_KEYWORDS: &[&str] = &[
    "bachelor",
    "master",
    "phd",
    "ph.d",
    "b.tech",
    "m.tech",
    "b.sc",
    "m.sc",
    "mba",
    "degree",
    "university",
    "college",
];

const MAX_EDUCATION_CHARS: usize = 200;

// Matches "5 years" and "10+ years"; ranges and prose are missed.
static YEARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})\+?\s+years").unwrap());

/// Score formula: `min(ceiling, base + per_skill × skills + per_year × years)`.
///
/// Any setting keeps the score monotonic in skills and years; `ceiling` above 100 is
/// treated as 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    pub base: u32,
    pub per_skill: u32,
    pub per_year: u32,
    pub ceiling: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            base: 50,
            per_skill: 5,
            per_year: 2,
            ceiling: 100,
        }
    }
}

impl ScoringPolicy {
    pub fn score(&self, skills_found: usize, experience_years: u32) -> u32 {
        let skills = u32::try_from(skills_found).unwrap_or(u32::MAX);
        let raw = self
            .base
            .saturating_add(self.per_skill.saturating_mul(skills))
            .saturating_add(self.per_year.saturating_mul(experience_years));
        raw.min(self.ceiling.min(100))
    }
}

pub fn assess_heuristically(
    text: &ExtractedText,
    role: &RoleLabel,
    policy: &ScoringPolicy,
) -> Assessment {
    let lower = text.as_str().to_lowercase();

    let skills = detect_skills(&lower);
    let experience_years = detect_experience_years(&lower);
    let ats_score = policy.score(skills.len(), experience_years);

    Assessment {
        summary: build_summary(role, skills.len(), experience_years),
        improvements: build_improvements(role, &skills, experience_years),
        education_summary: detect_education(text.as_str()),
        skills,
        experience_years: f64::from(experience_years),
        ats_score,
    }
}

fn detect_skills(lower: &str) -> Vec<String> {
    SKILL_VOCABULARY
        .iter()
        .filter(|skill| lower.contains(*skill))
        .map(|skill| skill.to_string())
        .collect()
}

fn detect_experience_years(lower: &str) -> u32 {
    YEARS_RE
        .captures(lower)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn detect_education(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| {
            let lower = line.to_lowercase();
            EDUCATION_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(|line| line.chars().take(MAX_EDUCATION_CHARS).collect())
        .unwrap_or_else(|| EDUCATION_NOT_FOUND.to_string())
}

fn build_summary(role: &RoleLabel, skills_found: usize, experience_years: u32) -> String {
    let experience = match experience_years {
        0 => "no stated years of experience (entry-level or unknown)".to_string(),
        1 => "1 year of stated experience".to_string(),
        n => format!("{n} years of stated experience"),
    };
    format!(
        "Heuristic assessment for the {role} role: {skills_found} known skill(s) detected and {experience}."
    )
}

fn build_improvements(role: &RoleLabel, skills: &[String], experience_years: u32) -> Vec<String> {
    let mut improvements = vec![
        format!(
            "Summary: Add a one-line professional summary aimed at the {role} role."
        ),
        "Experience: List achievements with metrics (e.g., increased X by Y%).".to_string(),
    ];
    if skills.is_empty() {
        improvements.push(format!(
            "Skills: Add a dedicated skills section listing the tools a {role} uses."
        ));
    } else if skills.len() < 3 {
        improvements.push(format!(
            "Skills: Expand the skills section beyond {} to cover more {role} requirements.",
            skills.join(", ")
        ));
    }
    if experience_years == 0 {
        improvements
            .push("Experience: State your total years of experience explicitly.".to_string());
    }
    improvements
}
