use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Role label cannot be empty")]
    Empty,

    #[error("Unknown role '{0}'")]
    Unknown(String),
}

/// The job role a resume is assessed against. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoleLabel(String);

impl RoleLabel {
    pub fn new(label: impl Into<String>) -> Result<Self, RoleError> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(RoleError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

const DEFAULT_ROLES: &[&str] = &[
    "Software Engineer",
    "Backend Developer",
    "Frontend Developer",
    "Full Stack Developer",
    "Data Analyst",
    "Data Scientist",
    "Data Engineer",
    "Machine Learning Engineer",
    "DevOps Engineer",
    "Cloud Engineer",
    "Cybersecurity Analyst",
    "QA Engineer",
    "Mobile App Developer",
    "Product Manager",
    "Project Manager",
    "Business Analyst",
    "UI/UX Designer",
    "Database Administrator",
    "Network Engineer",
    "Systems Administrator",
    "Technical Support Engineer",
    "Data Analyst",
    "Software Engineer",
];

/// Fixed set of selectable roles. Lookups are exact and case-sensitive.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    roles: Vec<RoleLabel>,
}

impl RoleCatalog {
    /// Builds a catalog, dropping blank titles and later duplicates while keeping order.
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roles: Vec<RoleLabel> = Vec::new();
        for title in titles {
            let Ok(role) = RoleLabel::new(title) else {
                continue;
            };
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        Self { roles }
    }

    pub fn roles(&self) -> &[RoleLabel] {
        &self.roles
    }

    pub fn lookup(&self, label: &str) -> Result<RoleLabel, RoleError> {
        if label.trim().is_empty() {
            return Err(RoleError::Empty);
        }
        self.roles
            .iter()
            .find(|r| r.as_str() == label)
            .cloned()
            .ok_or_else(|| RoleError::Unknown(label.to_string()))
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::from_titles(DEFAULT_ROLES.iter().copied())
    }
}
