//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::document::ResumeDocument;
use crate::models::role::RoleLabel;
use crate::pipeline::AnalysisReport;
use crate::state::AppState;

const DEFAULT_FILENAME: &str = "resume.pdf";

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<RoleLabel>,
}

/// GET /api/v1/roles
pub async fn handle_list_roles(State(state): State<AppState>) -> Json<RolesResponse> {
    Json(RolesResponse {
        roles: state.roles.roles().to_vec(),
    })
}

/// POST /api/v1/analyze
///
/// Multipart form with a `file` part (the PDF) and a `role` part (a catalog label).
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let mut document: Option<ResumeDocument> = None;
    let mut role: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| {
            AppError::Validation(format!("Malformed multipart body: {e}"))
        })?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .filter(|f| !f.trim().is_empty())
                    .unwrap_or(DEFAULT_FILENAME)
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        AppError::Validation(format!("Failed to read file: {e}"))
                    })?;
                document = Some(ResumeDocument::new(filename, data));
            }
            Some("role") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| {
                        AppError::Validation(format!("Failed to read role: {e}"))
                    })?;
                role = Some(value);
            }
            _ => {}
        }
    }

    let document =
        document.ok_or_else(|| AppError::Validation("Missing 'file' part".to_string()))?;
    let role = role.ok_or_else(|| AppError::Validation("Missing 'role' part".to_string()))?;
    let role = state.roles.lookup(&role)?;

    let report = state.pipeline.run(document, role).await?;
    Ok(Json(report))
}
