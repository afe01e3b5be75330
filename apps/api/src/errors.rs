use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::role::RoleError;
use crate::pipeline::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Empty document: {0}")]
    EmptyDocument(String),
}

impl From<RoleError> for AppError {
    fn from(e: RoleError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match &e {
            PipelineError::EmptyDocument { diagnostic, .. } => {
                let detail = diagnostic
                    .as_ref()
                    .map(|d| format!("{e} ({d})"))
                    .unwrap_or_else(|| e.to_string());
                AppError::EmptyDocument(detail)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::EmptyDocument(msg) => {
                tracing::warn!("Rejected upload: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EMPTY_DOCUMENT",
                    msg.clone(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::ExtractionDiagnostic;

    #[test]
    fn test_empty_document_maps_to_422() {
        let error: AppError = PipelineError::EmptyDocument {
            filename: "scan.pdf".into(),
            diagnostic: Some(ExtractionDiagnostic::NoTextLayer { pages: 2 }),
        }
        .into();
        assert!(error.to_string().contains("OCR"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_role_error_maps_to_400() {
        let error: AppError = RoleError::Unknown("Astronaut".into()).into();
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
