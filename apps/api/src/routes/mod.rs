pub mod analyze;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Uploads larger than this are rejected before reaching the pipeline.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/roles", get(analyze::handle_list_roles))
        .route("/api/v1/analyze", post(analyze::handle_analyze))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::assessment::client::AssessmentClient;
    use crate::assessment::heuristic::ScoringPolicy;
    use crate::config::DeliveryConfig;
    use crate::delivery::DeliveryForwarder;
    use crate::extraction::tests::make_test_pdf;
    use crate::models::role::RoleCatalog;
    use crate::pipeline::AnalysisPipeline;

    const BOUNDARY: &str = "X-RESUME-BOUNDARY";

    fn app() -> Router {
        let pipeline = AnalysisPipeline::new(
            AssessmentClient::offline("test", ScoringPolicy::default()),
            DeliveryForwarder::from_config(&DeliveryConfig::default()),
        );
        build_router(AppState {
            pipeline: Arc::new(pipeline),
            roles: Arc::new(RoleCatalog::default()),
        })
    }

    fn multipart_body(role: Option<&str>, pdf: Option<&[u8]>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(role) = role {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"role\"\r\n\r\n{role}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(pdf) = pdf {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(pdf);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn analyze_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_roles_lists_catalog() {
        let response = app()
            .oneshot(Request::get("/api/v1/roles").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        let roles = body["roles"].as_array().unwrap();
        assert_eq!(roles.len(), RoleCatalog::default().roles().len());
        assert!(roles.iter().any(|r| r == "Data Analyst"));
    }

    #[tokio::test]
    async fn test_unknown_role_is_rejected() {
        let pdf = make_test_pdf(&[Some("Python")]);
        let response = app()
            .oneshot(analyze_request(multipart_body(
                Some("Astronaut"),
                Some(&pdf),
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["code"],
            "VALIDATION_ERROR"
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_rejected() {
        let response = app()
            .oneshot(analyze_request(multipart_body(Some("Data Analyst"), None)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_scanned_document_is_unprocessable() {
        let pdf = make_test_pdf(&[None]);
        let response = app()
            .oneshot(analyze_request(multipart_body(
                Some("Data Analyst"),
                Some(&pdf),
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "EMPTY_DOCUMENT");
    }

    #[tokio::test]
    async fn test_offline_analysis_returns_report() {
        let pdf = make_test_pdf(&[Some("5+ years Python SQL Docker")]);
        let response = app()
            .oneshot(analyze_request(multipart_body(
                Some("Data Analyst"),
                Some(&pdf),
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["filename"], "cv.pdf");
        assert_eq!(body["role"], "Data Analyst");
        assert_eq!(body["provenance"], "heuristic");
        assert_eq!(body["assessment"]["ats_score"], 75);
        assert_eq!(body["delivery"]["status"], "skipped");
    }
}
