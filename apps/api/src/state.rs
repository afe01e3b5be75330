use std::sync::Arc;

use crate::models::role::RoleCatalog;
use crate::pipeline::AnalysisPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds only immutable collaborators; no per-analysis data survives a request.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
    pub roles: Arc<RoleCatalog>,
}
