//! Orchestrator: Extractor -> Assessment Client -> Delivery Forwarder.
//!
//! Runs each stage in sequence. Stages own their failure policy; the orchestrator only
//! short-circuits when the document yields no text.

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::assessment::client::AssessmentClient;
use crate::delivery::{DeliveryForwarder, DeliveryOutcome, DeliveryRecord};
use crate::extraction::extract;
use crate::models::assessment::{group_improvements, Assessment, ImprovementGroup, Provenance};
use crate::models::document::{ExtractionDiagnostic, ResumeDocument};
use crate::models::role::RoleLabel;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No text could be extracted from '{filename}'")]
    EmptyDocument {
        filename: String,
        diagnostic: Option<ExtractionDiagnostic>,
    },
}

/// What the presentation layer receives for one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub filename: String,
    pub role: RoleLabel,
    pub assessment: Assessment,
    pub provenance: Provenance,
    pub fallback_reason: Option<String>,
    pub improvement_groups: Vec<ImprovementGroup>,
    pub delivery: DeliveryOutcome,
    pub page_count: usize,
    pub text_preview: String,
}

pub struct AnalysisPipeline {
    assessor: AssessmentClient,
    forwarder: DeliveryForwarder,
}

impl AnalysisPipeline {
    pub fn new(assessor: AssessmentClient, forwarder: DeliveryForwarder) -> Self {
        Self {
            assessor,
            forwarder,
        }
    }

    pub async fn run(
        &self,
        document: ResumeDocument,
        role: RoleLabel,
    ) -> Result<AnalysisReport, PipelineError> {
        let text = extract(&document).await;
        let filename = document.filename;

        if text.is_empty() {
            return Err(PipelineError::EmptyDocument {
                filename,
                diagnostic: text.diagnostic().cloned(),
            });
        }

        let analysis_id = Uuid::new_v4();
        info!(
            "Analysis {} started: '{}' ({} page(s)) for role '{}'",
            analysis_id,
            filename,
            text.pages_with_text(),
            role
        );

        let result = self.assessor.assess(&text, &role).await;

        let record = DeliveryRecord::new(analysis_id, &filename, &role, text.as_str(), &result);
        let delivery = self.forwarder.deliver(&record).await;

        info!(
            "Analysis {} finished: ats_score={} provenance={:?}",
            analysis_id, result.assessment.ats_score, result.provenance
        );

        Ok(AnalysisReport {
            analysis_id,
            filename,
            improvement_groups: group_improvements(&result.assessment.improvements),
            assessment: result.assessment,
            provenance: result.provenance,
            fallback_reason: result.fallback_reason,
            role,
            delivery,
            page_count: text.pages_with_text(),
            text_preview: text.preview().to_string(),
        })
    }
}
