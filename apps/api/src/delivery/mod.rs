//! Delivery Forwarder: best-effort push of a finished assessment to a downstream webhook.
//!
//! Exactly one attempt, bounded by a timeout, no retry. Every outcome is returned as a
//! `DeliveryOutcome`; nothing here can fail the analysis.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DeliveryConfig;
use crate::models::assessment::{AssessmentResult, Provenance};
use crate::models::role::RoleLabel;

/// Substrings (lower-case) that mark an endpoint as an unfilled template value.
pub const PLACEHOLDER_MARKERS: &[&str] = &["your-webhook-url", "replace_me", "<webhook"];

/// The flattened payload posted downstream.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRecord {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub filename: String,
    pub role: String,
    pub resume_text: String,
    pub provenance: Provenance,
    pub skills: Vec<String>,
    pub experience_years: f64,
    pub summary: String,
    pub ats_score: u32,
    pub education_summary: String,
    pub improvements: Vec<String>,
}

impl DeliveryRecord {
    pub fn new(
        analysis_id: Uuid,
        filename: &str,
        role: &RoleLabel,
        resume_text: &str,
        result: &AssessmentResult,
    ) -> Self {
        let assessment = &result.assessment;
        Self {
            analysis_id,
            analyzed_at: Utc::now(),
            filename: filename.to_string(),
            role: role.to_string(),
            resume_text: resume_text.to_string(),
            provenance: result.provenance,
            skills: assessment.skills.clone(),
            experience_years: assessment.experience_years,
            summary: assessment.summary.clone(),
            ats_score: assessment.ats_score,
            education_summary: assessment.education_summary.clone(),
            improvements: assessment.improvements.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    #[serde(rename = "ok")]
    Delivered { http_status: u16 },
    Skipped { reason: String },
    Failed { reason: String },
}

/// Posts a JSON body once and reports the HTTP status.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<u16>;
}

/// `reqwest`-backed webhook transport.
#[derive(Clone, Default)]
pub struct HttpWebhook {
    client: Client,
}

#[async_trait]
impl WebhookTransport for HttpWebhook {
    async fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<u16> {
        let response = self
            .client
            .post(url.clone())
            .timeout(timeout)
            .json(body)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Destination {
    Disabled(&'static str),
    Invalid(String),
    Endpoint(Url),
}

impl Destination {
    fn from_config(config: &DeliveryConfig) -> Self {
        if !config.enabled {
            return Destination::Disabled("delivery disabled by configuration");
        }
        let Some(endpoint) = config
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
        else {
            return Destination::Disabled("no delivery endpoint configured");
        };

        if is_placeholder(endpoint) {
            return Destination::Invalid(format!(
                "delivery endpoint '{endpoint}' is a placeholder; set DELIVERY_ENDPOINT to a real URL"
            ));
        }
        match Url::parse(endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Destination::Endpoint(url),
            Ok(url) => Destination::Invalid(format!(
                "delivery endpoint scheme '{}' is not http(s)",
                url.scheme()
            )),
            Err(e) => Destination::Invalid(format!("delivery endpoint is not a valid URL: {e}")),
        }
    }
}

pub fn is_placeholder(endpoint: &str) -> bool {
    let lower = endpoint.to_lowercase();
    PLACEHOLDER_MARKERS.iter().any(|m| lower.contains(m))
}

pub struct DeliveryForwarder {
    destination: Destination,
    transport: Arc<dyn WebhookTransport>,
    timeout: Duration,
}

impl DeliveryForwarder {
    pub fn new(config: &DeliveryConfig, transport: Arc<dyn WebhookTransport>) -> Self {
        Self {
            destination: Destination::from_config(config),
            transport,
            timeout: config.timeout,
        }
    }

    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self::new(config, Arc::new(HttpWebhook::default()))
    }

    pub async fn deliver(&self, record: &DeliveryRecord) -> DeliveryOutcome {
        let url = match &self.destination {
            Destination::Disabled(reason) => {
                debug!("Skipping delivery of {}: {}", record.analysis_id, reason);
                return DeliveryOutcome::Skipped {
                    reason: reason.to_string(),
                };
            }
            Destination::Invalid(reason) => {
                warn!(
                    "Delivery of {} not attempted: {}",
                    record.analysis_id, reason
                );
                return DeliveryOutcome::Failed {
                    reason: reason.clone(),
                };
            }
            Destination::Endpoint(url) => url,
        };

        let body = match serde_json::to_value(record) {
            Ok(body) => body,
            Err(e) => {
                return DeliveryOutcome::Failed {
                    reason: format!("failed to serialize delivery record: {e}"),
                }
            }
        };

        match self.transport.post_json(url, &body, self.timeout).await {
            Ok(status) if (200..300).contains(&status) => {
                info!(
                    "Delivered {} to webhook (status {})",
                    record.analysis_id, status
                );
                DeliveryOutcome::Delivered {
                    http_status: status,
                }
            }
            Ok(status) => {
                warn!(
                    "Webhook rejected {} with status {}",
                    record.analysis_id, status
                );
                DeliveryOutcome::Failed {
                    reason: format!("webhook responded with status {status}"),
                }
            }
            Err(e) => {
                warn!("Webhook delivery of {} failed: {e:#}", record.analysis_id);
                DeliveryOutcome::Failed {
                    reason: format!("webhook request failed: {e:#}"),
                }
            }
        }
    }
}
