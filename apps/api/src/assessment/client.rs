//! Schema-Constrained Assessment Client.
//!
//! Asks the reasoning service for an Assessment through a forced tool call, validates the
//! payload against the schema, retries transient transport failures with exponential
//! backoff, and substitutes the heuristic assessment whenever the service cannot produce a
//! valid answer. Callers always receive a valid Assessment.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::assessment::heuristic::{assess_heuristically, ScoringPolicy};
use crate::assessment::prompts::{
    build_assessment_prompt, ASSESSMENT_SYSTEM, ASSESSMENT_TOOL_DESCRIPTION, ASSESSMENT_TOOL_NAME,
};
use crate::assessment::schema::{assessment_schema, validate_assessment, SchemaViolation};
use crate::config::ReasoningConfig;
use crate::llm_client::prompts::structured_system;
use crate::llm_client::{LlmClient, LlmError, ReasoningTransport, StructuredRequest, ToolSpec};
use crate::models::assessment::{Assessment, AssessmentResult, Provenance};
use crate::models::document::ExtractedText;
use crate::models::role::RoleLabel;

/// Exponential backoff between attempts: `base_delay`, then doubling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay slept before the zero-based `attempt` (only meaningful for `attempt >= 1`).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

/// Why the reasoning service's answer was not used.
#[derive(Debug, Error)]
enum AssessmentFailure {
    #[error("reasoning service unavailable after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: LlmError },

    #[error("reasoning service rejected the request: {0}")]
    Rejected(LlmError),

    #[error("reasoning service response violated the assessment schema: {0}")]
    Schema(#[from] SchemaViolation),
}

enum ServiceMode {
    Live(Arc<dyn ReasoningTransport>),
    /// No requests are ever made; the reason is reported as the fallback reason.
    Offline(String),
}

pub struct AssessmentClient {
    mode: ServiceMode,
    retry: RetryPolicy,
    policy: ScoringPolicy,
}

impl AssessmentClient {
    /// Builds the client from configuration. A disabled service or a missing credential
    /// yields an offline client rather than an error.
    pub fn from_config(
        config: &ReasoningConfig,
        policy: ScoringPolicy,
    ) -> Result<Self, LlmError> {
        if !config.enabled {
            return Ok(Self::offline(
                "reasoning service disabled by configuration",
                policy,
            ));
        }
        let Some(api_key) = config.api_key.clone() else {
            return Ok(Self::offline(
                "reasoning service credential not configured",
                policy,
            ));
        };

        let transport = LlmClient::new(config, api_key)?;
        let retry = RetryPolicy {
            max_attempts: config.max_attempts,
            base_delay: config.backoff_base,
        };
        Ok(Self::with_transport(Arc::new(transport), retry, policy))
    }

    pub fn with_transport(
        transport: Arc<dyn ReasoningTransport>,
        retry: RetryPolicy,
        policy: ScoringPolicy,
    ) -> Self {
        Self {
            mode: ServiceMode::Live(transport),
            retry: RetryPolicy {
                max_attempts: retry.max_attempts.max(1),
                ..retry
            },
            policy,
        }
    }

    pub fn offline(reason: impl Into<String>, policy: ScoringPolicy) -> Self {
        Self {
            mode: ServiceMode::Offline(reason.into()),
            retry: RetryPolicy::default(),
            policy,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.mode, ServiceMode::Live(_))
    }

    pub async fn assess(&self, text: &ExtractedText, role: &RoleLabel) -> AssessmentResult {
        let transport = match &self.mode {
            ServiceMode::Live(transport) => transport,
            ServiceMode::Offline(reason) => {
                info!("Assessing for '{role}' heuristically: {reason}");
                return self.fallback(text, role, reason.clone());
            }
        };

        match self.request_assessment(transport.as_ref(), text, role).await {
            Ok(assessment) => {
                info!(
                    "Reasoning service assessed resume for '{}' (ats_score={})",
                    role, assessment.ats_score
                );
                AssessmentResult {
                    assessment,
                    provenance: Provenance::Model,
                    fallback_reason: None,
                }
            }
            Err(failure) => {
                warn!(
                    "Falling back to heuristic assessment for '{role}': {failure}"
                );
                self.fallback(text, role, failure.to_string())
            }
        }
    }

    fn fallback(
        &self,
        text: &ExtractedText,
        role: &RoleLabel,
        reason: String,
    ) -> AssessmentResult {
        AssessmentResult {
            assessment: assess_heuristically(text, role, &self.policy),
            provenance: Provenance::Heuristic,
            fallback_reason: Some(reason),
        }
    }

    /// Retries transient failures only. Any other failure, including a payload that
    /// fails validation, ends the loop immediately.
    async fn request_assessment(
        &self,
        transport: &dyn ReasoningTransport,
        text: &ExtractedText,
        role: &RoleLabel,
    ) -> Result<Assessment, AssessmentFailure> {
        let request = build_request(text, role);
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..self.retry.max_attempts {
            if attempt > 0 {
                let delay = self.retry.delay_before(attempt);
                warn!(
                    "Reasoning call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match transport.send(&request).await {
                Ok(payload) => return Ok(validate_assessment(&payload)?),
                Err(e) if e.is_transient() => {
                    warn!(
                        "Reasoning call attempt {} hit a transient error: {}",
                        attempt + 1,
                        e
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(AssessmentFailure::Rejected(e)),
            }
        }

        Err(AssessmentFailure::Exhausted {
            attempts: self.retry.max_attempts,
            last: last_error.unwrap_or(LlmError::EmptyContent),
        })
    }
}

fn build_request(text: &ExtractedText, role: &RoleLabel) -> StructuredRequest {
    StructuredRequest {
        system: structured_system(ASSESSMENT_SYSTEM),
        prompt: build_assessment_prompt(role.as_str(), text.as_str()),
        tool: ToolSpec {
            name: ASSESSMENT_TOOL_NAME.to_string(),
            description: ASSESSMENT_TOOL_DESCRIPTION.to_string(),
            input_schema: assessment_schema(role),
        },
    }
}
