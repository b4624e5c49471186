use std::fmt;

use serde::Serialize;

use crate::config::DispatchConfig;
use crate::cost::CostProviderError;
use crate::model::DispatchRequest;
use crate::optimizer::{run_optimisation, DispatchError, OverallResult};
use crate::validation::ValidationIssue;

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeResponse {
    pub status: &'static str,
    pub run_id: String,
    pub solved_at: String,
    #[serde(flatten)]
    pub result: OverallResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub code: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderErrorResponse {
    pub status: &'static str,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub enum OptimizePayloadError {
    Parse(serde_json::Error),
    Validation(ValidationErrorResponse),
    CostProvider(CostProviderError),
    /// The result could not be encoded; a server fault, not a bad request.
    Serialize(serde_json::Error),
}

impl fmt::Display for OptimizePayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(_) => write!(f, "invalid optimize request"),
            Self::CostProvider(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize optimize response: {err}"),
        }
    }
}

impl std::error::Error for OptimizePayloadError {}

impl From<DispatchError> for OptimizePayloadError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Validation(validation) => Self::Validation(ValidationErrorResponse {
                status: "error",
                code: "validation_error",
                message: "Validation failed",
                errors: validation.issues,
            }),
            DispatchError::CostProvider(err) => Self::CostProvider(err),
        }
    }
}

pub fn root_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "hello": "world",
        "service": "tiered-dispatch"
    }))
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "tiered-dispatch",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn config_payload(config: &DispatchConfig) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "tiers": config.tiers,
        "categories": config.categories,
        "slack_penalty": config.slack_penalty,
        "tier_time_limit_ms": config.solver.tier_time_limit_ms,
        "cost": config.cost,
    }))
}

pub fn optimize_payload(body: &str, config: &DispatchConfig) -> Result<String, OptimizePayloadError> {
    let request: DispatchRequest =
        serde_json::from_str(body).map_err(OptimizePayloadError::Parse)?;
    let result = run_optimisation(&request, config)?;

    let response = OptimizeResponse {
        status: "ok",
        run_id: uuid::Uuid::new_v4().to_string(),
        solved_at: chrono::Utc::now().to_rfc3339(),
        result,
    };
    serde_json::to_string_pretty(&response).map_err(OptimizePayloadError::Serialize)
}
