//! Scoring service protocol: how `GET /model-info` and `POST /predict` are
//! built for the `Http` capability and how their results are read back. No
//! retries; every call is one attempt with a timeout.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::capabilities::{HttpError, HttpRequest, HttpResult};
use crate::config::ClientConfig;
use crate::model::{ModelInfo, PredictionOutcome, RiskLevel};
use crate::transform::ServiceRequest;

pub const MODEL_INFO_PATH: &str = "/model-info";
pub const PREDICT_PATH: &str = "/predict";

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum NetworkError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("scoring service responded with status {status}")]
    Status { status: u16 },

    #[error("unusable prediction from scoring service: {reason}")]
    InvalidPrediction { reason: String },
}

impl NetworkError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, NetworkError::Http(e) if e.is_timeout())
    }
}

// Wire shape of a successful `/predict` response; other keys are ignored.
#[derive(Debug, Deserialize)]
struct PredictionResponse {
    score: f64,
    probability_bad: f64,
    risk_level: RiskLevel,
}

pub fn model_info_request(config: &ClientConfig) -> Result<HttpRequest, HttpError> {
    HttpRequest::get(&config.endpoint(MODEL_INFO_PATH))?.with_timeout_ms(config.timeout_ms)
}

pub fn predict_request(
    config: &ClientConfig,
    body: &ServiceRequest,
) -> Result<HttpRequest, HttpError> {
    HttpRequest::post(&config.endpoint(PREDICT_PATH))?
        .with_json(body)?
        .with_timeout_ms(config.timeout_ms)
}

/// Model info is optional: any failure, including a payload whose
/// `recall_bad` is not a rate, yields `None` and a warning.
pub fn decode_model_info(result: HttpResult) -> Option<ModelInfo> {
    let response = match result {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            warn!(status = response.status(), "model info unavailable");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "model info unavailable");
            return None;
        }
    };

    match response.json::<ModelInfo>() {
        Ok(info) if info.has_valid_recall() => {
            info!(model_type = %info.model_type, "model info loaded");
            Some(info)
        }
        Ok(info) => {
            warn!(recall_bad = info.recall_bad, "model info rejected: recall outside [0, 1]");
            None
        }
        Err(e) => {
            warn!(error = %e, "model info response could not be decoded");
            None
        }
    }
}

pub fn decode_prediction(result: HttpResult) -> Result<PredictionOutcome, NetworkError> {
    let response = result?;

    if !response.is_success() {
        warn!(
            status = response.status(),
            duration_ms = response.duration_ms(),
            "prediction rejected by scoring service"
        );
        return Err(NetworkError::Status {
            status: response.status(),
        });
    }

    let body: PredictionResponse = response.json()?;
    let outcome = PredictionOutcome::new(body.score, body.probability_bad, body.risk_level)
        .ok_or_else(|| NetworkError::InvalidPrediction {
            reason: format!(
                "score {} / probability {} out of range",
                body.score, body.probability_bad
            ),
        })?;

    info!(
        duration_ms = response.duration_ms(),
        risk_level = ?outcome.risk_level(),
        "prediction received"
    );
    Ok(outcome)
}
