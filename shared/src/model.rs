use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::event::RequestId;
use crate::form::FormData;

#[derive(Default, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Dashboard,
    Predict,
    Result,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskLevel {
    Good,
    Bad,
}

impl RiskLevel {
    pub const fn decision(self) -> Decision {
        match self {
            RiskLevel::Good => Decision::Approved,
            RiskLevel::Bad => Decision::Declined,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Declined,
}

/// Scoring result. Only built from a successful `/predict` response.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PredictionOutcome {
    score: f64,
    probability: f64,
    risk_level: RiskLevel,
}

impl PredictionOutcome {
    /// `None` unless the score is finite and the probability lies in `[0, 1]`.
    pub fn new(score: f64, probability: f64, risk_level: RiskLevel) -> Option<Self> {
        if !score.is_finite() || !(0.0..=1.0).contains(&probability) {
            return None;
        }
        Some(Self {
            score,
            probability,
            risk_level,
        })
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }
}

/// Descriptive metadata about the remote model. Extra keys from the service
/// are ignored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelInfo {
    pub model_type: String,
    pub training_dataset: String,
    pub validation_strategy: String,
    pub recall_bad: f64,
}

impl ModelInfo {
    /// `recall_bad` is a rate; outside `[0, 1]` (or NaN) the payload is unusable.
    pub fn has_valid_recall(&self) -> bool {
        (0.0..=1.0).contains(&self.recall_bad)
    }
}

/// Session state. Mutated only through `App::update` and the navigation
/// machine; everything else reads it through the accessors.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub(crate) page: Page,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
    pub(crate) form: FormData,
    pub(crate) prediction: Option<PredictionOutcome>,
    pub(crate) model_info: Option<ModelInfo>,

    // Submission whose response is still wanted.
    #[serde(skip)]
    pub(crate) in_flight: Option<RequestId>,
    #[serde(skip)]
    pub(crate) config: ClientConfig,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn prediction(&self) -> Option<&PredictionOutcome> {
        self.prediction.as_ref()
    }

    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.model_info.as_ref()
    }

    pub fn in_flight(&self) -> Option<&RequestId> {
        self.in_flight.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
