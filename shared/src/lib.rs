#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capabilities;
pub mod client;
pub mod config;
pub mod event;
pub mod form;
pub mod model;
pub mod navigation;
pub mod session;
pub mod transform;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use client::NetworkError;
pub use config::{ClientConfig, ConfigError};
pub use event::{Event, RequestId};
pub use form::{FormData, FormField};
pub use model::{Decision, Model, ModelInfo, Page, PredictionOutcome, RiskLevel};
pub use navigation::{NavigationError, NavigationTrigger};
pub use session::Session;
pub use transform::{to_request, ServiceRequest, ValidationError};

pub const NETWORK_ERROR_MESSAGE: &str =
    "Failed to connect to the backend. Please make sure the API is running.";
pub const VALIDATION_ERROR_MESSAGE: &str =
    "Some numeric fields are not valid numbers. Please correct them and try again.";

pub const SUBMIT_LABEL: &str = "Generate Score";
pub const SUBMIT_LABEL_LOADING: &str = "Processing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Validation,
    InvalidState,
    Config,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Validation => "VALIDATION_ERROR",
            Self::InvalidState => "INVALID_STATE",
            Self::Config => "CONFIG_ERROR",
        }
    }

    /// Whether the user can sensibly try the same action again. Nothing in
    /// the core retries on its own.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Timeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Text stored in `Model::error`. Never names the failing field or leaks
    /// transport detail.
    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network | ErrorKind::Timeout => NETWORK_ERROR_MESSAGE.into(),
            ErrorKind::Validation => VALIDATION_ERROR_MESSAGE.into(),
            ErrorKind::InvalidState | ErrorKind::Config => self.message.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::new(ErrorKind::Validation, VALIDATION_ERROR_MESSAGE).with_internal(e.to_string())
    }
}

impl From<NetworkError> for AppError {
    fn from(e: NetworkError) -> Self {
        let kind = if e.is_timeout() {
            ErrorKind::Timeout
        } else {
            ErrorKind::Network
        };
        AppError::new(kind, NETWORK_ERROR_MESSAGE).with_internal(e.to_string())
    }
}

impl From<NavigationError> for AppError {
    fn from(e: NavigationError) -> Self {
        AppError::new(ErrorKind::InvalidState, "That page is not available right now.")
            .with_internal(e.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Config, e.to_string())
    }
}

// --- ViewModel ---

/// Fixed figures shown on the dashboard; not derived from any service call.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_requests: u32,
    pub approval_rate_percent: u8,
    pub risk_detected_percent: u8,
    pub recall_percent: u8,
}

impl Default for DashboardStats {
    fn default() -> Self {
        Self {
            total_requests: 1000,
            approval_rate_percent: 70,
            risk_detected_percent: 30,
            recall_percent: 82,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelInfoView {
    Pending,
    Available {
        model_type: String,
        training_dataset: String,
        validation_strategy: String,
        recall_percent: i64,
    },
}

impl From<Option<&ModelInfo>> for ModelInfoView {
    #[allow(clippy::cast_possible_truncation)]
    fn from(info: Option<&ModelInfo>) -> Self {
        match info {
            None => Self::Pending,
            Some(info) => Self::Available {
                model_type: info.model_type.clone(),
                training_dataset: info.training_dataset.clone(),
                validation_strategy: info.validation_strategy.clone(),
                recall_percent: (info.recall_bad * 100.0).round() as i64,
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionView {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldView {
    pub name: FormField,
    pub label: String,
    pub value: String,
    pub options: Option<Vec<OptionView>>,
}

impl FieldView {
    fn build(field: FormField, value: &str) -> Self {
        Self {
            name: field,
            label: field.label().to_string(),
            value: value.to_string(),
            options: field.options().map(|options| {
                options
                    .iter()
                    .map(|(value, label)| OptionView {
                        value: (*value).to_string(),
                        label: (*label).to_string(),
                    })
                    .collect()
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewState {
    Dashboard {
        stats: DashboardStats,
        model_info: ModelInfoView,
    },
    Predict {
        fields: Vec<FieldView>,
        submit_enabled: bool,
        submit_label: String,
        error: Option<String>,
    },
    Result {
        decision: Decision,
        score: f64,
        probability_percent: i64,
        risk_level: RiskLevel,
    },
}

/// The single header button. Its label is `New Prediction` on the dashboard
/// and `Dashboard` everywhere else.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HeaderAction {
    NewPrediction,
    Back,
    Dashboard,
}

impl HeaderAction {
    pub const fn for_page(page: Page) -> Self {
        match page {
            Page::Dashboard => Self::NewPrediction,
            Page::Predict => Self::Back,
            Page::Result => Self::Dashboard,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NewPrediction => "New Prediction",
            Self::Back | Self::Dashboard => "Dashboard",
        }
    }

    pub fn event(self) -> Event {
        match self {
            Self::NewPrediction => Event::NewPredictionRequested,
            Self::Back => Event::BackRequested,
            Self::Dashboard => Event::DashboardRequested,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub page: Page,
    pub state: ViewState,
    pub header_action: HeaderAction,
    pub is_loading: bool,
}

pub mod app {
    use tracing::{debug, info, warn};

    use super::*;
    use crate::client::{decode_model_info, decode_prediction, model_info_request, predict_request};
    use crate::navigation::navigate;

    #[derive(Default)]
    pub struct App;

    impl App {
        fn go(model: &mut Model, trigger: NavigationTrigger, caps: &Capabilities) {
            let from = model.page;
            match navigate(model, trigger) {
                Ok(to) => {
                    info!(?from, ?to, ?trigger, "page changed");
                    caps.render.render();
                }
                Err(e) => debug!(?from, ?trigger, error = %e, "navigation ignored"),
            }
        }

        /// An invalid config is logged and dropped; the previous one stays.
        fn configure(model: &mut Model, config: ClientConfig) {
            match config.validate() {
                Ok(()) => {
                    info!(
                        origin = config.origin(),
                        timeout_ms = config.timeout_ms,
                        "scoring service configured"
                    );
                    model.config = config;
                }
                Err(e) => warn!(
                    error = %AppError::from(e),
                    kept = model.config.origin(),
                    "configuration rejected"
                ),
            }
        }

        fn fetch_model_info(model: &Model, caps: &Capabilities) {
            match model_info_request(&model.config) {
                Ok(request) => caps.http.execute(request, |result| {
                    Event::ModelInfoLoaded(decode_model_info(result).map(Box::new))
                }),
                Err(e) => warn!(
                    origin = model.config.origin(),
                    error = %e,
                    "model info request could not be built"
                ),
            }
        }

        fn submit(model: &mut Model, caps: &Capabilities) {
            if model.loading || model.page != Page::Predict {
                debug!(
                    loading = model.loading,
                    page = ?model.page,
                    "submit ignored"
                );
                return;
            }

            model.loading = true;
            model.error = None;

            let call = to_request(&model.form)
                .map_err(AppError::from)
                .and_then(|body| {
                    predict_request(&model.config, &body)
                        .map_err(|e| AppError::from(NetworkError::from(e)))
                });

            match call {
                Ok(request) => {
                    let request_id = RequestId::generate();
                    info!(request_id = %request_id, "prediction submitted");
                    model.in_flight = Some(request_id.clone());
                    caps.render.render();
                    caps.http.execute(request, move |result| Event::PredictionResponse {
                        request_id,
                        result: Box::new(decode_prediction(result)),
                    });
                }
                Err(error) => {
                    debug!(error = %error, "submission rejected locally");
                    model.loading = false;
                    model.error = Some(error.user_facing_message());
                    caps.render.render();
                }
            }
        }

        fn complete(
            model: &mut Model,
            request_id: &RequestId,
            result: Result<PredictionOutcome, NetworkError>,
            caps: &Capabilities,
        ) {
            if model.in_flight.as_ref() != Some(request_id) {
                debug!(request_id = %request_id, "stale prediction response discarded");
                return;
            }

            model.in_flight = None;
            model.loading = false;

            match result {
                Ok(outcome) => {
                    model.prediction = Some(outcome);
                    if let Err(e) = navigate(model, NavigationTrigger::SubmissionSucceeded) {
                        warn!(error = %e, "prediction arrived outside the predict page");
                        model.error = Some(AppError::from(e).user_facing_message());
                    }
                }
                Err(e) => {
                    let error = AppError::from(e);
                    warn!(request_id = %request_id, error = %error, "prediction failed");
                    model.error = Some(error.user_facing_message());
                }
            }
            caps.render.render();
        }

        fn predict_view(model: &Model) -> ViewState {
            ViewState::Predict {
                fields: model
                    .form
                    .iter()
                    .map(|(field, value)| FieldView::build(field, value))
                    .collect(),
                submit_enabled: !model.loading,
                submit_label: if model.loading {
                    SUBMIT_LABEL_LOADING
                } else {
                    SUBMIT_LABEL
                }
                .to_string(),
                error: model.error.clone(),
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            match event {
                Event::Configure(config) => Self::configure(model, config),
                Event::ModelInfoRequested => Self::fetch_model_info(model, caps),

                Event::ModelInfoLoaded(info) => {
                    if info.is_none() {
                        debug!("model info not available");
                    }
                    model.model_info = info.map(|boxed| *boxed);
                    caps.render.render();
                }

                Event::NewPredictionRequested => {
                    Self::go(model, NavigationTrigger::NewPrediction, caps);
                }
                Event::BackRequested => Self::go(model, NavigationTrigger::Back, caps),
                Event::ResetRequested => Self::go(model, NavigationTrigger::Reset, caps),
                Event::DashboardRequested => Self::go(model, NavigationTrigger::Dashboard, caps),

                Event::FieldChanged { field, value } => {
                    model.form = model.form.update(field, value);
                    caps.render.render();
                }

                Event::SubmitRequested => Self::submit(model, caps),

                Event::PredictionResponse { request_id, result } => {
                    Self::complete(model, &request_id, *result, caps);
                }
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        fn view(&self, model: &Model) -> ViewModel {
            let state = match model.page {
                Page::Dashboard => ViewState::Dashboard {
                    stats: DashboardStats::default(),
                    model_info: ModelInfoView::from(model.model_info.as_ref()),
                },

                Page::Predict => Self::predict_view(model),

                Page::Result => match &model.prediction {
                    Some(outcome) => ViewState::Result {
                        decision: outcome.risk_level().decision(),
                        score: outcome.score(),
                        probability_percent: (outcome.probability() * 100.0).round() as i64,
                        risk_level: outcome.risk_level(),
                    },
                    None => Self::predict_view(model),
                },
            };

            ViewModel {
                page: model.page,
                state,
                header_action: HeaderAction::for_page(model.page),
                is_loading: model.loading,
            }
        }
    }
}
