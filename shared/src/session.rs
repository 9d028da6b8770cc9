//! Rust shell for the core: feeds events to a `crux_core::Core`, carries out
//! the `Http` effects it asks for through an [`HttpTransport`], and publishes
//! a fresh `ViewModel` on every render.

use std::collections::VecDeque;
use std::sync::Arc;

use crux_core::Core;
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::capabilities::{CapabilityError, HttpTransport, ReqwestTransport};
use crate::config::{ClientConfig, ConfigError};
use crate::{App, Capabilities, Effect, Event, FormField, ViewModel};

pub struct Session {
    core: Core<Effect, App>,
    transport: Arc<dyn HttpTransport>,
    render: watch::Sender<ViewModel>,
}

impl Session {
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, ConfigError> {
        config.validate()?;

        let core: Core<Effect, App> = Core::new::<Capabilities>();
        // Configuring neither renders nor calls out.
        let _ = core.process_event(Event::Configure(config));
        let (render, _) = watch::channel(core.view());

        Ok(Self {
            core,
            transport,
            render,
        })
    }

    /// Session over the production reqwest transport.
    pub fn connect(config: ClientConfig) -> Result<Self, CapabilityError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::new(config, Arc::new(transport))?)
    }

    /// Fetches model info once. Failure leaves the dashboard pending.
    #[instrument(skip(self))]
    pub async fn start(&self) {
        self.dispatch(Event::ModelInfoRequested).await;
    }

    /// Applies `event` and everything it causes, returning once the calls
    /// it started have been answered.
    pub async fn dispatch(&self, event: Event) {
        let mut effects: VecDeque<Effect> = self.core.process_event(event).into();

        while let Some(effect) = effects.pop_front() {
            match effect {
                Effect::Render(_) => {
                    self.render.send_replace(self.core.view());
                }
                Effect::Http(mut request) => {
                    debug!(
                        method = request.operation.method().as_str(),
                        url = request.operation.url(),
                        trace_id = request.operation.trace_id(),
                        "calling scoring service"
                    );
                    let result = self.transport.execute(request.operation.clone()).await;
                    effects.extend(self.core.resolve(&mut request, result));
                }
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn submit(&self) {
        self.dispatch(Event::SubmitRequested).await;
    }

    #[instrument(skip(self, value))]
    pub async fn update_field(&self, field: FormField, value: impl Into<String>) {
        self.dispatch(Event::FieldChanged {
            field,
            value: value.into(),
        })
        .await;
    }

    pub async fn new_prediction(&self) {
        self.dispatch(Event::NewPredictionRequested).await;
    }

    pub async fn back(&self) {
        self.dispatch(Event::BackRequested).await;
    }

    pub async fn reset(&self) {
        self.dispatch(Event::ResetRequested).await;
    }

    pub async fn dashboard(&self) {
        self.dispatch(Event::DashboardRequested).await;
    }

    pub fn view(&self) -> ViewModel {
        self.core.view()
    }

    /// Receives a fresh `ViewModel` after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.render.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::testing::ScriptedTransport;
    use crate::capabilities::{HttpRequest, HttpResponse, HttpResult};
    use crate::model::{Page, RiskLevel};
    use crate::{ModelInfoView, ViewState, NETWORK_ERROR_MESSAGE};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn session(transport: ScriptedTransport) -> Session {
        Session::new(ClientConfig::default(), Arc::new(transport)).unwrap()
    }

    fn model_info() -> serde_json::Value {
        json!({
            "model_type": "Random Forest",
            "training_dataset": "German Credit Dataset (UCI)",
            "validation_strategy": "Train-test split (70-30)",
            "recall_bad": 0.82
        })
    }

    /// Holds every call until released and counts how many arrived.
    #[derive(Default)]
    struct GatedTransport {
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl HttpTransport for GatedTransport {
        async fn execute(&self, _request: HttpRequest) -> HttpResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            let body = json!({"score": 720, "probability_bad": 0.18, "risk_level": "Good"});
            Ok(HttpResponse::new(200, serde_json::to_vec(&body).unwrap()))
        }
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let result = Session::new(ClientConfig::new("ftp://x"), Arc::new(ScriptedTransport::new()));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn initial_view_is_dashboard() {
        let session = session(ScriptedTransport::new());
        let rx = session.subscribe();
        assert!(matches!(rx.borrow().state, ViewState::Dashboard { .. }));
    }

    #[tokio::test]
    async fn start_tolerates_unreachable_service() {
        let session = session(ScriptedTransport::new());
        session.start().await;

        let view = session.view();
        assert_eq!(view.page, Page::Dashboard);
        let ViewState::Dashboard { model_info, .. } = view.state else {
            panic!("expected dashboard");
        };
        assert_eq!(model_info, ModelInfoView::Pending);
    }

    #[tokio::test]
    async fn full_round_trip_through_scripted_transport() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply_json(200, &model_info())
                .reply_json(
                    200,
                    &json!({"score": 512, "probability_bad": 0.61, "risk_level": "Bad"}),
                ),
        );
        let session = Session::new(ClientConfig::default(), transport.clone()).unwrap();
        let mut rx = session.subscribe();

        session.start().await;
        session.new_prediction().await;
        session.update_field(FormField::Age, "41").await;
        session.submit().await;

        let view = session.view();
        assert_eq!(view.page, Page::Result);
        assert!(matches!(
            view.state,
            ViewState::Result { risk_level: RiskLevel::Bad, probability_percent: 61, .. }
        ));

        assert!(rx.has_changed().unwrap());
        assert!(matches!(rx.borrow_and_update().state, ViewState::Result { .. }));

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        let body: serde_json::Value = serde_json::from_slice(sent[1].body().unwrap()).unwrap();
        assert_eq!(body["age"], 41);
    }

    #[tokio::test]
    async fn failed_call_leaves_a_retryable_error() {
        let session = session(ScriptedTransport::new().reply_status(500));
        session.new_prediction().await;
        session.submit().await;

        let view = session.view();
        assert_eq!(view.page, Page::Predict);
        assert!(!view.is_loading);
        let ViewState::Predict { error, submit_enabled, .. } = view.state else {
            panic!("expected predict view");
        };
        assert_eq!(error.as_deref(), Some(NETWORK_ERROR_MESSAGE));
        assert!(submit_enabled);
    }

    #[tokio::test]
    async fn second_submit_while_loading_is_ignored() {
        let transport = Arc::new(GatedTransport::default());
        let session =
            Arc::new(Session::new(ClientConfig::default(), transport.clone()).unwrap());
        session.new_prediction().await;

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.submit().await }
        });
        transport.entered.notified().await;
        assert!(session.view().is_loading);

        session.submit().await;
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        transport.release.notify_one();
        first.await.unwrap();

        assert_eq!(session.view().page, Page::Result);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn response_after_leaving_predict_is_discarded() {
        let transport = Arc::new(GatedTransport::default());
        let session =
            Arc::new(Session::new(ClientConfig::default(), transport.clone()).unwrap());
        session.new_prediction().await;

        let pending = tokio::spawn({
            let session = session.clone();
            async move { session.submit().await }
        });
        transport.entered.notified().await;

        session.back().await;
        let view = session.view();
        assert_eq!(view.page, Page::Dashboard);
        assert!(!view.is_loading);

        transport.release.notify_one();
        pending.await.unwrap();

        let view = session.view();
        assert_eq!(view.page, Page::Dashboard);
        assert!(matches!(view.state, ViewState::Dashboard { .. }));
    }
}
