use serde::{Deserialize, Serialize};
use std::fmt;

use crate::client::NetworkError;
use crate::config::ClientConfig;
use crate::form::FormField;
use crate::model::{ModelInfo, PredictionOutcome};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(RequestId);

impl RequestId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

// --- Event enum: shell intents first, capability responses last ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Startup
    Configure(ClientConfig),
    ModelInfoRequested,

    // Navigation
    NewPredictionRequested,
    BackRequested,
    ResetRequested,
    DashboardRequested,

    // Form
    FieldChanged { field: FormField, value: String },
    SubmitRequested,

    // Capability responses; never sent by a shell.
    #[serde(skip)]
    ModelInfoLoaded(Option<Box<ModelInfo>>),
    #[serde(skip)]
    PredictionResponse {
        request_id: RequestId,
        result: Box<Result<PredictionOutcome, NetworkError>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_request_ids_are_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn shell_events_deserialize_with_form_names() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "FieldChanged": { "field": "creditAmount", "value": "7500" }
        }))
        .unwrap();
        assert_eq!(
            event,
            Event::FieldChanged {
                field: FormField::CreditAmount,
                value: "7500".into()
            }
        );

        let event: Event = serde_json::from_str("\"SubmitRequested\"").unwrap();
        assert_eq!(event, Event::SubmitRequested);
    }

    #[test]
    fn response_events_cannot_be_forged_by_a_shell() {
        let forged = serde_json::json!({ "ModelInfoLoaded": null });
        assert!(serde_json::from_value::<Event>(forged).is_err());
    }

    #[test]
    fn event_size_is_reasonable() {
        // Ensure boxing keeps the enum small.
        let size = std::mem::size_of::<Event>();
        assert!(
            size <= 64,
            "Event enum is {size} bytes, box the larger variants"
        );
    }
}
