//! Page state machine.
//!
//! | From      | Trigger             | To        |
//! |-----------|---------------------|-----------|
//! | dashboard | NewPrediction       | predict   |
//! | predict   | SubmissionSucceeded | result    |
//! | predict   | Back                | dashboard |
//! | result    | Reset               | predict   |
//! | result    | Dashboard           | dashboard |
//!
//! `result` is never entered without a prediction outcome.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Model, Page};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationTrigger {
    NewPrediction,
    SubmissionSucceeded,
    Back,
    Reset,
    Dashboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("{trigger:?} is not allowed from {from:?}")]
    InvalidTransition {
        from: Page,
        trigger: NavigationTrigger,
    },

    #[error("the result page requires a prediction outcome")]
    MissingOutcome,
}

pub fn next_page(
    from: Page,
    trigger: NavigationTrigger,
    has_outcome: bool,
) -> Result<Page, NavigationError> {
    use NavigationTrigger as T;

    match (from, trigger) {
        (Page::Dashboard, T::NewPrediction) | (Page::Result, T::Reset) => Ok(Page::Predict),
        (Page::Predict, T::SubmissionSucceeded) if has_outcome => Ok(Page::Result),
        (Page::Predict, T::SubmissionSucceeded) => Err(NavigationError::MissingOutcome),
        (Page::Predict, T::Back) | (Page::Result, T::Dashboard) => Ok(Page::Dashboard),
        (from, trigger) => Err(NavigationError::InvalidTransition { from, trigger }),
    }
}

/// Applies a transition to the session state. Entering the dashboard drops
/// the last outcome and forgets any submission still in flight; the form is
/// never touched.
pub fn navigate(model: &mut Model, trigger: NavigationTrigger) -> Result<Page, NavigationError> {
    let to = next_page(model.page, trigger, model.prediction.is_some())?;

    match to {
        Page::Dashboard => {
            model.prediction = None;
            model.in_flight = None;
            model.loading = false;
            model.error = None;
        }
        Page::Predict => model.error = None,
        Page::Result => {}
    }

    model.page = to;
    Ok(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormData, FormField};
    use crate::model::{PredictionOutcome, RiskLevel};

    const ALL_PAGES: [Page; 3] = [Page::Dashboard, Page::Predict, Page::Result];
    const ALL_TRIGGERS: [NavigationTrigger; 5] = [
        NavigationTrigger::NewPrediction,
        NavigationTrigger::SubmissionSucceeded,
        NavigationTrigger::Back,
        NavigationTrigger::Reset,
        NavigationTrigger::Dashboard,
    ];

    fn on_result() -> Model {
        Model {
            page: Page::Result,
            form: FormData::default().update(FormField::Age, "52"),
            prediction: PredictionOutcome::new(640.0, 0.38, RiskLevel::Bad),
            ..Model::default()
        }
    }

    #[test]
    fn transition_table() {
        use NavigationTrigger as T;
        assert_eq!(next_page(Page::Dashboard, T::NewPrediction, false), Ok(Page::Predict));
        assert_eq!(next_page(Page::Predict, T::SubmissionSucceeded, true), Ok(Page::Result));
        assert_eq!(next_page(Page::Predict, T::Back, false), Ok(Page::Dashboard));
        assert_eq!(next_page(Page::Result, T::Reset, true), Ok(Page::Predict));
        assert_eq!(next_page(Page::Result, T::Dashboard, true), Ok(Page::Dashboard));
    }

    #[test]
    fn result_is_unreachable_without_outcome() {
        for from in ALL_PAGES {
            for trigger in ALL_TRIGGERS {
                if let Ok(to) = next_page(from, trigger, false) {
                    assert_ne!(to, Page::Result, "{from:?} --{trigger:?}--> result");
                }
            }
        }
        assert_eq!(
            next_page(Page::Predict, NavigationTrigger::SubmissionSucceeded, false),
            Err(NavigationError::MissingOutcome)
        );
    }

    #[test]
    fn undefined_pairs_are_rejected_and_leave_page_alone() {
        let mut model = Model::default();
        let err = navigate(&mut model, NavigationTrigger::Reset).unwrap_err();
        assert!(matches!(err, NavigationError::InvalidTransition { .. }));
        assert_eq!(model.page, Page::Dashboard);

        let mut model = on_result();
        assert!(navigate(&mut model, NavigationTrigger::NewPrediction).is_err());
        assert_eq!(model.page, Page::Result);
    }

    #[test]
    fn reset_keeps_form_intact() {
        let mut model = on_result();
        let form_before = model.form.clone();

        assert_eq!(navigate(&mut model, NavigationTrigger::Reset), Ok(Page::Predict));
        assert_eq!(model.form, form_before);
        assert_eq!(model.form.get(FormField::Age), "52");
    }

    #[test]
    fn dashboard_discards_outcome() {
        let mut model = on_result();
        assert_eq!(navigate(&mut model, NavigationTrigger::Dashboard), Ok(Page::Dashboard));
        assert!(model.prediction.is_none());
        assert_eq!(model.form.get(FormField::Age), "52");
    }

    #[test]
    fn back_abandons_in_flight_submission() {
        let mut model = Model {
            page: Page::Predict,
            loading: true,
            in_flight: Some(crate::event::RequestId::new("req-1")),
            ..Model::default()
        };
        assert_eq!(navigate(&mut model, NavigationTrigger::Back), Ok(Page::Dashboard));
        assert!(!model.loading);
        assert!(model.in_flight.is_none());
    }
}
