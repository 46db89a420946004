//! Applies backend events to the form state.

use client_core::FormController;

use crate::controller::events::UiEvent;

pub fn apply_ui_event(form: &mut FormController, status: &mut String, event: UiEvent) {
    match event {
        UiEvent::Info(message) => *status = message,
        UiEvent::SubmitFinished(outcome) => {
            *status = match &outcome {
                Ok(_) => "Submission processed".to_string(),
                Err(err) => {
                    tracing::warn!(error = %err, "submission failed");
                    "Submission failed".to_string()
                }
            };
            form.complete_submit(outcome);
        }
        UiEvent::HealthChecked(Ok(service_status)) => {
            *status = format!("OCR service is {service_status}");
        }
        UiEvent::HealthChecked(Err(err)) => {
            *status = format!("OCR service unreachable: {err}");
        }
        UiEvent::WorkerFailed(message) => {
            *status = message;
            form.cancel_submit();
        }
    }
}

#[cfg(test)]
#[path = "../tests/reducer_tests.rs"]
mod tests;
