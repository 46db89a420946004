//! Form state for the receipt/transaction submit flow.

use serde_json::Value;

use crate::{pretty_print, OcrService, SelectedFile, SubmitError, Submission};

pub const DEFAULT_PLACEHOLDER: &str = "Enter unformatted transaction record here.";
pub const IMAGE_PLACEHOLDER: &str = "And you can add some description for your image.";
pub const NO_INPUT_MESSAGE: &str = "Please upload an image or enter unformatted text.";
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while processing your request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
}

/// Owns everything the form shows.
///
/// At most one of `response` and `error` is set at any time.
#[derive(Debug, Clone)]
pub struct FormController {
    selected_file: Option<SelectedFile>,
    unformatted_text: String,
    placeholder: &'static str,
    response: Option<String>,
    error: Option<String>,
    phase: SubmitPhase,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        Self {
            selected_file: None,
            unformatted_text: String::new(),
            placeholder: DEFAULT_PLACEHOLDER,
            response: None,
            error: None,
            phase: SubmitPhase::Idle,
        }
    }

    /// Replaces the attachment. `None` behaves like an emptied file input.
    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        self.placeholder = if file.is_some() {
            IMAGE_PLACEHOLDER
        } else {
            DEFAULT_PLACEHOLDER
        };
        self.selected_file = file;
    }

    pub fn discard_file(&mut self) {
        self.selected_file = None;
        self.placeholder = DEFAULT_PLACEHOLDER;
    }

    pub fn edit_text(&mut self, value: impl Into<String>) {
        self.unformatted_text = value.into();
    }

    /// Validates the inputs and moves to `Submitting`.
    ///
    /// Returns the part to send, or `None` when nothing should go out: either
    /// a request is already in flight, or there is no input (in which case
    /// the validation message is set).
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.phase == SubmitPhase::Submitting {
            tracing::debug!("submit ignored; a request is already in flight");
            return None;
        }

        match Submission::from_inputs(self.selected_file.as_ref(), &self.unformatted_text) {
            Some(submission) => {
                self.phase = SubmitPhase::Submitting;
                Some(submission)
            }
            None => {
                self.show_error(SubmitError::MissingInput.user_message());
                None
            }
        }
    }

    pub fn complete_submit(&mut self, outcome: Result<Value, SubmitError>) {
        self.phase = SubmitPhase::Idle;
        match outcome {
            Ok(body) => {
                self.response = Some(pretty_print(&body));
                self.error = None;
            }
            Err(err) => {
                tracing::debug!(error = %err, "submit failed");
                self.show_error(err.user_message());
            }
        }
    }

    /// Returns to `Idle` when a begun submit never reached the service.
    pub fn cancel_submit(&mut self) {
        self.phase = SubmitPhase::Idle;
    }

    pub async fn submit<S>(&mut self, service: &S)
    where
        S: OcrService + ?Sized,
    {
        let Some(submission) = self.begin_submit() else {
            return;
        };
        let outcome = service.submit(submission).await;
        self.complete_submit(outcome);
    }

    fn show_error(&mut self, message: String) {
        self.error = Some(message);
        self.response = None;
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn has_file(&self) -> bool {
        self.selected_file.is_some()
    }

    pub fn unformatted_text(&self) -> &str {
        &self.unformatted_text
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
