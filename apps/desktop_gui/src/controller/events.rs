//! Events sent from the backend worker back to the UI.

use client_core::SubmitError;
use serde_json::Value;

pub enum UiEvent {
    Info(String),
    SubmitFinished(Result<Value, SubmitError>),
    HealthChecked(Result<String, String>),
    WorkerFailed(String),
}
