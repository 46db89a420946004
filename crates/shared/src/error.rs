use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure body returned by the OCR service, `{ "error": ..., "details": ... }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ServiceErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Lenient parse of a failure body.
    ///
    /// Returns `None` unless the body is a JSON object. A non-string `error`
    /// is treated as absent; a non-string `details` is kept as its JSON text.
    pub fn from_slice(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        let object = value.as_object()?;

        let error = object
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let details = object.get("details").and_then(|details| match details {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        });

        Some(Self { error, details })
    }

    /// The server-supplied message, if it is present and non-empty.
    pub fn message(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
