use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde_json::Value;
use shared::{
    error::ServiceErrorBody,
    protocol::{health_route, HealthResponse, IMAGE_FIELD, TEXT_FIELD},
};
use thiserror::Error;
use url::Url;

pub mod config;
pub mod form;

pub use reqwest::StatusCode;

pub use config::{load_settings, Settings};
pub use form::{
    FormController, SubmitPhase, DEFAULT_PLACEHOLDER, GENERIC_FAILURE_MESSAGE, IMAGE_PLACEHOLDER,
    NO_INPUT_MESSAGE,
};

/// Image attached to the form, held in memory until submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads an image from disk, guessing its MIME type from the extension.
    ///
    /// Files that do not guess to an `image/*` type are refused.
    pub fn load(path: &Path) -> Result<Self> {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(anyhow!(
                "'{}' is not an image file (detected {mime})",
                path.display()
            ));
        }

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read image '{}'", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            filename,
            mime_type: mime.essence_str().to_string(),
            bytes,
        })
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// The single multipart part sent for one submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Image(SelectedFile),
    Text(String),
}

impl Submission {
    /// Picks what to send: the file when present, else non-empty text.
    pub fn from_inputs(file: Option<&SelectedFile>, text: &str) -> Option<Self> {
        if let Some(file) = file {
            Some(Self::Image(file.clone()))
        } else if !text.is_empty() {
            Some(Self::Text(text.to_string()))
        } else {
            None
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Image(_) => IMAGE_FIELD,
            Self::Text(_) => TEXT_FIELD,
        }
    }

    pub fn payload_len(&self) -> usize {
        match self {
            Self::Image(file) => file.size_bytes(),
            Self::Text(text) => text.len(),
        }
    }

    fn into_form(self) -> Result<multipart::Form, SubmitError> {
        match self {
            Self::Image(file) => {
                let part = multipart::Part::bytes(file.bytes)
                    .file_name(file.filename)
                    .mime_str(&file.mime_type)?;
                Ok(multipart::Form::new().part(IMAGE_FIELD, part))
            }
            Self::Text(text) => Ok(multipart::Form::new().text(TEXT_FIELD, text)),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no image or text to submit")]
    MissingInput,
    #[error("OCR service rejected the request with status {status}")]
    Rejected {
        status: StatusCode,
        message: Option<String>,
        details: Option<String>,
    },
    #[error("request to OCR service failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SubmitError {
    /// Text shown in the form's error panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingInput => NO_INPUT_MESSAGE.to_string(),
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Anything that can take a submission and hand back the service reply.
#[async_trait]
pub trait OcrService: Send + Sync {
    async fn submit(&self, submission: Submission) -> Result<Value, SubmitError>;
}

#[derive(Debug, Clone)]
pub struct OcrClient {
    http: Client,
    endpoint: Url,
}

impl OcrClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let endpoint = settings.endpoint_url()?;
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build HTTP client")?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `/health` on the same origin as the submit endpoint.
    pub fn health_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.set_path(health_route());
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let res = self
            .http
            .get(self.health_url())
            .send()
            .await?
            .error_for_status()?;
        let body: HealthResponse = res
            .json()
            .await
            .context("malformed health response from OCR service")?;
        Ok(body)
    }
}

#[async_trait]
impl OcrService for OcrClient {
    async fn submit(&self, submission: Submission) -> Result<Value, SubmitError> {
        tracing::info!(
            field = submission.field_name(),
            payload_bytes = submission.payload_len(),
            endpoint = %self.endpoint,
            "submitting to OCR service"
        );

        let form = submission.into_form()?;
        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(%status, body_bytes = body.len(), "OCR service responded");

        if !status.is_success() {
            let parsed = ServiceErrorBody::from_slice(&body).unwrap_or_default();
            if let Some(details) = parsed.details.as_deref() {
                tracing::warn!(%status, details, "OCR service reported failure details");
            }
            return Err(SubmitError::Rejected {
                status,
                message: parsed.message().map(str::to_owned),
                details: parsed.details,
            });
        }

        Ok(decode_success_body(&body))
    }
}

/// A success body that is not JSON is kept as a JSON string.
pub fn decode_success_body(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Two-space indented rendering, keys in received order.
pub fn pretty_print(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
