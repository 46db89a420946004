use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Multipart field carrying an uploaded image.
pub const IMAGE_FIELD: &str = "image";
/// Multipart field carrying pasted transaction text.
pub const TEXT_FIELD: &str = "text";

pub fn extract_and_format_route() -> &'static str {
    "/extract-and-format-ocr"
}

pub fn health_route() -> &'static str {
    "/health"
}

/// Reply of the reference OCR service on success.
///
/// Every field is optional: the client renders whatever JSON comes back, so
/// this view is only used where a front end wants one specific part of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ocr_text: Option<String>,
    #[serde(default)]
    pub formatted_data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}
