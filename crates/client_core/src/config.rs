use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use shared::protocol::extract_and_format_route;
use url::Url;

pub const SETTINGS_FILE: &str = "recurapide.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: format!("http://127.0.0.1:8001{}", extract_and_format_route()),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn endpoint_url(&self) -> Result<Url> {
        let raw = self.endpoint.trim();
        let url = Url::parse(raw).with_context(|| format!("invalid OCR endpoint '{raw}'"))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(anyhow!(
                "unsupported scheme '{other}' in OCR endpoint '{raw}'; expected http or https"
            )),
        }
    }

    /// `None` (or zero) leaves requests without a client-side timeout.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<SettingsFile>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.endpoint {
                    settings.endpoint = v;
                }
                if let Some(v) = file_cfg.request_timeout_secs {
                    settings.request_timeout_secs = Some(v);
                }
            }
            Err(err) => {
                tracing::warn!("ignoring malformed settings file '{}': {err}", path.display());
            }
        }
    }

    apply_env(&mut settings, env);
    settings
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("OCR_ENDPOINT") {
        settings.endpoint = v;
    }
    if let Some(v) = non_empty("APP__OCR_ENDPOINT") {
        settings.endpoint = v;
    }

    if let Some(v) = non_empty("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = Some(parsed),
            Err(_) => tracing::warn!("ignoring non-numeric APP__REQUEST_TIMEOUT_SECS '{v}'"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
