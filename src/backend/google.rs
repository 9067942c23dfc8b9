use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::info;

use super::{BackendFuture, Credentials, TranslationBackend};
use crate::resolver::TranslationRequest;

const DEFAULT_BASE_URL: &str = "https://translation.googleapis.com";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Google Cloud Translation (v2 REST API).
#[derive(Debug, Clone)]
pub struct GoogleTranslate {
    credentials: Credentials,
    project_id: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl GoogleTranslate {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            project_id: None,
            base_url: base_url(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_project_id(mut self, project_id: Option<String>) -> Self {
        self.project_id = project_id.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if !base_url.trim().is_empty() {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/language/translate/v2", self.base_url)
    }
}

impl TranslationBackend for GoogleTranslate {
    fn translate(&self, request: TranslationRequest) -> BackendFuture {
        let backend = self.clone();
        Box::pin(async move { call_translate(backend, request).await })
    }
}

fn base_url() -> String {
    std::env::var("GOOGLE_TRANSLATE_BASE_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

fn request_body(request: &TranslationRequest) -> serde_json::Value {
    let mut body = json!({
        "q": request.text,
        "target": request.to_code,
        "format": "text"
    });
    if let Some(from) = request.from_code.as_deref() {
        body["source"] = json!(from);
    }
    body
}

async fn call_translate(backend: GoogleTranslate, request: TranslationRequest) -> Result<String> {
    let client = reqwest::Client::builder().timeout(backend.timeout);
    #[cfg(test)]
    let client = client.no_proxy();
    let client = client
        .build()
        .with_context(|| "failed to build HTTP client")?;

    let mut builder = client.post(backend.endpoint()).json(&request_body(&request));
    builder = match &backend.credentials {
        Credentials::ApiKey(key) => builder.query(&[("key", key.as_str())]),
        Credentials::AccessToken(token) => builder.bearer_auth(token),
    };
    if let Some(project_id) = backend.project_id.as_deref() {
        builder = builder.header("x-goog-user-project", project_id);
    }

    info!(
        "translate: to={} from={}",
        request.to_code,
        request.from_code.as_deref().unwrap_or("auto")
    );
    let response = builder
        .send()
        .await
        .with_context(|| "translation request failed")?;
    let status = response.status();
    let text = response
        .text()
        .await
        .with_context(|| "failed to read translation response")?;
    if status.is_success() {
        return extract_translation(&text);
    }
    Err(anyhow!(
        "Google Translate API error ({}): {}",
        status,
        extract_google_error(&text).unwrap_or(text)
    ))
}

/// The first translation in the payload, or an empty string when there is none.
fn extract_translation(text: &str) -> Result<String> {
    let payload: TranslateResponse = serde_json::from_str(text)
        .with_context(|| "failed to parse Google Translate response JSON")?;
    Ok(payload
        .data
        .and_then(|data| data.translations.into_iter().next())
        .and_then(|translation| translation.translated_text)
        .unwrap_or_default())
}

fn extract_google_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<GoogleError>,
    }

    #[derive(Deserialize)]
    struct GoogleError {
        message: Option<String>,
        status: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let error = parsed.error?;
    let mut parts = Vec::new();
    if let Some(message) = error.message.filter(|value| !value.trim().is_empty()) {
        parts.push(message);
    }
    if let Some(status) = error.status.filter(|value| !value.trim().is_empty()) {
        parts.push(format!("status: {}", status));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: Option<TranslateData>,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: Option<String>,
}
