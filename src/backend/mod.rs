use anyhow::{Result, anyhow};
use std::future::Future;
use std::pin::Pin;

use crate::resolver::TranslationRequest;

mod google;

pub use google::GoogleTranslate;

pub type BackendFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

/// Remote service that turns `(text, to, from?)` into translated text. An
/// empty string means the service had nothing to offer for the input.
pub trait TranslationBackend: Clone + Send + Sync {
    fn translate(&self, request: TranslationRequest) -> BackendFuture;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey(String),
    AccessToken(String),
}

/// An explicit key wins; otherwise the environment is consulted, API keys
/// before access tokens.
pub fn resolve_credentials(override_key: Option<&str>) -> Result<Credentials> {
    if let Some(key) = override_key.filter(|key| !key.trim().is_empty()) {
        return Ok(Credentials::ApiKey(key.trim().to_string()));
    }
    if let Some(key) = get_env("GOOGLE_TRANSLATE_API_KEY").or_else(|| get_env("GOOGLE_API_KEY")) {
        return Ok(Credentials::ApiKey(key));
    }
    if let Some(token) = get_env("GOOGLE_TRANSLATE_ACCESS_TOKEN") {
        return Ok(Credentials::AccessToken(token));
    }
    Err(anyhow!(
        "no translation credentials found (checked GOOGLE_TRANSLATE_API_KEY, GOOGLE_API_KEY, GOOGLE_TRANSLATE_ACCESS_TOKEN)"
    ))
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
