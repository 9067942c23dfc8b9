use anyhow::Result;
use tracing::{error, info, warn};

use crate::backend::TranslationBackend;
use crate::messages;
use crate::resolver::TranslationRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Translated(String),
    Empty,
    Failed(String),
}

impl From<Result<String>> for TranslationOutcome {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) if text.is_empty() => TranslationOutcome::Empty,
            Ok(text) => TranslationOutcome::Translated(text),
            Err(err) => TranslationOutcome::Failed(format!("{:#}", err)),
        }
    }
}

impl TranslationOutcome {
    pub fn message(&self) -> String {
        match self {
            TranslationOutcome::Translated(text) => messages::translated(text),
            TranslationOutcome::Empty => messages::untranslatable(),
            TranslationOutcome::Failed(_) => messages::service_unavailable(),
        }
    }
}

/// Calls the backend for a validated request. Backend failures end here and
/// become a reply; they never reach the caller.
#[derive(Debug, Clone)]
pub struct Translator<B: TranslationBackend> {
    backend: B,
}

impl<B: TranslationBackend> Translator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn outcome(&self, request: &TranslationRequest) -> TranslationOutcome {
        let outcome = TranslationOutcome::from(self.backend.translate(request.clone()).await);
        match &outcome {
            TranslationOutcome::Translated(text) => {
                info!("translated {} chars", text.chars().count())
            }
            TranslationOutcome::Empty => warn!(
                "backend returned no translation (to={}, from={})",
                request.to_code,
                request.from_code.as_deref().unwrap_or("auto")
            ),
            TranslationOutcome::Failed(detail) => error!("translation failed: {}", detail),
        }
        outcome
    }

    pub async fn translate(&self, request: &TranslationRequest) -> String {
        self.outcome(request).await.message()
    }
}
