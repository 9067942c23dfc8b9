use anyhow::Result;
use std::path::Path;

pub mod backend;
pub mod chat;
pub mod context;
pub mod fulfillment;
pub mod languages;
pub mod logging;
pub mod messages;
pub mod resolver;
pub mod server;
pub mod settings;
mod test_util;
mod translator;

pub use backend::{Credentials, GoogleTranslate, TranslationBackend};
pub use context::{ContextStore, SessionContexts};
pub use fulfillment::{Fulfillment, UnsupportedAction};
pub use languages::LanguageMapping;
pub use resolver::{Prompt, Resolution, SlotResolver, TranslationRequest, TurnParameters};
pub use translator::{TranslationOutcome, Translator};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub key: Option<String>,
    pub settings_path: Option<String>,
}

/// Loads settings and the language list. Separate from the backend so the
/// offline commands work without credentials.
pub fn load_environment(config: &Config) -> Result<(settings::Settings, LanguageMapping)> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;
    let mapping = LanguageMapping::load()?.with_aliases(&settings.language_aliases);
    Ok((settings, mapping))
}

pub fn build_backend(config: &Config, settings: &settings::Settings) -> Result<GoogleTranslate> {
    let credentials = backend::resolve_credentials(config.key.as_deref())?;
    let mut backend = GoogleTranslate::new(credentials)
        .with_project_id(settings.project_id.clone())
        .with_timeout(settings.timeout);
    if let Some(base_url) = settings.base_url.as_deref() {
        backend = backend.with_base_url(base_url);
    }
    Ok(backend)
}

pub fn build_fulfillment(config: &Config) -> Result<(settings::Settings, Fulfillment<GoogleTranslate>)> {
    let (settings, mapping) = load_environment(config)?;
    let backend = build_backend(config, &settings)?;
    Ok((settings, Fulfillment::new(mapping, backend)))
}

pub fn format_languages(mapping: &LanguageMapping) -> String {
    mapping
        .entries()
        .into_iter()
        .map(|(name, code)| format!("{}\t{}", name, code))
        .collect::<Vec<_>>()
        .join("\n")
}
