use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::{
    ContextParameters, ContextStore, TRANSLATE_CONTEXT, TRANSLATE_CONTEXT_LIFESPAN,
};
use crate::languages::LanguageMapping;
use crate::messages;

/// The translation slots. Used both for the parameters extracted from the
/// current turn and for the state carried in the conversation context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnParameters {
    #[serde(
        rename = "lang-to",
        default,
        deserialize_with = "non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub destination_language: Option<String>,
    #[serde(
        rename = "lang-from",
        default,
        deserialize_with = "non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_language: Option<String>,
    #[serde(
        default,
        deserialize_with = "non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
}

impl TurnParameters {
    /// Reads the slots from a parameter bag. Unrelated keys are ignored and
    /// non-string or blank values count as absent.
    pub fn from_parameters(parameters: &ContextParameters) -> Self {
        serde_json::from_value(Value::Object(parameters.clone())).unwrap_or_else(|err| {
            warn!("ignoring malformed translation parameters: {}", err);
            TurnParameters::default()
        })
    }

    pub fn to_parameters(&self) -> ContextParameters {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => ContextParameters::new(),
        }
    }

    /// Field-level fallback: each slot missing from `self` is taken from `prior`.
    pub fn merge(self, prior: TurnParameters) -> TurnParameters {
        TurnParameters {
            destination_language: self.destination_language.or(prior.destination_language),
            source_language: self.source_language.or(prior.source_language),
            text: self.text.or(prior.text),
        }
    }
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(value)) if !value.trim().is_empty() => Some(value),
        _ => None,
    })
}

/// A fully validated translation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub to_code: String,
    pub from_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    MissingText,
    MissingDestination,
    UnknownDestination(String),
    UnknownSource(String),
}

impl Prompt {
    pub fn message(&self) -> String {
        match self {
            Prompt::MissingText => messages::ask_for_text(),
            Prompt::MissingDestination => messages::ask_for_destination(),
            Prompt::UnknownDestination(name) | Prompt::UnknownSource(name) => {
                messages::unknown_language(name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Ready(TranslationRequest),
    Prompt(Prompt),
}

#[derive(Debug, Clone, Copy)]
pub struct SlotResolver<'a> {
    mapping: &'a LanguageMapping,
}

impl<'a> SlotResolver<'a> {
    pub fn new(mapping: &'a LanguageMapping) -> Self {
        Self { mapping }
    }

    pub fn resolve<S: ContextStore + ?Sized>(
        &self,
        turn: &TurnParameters,
        store: &mut S,
    ) -> Resolution {
        let prior = store
            .get(TRANSLATE_CONTEXT)
            .map(|parameters| TurnParameters::from_parameters(&parameters))
            .unwrap_or_default();
        let merged = turn.clone().merge(prior);

        // Written before any validation so the next turn can answer a prompt.
        store.set(
            TRANSLATE_CONTEXT,
            TRANSLATE_CONTEXT_LIFESPAN,
            merged.to_parameters(),
        );
        debug!(
            "translation slots: lang-to={:?} lang-from={:?} text={:?}",
            merged.destination_language, merged.source_language, merged.text
        );

        let Some(text) = merged.text else {
            return Resolution::Prompt(Prompt::MissingText);
        };
        let Some(destination) = merged.destination_language else {
            return Resolution::Prompt(Prompt::MissingDestination);
        };

        let Some(to_code) = self.mapping.code_for(&destination) else {
            return Resolution::Prompt(Prompt::UnknownDestination(destination));
        };
        let from_code = match merged.source_language {
            Some(source) => match self.mapping.code_for(&source) {
                Some(code) => Some(code.to_string()),
                None => return Resolution::Prompt(Prompt::UnknownSource(source)),
            },
            None => None,
        };

        Resolution::Ready(TranslationRequest {
            text,
            to_code: to_code.to_string(),
            from_code,
        })
    }
}
