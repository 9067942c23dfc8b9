use std::fmt;
use tracing::info;

use crate::backend::TranslationBackend;
use crate::context::ContextStore;
use crate::languages::LanguageMapping;
use crate::resolver::{Resolution, SlotResolver, TurnParameters};
use crate::translator::Translator;

pub const TRANSLATE_TEXT_ACTION: &str = "translate.text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedAction(pub String);

impl fmt::Display for UnsupportedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No handler for requested action: {}", self.0)
    }
}

impl std::error::Error for UnsupportedAction {}

/// Entry point for a single conversational turn: picks the handler for the
/// action and collects the messages it queues.
#[derive(Debug, Clone)]
pub struct Fulfillment<B: TranslationBackend> {
    mapping: LanguageMapping,
    translator: Translator<B>,
}

impl<B: TranslationBackend> Fulfillment<B> {
    pub fn new(mapping: LanguageMapping, backend: B) -> Self {
        Self {
            mapping,
            translator: Translator::new(backend),
        }
    }

    pub fn mapping(&self) -> &LanguageMapping {
        &self.mapping
    }

    pub async fn handle<S: ContextStore + Send + ?Sized>(
        &self,
        action: &str,
        parameters: &TurnParameters,
        contexts: &mut S,
    ) -> Result<Vec<String>, UnsupportedAction> {
        let mut replies = Vec::new();
        match action {
            TRANSLATE_TEXT_ACTION => {
                info!("dispatching action {}", action);
                self.translate_text(parameters, contexts, &mut replies)
                    .await;
            }
            _ => return Err(UnsupportedAction(action.to_string())),
        }
        Ok(replies)
    }

    async fn translate_text<S: ContextStore + Send + ?Sized>(
        &self,
        parameters: &TurnParameters,
        contexts: &mut S,
        replies: &mut Vec<String>,
    ) {
        let resolution = SlotResolver::new(&self.mapping).resolve(parameters, contexts);
        let reply = match resolution {
            Resolution::Prompt(prompt) => prompt.message(),
            Resolution::Ready(request) => self.translator.translate(&request).await,
        };
        replies.push(reply);
    }
}
