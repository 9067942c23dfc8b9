use serde::{Deserialize, Serialize};

use crate::context::{ContextParameters, SessionContexts};

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookRequest {
    pub response_id: Option<String>,
    pub session: String,
    pub query_result: QueryResult,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryResult {
    pub query_text: Option<String>,
    pub action: String,
    pub parameters: ContextParameters,
    pub output_contexts: Vec<OutputContext>,
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputContext {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifespan_count: Option<u32>,
    #[serde(default, skip_serializing_if = "ContextParameters::is_empty")]
    pub parameters: ContextParameters,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub fulfillment_text: String,
    pub fulfillment_messages: Vec<FulfillmentMessage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_contexts: Vec<OutputContext>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FulfillmentMessage {
    pub text: TextMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextMessage {
    pub text: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl WebhookRequest {
    /// Contexts that were active when the request was made. A context without
    /// a lifespan is treated as active for this turn only.
    pub(crate) fn session_contexts(&self) -> SessionContexts {
        let mut contexts = SessionContexts::new();
        for context in &self.query_result.output_contexts {
            contexts.insert(
                &context.name,
                context.lifespan_count.unwrap_or(0),
                context.parameters.clone(),
            );
        }
        contexts
    }
}

impl WebhookResponse {
    pub(crate) fn new(messages: Vec<String>, session: &str, contexts: &SessionContexts) -> Self {
        let output_contexts = contexts
            .written()
            .map(|(name, entry)| OutputContext {
                name: context_path(session, name),
                lifespan_count: Some(entry.lifespan),
                parameters: entry.parameters.clone(),
            })
            .collect();
        Self {
            fulfillment_text: messages.join("\n"),
            fulfillment_messages: messages
                .into_iter()
                .map(|text| FulfillmentMessage {
                    text: TextMessage { text: vec![text] },
                })
                .collect(),
            output_contexts,
        }
    }
}

fn context_path(session: &str, name: &str) -> String {
    let session = session.trim().trim_end_matches('/');
    if session.is_empty() {
        name.to_string()
    } else {
        format!("{}/contexts/{}", session, name)
    }
}
