//! Drives the webhook router in-process, without binding a socket.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use translate_fulfillment::backend::BackendFuture;
use translate_fulfillment::server::build_app;
use translate_fulfillment::server::models::{ErrorResponse, WebhookResponse};
use translate_fulfillment::{Fulfillment, LanguageMapping, TranslationBackend, TranslationRequest};

const SESSION: &str = "projects/lvp-gunther/agent/sessions/1234";

#[derive(Clone)]
struct FakeBackend {
    reply: Result<String, String>,
    calls: Arc<Mutex<Vec<TranslationRequest>>>,
}

impl FakeBackend {
    fn new(reply: Result<&str, &str>) -> Self {
        Self {
            reply: reply.map(str::to_string).map_err(str::to_string),
            calls: Arc::default(),
        }
    }

    fn calls(&self) -> Vec<TranslationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl TranslationBackend for FakeBackend {
    fn translate(&self, request: TranslationRequest) -> BackendFuture {
        self.calls.lock().unwrap().push(request);
        let reply = self.reply.clone();
        Box::pin(async move { reply.map_err(anyhow::Error::msg) })
    }
}

fn app(backend: &FakeBackend) -> axum::Router {
    build_app(Fulfillment::new(
        LanguageMapping::load().unwrap(),
        backend.clone(),
    ))
}

fn webhook_body(action: &str, parameters: Value, contexts: Value) -> Body {
    Body::from(
        json!({
            "responseId": "r-1",
            "session": SESSION,
            "queryResult": {
                "queryText": "translate",
                "action": action,
                "parameters": parameters,
                "outputContexts": contexts
            }
        })
        .to_string(),
    )
}

async fn post(app: axum::Router, body: Body) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let backend = FakeBackend::new(Ok("unused"));
    let response = app(&backend)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn translates_and_rewrites_context() {
    let backend = FakeBackend::new(Ok("hallo"));
    let (status, body) = post(
        app(&backend),
        webhook_body(
            "translate.text",
            json!({ "text": "hello", "lang-to": "Dutch", "lang-from": "" }),
            json!([]),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: WebhookResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.fulfillment_text, "hallo, @{nickname}");
    assert_eq!(response.fulfillment_messages.len(), 1);
    assert_eq!(response.output_contexts.len(), 1);
    let context = &response.output_contexts[0];
    assert_eq!(context.name, format!("{}/contexts/translate-text", SESSION));
    assert_eq!(context.lifespan_count, Some(2));
    assert_eq!(context.parameters["lang-to"], "Dutch");
    assert!(context.parameters.get("lang-from").is_none());

    assert_eq!(
        backend.calls(),
        vec![TranslationRequest {
            text: "hello".to_string(),
            to_code: "nl".to_string(),
            from_code: None,
        }]
    );
}

#[tokio::test]
async fn answer_is_merged_with_prior_context() {
    let backend = FakeBackend::new(Ok("hello"));
    let (status, body) = post(
        app(&backend),
        webhook_body(
            "translate.text",
            json!({ "lang-to": "english" }),
            json!([{
                "name": format!("{}/contexts/translate-text", SESSION),
                "lifespanCount": 1,
                "parameters": { "text": "hola", "lang-from": "español" }
            }]),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: WebhookResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.fulfillment_text, "hello, @{nickname}");
    assert_eq!(
        backend.calls(),
        vec![TranslationRequest {
            text: "hola".to_string(),
            to_code: "en".to_string(),
            from_code: Some("es".to_string()),
        }]
    );
}

#[tokio::test]
async fn missing_text_prompt_still_saves_context() {
    let backend = FakeBackend::new(Ok("unused"));
    let (status, body) = post(
        app(&backend),
        webhook_body("translate.text", json!({ "lang-to": "klingon" }), json!([])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: WebhookResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        response.fulfillment_text,
        "What text would you like to translate, @{nickname}?"
    );
    assert_eq!(response.output_contexts[0].parameters["lang-to"], "klingon");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn unknown_language_is_named_in_the_reply() {
    let backend = FakeBackend::new(Ok("unused"));
    let (_, body) = post(
        app(&backend),
        webhook_body(
            "translate.text",
            json!({ "text": "hi", "lang-to": "klingon" }),
            json!([]),
        ),
    )
    .await;

    let response: WebhookResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        response.fulfillment_text,
        "Sorry, I don't know what language klingon is, @{nickname}."
    );
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn backend_failure_is_an_apology() {
    let backend = FakeBackend::new(Err("503 Service Unavailable"));
    let (status, body) = post(
        app(&backend),
        webhook_body(
            "translate.text",
            json!({ "text": "hi", "lang-to": "german" }),
            json!([]),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: WebhookResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        response.fulfillment_text,
        "Sorry {nickname}, the translation service is currently unavailable."
    );
}

#[tokio::test]
async fn empty_translation_is_untranslatable() {
    let backend = FakeBackend::new(Ok(""));
    let (_, body) = post(
        app(&backend),
        webhook_body(
            "translate.text",
            json!({ "text": "hi", "lang-to": "latin" }),
            json!([]),
        ),
    )
    .await;

    let response: WebhookResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        response.fulfillment_text,
        "Sorry {nickname}, I don't know how to translate that yet."
    );
}

#[tokio::test]
async fn unsupported_action_is_rejected() {
    let backend = FakeBackend::new(Ok("unused"));
    let (status, body) = post(
        app(&backend),
        webhook_body("smalltalk.greetings", json!({ "text": "hi" }), json!([])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        error.error,
        "No handler for requested action: smalltalk.greetings"
    );
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn webhook_serves_only_post_without_cors_headers() {
    let backend = FakeBackend::new(Ok("unused"));
    let response = app(&backend)
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/webhook")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.headers().get("access-control-allow-origin").is_none());

    let response = app(&backend)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(webhook_body(
                    "translate.text",
                    json!({ "text": "hi" }),
                    json!([]),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("access-control-allow-origin").is_none());
}
