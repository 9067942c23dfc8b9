use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::models::{ErrorResponse, WebhookRequest, WebhookResponse};
use super::state::ServerState;
use crate::backend::TranslationBackend;
use crate::fulfillment::Fulfillment;
use crate::resolver::TurnParameters;

pub async fn run_server<B>(fulfillment: Fulfillment<B>, addr: String) -> Result<()>
where
    B: TranslationBackend + 'static,
{
    let app = build_app(fulfillment);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind server address: {}", addr))?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_app<B>(fulfillment: Fulfillment<B>) -> Router
where
    B: TranslationBackend + 'static,
{
    let state = Arc::new(ServerState { fulfillment });
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook::<B>))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn webhook<B>(
    State(state): State<Arc<ServerState<B>>>,
    Json(payload): Json<WebhookRequest>,
) -> Result<Json<WebhookResponse>, (StatusCode, Json<ErrorResponse>)>
where
    B: TranslationBackend + 'static,
{
    debug!("webhook request: {:?}", payload);
    let action = payload.query_result.action.trim();
    let parameters = TurnParameters::from_parameters(&payload.query_result.parameters);
    let mut contexts = payload.session_contexts();

    let messages = state
        .fulfillment
        .handle(action, &parameters, &mut contexts)
        .await
        .map_err(|err| {
            warn!("{}", err);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
        })?;

    Ok(Json(WebhookResponse::new(
        messages,
        &payload.session,
        &contexts,
    )))
}
