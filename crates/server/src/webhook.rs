//! Custom-action webhook spoken by the dialogue framework.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use immo_actions::{ActionRegistry, Tracker};
use immo_core::errors::{ApplicationError, InterfaceError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct WebhookState {
    registry: Arc<ActionRegistry>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub next_action: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub tracker: Tracker,
}

#[derive(Debug, Serialize)]
pub struct WebhookError {
    pub error: String,
    pub action_name: String,
    pub correlation_id: String,
}

#[derive(Debug, Serialize)]
pub struct ActionDescriptor {
    pub name: &'static str,
}

pub fn router(registry: Arc<ActionRegistry>) -> Router {
    Router::new()
        .route("/webhook", post(run_action))
        .route("/actions", get(list_actions))
        .with_state(WebhookState { registry })
}

pub async fn run_action(
    State(state): State<WebhookState>,
    Json(request): Json<WebhookRequest>,
) -> Response {
    let WebhookRequest { next_action, sender_id, mut tracker } = request;

    // The sender id doubles as correlation id; anonymous calls get a fresh one.
    let correlation_id = sender_id
        .filter(|id| !id.trim().is_empty())
        .or_else(|| Some(tracker.sender_id.clone()).filter(|id| !id.trim().is_empty()))
        .unwrap_or_else(|| format!("anon-{}", Uuid::new_v4()));
    if tracker.sender_id.trim().is_empty() {
        tracker.sender_id = correlation_id.clone();
    }

    if next_action.trim().is_empty() {
        let error = ApplicationError::InvalidRequest("next_action must not be empty".to_string());
        return error_response(error.into_interface(correlation_id), next_action);
    }

    match state.registry.execute(&next_action, &tracker).await {
        Ok(response) => {
            info!(
                event_name = "http.webhook.completed",
                correlation_id = %correlation_id,
                action_name = %next_action,
                "webhook action answered"
            );
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(dispatch_error) => {
            let error = ApplicationError::from(dispatch_error);
            error_response(error.into_interface(correlation_id), next_action)
        }
    }
}

pub async fn list_actions(State(state): State<WebhookState>) -> Json<Vec<ActionDescriptor>> {
    Json(state.registry.names().into_iter().map(|name| ActionDescriptor { name }).collect())
}

fn error_response(error: InterfaceError, action_name: String) -> Response {
    let (status, message) = match &error {
        InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
        InterfaceError::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.clone()),
    };

    warn!(
        event_name = "http.webhook.rejected",
        correlation_id = %error.correlation_id(),
        action_name = %action_name,
        status = status.as_u16(),
        error = %message,
        "webhook request rejected"
    );

    let body = WebhookError {
        error: message,
        action_name,
        correlation_id: error.correlation_id().to_string(),
    };
    (status, Json(body)).into_response()
}
