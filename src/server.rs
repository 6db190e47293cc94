//! # HTTP Server
//!
//! The `axum` router exposing the alert endpoint. Handler failures are turned
//! into JSON error bodies of the form `{"detail": "..."}` with the status code
//! chosen by `AlertError::status_code`.

use crate::core::{AlertPayload, AlertReceipt};
use crate::error::AlertError;
use crate::handler::AlertHandler;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::trace;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<AlertHandler>,
    pub prom_handle: Option<PrometheusHandle>,
}

/// Builds the application router. `/metrics` is only mounted when a
/// Prometheus handle is present.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/alert", post(post_alert))
        .route("/health", get(health));
    if state.prom_handle.is_some() {
        router = router.route("/metrics", get(render_metrics));
    }
    router.with_state(state)
}

async fn post_alert(
    State(state): State<AppState>,
    Json(payload): Json<AlertPayload>,
) -> Result<Json<AlertReceipt>, AlertError> {
    trace!(?payload, "Received alert");
    let receipt = state.handler.handle(&payload).await?;
    Ok(Json(receipt))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "routes": state.handler.table().len(),
    }))
}

async fn render_metrics(State(state): State<AppState>) -> String {
    state
        .prom_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

impl IntoResponse for AlertError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
